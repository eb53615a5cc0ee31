//! Domain-level constants.
//!
//! These constants define the validation requirements for user accounts.

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement (in characters)
pub const MIN_PASSWORD_LENGTH: u64 = 7;

/// Minimum name length requirement (in characters)
pub const MIN_NAME_LENGTH: u64 = 1;

// =============================================================================
// Redaction
// =============================================================================

/// Placeholder printed instead of secrets in debug output
pub const REDACTED: &str = "[REDACTED]";
