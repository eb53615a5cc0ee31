//! Input validation for user params.
//!
//! Field rules are declared with `validator` derives on the param types; this
//! module runs them and turns the result into a deterministic list of
//! [`FieldViolation`]s. Nothing here performs I/O.

use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{DomainError, DomainResult, FieldViolation};
use crate::user::{CreateUserParams, UpdateUserParams};

/// Check creation params: email shape, non-empty names, password length.
pub fn validate_create(params: &CreateUserParams) -> DomainResult<()> {
    params.validate().map_err(into_domain_error)
}

/// Check update params. Only supplied fields are validated.
pub fn validate_update(params: &UpdateUserParams) -> DomainResult<()> {
    params.validate().map_err(into_domain_error)
}

/// Email must hold exactly one `@` with something on both sides.
pub fn validate_email_shape(email: &str) -> Result<(), ValidationError> {
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };

    if well_formed {
        Ok(())
    } else {
        let mut err = ValidationError::new("email");
        err.message = Some("must contain a single @ with non-empty local and domain parts".into());
        Err(err)
    }
}

/// Flatten validator output, sorted so identical input always yields identical errors.
fn into_domain_error(errors: ValidationErrors) -> DomainError {
    let mut violations: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |e| {
                let reason = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("is invalid ({})", e.code));
                FieldViolation::new(field.clone(), reason)
            })
        })
        .collect();

    violations.sort();
    DomainError::Validation(violations)
}
