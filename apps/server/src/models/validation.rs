use validator::ValidationErrors;

use crate::Error;

pub const MAX_NAME_LEN: u64 = 120;

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, ' ' | '-' | '.' | '\'' | '/')
}

/// Letters, digits, spaces and `- . ' /`, not blank once trimmed.
pub fn validate_name(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    if !value.chars().all(is_name_char) {
        let mut err = validator::ValidationError::new("name_chars");
        err.message =
            Some("may only contain letters, digits, spaces and - . ' /".into());
        return Err(err);
    }
    Ok(())
}

/// Flattens `validator` output into a single caller-facing message.
pub fn describe(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => format!("{field}: {message}"),
                None => format!("{field}: invalid ({})", e.code),
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Error::Validation(describe(&errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert!(validate_name("North Field 2").is_ok());
        assert!(validate_name("O'Brien-Smith Farm / East").is_ok());
        assert!(validate_name("Šljivik").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("drop;table").is_err());
    }
}
