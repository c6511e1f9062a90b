//! Unified error model for the role/privilege core.
//! Every failure of construction, resolution input or (de)serialization surfaces as an
//! `AclError`; helpers map each variant to a stable code and to pgwire fields.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AclError {
    /// Document parse: a specific token kind was required but another was found.
    #[error("failed to parse {context}, expected {expected} but got {found}")]
    UnexpectedToken { context: String, expected: &'static str, found: String },

    /// Document parse: a field name outside the recognized set.
    #[error("failed to parse {context}, unexpected field name: {field}")]
    UnexpectedField { context: &'static str, field: String },

    /// Document parse: mandatory data absent from an otherwise well-formed document.
    #[error("failed to parse {context}, not found")]
    NotFound { context: &'static str },

    /// Password without login, or a superuser without login.
    #[error("invalid role '{role}': {reason}")]
    Invariant { role: String, reason: String },

    /// Encoded input (bytes or document values) that cannot describe a valid value.
    #[error("malformed {context}: {message}")]
    Malformed { context: &'static str, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("cannot cast value '{value}' to type {target}")]
    Conversion { value: String, target: String },

    #[error("function {function} expects {expected} arguments, got {actual}")]
    Arity { function: &'static str, expected: usize, actual: usize },
}

pub type AclResult<T> = Result<T, AclError>;

impl AclError {
    pub fn invariant(role: impl Into<String>, reason: impl Into<String>) -> Self {
        AclError::Invariant { role: role.into(), reason: reason.into() }
    }

    pub fn malformed(context: &'static str, message: impl Into<String>) -> Self {
        AclError::Malformed { context, message: message.into() }
    }

    pub fn code_str(&self) -> &'static str {
        match self {
            AclError::UnexpectedToken { .. } | AclError::UnexpectedField { .. } => "parse_error",
            AclError::NotFound { .. } => "not_found",
            AclError::Invariant { .. } => "invariant_violation",
            AclError::Malformed { .. } => "malformed_stream",
            AclError::Io(_) => "io_error",
            AclError::Json(_) => "json_error",
            AclError::Conversion { .. } => "conversion_error",
            AclError::Arity { .. } => "arity_error",
        }
    }

    /// True for failures caused by persisted or transmitted bytes rather than the caller.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            AclError::UnexpectedToken { .. }
                | AclError::UnexpectedField { .. }
                | AclError::NotFound { .. }
                | AclError::Malformed { .. }
                | AclError::Json(_)
        )
    }

    /// Pgwire mapping: return (sqlstate, severity, message)
    pub fn pgwire_fields(&self) -> (&'static str, &'static str, String) {
        let msg = self.to_string();
        match self {
            AclError::UnexpectedToken { .. }
            | AclError::UnexpectedField { .. }
            | AclError::NotFound { .. }
            | AclError::Malformed { .. }
            | AclError::Json(_) => ("XX001", "ERROR", msg), // data_corrupted
            AclError::Invariant { .. } => ("XX000", "ERROR", msg), // internal_error
            AclError::Io(_) => ("58030", "ERROR", msg),            // io_error
            AclError::Conversion { .. } => ("22P02", "ERROR", msg), // invalid_text_representation
            AclError::Arity { .. } => ("42883", "ERROR", msg),      // undefined_function
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_sqlstates() {
        let e = AclError::UnexpectedField { context: "a role", field: "bogus".into() };
        assert_eq!(e.code_str(), "parse_error");
        assert_eq!(e.to_string(), "failed to parse a role, unexpected field name: bogus");
        let (code, sev, _) = e.pgwire_fields();
        assert_eq!(code, "XX001");
        assert_eq!(sev, "ERROR");
        assert!(e.is_corruption());

        let e = AclError::invariant("r1", "cannot have a password without login");
        assert_eq!(e.pgwire_fields().0, "XX000");
        assert!(!e.is_corruption());

        let e = AclError::from(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"));
        assert_eq!(e.code_str(), "io_error");
        assert_eq!(e.pgwire_fields().0, "58030");
    }

    #[test]
    fn not_found_message() {
        let e = AclError::NotFound { context: "role properties" };
        assert_eq!(e.to_string(), "failed to parse role properties, not found");
    }
}
