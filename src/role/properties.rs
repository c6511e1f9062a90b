use super::secure_hash::SecureHash;
use crate::error::{AclError, AclResult};

/// Login capability plus the optional credential. A role that cannot log in has no password.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Properties {
    login: bool,
    password: Option<SecureHash>,
}

impl Properties {
    /// `role` is only used to name the offender in the error.
    pub fn new(role: &str, login: bool, password: Option<SecureHash>) -> AclResult<Self> {
        if !login && password.is_some() {
            return Err(AclError::invariant(role, "a role without login cannot have a password"));
        }
        Ok(Self { login, password })
    }

    /// Login-capable without a credential; always valid.
    pub fn login_only() -> Self { Self { login: true, password: None } }

    pub fn login(&self) -> bool { self.login }
    pub fn password(&self) -> Option<&SecureHash> { self.password.as_ref() }
}
