use std::collections::BTreeSet;
use std::fmt;

use once_cell::sync::Lazy;
use tracing::{debug, warn};

use super::granted::GrantedRoles;
use super::privileges::PrivilegeSet;
use super::properties::Properties;
use super::secure_hash::SecureHash;
use crate::error::{AclError, AclResult};

/// Name of the bootstrap administrative principal.
pub const SUPERUSER_NAME: &str = "crate";

// The only superuser: login-capable, no password, no stored privileges. Never persisted.
static SUPERUSER: Lazy<Role> = Lazy::new(|| Role {
    name: SUPERUSER_NAME.to_string(),
    privileges: PrivilegeSet::new(),
    granted_roles: GrantedRoles::new(),
    properties: Properties::login_only(),
    is_superuser: true,
});

/// A named principal: privileges, role memberships and login properties.
/// Immutable; every update returns a new `Role`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Role {
    name: String,
    privileges: PrivilegeSet,
    granted_roles: GrantedRoles,
    properties: Properties,
    is_superuser: bool,
}

impl Role {
    /// Build an ordinary (non-superuser) role or user.
    pub fn new(
        name: impl Into<String>,
        login: bool,
        privileges: PrivilegeSet,
        granted_roles: GrantedRoles,
        password: Option<SecureHash>,
    ) -> AclResult<Self> {
        let name = name.into();
        let properties = Properties::new(&name, login, password)?;
        Self::build(name, privileges, granted_roles, properties, false)
    }

    /// Build from already validated parts, as the codecs do. Never yields a superuser.
    pub fn from_parts(
        name: impl Into<String>,
        privileges: PrivilegeSet,
        granted_roles: GrantedRoles,
        properties: Properties,
    ) -> AclResult<Self> {
        Self::build(name.into(), privileges, granted_roles, properties, false)
    }

    pub fn superuser() -> &'static Role { &SUPERUSER }

    fn build(
        name: String,
        privileges: PrivilegeSet,
        granted_roles: GrantedRoles,
        properties: Properties,
        is_superuser: bool,
    ) -> AclResult<Self> {
        if !properties.login() {
            if properties.password().is_some() {
                warn!(target: "clarium_acl::role", "rejecting role '{}': password without login", name);
                return Err(AclError::invariant(name, "a role without login cannot have a password"));
            }
            if is_superuser {
                warn!(target: "clarium_acl::role", "rejecting role '{}': superuser without login", name);
                return Err(AclError::invariant(name, "a role without login cannot be a superuser"));
            }
        }
        Ok(Self { name, privileges, granted_roles, properties, is_superuser })
    }

    /// Same role with `privileges` replaced.
    pub fn with_privileges(&self, privileges: PrivilegeSet) -> Role {
        debug!(target: "clarium_acl::role", "role '{}': replacing {} privileges with {}", self.name, self.privileges.len(), privileges.len());
        Role { privileges, ..self.clone() }
    }

    /// Same role with its membership edges replaced.
    pub fn with_granted_roles(&self, granted_roles: GrantedRoles) -> Role {
        Role { granted_roles, ..self.clone() }
    }

    /// Same role with the credential replaced (or cleared). Does not change the login flag.
    pub fn with_password(&self, password: Option<SecureHash>) -> AclResult<Role> {
        let properties = Properties::new(&self.name, self.properties.login(), password)?;
        Self::build(self.name.clone(), self.privileges.clone(), self.granted_roles.clone(), properties, self.is_superuser)
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn privileges(&self) -> &PrivilegeSet { &self.privileges }
    pub fn granted_roles(&self) -> &GrantedRoles { &self.granted_roles }
    pub fn properties(&self) -> &Properties { &self.properties }
    pub fn password(&self) -> Option<&SecureHash> { self.properties.password() }
    /// Login-capable roles are users.
    pub fn is_user(&self) -> bool { self.properties.login() }
    pub fn is_superuser(&self) -> bool { self.is_superuser }

    /// Names of the roles this role is a member of; grantors are dropped.
    pub fn granted_role_names(&self) -> BTreeSet<String> {
        self.granted_roles.names().map(str::to_string).collect()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_user() { "User" } else { "Role" };
        let pw = if self.password().is_some() { "*****" } else { "null" };
        write!(f, "{}{{{}, {}}}", kind, self.name, pw)
    }
}
