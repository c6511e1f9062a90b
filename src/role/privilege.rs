//! Grant records: the decision (policy) for one permission on one securable scope.

use std::fmt;

use crate::error::{AclError, AclResult};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Policy { Grant = 0, Deny = 1, Revoke = 2 }

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Permission {
    /// Read data
    Dql = 0,
    /// Write data
    Dml = 1,
    /// Schema change
    Ddl = 2,
    /// Administration
    Al = 3,
}

/// Scope kinds, ordered from least to most specific.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Securable { Cluster = 0, Schema = 1, Table = 2, View = 3 }

impl Policy {
    pub const ALL: [Policy; 3] = [Policy::Grant, Policy::Deny, Policy::Revoke];
    pub fn ordinal(self) -> u32 { self as u32 }
    pub fn from_ordinal(v: u32) -> Option<Self> { Self::ALL.get(v as usize).copied() }
}

impl Permission {
    pub const ALL: [Permission; 4] = [Permission::Dql, Permission::Dml, Permission::Ddl, Permission::Al];
    pub fn ordinal(self) -> u32 { self as u32 }
    pub fn from_ordinal(v: u32) -> Option<Self> { Self::ALL.get(v as usize).copied() }
}

impl Securable {
    pub const ALL: [Securable; 4] = [Securable::Cluster, Securable::Schema, Securable::Table, Securable::View];
    pub fn ordinal(self) -> u32 { self as u32 }
    pub fn from_ordinal(v: u32) -> Option<Self> { Self::ALL.get(v as usize).copied() }
    /// Every scope except the cluster names its target object.
    pub fn requires_ident(self) -> bool { self != Securable::Cluster }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Policy::Grant => "GRANT", Policy::Deny => "DENY", Policy::Revoke => "REVOKE" })
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Permission::Dql => "DQL", Permission::Dml => "DML", Permission::Ddl => "DDL", Permission::Al => "AL" })
    }
}

impl fmt::Display for Securable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Securable::Cluster => "CLUSTER",
            Securable::Schema => "SCHEMA",
            Securable::Table => "TABLE",
            Securable::View => "VIEW",
        })
    }
}

/// What a privilege applies to. Two privileges with the same subject are duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subject {
    permission: Permission,
    securable: Securable,
    ident: Option<String>,
}

impl Subject {
    /// Rejects a missing ident on a non-cluster scope and any ident on the cluster scope.
    pub fn new(permission: Permission, securable: Securable, ident: Option<String>) -> AclResult<Self> {
        match (securable.requires_ident(), ident.is_some()) {
            (true, false) => Err(AclError::malformed("privilege", format!("{} privilege requires an ident", securable))),
            (false, true) => Err(AclError::malformed("privilege", "CLUSTER privilege cannot carry an ident")),
            _ => Ok(Self { permission, securable, ident }),
        }
    }

    pub fn cluster(permission: Permission) -> Self {
        Self { permission, securable: Securable::Cluster, ident: None }
    }

    pub fn permission(&self) -> Permission { self.permission }
    pub fn securable(&self) -> Securable { self.securable }
    pub fn ident(&self) -> Option<&str> { self.ident.as_deref() }
}

/// Immutable grant record `(policy, permission, securable, ident?, grantor)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Privilege {
    policy: Policy,
    subject: Subject,
    grantor: String,
}

impl Privilege {
    pub fn new(policy: Policy, subject: Subject, grantor: impl Into<String>) -> Self {
        Self { policy, subject, grantor: grantor.into() }
    }

    pub fn cluster(policy: Policy, permission: Permission, grantor: impl Into<String>) -> Self {
        Self::new(policy, Subject::cluster(permission), grantor)
    }

    pub fn scoped(
        policy: Policy,
        permission: Permission,
        securable: Securable,
        ident: impl Into<String>,
        grantor: impl Into<String>,
    ) -> AclResult<Self> {
        Ok(Self::new(policy, Subject::new(permission, securable, Some(ident.into()))?, grantor))
    }

    pub fn policy(&self) -> Policy { self.policy }
    pub fn subject(&self) -> &Subject { &self.subject }
    pub fn permission(&self) -> Permission { self.subject.permission }
    pub fn securable(&self) -> Securable { self.subject.securable }
    pub fn ident(&self) -> Option<&str> { self.subject.ident() }
    pub fn grantor(&self) -> &str { &self.grantor }
}
