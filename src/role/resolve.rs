//! Permission resolution over a role's own privileges.
//! Precedence: superuser bypass, then the exact scope, then the cluster-wide default, then REVOKE.
//! Role membership inheritance is resolved by the caller, not here.

use tracing::trace;

use super::principal::Role;
use super::privilege::{Permission, Policy, Securable};

/// Decides whether a stored privilege ident names the queried object.
pub trait IdentMatcher {
    fn matches(&self, stored: &str) -> bool;
}

/// Plain string equality.
#[derive(Debug, Clone, Copy)]
pub struct Exact<'a>(pub &'a str);

/// Compares through a caller-supplied name -> numeric alias function (e.g. schema OIDs).
#[derive(Debug, Clone, Copy)]
pub struct OidAlias<F> {
    pub oid: i32,
    pub hasher: F,
}

/// Matches any ident; used for cluster-wide queries.
#[derive(Debug, Clone, Copy)]
pub struct AnyIdent;

impl IdentMatcher for Exact<'_> {
    fn matches(&self, stored: &str) -> bool { self.0 == stored }
}

impl<F: Fn(&str) -> i32> IdentMatcher for OidAlias<F> {
    fn matches(&self, stored: &str) -> bool { (self.hasher)(stored) == self.oid }
}

impl IdentMatcher for AnyIdent {
    fn matches(&self, _stored: &str) -> bool { true }
}

impl Role {
    /// Resolve `permission` on the object of kind `securable` selected by `ident`.
    /// The first exact-scope record in stored order decides; otherwise the last
    /// cluster-wide record does; otherwise REVOKE.
    pub fn resolve(&self, permission: Permission, securable: Securable, ident: &impl IdentMatcher) -> Policy {
        if self.is_superuser() {
            return Policy::Grant;
        }
        let mut fallback = Policy::Revoke;
        for privilege in self.privileges() {
            if privilege.permission() != permission {
                continue;
            }
            let exact = privilege.securable() == securable && privilege.ident().map_or(true, |id| ident.matches(id));
            if exact {
                trace!(target: "clarium_acl::resolve", "role '{}': {} on {} resolved by exact record: {}", self.name(), permission, securable, privilege.policy());
                return privilege.policy();
            }
            if privilege.securable() == Securable::Cluster {
                fallback = privilege.policy();
            }
        }
        trace!(target: "clarium_acl::resolve", "role '{}': {} on {} falls back to {}", self.name(), permission, securable, fallback);
        fallback
    }

    /// Schema lookup by numeric alias, as used by catalog code that only carries schema OIDs.
    pub fn match_schema<F: Fn(&str) -> i32>(&self, permission: Permission, oid: i32, hasher: F) -> Policy {
        self.resolve(permission, Securable::Schema, &OidAlias { oid, hasher })
    }

    /// Three-level resolution for a relation: table or view record (ident `schema.table`),
    /// then schema record, then cluster record, then REVOKE.
    /// Schema names contain no `.`, so a stored relation ident splits at its first dot.
    pub fn resolve_table(&self, permission: Permission, schema: &str, table: &str) -> Policy {
        if self.is_superuser() {
            return Policy::Grant;
        }
        let mut schema_fallback: Option<Policy> = None;
        let mut cluster_fallback: Option<Policy> = None;
        for privilege in self.privileges() {
            if privilege.permission() != permission {
                continue;
            }
            match (privilege.securable(), privilege.ident()) {
                (Securable::Table | Securable::View, Some(id)) if id.split_once('.') == Some((schema, table)) => {
                    return privilege.policy();
                }
                (Securable::Schema, Some(id)) if id == schema => {
                    schema_fallback.get_or_insert(privilege.policy());
                }
                (Securable::Cluster, _) => cluster_fallback = Some(privilege.policy()),
                _ => {}
            }
        }
        let policy = schema_fallback.or(cluster_fallback).unwrap_or(Policy::Revoke);
        trace!(target: "clarium_acl::resolve", "role '{}': {} on {}.{} resolved via fallback: {}", self.name(), permission, schema, table, policy);
        policy
    }
}
