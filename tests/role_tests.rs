//! Role construction, invariants and functional updates.

use clarium_acl::role::{
    GrantedRole, GrantedRoles, Permission, Policy, Privilege, PrivilegeSet, Role, Securable, SecureHash,
};
use clarium_acl::AclError;

fn pw(seed: u8) -> SecureHash { SecureHash::new(10_000, vec![seed; 32], vec![seed ^ 0xFF; 16]) }

fn privs(items: Vec<Privilege>) -> PrivilegeSet { items.into_iter().collect() }

fn schema_grant(policy: Policy, schema: &str) -> Privilege {
    Privilege::scoped(policy, Permission::Dql, Securable::Schema, schema, "crate").unwrap()
}

#[test]
fn role_without_login_cannot_have_password() {
    let err = Role::new("r", false, PrivilegeSet::new(), GrantedRoles::new(), Some(pw(1))).unwrap_err();
    match err {
        AclError::Invariant { role, reason } => {
            assert_eq!(role, "r");
            assert!(reason.contains("password"), "reason: {}", reason);
        }
        other => panic!("expected invariant violation, got {:?}", other),
    }
}

#[test]
fn ordinary_constructor_never_makes_superusers() {
    let user = Role::new("crate", true, PrivilegeSet::new(), GrantedRoles::new(), None).unwrap();
    assert!(!user.is_superuser());
    assert_ne!(&user, Role::superuser());
}

#[test]
fn with_password_keeps_login_flag_and_rechecks_invariant() {
    let user = Role::new("ford", true, PrivilegeSet::new(), GrantedRoles::new(), None).unwrap();
    let rotated = user.with_password(Some(pw(2))).unwrap();
    assert!(rotated.is_user());
    assert_eq!(rotated.password(), Some(&pw(2)));
    assert!(user.password().is_none());

    let cleared = rotated.with_password(None).unwrap();
    assert!(cleared.password().is_none());
    assert_eq!(cleared, user);

    let role = Role::new("analyst", false, PrivilegeSet::new(), GrantedRoles::new(), None).unwrap();
    assert!(matches!(role.with_password(Some(pw(3))), Err(AclError::Invariant { .. })));
}

#[test]
fn with_privileges_leaves_originals_untouched() {
    let original = Role::new("u", true, privs(vec![schema_grant(Policy::Grant, "doc")]), GrantedRoles::new(), Some(pw(4))).unwrap();
    let snapshot = original.clone();

    let first = original.with_privileges(privs(vec![schema_grant(Policy::Deny, "doc")]));
    let second = first.with_privileges(PrivilegeSet::new());

    assert_eq!(original, snapshot);
    assert_eq!(first.privileges().len(), 1);
    assert_eq!(first.privileges().iter().next().unwrap().policy(), Policy::Deny);
    assert!(second.privileges().is_empty());
    assert_eq!(first.name(), original.name());
    assert_eq!(first.password(), original.password());
    assert_eq!(original.resolve(Permission::Dql, Securable::Schema, &clarium_acl::role::Exact("doc")), Policy::Grant);
}

#[test]
fn with_granted_roles_replaces_edges() {
    let role = Role::new("u", true, PrivilegeSet::new(), [GrantedRole::new("a", "x")].into_iter().collect(), None).unwrap();
    let updated = role.with_granted_roles([GrantedRole::new("b", "y")].into_iter().collect());
    assert_eq!(role.granted_role_names().into_iter().collect::<Vec<_>>(), vec!["a".to_string()]);
    assert_eq!(updated.granted_role_names().into_iter().collect::<Vec<_>>(), vec!["b".to_string()]);
}

#[test]
fn equality_and_hash_are_structural() {
    use std::collections::HashSet;

    let make = |grantor: &str| {
        Role::new("u", true, privs(vec![schema_grant(Policy::Grant, "doc")]), [GrantedRole::new("r", grantor)].into_iter().collect(), None).unwrap()
    };
    let a = make("x");
    let b = make("x");
    let c = make("y");
    assert_eq!(a, b);
    assert_ne!(a, c);

    let set: HashSet<Role> = [a, b, c].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn record_order_does_not_affect_equality() {
    use std::collections::HashSet;

    let cluster = Privilege::cluster(Policy::Grant, Permission::Dql, "crate");
    let schema = schema_grant(Policy::Deny, "doc");
    let forward = Role::new("u", true, privs(vec![cluster.clone(), schema.clone()]), GrantedRoles::new(), None).unwrap();
    let reversed = Role::new("u", true, privs(vec![schema, cluster]), GrantedRoles::new(), None).unwrap();

    assert_eq!(forward, reversed);
    let set: HashSet<Role> = [forward, reversed].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn roles_are_shareable_across_threads() {
    let role = std::sync::Arc::new(
        Role::new("u", true, privs(vec![Privilege::cluster(Policy::Grant, Permission::Dml, "crate")]), GrantedRoles::new(), None).unwrap(),
    );
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let role = role.clone();
            std::thread::spawn(move || role.resolve(Permission::Dml, Securable::Table, &clarium_acl::role::Exact("doc.t")))
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), Policy::Grant);
    }
}
