use std::collections::BTreeMap;

/// Membership edge: the owning role has been granted `role_name` by `grantor`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GrantedRole {
    role_name: String,
    grantor: String,
}

impl GrantedRole {
    pub fn new(role_name: impl Into<String>, grantor: impl Into<String>) -> Self {
        Self { role_name: role_name.into(), grantor: grantor.into() }
    }

    pub fn role_name(&self) -> &str { &self.role_name }
    pub fn grantor(&self) -> &str { &self.grantor }
}

/// Membership edges keyed by target role name. Granting the same role again
/// replaces the recorded grantor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GrantedRoles {
    by_name: BTreeMap<String, String>,
}

impl GrantedRoles {
    pub fn new() -> Self { Self::default() }

    /// Returns the previous grantor when `role_name` was already granted.
    pub fn grant(&mut self, edge: GrantedRole) -> Option<String> {
        self.by_name.insert(edge.role_name, edge.grantor)
    }

    pub fn revoke(&mut self, role_name: &str) -> Option<String> { self.by_name.remove(role_name) }

    pub fn grantor_of(&self, role_name: &str) -> Option<&str> { self.by_name.get(role_name).map(String::as_str) }
    pub fn contains(&self, role_name: &str) -> bool { self.by_name.contains_key(role_name) }
    pub fn len(&self) -> usize { self.by_name.len() }
    pub fn is_empty(&self) -> bool { self.by_name.is_empty() }

    /// Edges in role-name order.
    pub fn iter(&self) -> impl Iterator<Item = GrantedRole> + '_ {
        self.by_name.iter().map(|(r, g)| GrantedRole::new(r.as_str(), g.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ { self.by_name.keys().map(String::as_str) }
}

impl FromIterator<GrantedRole> for GrantedRoles {
    fn from_iter<I: IntoIterator<Item = GrantedRole>>(iter: I) -> Self {
        let mut roles = GrantedRoles::new();
        for edge in iter { roles.grant(edge); }
        roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regrant_overwrites_grantor() {
        let mut roles = GrantedRoles::new();
        assert_eq!(roles.grant(GrantedRole::new("analyst", "alice")), None);
        assert_eq!(roles.grant(GrantedRole::new("analyst", "bob")), Some("alice".to_string()));
        assert_eq!(roles.len(), 1);
        assert_eq!(roles.grantor_of("analyst"), Some("bob"));
    }

    #[test]
    fn iterates_in_name_order() {
        let roles: GrantedRoles =
            [GrantedRole::new("b", "x"), GrantedRole::new("a", "y")].into_iter().collect();
        let names: Vec<&str> = roles.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(roles.iter().next(), Some(GrantedRole::new("a", "y")));
    }
}
