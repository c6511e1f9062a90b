use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use super::privilege::{Privilege, Subject};

/// Insertion-ordered privileges with at most one record per `Subject`.
/// Adding a record for a subject already present replaces it in place.
#[derive(Debug, Clone, Default)]
pub struct PrivilegeSet {
    entries: Vec<Privilege>,
    index: HashMap<Subject, usize>,
}

impl PrivilegeSet {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, privilege: Privilege) -> Option<Privilege> {
        match self.index.get(privilege.subject()) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos], privilege)),
            None => {
                self.index.insert(privilege.subject().clone(), self.entries.len());
                self.entries.push(privilege);
                None
            }
        }
    }

    pub fn get(&self, subject: &Subject) -> Option<&Privilege> {
        self.index.get(subject).map(|&pos| &self.entries[pos])
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn iter(&self) -> std::slice::Iter<'_, Privilege> { self.entries.iter() }
}

impl FromIterator<Privilege> for PrivilegeSet {
    fn from_iter<I: IntoIterator<Item = Privilege>>(iter: I) -> Self {
        let mut set = PrivilegeSet::new();
        for p in iter { set.insert(p); }
        set
    }
}

impl<'a> IntoIterator for &'a PrivilegeSet {
    type Item = &'a Privilege;
    type IntoIter = std::slice::Iter<'a, Privilege>;
    fn into_iter(self) -> Self::IntoIter { self.entries.iter() }
}

// Set semantics: insertion order is kept for the codecs but ignored by Eq and Hash.
impl PartialEq for PrivilegeSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.entries.iter().all(|p| other.get(p.subject()) == Some(p))
    }
}

impl Eq for PrivilegeSet {}

impl Hash for PrivilegeSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let combined = self.entries.iter().fold(0u64, |acc, p| {
            let mut h = DefaultHasher::new();
            p.hash(&mut h);
            acc.wrapping_add(h.finish())
        });
        self.len().hash(state);
        combined.hash(state);
    }
}
