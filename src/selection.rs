//! Per-user item selection state
//!
//! A selection is the set of item ids a user has claimed on one bill.
//! Membership is exact on the id string. Insertion order is kept so that
//! listings follow the order in which items were picked.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet {
    ids: Vec<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.ids.iter().any(|id| id == item_id)
    }

    /// Add an item. Returns false if it was already selected.
    pub fn select(&mut self, item_id: &str) -> bool {
        if self.contains(item_id) {
            return false;
        }
        self.ids.push(item_id.to_string());
        true
    }

    /// Remove an item. Returns false if it was not selected.
    pub fn deselect(&mut self, item_id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| id != item_id);
        self.ids.len() != before
    }

    /// Flip membership of one item and return whether it is now selected
    pub fn toggle(&mut self, item_id: &str) -> bool {
        if self.deselect(item_id) {
            false
        } else {
            self.ids.push(item_id.to_string());
            true
        }
    }

    /// Ids from `ids` whose membership differs from `select`, in the given order
    pub fn changes_for_group<S: AsRef<str>>(&self, ids: &[S], select: bool) -> Vec<String> {
        let mut changes: Vec<String> = Vec::new();
        for id in ids {
            let id = id.as_ref();
            if self.contains(id) != select && !changes.iter().any(|c| c == id) {
                changes.push(id.to_string());
            }
        }
        changes
    }

    /// Select or deselect every id in a group. Returns how many ids changed.
    pub fn toggle_group<S: AsRef<str>>(&mut self, ids: &[S], select: bool) -> usize {
        let changes = self.changes_for_group(ids, select);
        for id in &changes {
            if select {
                self.ids.push(id.clone());
            } else {
                self.ids.retain(|existing| existing != id);
            }
        }
        changes.len()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }
}

impl FromIterator<String> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = SelectionSet::new();
        for id in iter {
            set.select(&id);
        }
        set
    }
}

impl From<Vec<String>> for SelectionSet {
    fn from(ids: Vec<String>) -> Self {
        ids.into_iter().collect()
    }
}

impl<'a> From<&[&'a str]> for SelectionSet {
    fn from(ids: &[&'a str]) -> Self {
        ids.iter().map(|id| id.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_restores() {
        let mut set = SelectionSet::from(&["a", "b"][..]);
        let original = set.clone();

        assert!(set.toggle("c"));
        assert!(set.contains("c"));
        assert!(!set.toggle("c"));
        assert_eq!(set, original);

        assert!(!set.toggle("a"));
        assert!(set.toggle("a"));
        assert_eq!(set.len(), 2);
        assert!(set.contains("a"));
    }

    #[test]
    fn test_membership_is_exact() {
        let set = SelectionSet::from(&["item-1"][..]);
        assert!(set.contains("item-1"));
        assert!(!set.contains("item-10"));
        assert!(!set.contains("ITEM-1"));
        assert!(!set.contains("item"));
    }

    #[test]
    fn test_from_iter_deduplicates() {
        let set: SelectionSet = vec!["a".to_string(), "b".to_string(), "a".to_string()].into();
        assert_eq!(set.as_slice(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_group_select_then_clear_restores() {
        let mut set = SelectionSet::from(&["x"][..]);
        let original = set.clone();
        let group = ["p1", "p2", "p3"];

        assert_eq!(set.toggle_group(&group[..], true), 3);
        assert!(group.iter().all(|id| set.contains(id)));

        assert_eq!(set.toggle_group(&group[..], false), 3);
        assert_eq!(set, original);
    }

    #[test]
    fn test_group_toggle_is_idempotent() {
        let mut set = SelectionSet::from(&["p2"][..]);
        let group = ["p1", "p2", "p3"];

        assert_eq!(set.toggle_group(&group[..], true), 2);
        let after_first = set.clone();
        assert_eq!(set.toggle_group(&group[..], true), 0);
        assert_eq!(set, after_first);

        set.toggle_group(&group[..], false);
        let cleared = set.clone();
        assert_eq!(set.toggle_group(&group[..], false), 0);
        assert_eq!(set, cleared);
        assert!(set.is_empty());
    }

    #[test]
    fn test_changes_for_group_only_lists_differences() {
        let set = SelectionSet::from(&["p1", "other"][..]);
        let group = ["p1", "p2", "p2"];
        assert_eq!(set.changes_for_group(&group[..], true), vec!["p2".to_string()]);
        assert_eq!(set.changes_for_group(&group[..], false), vec!["p1".to_string()]);
    }
}
