//! Typed association tables
//!
//! One table per edge kind, parameterized by the two id types it
//! connects and exposing only link/unlink/list plus a reverse lookup.
//! Ids stay strongly typed from the API surface down to edge storage;
//! nothing here ever round-trips through joined strings.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::RwLock;

use crate::domain::DomainError;

/// Thread-safe many-to-many edge set between two id types.
///
/// The table stores bare edges. Whether an endpoint id actually
/// exists is the owning store's concern, not the table's.
#[derive(Debug)]
pub struct AssociationTable<L, R> {
    edges: RwLock<HashMap<L, HashSet<R>>>,
}

impl<L, R> AssociationTable<L, R>
where
    L: Clone + Eq + Hash + Ord,
    R: Clone + Eq + Hash + Ord,
{
    /// Creates an empty table
    pub fn new() -> Self {
        Self {
            edges: RwLock::new(HashMap::new()),
        }
    }

    /// Add an edge. Returns false if it was already present.
    pub fn link(&self, left: &L, right: &R) -> Result<bool, DomainError> {
        let mut edges = self
            .edges
            .write()
            .map_err(|e| DomainError::internal(format!("Failed to acquire write lock: {}", e)))?;

        Ok(edges.entry(left.clone()).or_default().insert(right.clone()))
    }

    /// Remove an edge. Returns false if it was not present.
    pub fn unlink(&self, left: &L, right: &R) -> Result<bool, DomainError> {
        let mut edges = self
            .edges
            .write()
            .map_err(|e| DomainError::internal(format!("Failed to acquire write lock: {}", e)))?;

        Ok(edges.get_mut(left).is_some_and(|set| set.remove(right)))
    }

    /// All right-hand ids linked to `left`, in sorted order
    pub fn list(&self, left: &L) -> Result<Vec<R>, DomainError> {
        let edges = self
            .edges
            .read()
            .map_err(|e| DomainError::internal(format!("Failed to acquire read lock: {}", e)))?;

        let mut result: Vec<R> = edges
            .get(left)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        result.sort();

        Ok(result)
    }

    /// All left-hand ids linked to `right`, in sorted order
    pub fn list_reverse(&self, right: &R) -> Result<Vec<L>, DomainError> {
        let edges = self
            .edges
            .read()
            .map_err(|e| DomainError::internal(format!("Failed to acquire read lock: {}", e)))?;

        let mut result: Vec<L> = edges
            .iter()
            .filter(|(_, set)| set.contains(right))
            .map(|(left, _)| left.clone())
            .collect();
        result.sort();

        Ok(result)
    }

    /// Drop every edge of `left`. Returns how many edges went away.
    pub fn remove_left(&self, left: &L) -> Result<usize, DomainError> {
        let mut edges = self
            .edges
            .write()
            .map_err(|e| DomainError::internal(format!("Failed to acquire write lock: {}", e)))?;

        Ok(edges.remove(left).map(|set| set.len()).unwrap_or(0))
    }

    /// Drop `right` from every left-hand side. Returns how many edges
    /// went away.
    pub fn remove_right(&self, right: &R) -> Result<usize, DomainError> {
        let mut edges = self
            .edges
            .write()
            .map_err(|e| DomainError::internal(format!("Failed to acquire write lock: {}", e)))?;

        let mut removed = 0;

        for set in edges.values_mut() {
            if set.remove(right) {
                removed += 1;
            }
        }

        Ok(removed)
    }
}

impl<L, R> Default for AssociationTable<L, R>
where
    L: Clone + Eq + Hash + Ord,
    R: Clone + Eq + Hash + Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::IdentityId;
    use crate::domain::team::TeamId;

    fn team(id: &str) -> TeamId {
        TeamId::new(id).unwrap()
    }

    fn identity(id: &str) -> IdentityId {
        IdentityId::new(id).unwrap()
    }

    #[test]
    fn test_link_creates_the_edge() {
        let table: AssociationTable<TeamId, IdentityId> = AssociationTable::new();

        assert!(table.link(&team("t1"), &identity("u1")).unwrap());
        assert_eq!(table.list(&team("t1")).unwrap(), vec![identity("u1")]);
        assert!(table.list(&team("t2")).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_link_reports_existing() {
        let table: AssociationTable<TeamId, IdentityId> = AssociationTable::new();

        assert!(table.link(&team("t1"), &identity("u1")).unwrap());
        assert!(!table.link(&team("t1"), &identity("u1")).unwrap());
    }

    #[test]
    fn test_unlink_missing_edge_is_noop() {
        let table: AssociationTable<TeamId, IdentityId> = AssociationTable::new();

        assert!(!table.unlink(&team("t1"), &identity("u1")).unwrap());

        table.link(&team("t1"), &identity("u1")).unwrap();
        assert!(table.unlink(&team("t1"), &identity("u1")).unwrap());
        assert!(!table.unlink(&team("t1"), &identity("u1")).unwrap());
    }

    #[test]
    fn test_list_is_sorted() {
        let table: AssociationTable<TeamId, IdentityId> = AssociationTable::new();

        table.link(&team("t1"), &identity("u3")).unwrap();
        table.link(&team("t1"), &identity("u1")).unwrap();
        table.link(&team("t1"), &identity("u2")).unwrap();

        let members = table.list(&team("t1")).unwrap();
        let names: Vec<&str> = members.iter().map(|id| id.as_str()).collect();
        assert_eq!(names, vec!["u1", "u2", "u3"]);
    }

    #[test]
    fn test_list_unknown_left_is_empty() {
        let table: AssociationTable<TeamId, IdentityId> = AssociationTable::new();
        assert!(table.list(&team("t1")).unwrap().is_empty());
    }

    #[test]
    fn test_reverse_lookup() {
        let table: AssociationTable<TeamId, IdentityId> = AssociationTable::new();

        table.link(&team("t2"), &identity("u1")).unwrap();
        table.link(&team("t1"), &identity("u1")).unwrap();
        table.link(&team("t3"), &identity("u2")).unwrap();

        let teams = table.list_reverse(&identity("u1")).unwrap();
        let names: Vec<&str> = teams.iter().map(|id| id.as_str()).collect();
        assert_eq!(names, vec!["t1", "t2"]);
    }

    #[test]
    fn test_remove_left_collapses_edge_set() {
        let table: AssociationTable<TeamId, IdentityId> = AssociationTable::new();

        table.link(&team("t1"), &identity("u1")).unwrap();
        table.link(&team("t1"), &identity("u2")).unwrap();

        assert_eq!(table.remove_left(&team("t1")).unwrap(), 2);
        assert!(table.list(&team("t1")).unwrap().is_empty());
        assert_eq!(table.remove_left(&team("t1")).unwrap(), 0);
    }

    #[test]
    fn test_remove_right_across_lefts() {
        let table: AssociationTable<TeamId, IdentityId> = AssociationTable::new();

        table.link(&team("t1"), &identity("u1")).unwrap();
        table.link(&team("t2"), &identity("u1")).unwrap();
        table.link(&team("t2"), &identity("u2")).unwrap();

        assert_eq!(table.remove_right(&identity("u1")).unwrap(), 2);
        assert!(table.list(&team("t1")).unwrap().is_empty());
        assert_eq!(table.list(&team("t2")).unwrap().len(), 1);
    }
}
