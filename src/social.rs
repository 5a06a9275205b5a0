//! # Social Graph
//!
//! Undirected, unweighted graph over users. "A follows B" and "B follows A"
//! collapse into one symmetric connection; discovery only cares that the two
//! users are linked.

use crate::collections::{List, Map, Set};
use crate::model::Username;
use log::trace;

/// Distance at which friend suggestions are taken.
const SUGGESTION_DISTANCE: usize = 2;

#[derive(Debug, Default, Clone)]
pub struct SocialGraph {
    adjacency: Map<Username, Set<Username>>,
}

impl SocialGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, user: &Username) {
        if !self.adjacency.contains_key(user) {
            self.adjacency.put(user.clone(), Set::new());
        }
    }

    /// Removes `user` and every connection touching it.
    pub fn remove_user(&mut self, user: &Username) {
        if self.adjacency.remove(user).is_none() {
            return;
        }
        for neighbors in self.adjacency.values_mut() {
            neighbors.remove(user);
        }
    }

    /// Links `a` and `b`, adding either user if needed. Self links are ignored.
    pub fn connect(&mut self, a: &Username, b: &Username) {
        if a == b {
            return;
        }
        self.add_user(a);
        self.add_user(b);
        if let Some(neighbors) = self.adjacency.get_mut(a) {
            neighbors.add(b.clone());
        }
        if let Some(neighbors) = self.adjacency.get_mut(b) {
            neighbors.add(a.clone());
        }
    }

    /// Unlinks `a` and `b`. Unknown users are ignored.
    pub fn disconnect(&mut self, a: &Username, b: &Username) {
        if let Some(neighbors) = self.adjacency.get_mut(a) {
            neighbors.remove(b);
        }
        if let Some(neighbors) = self.adjacency.get_mut(b) {
            neighbors.remove(a);
        }
    }

    #[must_use]
    pub fn neighbors(&self, user: &Username) -> Set<Username> {
        self.adjacency.get(user).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn are_connected(&self, a: &Username, b: &Username) -> bool {
        self.adjacency
            .get(a)
            .is_some_and(|neighbors| neighbors.contains(b))
    }

    #[must_use]
    pub fn all_users(&self) -> Set<Username> {
        self.adjacency.key_set()
    }

    #[must_use]
    pub const fn adjacency(&self) -> &Map<Username, Set<Username>> {
        &self.adjacency
    }

    #[must_use]
    pub fn contains(&self, user: &Username) -> bool {
        self.adjacency.contains_key(user)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.adjacency.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Users exactly two hops from `origin`, in breadth-first discovery
    /// order. Direct neighbors and `origin` itself are never included, and
    /// nothing beyond distance two is explored.
    #[must_use]
    pub fn friends_of_friends(&self, origin: &Username) -> List<Username> {
        let mut found = List::new();
        if !self.contains(origin) {
            return found;
        }

        let mut distance: Map<Username, usize> = Map::new();
        let mut queue = List::new();
        distance.put(origin.clone(), 0);
        queue.push(origin.clone());

        while let Some(current) = queue.pop_front() {
            let depth = *distance.get_or_default(&current, &0);
            if depth >= SUGGESTION_DISTANCE {
                continue;
            }
            let Some(neighbors) = self.adjacency.get(&current) else {
                continue;
            };
            for neighbor in neighbors {
                if distance.contains_key(neighbor) {
                    continue;
                }
                distance.put(neighbor.clone(), depth + 1);
                if depth + 1 == SUGGESTION_DISTANCE {
                    found.push(neighbor.clone());
                }
                queue.push(neighbor.clone());
            }
        }

        trace!("{} users two hops from `{origin}`", found.len());
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> Username {
        Username::from(name)
    }

    fn names(found: List<Username>) -> Vec<String> {
        found.into_iter().map(|u| u.as_str().to_string()).collect()
    }

    #[test]
    fn test_connect_is_symmetric() {
        let mut graph = SocialGraph::new();
        graph.connect(&user("ana"), &user("ben"));

        assert!(graph.are_connected(&user("ana"), &user("ben")));
        assert!(graph.are_connected(&user("ben"), &user("ana")));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_self_connection_is_ignored() {
        let mut graph = SocialGraph::new();
        graph.connect(&user("ana"), &user("ana"));

        assert!(graph.is_empty());
        graph.add_user(&user("ana"));
        graph.connect(&user("ana"), &user("ana"));
        assert!(!graph.neighbors(&user("ana")).contains(&user("ana")));
    }

    #[test]
    fn test_disconnect_is_symmetric_and_tolerant() {
        let mut graph = SocialGraph::new();
        graph.connect(&user("ana"), &user("ben"));
        graph.disconnect(&user("ben"), &user("ana"));

        assert!(graph.neighbors(&user("ana")).is_empty());
        assert!(graph.neighbors(&user("ben")).is_empty());

        graph.disconnect(&user("zoe"), &user("ana"));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_add_user_is_idempotent() {
        let mut graph = SocialGraph::new();
        graph.connect(&user("ana"), &user("ben"));
        graph.add_user(&user("ana"));

        assert_eq!(graph.all_users().len(), 2);
        assert_eq!(graph.neighbors(&user("ana")).len(), 1);
    }

    #[test]
    fn test_chain_yields_distance_two_only() {
        let mut graph = SocialGraph::new();
        graph.connect(&user("a"), &user("b"));
        graph.connect(&user("b"), &user("c"));
        graph.connect(&user("c"), &user("d"));

        assert_eq!(names(graph.friends_of_friends(&user("a"))), vec!["c"]);
    }

    #[test]
    fn test_direct_friend_is_never_suggested() {
        // Triangle: c is both a direct friend and two hops away through b.
        let mut graph = SocialGraph::new();
        graph.connect(&user("a"), &user("b"));
        graph.connect(&user("b"), &user("c"));
        graph.connect(&user("a"), &user("c"));
        graph.connect(&user("c"), &user("d"));

        let found = names(graph.friends_of_friends(&user("a")));
        assert_eq!(found, vec!["d"]);
    }

    #[test]
    fn test_suggestions_are_deduplicated() {
        let mut graph = SocialGraph::new();
        graph.connect(&user("a"), &user("b"));
        graph.connect(&user("a"), &user("c"));
        graph.connect(&user("b"), &user("x"));
        graph.connect(&user("c"), &user("x"));

        assert_eq!(names(graph.friends_of_friends(&user("a"))), vec!["x"]);
    }

    #[test]
    fn test_unknown_origin_yields_nothing() {
        let mut graph = SocialGraph::new();
        graph.connect(&user("a"), &user("b"));

        assert!(graph.friends_of_friends(&user("nobody")).is_empty());
    }

    #[test]
    fn test_remove_user_tears_down() {
        let mut graph = SocialGraph::new();
        graph.connect(&user("a"), &user("b"));
        graph.connect(&user("b"), &user("c"));
        graph.remove_user(&user("b"));

        assert!(!graph.contains(&user("b")));
        assert!(graph.neighbors(&user("a")).is_empty());
        assert!(graph.friends_of_friends(&user("a")).is_empty());
    }
}
