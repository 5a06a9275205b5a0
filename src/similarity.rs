//! # Similarity Graph
//!
//! Undirected, weighted graph over songs. Edge weight is a cost in `[0, 1]`
//! (see [`similarity_cost`](crate::model::similarity_cost)): the lower the
//! cost, the closer the songs.
//!
//! ## Invariants
//!
//! - Adjacency is symmetric: `a` lists `b` with weight `w` iff `b` lists `a`
//!   with weight `w`.
//! - No song is its own neighbor.
//! - Removing a song removes every edge that pointed at it.
//!
//! Unknown songs never raise errors; they read as empty neighbor maps and
//! unreachable routes.

use crate::collections::{List, Map, Set};
use crate::model::SongId;
use log::trace;
use serde::Serialize;

/// Shortest route between two songs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    /// Origin first, destination last.
    pub path: Vec<SongId>,
    /// Sum of edge costs along `path`.
    pub cost: f64,
}

impl Route {
    /// The first song after the origin, if the route has one.
    #[must_use]
    pub fn first_step(&self) -> Option<SongId> {
        self.path.get(1).copied()
    }
}

#[derive(Debug, Default, Clone)]
pub struct SimilarityGraph {
    adjacency: Map<SongId, Map<SongId, f64>>,
}

/// Working tables of one Dijkstra run.
struct Search {
    distance: Map<SongId, f64>,
    previous: Map<SongId, SongId>,
}

impl Search {
    fn distance_to(&self, song: SongId) -> f64 {
        *self.distance.get_or_default(&song, &f64::INFINITY)
    }

    /// Walks predecessor links back from `destination`. An unreached
    /// destination yields a path of itself alone.
    fn walk_back(&self, destination: SongId) -> List<SongId> {
        let mut path = List::new();
        let mut current = Some(destination);
        while let Some(song) = current {
            path.push_front(song);
            current = self.previous.get(&song).copied();
        }
        path
    }
}

impl SimilarityGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `song` with no edges. Existing songs keep their edges.
    pub fn add_song(&mut self, song: SongId) {
        if !self.adjacency.contains_key(&song) {
            self.adjacency.put(song, Map::new());
        }
    }

    /// Removes `song` and every edge touching it.
    pub fn remove_song(&mut self, song: SongId) {
        if self.adjacency.remove(&song).is_none() {
            return;
        }
        for neighbors in self.adjacency.values_mut() {
            neighbors.remove(&song);
        }
    }

    /// Connects `a` and `b` with cost `weight` in both directions, adding
    /// either song if needed. Reconnecting overwrites the previous weight.
    /// Self loops are ignored.
    pub fn connect(&mut self, a: SongId, b: SongId, weight: f64) {
        if a == b {
            return;
        }
        self.add_song(a);
        self.add_song(b);
        if let Some(neighbors) = self.adjacency.get_mut(&a) {
            neighbors.put(b, weight);
        }
        if let Some(neighbors) = self.adjacency.get_mut(&b) {
            neighbors.put(a, weight);
        }
    }

    /// Neighbor map of `song`, empty when the song is unknown.
    #[must_use]
    pub fn neighbors(&self, song: SongId) -> Map<SongId, f64> {
        self.adjacency.get(&song).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn weight(&self, a: SongId, b: SongId) -> Option<f64> {
        self.adjacency.get(&a)?.get(&b).copied()
    }

    #[must_use]
    pub fn all_songs(&self) -> Set<SongId> {
        self.adjacency.key_set()
    }

    pub fn songs(&self) -> impl Iterator<Item = SongId> + '_ {
        self.adjacency.keys().copied()
    }

    #[must_use]
    pub fn contains(&self, song: SongId) -> bool {
        self.adjacency.contains_key(&song)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.adjacency.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Map::len).sum::<usize>() / 2
    }

    /// Dijkstra from `origin` to `destination`.
    ///
    /// Returns the path origin-first. When `destination` cannot be reached the
    /// result holds `destination` alone, so a one-element path only means
    /// "found" when `origin == destination`. Prefer [`Self::shortest_route`]
    /// for an explicit answer.
    #[must_use]
    pub fn shortest_path(&self, origin: SongId, destination: SongId) -> List<SongId> {
        self.search(origin, destination).walk_back(destination)
    }

    /// Dijkstra from `origin` to `destination`, `None` when unreachable.
    #[must_use]
    pub fn shortest_route(&self, origin: SongId, destination: SongId) -> Option<Route> {
        let search = self.search(origin, destination);
        let cost = search.distance_to(destination);
        if !cost.is_finite() {
            return None;
        }
        Some(Route {
            path: search.walk_back(destination).into_iter().collect(),
            cost,
        })
    }

    fn search(&self, origin: SongId, destination: SongId) -> Search {
        let mut distance = Map::new();
        for song in self.adjacency.keys() {
            distance.put(*song, f64::INFINITY);
        }
        distance.put(origin, 0.0);

        let mut search = Search {
            distance,
            previous: Map::new(),
        };
        let mut visited: Set<SongId> = Set::new();
        let mut frontier: Set<SongId> = Set::new();
        frontier.add(origin);

        while let Some(current) = Self::closest(&frontier, &search) {
            frontier.remove(&current);
            if current == destination {
                break;
            }
            if !visited.add(current) {
                continue;
            }

            let base = search.distance_to(current);
            let Some(neighbors) = self.adjacency.get(&current) else {
                continue;
            };
            for (&neighbor, &weight) in neighbors.iter() {
                if visited.contains(&neighbor) {
                    continue;
                }
                let candidate = base + weight;
                if candidate < search.distance_to(neighbor) {
                    search.distance.put(neighbor, candidate);
                    search.previous.put(neighbor, current);
                    frontier.add(neighbor);
                }
            }
        }

        trace!(
            "Dijkstra {origin} -> {destination}: cost {}",
            search.distance_to(destination)
        );
        search
    }

    /// Linear scan for the frontier song with the smallest distance. The first
    /// one seen wins ties.
    fn closest(frontier: &Set<SongId>, search: &Search) -> Option<SongId> {
        let mut best: Option<(SongId, f64)> = None;
        for &song in frontier {
            let distance = search.distance_to(song);
            if best.map_or(true, |(_, shortest)| distance < shortest) {
                best = Some((song, distance));
            }
        }
        best.map(|(song, _)| song)
    }
}
