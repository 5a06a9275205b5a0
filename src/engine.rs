//! # Recommendation Engine
//!
//! Owns the catalog arena together with the similarity graph, the social
//! graph and the title trie, and turns graph answers into the artifacts the
//! rest of the application shows to people:
//!
//! - **Radio queue**: the closest neighbors of a seed song, cheapest first
//! - **Weekly discovery**: for each favorite, the first step of the shortest
//!   route towards every other song, deduplicated and capped
//! - **Friend suggestions**: users exactly two hops away in the social graph
//! - **Autocomplete**: titles and artist names by prefix
//!
//! ## Locking
//!
//! Each structure sits behind its own [`RwLock`]. Anything that needs more
//! than one lock takes them in a fixed order (catalog, similarity, social,
//! titles) and a mutation holds every write lock it needs before changing
//! anything, so a reader never sees an adjacency halfway through an update.
//!
//! Existence checks happen here, against the catalog. The graphs themselves
//! never fail.

use crate::catalog::Catalog;
use crate::collections::Set;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::model::{similarity_cost, Artist, Genre, Song, SongId, User, Username};
use crate::similarity::{Route, SimilarityGraph};
use crate::social::SocialGraph;
use crate::trie::Trie;
use log::{debug, info, trace};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// One entry of a radio queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadioTrack {
    pub id: SongId,
    pub title: String,
    pub artist: String,
    pub genre: Genre,
    /// Edge cost to the seed song, lower is closer.
    pub cost: f64,
}

/// Lightweight song record for playlists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongSummary {
    pub id: SongId,
    pub title: String,
    pub artist: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Playlist {
    pub name: String,
    pub owner: Username,
    pub songs: Vec<SongSummary>,
}

/// Lightweight user record for friend suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub username: Username,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub songs: usize,
    pub users: usize,
    pub similarity_edges: usize,
    pub social_links: usize,
    pub indexed_words: usize,
}

impl fmt::Display for EngineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Songs:            {}", self.songs)?;
        writeln!(f, "Users:            {}", self.users)?;
        writeln!(f, "Similarity edges: {}", self.similarity_edges)?;
        writeln!(f, "Social links:     {}", self.social_links)?;
        write!(f, "Indexed words:    {}", self.indexed_words)
    }
}

pub struct RecommendationEngine {
    catalog: RwLock<Catalog>,
    similarity: RwLock<SimilarityGraph>,
    social: RwLock<SocialGraph>,
    titles: RwLock<Trie>,
    config: EngineConfig,
}

// A panic while a guard is held cannot leave a structure half-written: every
// mutation below completes its own graph method before touching the next.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Every song pair connected by its similarity cost. Costs are computed in
/// parallel, insertion stays sequential.
fn build_similarity(catalog: &Catalog) -> SimilarityGraph {
    let songs: Vec<&Song> = catalog.songs().collect();
    let songs = &songs;
    let edges: Vec<(SongId, SongId, f64)> = songs
        .par_iter()
        .enumerate()
        .flat_map_iter(move |(i, a)| {
            songs[i + 1..]
                .iter()
                .map(move |b| (a.id, b.id, similarity_cost(a, b)))
        })
        .collect();

    let mut graph = SimilarityGraph::new();
    for song in songs {
        graph.add_song(song.id);
    }
    for (a, b, cost) in edges {
        graph.connect(a, b, cost);
    }
    graph
}

fn build_social(catalog: &Catalog) -> SocialGraph {
    let mut graph = SocialGraph::new();
    for user in catalog.users() {
        graph.add_user(&user.username);
        for followed in &user.following {
            if catalog.user(followed).is_some() {
                graph.connect(&user.username, followed);
            }
        }
    }
    graph
}

impl RecommendationEngine {
    /// Builds every graph from `catalog`. The trie stays empty until the
    /// first autocomplete.
    #[must_use]
    pub fn new(catalog: Catalog, config: EngineConfig) -> Self {
        let similarity = build_similarity(&catalog);
        let social = build_social(&catalog);
        info!(
            "Engine ready: {} songs ({} edges), {} users",
            similarity.len(),
            similarity.edge_count(),
            social.len()
        );

        Self {
            catalog: RwLock::new(catalog),
            similarity: RwLock::new(similarity),
            social: RwLock::new(social),
            titles: RwLock::new(Trie::new()),
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rebuilds every graph from the current catalog and empties the trie.
    pub fn rebuild(&self) {
        let catalog = read(&self.catalog);
        let mut similarity = write(&self.similarity);
        let mut social = write(&self.social);
        let mut titles = write(&self.titles);

        *similarity = build_similarity(&catalog);
        *social = build_social(&catalog);
        titles.clear();
        info!("Rebuilt graphs for {} songs", similarity.len());
    }

    /// Runs `f` with shared access to the catalog.
    pub fn with_catalog<R>(&self, f: impl FnOnce(&Catalog) -> R) -> R {
        f(&read(&self.catalog))
    }

    #[must_use]
    pub fn stats(&self) -> EngineStats {
        let catalog = read(&self.catalog);
        let similarity = read(&self.similarity);
        let social = read(&self.social);
        let titles = read(&self.titles);

        EngineStats {
            songs: catalog.song_count(),
            users: catalog.user_count(),
            similarity_edges: similarity.edge_count(),
            social_links: social.adjacency().values().map(Set::len).sum::<usize>() / 2,
            indexed_words: titles.len(),
        }
    }

    pub fn add_artist(&self, artist: Artist) {
        let mut catalog = write(&self.catalog);
        let mut titles = write(&self.titles);

        let renamed = catalog
            .insert_artist(artist.clone())
            .is_some_and(|previous| previous.name != artist.name);
        if renamed {
            titles.clear();
        } else if !titles.is_empty() {
            titles.insert(&artist.name);
        }
    }

    /// Adds or replaces a song and connects it to every other song.
    ///
    /// # Errors
    ///
    /// [`EngineError::ArtistNotFound`] when its primary artist is unknown.
    pub fn add_song(&self, song: Song) -> Result<()> {
        let mut catalog = write(&self.catalog);
        if catalog.artist(song.artist).is_none() {
            return Err(EngineError::ArtistNotFound(song.artist));
        }
        let mut similarity = write(&self.similarity);
        let mut titles = write(&self.titles);

        similarity.add_song(song.id);
        for other in catalog.songs().filter(|other| other.id != song.id) {
            similarity.connect(song.id, other.id, similarity_cost(&song, other));
        }

        let id = song.id;
        let title = song.title.clone();
        let replaced = catalog.insert_song(song).is_some();
        if replaced {
            titles.clear();
        } else if !titles.is_empty() {
            titles.insert(&title);
        }
        debug!("Added song {id} `{title}`");
        Ok(())
    }

    /// # Errors
    ///
    /// [`EngineError::SongNotFound`] when `id` is not in the catalog.
    pub fn remove_song(&self, id: SongId) -> Result<Song> {
        let mut catalog = write(&self.catalog);
        let mut similarity = write(&self.similarity);
        let mut titles = write(&self.titles);
        let removed = catalog.remove_song(id).ok_or(EngineError::SongNotFound(id))?;

        similarity.remove_song(id);
        titles.clear();
        debug!("Removed song {id}");
        Ok(removed)
    }

    /// Adds or replaces a user. Links are created towards every known user it
    /// follows and from every known user following it.
    pub fn add_user(&self, user: User) {
        let mut catalog = write(&self.catalog);
        let mut social = write(&self.social);

        let username = user.username.clone();
        social.remove_user(&username);
        social.add_user(&username);
        catalog.insert_user(user);

        let links: Vec<Username> = catalog
            .users()
            .filter(|other| other.username != username)
            .filter(|other| {
                other.follows(&username)
                    || catalog
                        .user(&username)
                        .is_some_and(|added| added.follows(&other.username))
            })
            .map(|other| other.username.clone())
            .collect();
        for other in &links {
            social.connect(&username, other);
        }
        debug!("Added user `{username}` with {} links", links.len());
    }

    /// # Errors
    ///
    /// [`EngineError::UserNotFound`] when `username` is not in the catalog.
    pub fn remove_user(&self, username: &Username) -> Result<User> {
        let mut catalog = write(&self.catalog);
        let mut social = write(&self.social);
        let removed = catalog
            .remove_user(username)
            .ok_or_else(|| EngineError::UserNotFound(username.clone()))?;

        social.remove_user(username);
        Ok(removed)
    }

    /// Records that `follower` follows `followed` and links them.
    ///
    /// # Errors
    ///
    /// [`EngineError::UserNotFound`] when either user is unknown.
    pub fn follow(&self, follower: &Username, followed: &Username) -> Result<()> {
        let mut catalog = write(&self.catalog);
        Self::require_user(&catalog, followed)?;
        if follower == followed {
            Self::require_user(&catalog, follower)?;
            return Ok(());
        }
        let user = catalog
            .user_mut(follower)
            .ok_or_else(|| EngineError::UserNotFound(follower.clone()))?;
        let mut social = write(&self.social);

        user.following.insert(followed.clone());
        social.connect(follower, followed);
        Ok(())
    }

    /// Drops the follow. The link itself only goes away once neither user
    /// follows the other.
    ///
    /// # Errors
    ///
    /// [`EngineError::UserNotFound`] when either user is unknown.
    pub fn unfollow(&self, follower: &Username, followed: &Username) -> Result<()> {
        let mut catalog = write(&self.catalog);
        let follows_back = Self::require_user(&catalog, followed)?.follows(follower);
        let user = catalog
            .user_mut(follower)
            .ok_or_else(|| EngineError::UserNotFound(follower.clone()))?;
        let mut social = write(&self.social);

        user.following.remove(followed);
        if !follows_back {
            social.disconnect(follower, followed);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// [`EngineError::UserNotFound`] or [`EngineError::SongNotFound`].
    pub fn add_favorite(&self, username: &Username, song: SongId) -> Result<()> {
        let mut catalog = write(&self.catalog);
        Self::require_song(&catalog, song)?;
        let user = catalog
            .user_mut(username)
            .ok_or_else(|| EngineError::UserNotFound(username.clone()))?;
        user.favorites.insert(song);
        Ok(())
    }

    /// # Errors
    ///
    /// [`EngineError::UserNotFound`] when the user is unknown.
    pub fn remove_favorite(&self, username: &Username, song: SongId) -> Result<()> {
        let mut catalog = write(&self.catalog);
        let user = catalog
            .user_mut(username)
            .ok_or_else(|| EngineError::UserNotFound(username.clone()))?;
        user.favorites.remove(&song);
        Ok(())
    }

    /// Closest songs to `seed`, cheapest first, at most
    /// [`EngineConfig::radio_length`] of them.
    ///
    /// # Errors
    ///
    /// [`EngineError::SongNotFound`] when `seed` is not in the catalog.
    pub fn radio_queue(&self, seed: SongId) -> Result<Vec<RadioTrack>> {
        let catalog = read(&self.catalog);
        Self::require_song(&catalog, seed)?;
        let similarity = read(&self.similarity);

        let mut ranked: Vec<(SongId, f64)> = similarity
            .neighbors(seed)
            .iter()
            .map(|(&id, &cost)| (id, cost))
            .collect();
        ranked.sort_by(|(_, a), (_, b)| a.total_cmp(b));

        let queue: Vec<RadioTrack> = ranked
            .into_iter()
            .filter_map(|(id, cost)| {
                let song = catalog.song(id)?;
                Some(RadioTrack {
                    id,
                    title: song.title.clone(),
                    artist: Self::artist_name(&catalog, song),
                    genre: song.genre,
                    cost,
                })
            })
            .take(self.config.radio_length)
            .collect();
        trace!("Radio for {seed}: {} tracks", queue.len());
        Ok(queue)
    }

    /// Weekly discovery playlist for `username`.
    ///
    /// For every favorite, runs Dijkstra towards every other song and keeps
    /// the favorite's first step on each route. Empty when the user has no
    /// favorites.
    ///
    /// # Errors
    ///
    /// [`EngineError::UserNotFound`] when the user is unknown.
    pub fn weekly_discovery(&self, username: &Username) -> Result<Playlist> {
        let catalog = read(&self.catalog);
        let user = Self::require_user(&catalog, username)?;
        let mut playlist = Playlist {
            name: self.config.discovery_name.clone(),
            owner: username.clone(),
            songs: Vec::new(),
        };
        if user.favorites.is_empty() {
            debug!("`{username}` has no favorites, empty discovery");
            return Ok(playlist);
        }

        let similarity = read(&self.similarity);
        let limit = self.config.discovery_limit;
        let mut picked: Set<SongId> = Set::new();

        'favorites: for &favorite in &user.favorites {
            for target in similarity.songs().filter(|&target| target != favorite) {
                if picked.len() >= limit {
                    break 'favorites;
                }
                let step = similarity
                    .shortest_route(favorite, target)
                    .and_then(|route| route.first_step());
                if let Some(step) = step {
                    picked.add(step);
                }
            }
        }

        playlist.songs = picked
            .iter()
            .filter_map(|&id| catalog.song(id))
            .map(|song| Self::summary(&catalog, song))
            .collect();
        debug!(
            "Discovery for `{username}`: {} songs from {} favorites",
            playlist.songs.len(),
            user.favorites.len()
        );
        Ok(playlist)
    }

    /// Users two hops away from `username`, in discovery order.
    ///
    /// # Errors
    ///
    /// [`EngineError::UserNotFound`] when the user is unknown.
    pub fn friend_suggestions(&self, username: &Username) -> Result<Vec<UserSummary>> {
        let catalog = read(&self.catalog);
        Self::require_user(&catalog, username)?;
        let social = read(&self.social);

        Ok(social
            .friends_of_friends(username)
            .into_iter()
            .map(|found| UserSummary {
                display_name: catalog
                    .user(&found)
                    .map_or_else(|| found.to_string(), |user| user.display_name.clone()),
                username: found,
            })
            .collect())
    }

    /// Cheapest route between two catalogued songs, `None` when unreachable.
    ///
    /// # Errors
    ///
    /// [`EngineError::SongNotFound`] when either song is unknown.
    pub fn route(&self, origin: SongId, destination: SongId) -> Result<Option<Route>> {
        let catalog = read(&self.catalog);
        Self::require_song(&catalog, origin)?;
        Self::require_song(&catalog, destination)?;
        let similarity = read(&self.similarity);
        Ok(similarity.shortest_route(origin, destination))
    }

    /// Lowercased titles and artist names starting with `prefix`, sorted.
    /// Populates the trie on first use after it was emptied.
    #[must_use]
    pub fn autocomplete(&self, prefix: &str) -> Vec<String> {
        {
            let titles = read(&self.titles);
            if !titles.is_empty() {
                return Self::sorted(titles.autocomplete(prefix));
            }
        }

        let catalog = read(&self.catalog);
        let mut titles = write(&self.titles);
        if titles.is_empty() {
            for word in catalog.completion_words() {
                titles.insert(word);
            }
            debug!("Indexed {} words for autocomplete", titles.len());
        }
        Self::sorted(titles.autocomplete(prefix))
    }

    fn sorted(found: impl IntoIterator<Item = String>) -> Vec<String> {
        let mut words: Vec<String> = found.into_iter().collect();
        words.sort();
        words
    }

    fn require_song(catalog: &Catalog, id: SongId) -> Result<&Song> {
        catalog.song(id).ok_or(EngineError::SongNotFound(id))
    }

    fn require_user<'a>(catalog: &'a Catalog, username: &Username) -> Result<&'a User> {
        catalog
            .user(username)
            .ok_or_else(|| EngineError::UserNotFound(username.clone()))
    }

    fn artist_name(catalog: &Catalog, song: &Song) -> String {
        catalog
            .artist(song.artist)
            .map_or_else(|| "Unknown".to_string(), |artist| artist.name.clone())
    }

    fn summary(catalog: &Catalog, song: &Song) -> SongSummary {
        SongSummary {
            id: song.id,
            title: song.title.clone(),
            artist: Self::artist_name(catalog, song),
        }
    }
}
