//! # Domain Records
//!
//! Songs, artists and users as the persistence collaborator supplies them.
//! Graphs only ever hold the identity types ([`SongId`], [`Username`]); the
//! records themselves live in the [`Catalog`](crate::catalog::Catalog) arena.
//!
//! ## Similarity Rule
//!
//! ```text
//! similarity(a, b) = 0.6 * [same genre] + 0.4 * [same primary artist]
//! cost(a, b)       = 1 - similarity(a, b)
//! ```
//!
//! Cost is what the similarity graph stores and what Dijkstra minimises.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Contribution of a shared genre to similarity.
pub const GENRE_SIMILARITY: f64 = 0.6;

/// Contribution of a shared primary artist to similarity.
pub const ARTIST_SIMILARITY: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(pub u32);

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtistId(pub u32);

impl fmt::Display for ArtistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable business key of a user. The numeric surrogate id of the store is
/// never used for graph identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Username {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    Rock,
    Pop,
    Rap,
    Jazz,
    Electronic,
    Classical,
    Reggaeton,
    Salsa,
    Metal,
    Other,
}

impl Genre {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rock => "rock",
            Self::Pop => "pop",
            Self::Rap => "rap",
            Self::Jazz => "jazz",
            Self::Electronic => "electronic",
            Self::Classical => "classical",
            Self::Reggaeton => "reggaeton",
            Self::Salsa => "salsa",
            Self::Metal => "metal",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown genre names are an error rather than silently mapped to
/// [`Genre::Other`], so bad imports surface early.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown genre `{0}`")]
pub struct UnknownGenre(pub String);

impl FromStr for Genre {
    type Err = UnknownGenre;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rock" => Ok(Self::Rock),
            "pop" => Ok(Self::Pop),
            "rap" | "hip-hop" | "hiphop" => Ok(Self::Rap),
            "jazz" => Ok(Self::Jazz),
            "electronic" => Ok(Self::Electronic),
            "classical" => Ok(Self::Classical),
            "reggaeton" => Ok(Self::Reggaeton),
            "salsa" => Ok(Self::Salsa),
            "metal" => Ok(Self::Metal),
            "other" => Ok(Self::Other),
            _ => Err(UnknownGenre(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
}

/// A catalogued song.
///
/// Equality is identity: two records with the same `id` are the same song,
/// whatever their metadata says.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub genre: Genre,
    /// Primary artist.
    pub artist: ArtistId,
    /// Release metadata, carried for display only.
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub year: Option<u16>,
}

impl PartialEq for Song {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Song {}

impl std::hash::Hash for Song {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A user and their outgoing relationships, stored as identity sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: Username,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub favorites: BTreeSet<SongId>,
    #[serde(default)]
    pub following: BTreeSet<Username>,
}

impl User {
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        let username = Username::new(username);
        Self {
            display_name: username.as_str().to_string(),
            username,
            favorites: BTreeSet::new(),
            following: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn follows(&self, other: &Username) -> bool {
        self.following.contains(other)
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username
    }
}

impl Eq for User {}

/// Similarity of two songs in `[0, 1]`.
#[must_use]
pub fn similarity(a: &Song, b: &Song) -> f64 {
    let mut score = 0.0;
    if a.genre == b.genre {
        score += GENRE_SIMILARITY;
    }
    if a.artist == b.artist {
        score += ARTIST_SIMILARITY;
    }
    score
}

/// Edge cost between two songs: `1 - similarity`, clamped to `[0, 1]`.
#[must_use]
pub fn similarity_cost(a: &Song, b: &Song) -> f64 {
    (1.0 - similarity(a, b)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: u32, genre: Genre, artist: u32) -> Song {
        Song {
            id: SongId(id),
            title: format!("Song {id}"),
            genre,
            artist: ArtistId(artist),
            album: None,
            year: None,
        }
    }

    #[test]
    fn test_cost_extremes() {
        let a = song(1, Genre::Rock, 1);
        let b = song(2, Genre::Rock, 1);
        let c = song(3, Genre::Rap, 2);

        assert_eq!(similarity_cost(&a, &b), 0.0);
        assert_eq!(similarity_cost(&a, &c), 1.0);
    }

    #[test]
    fn test_cost_partial_matches() {
        let base = song(1, Genre::Jazz, 1);
        let same_genre = song(2, Genre::Jazz, 2);
        let same_artist = song(3, Genre::Pop, 1);

        assert!((similarity_cost(&base, &same_genre) - 0.4).abs() < 1e-9);
        assert!((similarity_cost(&base, &same_artist) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_song_equality_is_identity() {
        let a = song(1, Genre::Rock, 1);
        let renamed = Song {
            title: "Another title".to_string(),
            genre: Genre::Metal,
            ..a.clone()
        };
        assert_eq!(a, renamed);
        assert_ne!(a, song(2, Genre::Rock, 1));
    }

    #[test]
    fn test_genre_parsing() {
        assert_eq!("Rock".parse::<Genre>(), Ok(Genre::Rock));
        assert_eq!(" hip-hop ".parse::<Genre>(), Ok(Genre::Rap));
        assert!("polka".parse::<Genre>().is_err());
        assert_eq!(Genre::Electronic.to_string(), "electronic");
    }

    #[test]
    fn test_user_defaults_display_name() {
        let user = User::new("ana");
        assert_eq!(user.display_name, "ana");
        assert!(user.favorites.is_empty());
        assert!(!user.follows(&Username::from("ben")));
    }
}
