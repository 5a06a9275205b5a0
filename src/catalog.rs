//! # Catalog
//!
//! Arena owning every artist, song and user. Records point at each other by
//! id only ([`ArtistId`], [`SongId`], [`Username`]), so there are no back
//! references to keep in sync and the whole catalog serializes as plain data.
//!
//! The catalog is what the persistence collaborator hands over at startup
//! and what the engine checks for existence before touching any graph.

use crate::model::{Artist, ArtistId, Song, SongId, User, Username};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat, serializable form used for JSON import and export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub songs: Vec<Song>,
    #[serde(default)]
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    artists: BTreeMap<ArtistId, Artist>,
    songs: BTreeMap<SongId, Song>,
    users: BTreeMap<Username, User>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any artist with the same id.
    pub fn insert_artist(&mut self, artist: Artist) -> Option<Artist> {
        self.artists.insert(artist.id, artist)
    }

    /// Replaces any song with the same id.
    pub fn insert_song(&mut self, song: Song) -> Option<Song> {
        self.songs.insert(song.id, song)
    }

    /// Replaces any user with the same username.
    pub fn insert_user(&mut self, user: User) -> Option<User> {
        self.users.insert(user.username.clone(), user)
    }

    #[must_use]
    pub fn artist(&self, id: ArtistId) -> Option<&Artist> {
        self.artists.get(&id)
    }

    #[must_use]
    pub fn song(&self, id: SongId) -> Option<&Song> {
        self.songs.get(&id)
    }

    #[must_use]
    pub fn user(&self, username: &Username) -> Option<&User> {
        self.users.get(username)
    }

    pub fn user_mut(&mut self, username: &Username) -> Option<&mut User> {
        self.users.get_mut(username)
    }

    /// Removes the song and strips it from every user's favorites.
    pub fn remove_song(&mut self, id: SongId) -> Option<Song> {
        let removed = self.songs.remove(&id)?;
        for user in self.users.values_mut() {
            user.favorites.remove(&id);
        }
        Some(removed)
    }

    /// Removes the user and strips it from everyone's `following`.
    pub fn remove_user(&mut self, username: &Username) -> Option<User> {
        let removed = self.users.remove(username)?;
        for user in self.users.values_mut() {
            user.following.remove(username);
        }
        Some(removed)
    }

    pub fn artists(&self) -> impl Iterator<Item = &Artist> {
        self.artists.values()
    }

    pub fn songs(&self) -> impl Iterator<Item = &Song> {
        self.songs.values()
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    #[must_use]
    pub fn song_count(&self) -> usize {
        self.songs.len()
    }

    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Name of the song's primary artist, if both are known.
    #[must_use]
    pub fn primary_artist_name(&self, song: SongId) -> Option<&str> {
        let song = self.songs.get(&song)?;
        self.artists.get(&song.artist).map(|artist| artist.name.as_str())
    }

    /// Words offered for autocompletion: every title and artist name.
    pub fn completion_words(&self) -> impl Iterator<Item = &str> {
        self.songs
            .values()
            .map(|song| song.title.as_str())
            .chain(self.artists.values().map(|artist| artist.name.as_str()))
    }

    #[must_use]
    pub fn to_file(&self) -> CatalogFile {
        CatalogFile {
            artists: self.artists.values().cloned().collect(),
            songs: self.songs.values().cloned().collect(),
            users: self.users.values().cloned().collect(),
        }
    }
}

impl From<CatalogFile> for Catalog {
    fn from(file: CatalogFile) -> Self {
        let mut catalog = Self::new();
        for artist in file.artists {
            catalog.insert_artist(artist);
        }
        for song in file.songs {
            catalog.insert_song(song);
        }
        for user in file.users {
            catalog.insert_user(user);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Genre;

    fn sample() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert_artist(Artist {
            id: ArtistId(1),
            name: "Queen".to_string(),
        });
        catalog.insert_song(Song {
            id: SongId(10),
            title: "Bohemian Rhapsody".to_string(),
            genre: Genre::Rock,
            artist: ArtistId(1),
            album: Some("A Night at the Opera".to_string()),
            year: Some(1975),
        });

        let mut ana = User::new("ana");
        ana.favorites.insert(SongId(10));
        ana.following.insert(Username::from("ben"));
        catalog.insert_user(ana);
        catalog.insert_user(User::new("ben"));
        catalog
    }

    #[test]
    fn test_lookup_by_identity() {
        let catalog = sample();

        assert_eq!(catalog.song(SongId(10)).map(|s| s.title.as_str()), Some("Bohemian Rhapsody"));
        assert_eq!(catalog.primary_artist_name(SongId(10)), Some("Queen"));
        assert!(catalog.user(&Username::from("ana")).is_some());
        assert!(catalog.song(SongId(99)).is_none());
    }

    #[test]
    fn test_remove_song_strips_favorites() {
        let mut catalog = sample();
        assert!(catalog.remove_song(SongId(10)).is_some());

        let ana = catalog.user(&Username::from("ana")).expect("ana exists");
        assert!(ana.favorites.is_empty());
        assert!(catalog.remove_song(SongId(10)).is_none());
    }

    #[test]
    fn test_remove_user_strips_following() {
        let mut catalog = sample();
        catalog.remove_user(&Username::from("ben"));

        let ana = catalog.user(&Username::from("ana")).expect("ana exists");
        assert!(ana.following.is_empty());
        assert_eq!(catalog.user_count(), 1);
    }

    #[test]
    fn test_completion_words_cover_titles_and_artists() {
        let catalog = sample();
        let words: Vec<&str> = catalog.completion_words().collect();
        assert_eq!(words, vec!["Bohemian Rhapsody", "Queen"]);
    }

    #[test]
    fn test_file_round_trip_through_json() {
        let catalog = sample();
        let json = serde_json::to_string(&catalog.to_file()).expect("serializes");
        let restored: Catalog = serde_json::from_str::<CatalogFile>(&json)
            .expect("deserializes")
            .into();

        assert_eq!(restored.song_count(), 1);
        assert_eq!(restored.user_count(), 2);
        assert_eq!(restored.primary_artist_name(SongId(10)), Some("Queen"));
    }
}
