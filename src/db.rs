//! # Catalog Database
//!
//! SQLite persistence for the catalog. This is the collaborator the engine
//! loads from at startup; the graphs themselves are never stored.
//!
//! ## Schema
//!
//! ```text
//! artist   (id, name)
//! song     (id, title, genre, artist_id, album, year)
//! user     (username, display_name)
//! favorite (username, song_id)
//! follow   (follower, followed)
//! ```

use crate::catalog::Catalog;
use crate::model::{Artist, ArtistId, Genre, Song, SongId, User, Username};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use rusqlite::{params, Connection};
use std::path::Path;

/// Open the database at `path`, creating the file if needed.
///
/// # Errors
///
/// Fails when SQLite refuses the connection.
pub fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Rusqlite DB connection refused. DB location: {}", path.display()))?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .context("Failed to enable foreign keys")?;
    Ok(conn)
}

/// Creates every table that does not exist yet. Safe to call repeatedly.
///
/// # Errors
///
/// Fails on invalid SQL or a read-only database.
pub fn init(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS artist (
            id   INTEGER PRIMARY KEY,
            name TEXT    NOT NULL
        );
        CREATE TABLE IF NOT EXISTS song (
            id        INTEGER PRIMARY KEY,
            title     TEXT    NOT NULL,
            genre     TEXT    NOT NULL,
            artist_id INTEGER NOT NULL REFERENCES artist(id),
            album     TEXT,
            year      INTEGER
        );
        CREATE TABLE IF NOT EXISTS user (
            username     TEXT PRIMARY KEY,
            display_name TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS favorite (
            username TEXT    NOT NULL REFERENCES user(username) ON DELETE CASCADE,
            song_id  INTEGER NOT NULL REFERENCES song(id) ON DELETE CASCADE,
            PRIMARY KEY (username, song_id)
        );
        CREATE TABLE IF NOT EXISTS follow (
            follower TEXT NOT NULL REFERENCES user(username) ON DELETE CASCADE,
            followed TEXT NOT NULL REFERENCES user(username) ON DELETE CASCADE,
            PRIMARY KEY (follower, followed)
        );",
    )
    .context("Invalid SQL command when CREATEing catalog tables.")?;
    Ok(())
}

/// Drops every catalog table. Used by `init-db --force`.
///
/// # Errors
///
/// Fails on a read-only database.
pub fn reset(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "DROP TABLE IF EXISTS follow;
        DROP TABLE IF EXISTS favorite;
        DROP TABLE IF EXISTS user;
        DROP TABLE IF EXISTS song;
        DROP TABLE IF EXISTS artist;",
    )
    .context("Failed to drop catalog tables.")?;
    init(conn)
}

/// Writes `catalog` in a single transaction, updating rows with the same
/// keys in place. Relationship rows of the saved users are rewritten from
/// scratch; rows of users absent from `catalog` are left alone. A follow
/// naming a user that is neither in `catalog` nor already stored is dropped.
///
/// # Errors
///
/// Fails on constraint violations, e.g. a song whose artist is missing.
pub fn save_catalog(catalog: &Catalog, conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO artist (id, name) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
        )?;
        for artist in catalog.artists() {
            stmt.execute(params![artist.id.0, artist.name])
                .with_context(|| format!("Failed to INSERT artist: {artist:?}"))?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO song (id, title, genre, artist_id, album, year)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title, genre = excluded.genre, artist_id = excluded.artist_id,
                album = excluded.album, year = excluded.year",
        )?;
        for song in catalog.songs() {
            stmt.execute(params![
                song.id.0,
                song.title,
                song.genre.as_str(),
                song.artist.0,
                song.album,
                song.year,
            ])
            .with_context(|| format!("Failed to INSERT song: {song:?}"))?;
        }

        let mut user_stmt = tx.prepare(
            "INSERT INTO user (username, display_name) VALUES (?1, ?2)
             ON CONFLICT(username) DO UPDATE SET display_name = excluded.display_name",
        )?;
        let mut clear_favorites = tx.prepare("DELETE FROM favorite WHERE username = ?1")?;
        let mut clear_follows = tx.prepare("DELETE FROM follow WHERE follower = ?1")?;
        let mut favorite_stmt =
            tx.prepare("INSERT INTO favorite (username, song_id) VALUES (?1, ?2)")?;
        // Follows of users that exist nowhere are skipped, as the social graph does.
        let mut follow_stmt = tx.prepare(
            "INSERT INTO follow (follower, followed)
             SELECT ?1, ?2 WHERE EXISTS (SELECT 1 FROM user WHERE username = ?2)",
        )?;

        for user in catalog.users() {
            let username = user.username.as_str();
            user_stmt
                .execute(params![username, user.display_name])
                .with_context(|| format!("Failed to INSERT user `{username}`"))?;
            clear_favorites.execute([username])?;
            clear_follows.execute([username])?;
        }
        // Second pass: follows may point at users saved later in the loop.
        for user in catalog.users() {
            let username = user.username.as_str();
            for song in &user.favorites {
                favorite_stmt
                    .execute(params![username, song.0])
                    .with_context(|| format!("Failed to INSERT favorite {song} of `{username}`"))?;
            }
            for followed in &user.following {
                let inserted = follow_stmt
                    .execute(params![username, followed.as_str()])
                    .with_context(|| format!("Failed to INSERT follow `{username}` -> `{followed}`"))?;
                if inserted == 0 {
                    warn!("Skipping follow `{username}` -> `{followed}`: unknown user");
                }
            }
        }
    }

    tx.commit().context("Commiting SQL transaction failed.")?;
    info!(
        "Saved {} songs and {} users",
        catalog.song_count(),
        catalog.user_count()
    );
    Ok(())
}

/// Reads the whole catalog.
///
/// # Errors
///
/// Fails on missing tables or rows that do not decode, such as an unknown genre.
pub fn load_catalog(conn: &Connection) -> Result<Catalog> {
    let mut catalog = Catalog::new();

    let mut stmt = conn.prepare("SELECT id, name FROM artist")?;
    let artists = stmt.query_map([], |row| {
        Ok(Artist {
            id: ArtistId(row.get(0)?),
            name: row.get(1)?,
        })
    })?;
    for artist in artists {
        catalog.insert_artist(artist.context("Queried artist unwrap failed.")?);
    }

    let mut stmt = conn.prepare("SELECT id, title, genre, artist_id, album, year FROM song")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, u32>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, u32>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, Option<u16>>(5)?,
        ))
    })?;
    for row in rows {
        let (id, title, genre, artist, album, year) = row.context("Queried song unwrap failed.")?;
        let genre: Genre = genre
            .parse()
            .with_context(|| format!("Song {id} has an invalid genre"))?;
        catalog.insert_song(Song {
            id: SongId(id),
            title,
            genre,
            artist: ArtistId(artist),
            album,
            year,
        });
    }

    let mut stmt = conn.prepare("SELECT username, display_name FROM user")?;
    let users = stmt.query_map([], |row| {
        let mut user = User::new(row.get::<_, String>(0)?);
        user.display_name = row.get(1)?;
        Ok(user)
    })?;
    for user in users {
        catalog.insert_user(user.context("Queried user unwrap failed.")?);
    }

    let mut stmt = conn.prepare("SELECT username, song_id FROM favorite")?;
    let favorites = stmt.query_map([], |row| {
        Ok((Username::new(row.get::<_, String>(0)?), SongId(row.get(1)?)))
    })?;
    for favorite in favorites {
        let (username, song) = favorite?;
        if let Some(user) = catalog.user_mut(&username) {
            user.favorites.insert(song);
        }
    }

    let mut stmt = conn.prepare("SELECT follower, followed FROM follow")?;
    let follows = stmt.query_map([], |row| {
        Ok((
            Username::new(row.get::<_, String>(0)?),
            Username::new(row.get::<_, String>(1)?),
        ))
    })?;
    for follow in follows {
        let (follower, followed) = follow?;
        if let Some(user) = catalog.user_mut(&follower) {
            user.following.insert(followed);
        }
    }

    debug!(
        "Loaded {} songs and {} users from database",
        catalog.song_count(),
        catalog.user_count()
    );
    Ok(catalog)
}

/// Deletes one song; favorites cascade.
///
/// # Errors
///
/// Fails on SQL errors. Deleting a missing song is not an error.
pub fn delete_song(conn: &Connection, id: SongId) -> Result<bool> {
    let removed = conn
        .execute("DELETE FROM song WHERE id = ?1", [id.0])
        .with_context(|| format!("Failed to DELETE song {id}"))?;
    Ok(removed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert_artist(Artist {
            id: ArtistId(1),
            name: "Los Amantes".to_string(),
        });
        catalog.insert_song(Song {
            id: SongId(1),
            title: "Amapola".to_string(),
            genre: Genre::Salsa,
            artist: ArtistId(1),
            album: Some("Flores".to_string()),
            year: Some(1999),
        });
        catalog.insert_song(Song {
            id: SongId(2),
            title: "Amargo".to_string(),
            genre: Genre::Salsa,
            artist: ArtistId(1),
            album: None,
            year: None,
        });
        let mut ana = User::new("ana");
        ana.favorites.insert(SongId(1));
        ana.following.insert(Username::from("ben"));
        catalog.insert_user(ana);
        catalog.insert_user(User::new("ben"));
        catalog
    }

    fn open_temp() -> Result<(TempDir, Connection)> {
        let dir = TempDir::new()?;
        let conn = connect(&dir.path().join("catalog.db"))?;
        init(&conn)?;
        Ok((dir, conn))
    }

    #[test]
    fn test_save_then_load() -> Result<()> {
        let (_dir, mut conn) = open_temp()?;
        save_catalog(&sample(), &mut conn)?;

        let loaded = load_catalog(&conn)?;
        assert_eq!(loaded.song_count(), 2);
        assert_eq!(loaded.user_count(), 2);
        let song = loaded.song(SongId(1)).expect("song 1 saved");
        assert_eq!(song.genre, Genre::Salsa);
        assert_eq!(song.year, Some(1999));

        let ana = loaded.user(&Username::from("ana")).expect("ana saved");
        assert!(ana.favorites.contains(&SongId(1)));
        assert!(ana.follows(&Username::from("ben")));
        Ok(())
    }

    #[test]
    fn test_init_is_idempotent() -> Result<()> {
        let (_dir, conn) = open_temp()?;
        init(&conn)?;
        init(&conn)?;
        assert_eq!(load_catalog(&conn)?.song_count(), 0);
        Ok(())
    }

    #[test]
    fn test_resave_replaces_relationships() -> Result<()> {
        let (_dir, mut conn) = open_temp()?;
        let mut catalog = sample();
        save_catalog(&catalog, &mut conn)?;

        if let Some(ana) = catalog.user_mut(&Username::from("ana")) {
            ana.favorites.clear();
            ana.following.clear();
        }
        save_catalog(&catalog, &mut conn)?;

        let loaded = load_catalog(&conn)?;
        let ana = loaded.user(&Username::from("ana")).expect("ana saved");
        assert!(ana.favorites.is_empty());
        assert!(ana.following.is_empty());
        Ok(())
    }

    #[test]
    fn test_delete_song_cascades_favorites() -> Result<()> {
        let (_dir, mut conn) = open_temp()?;
        save_catalog(&sample(), &mut conn)?;

        assert!(delete_song(&conn, SongId(1))?);
        assert!(!delete_song(&conn, SongId(1))?);

        let loaded = load_catalog(&conn)?;
        let ana = loaded.user(&Username::from("ana")).expect("ana saved");
        assert!(ana.favorites.is_empty());
        Ok(())
    }

    #[test]
    fn test_song_with_unknown_artist_is_rejected() -> Result<()> {
        let (_dir, mut conn) = open_temp()?;
        let mut catalog = Catalog::new();
        catalog.insert_song(Song {
            id: SongId(5),
            title: "Orphan".to_string(),
            genre: Genre::Pop,
            artist: ArtistId(9),
            album: None,
            year: None,
        });

        assert!(save_catalog(&catalog, &mut conn).is_err());
        assert_eq!(load_catalog(&conn)?.song_count(), 0);
        Ok(())
    }

    #[test]
    fn test_follow_of_unknown_user_is_skipped() -> Result<()> {
        let (_dir, mut conn) = open_temp()?;
        let mut catalog = Catalog::new();
        let mut ana = User::new("ana");
        ana.following.insert(Username::from("ghost"));
        catalog.insert_user(ana);

        save_catalog(&catalog, &mut conn)?;

        let loaded = load_catalog(&conn)?;
        let ana = loaded.user(&Username::from("ana")).expect("ana saved");
        assert!(ana.following.is_empty());
        Ok(())
    }

    #[test]
    fn test_follow_of_previously_stored_user_is_kept() -> Result<()> {
        let (_dir, mut conn) = open_temp()?;
        let mut first = Catalog::new();
        first.insert_user(User::new("ben"));
        save_catalog(&first, &mut conn)?;

        let mut second = Catalog::new();
        let mut ana = User::new("ana");
        ana.following.insert(Username::from("ben"));
        second.insert_user(ana);
        save_catalog(&second, &mut conn)?;

        let loaded = load_catalog(&conn)?;
        let ana = loaded.user(&Username::from("ana")).expect("ana saved");
        assert!(ana.follows(&Username::from("ben")));
        Ok(())
    }

    #[test]
    fn test_reset_empties_tables() -> Result<()> {
        let (_dir, mut conn) = open_temp()?;
        save_catalog(&sample(), &mut conn)?;
        reset(&conn)?;
        assert_eq!(load_catalog(&conn)?.user_count(), 0);
        Ok(())
    }
}
