//! # Sonograph
//!
//! Command-line front end over the recommendation engine. Every command loads
//! the catalog from SQLite, builds the graphs, answers, and writes mutations
//! back.
//!
//! ## Usage
//!
//! ```bash
//! # Create the database and load a catalog
//! sonograph init-db
//! sonograph import catalog.json
//!
//! # Recommendations
//! sonograph radio 12
//! sonograph discover ana
//! sonograph friends ana
//! sonograph complete "boh"
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info, warn};
use rusqlite::Connection;
use serde::Serialize;
use sonograph::catalog::{Catalog, CatalogFile};
use sonograph::cli::{self, Command};
use sonograph::completion;
use sonograph::config::RuntimeConfig;
use sonograph::db;
use sonograph::engine::RecommendationEngine;
use sonograph::model::{SongId, Username};
use std::fs;
use std::path::Path;

/// Main entry point for Sonograph.
///
/// Logging is controlled via `RUST_LOG`:
/// - `RUST_LOG=debug sonograph discover ana`
/// - `RUST_LOG=sonograph::similarity=trace sonograph route 1 9`
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    // Commands that never touch the database.
    if let Command::Completion { shell } = args.command {
        let mut cmd = cli::Args::command();
        completion::generate_completions(completion::shell_to_completion_shell(shell), &mut cmd);
        return Ok(());
    }

    let mut config = match RuntimeConfig::load() {
        Ok(config) => config,
        // An explicit database does not need the data directory.
        Err(e) if args.db.is_some() => {
            warn!("{e:#}; using default settings");
            RuntimeConfig::default()
        }
        Err(e) => return Err(e),
    };
    if let Some(db_path) = args.db {
        config.db_path = db_path;
    }
    debug!("Using database {}", config.db_path.display());

    let mut conn = db::connect(&config.db_path)?;
    match args.command {
        Command::InitDb { force } => {
            if force {
                db::reset(&conn)?;
            } else {
                db::init(&conn)?;
            }
            info!("Database ready at {}", config.db_path.display());
            println!("Initialized {}", config.db_path.display());
            return Ok(());
        }
        Command::Import { ref path } => {
            db::init(&conn)?;
            let catalog = read_catalog_file(path)?;
            db::save_catalog(&catalog, &mut conn)?;
            println!(
                "Imported {} songs and {} users from {}",
                catalog.song_count(),
                catalog.user_count(),
                path.display()
            );
            return Ok(());
        }
        _ => {}
    }

    db::init(&conn)?;
    let engine = RecommendationEngine::new(db::load_catalog(&conn)?, config.engine);

    match args.command {
        Command::Export { path } => {
            let file = engine.with_catalog(Catalog::to_file);
            let json = serde_json::to_string_pretty(&file).context("Failed to serialize catalog")?;
            fs::write(&path, json)
                .with_context(|| format!("Failed to write catalog to {}", path.display()))?;
            println!("Exported {} songs to {}", file.songs.len(), path.display());
        }
        Command::List => list_songs(&engine, args.json)?,
        Command::Radio { song } => {
            let queue = engine.radio_queue(SongId(song))?;
            emit(args.json, &queue, |queue| {
                for (position, track) in queue.iter().enumerate() {
                    println!(
                        "{:>2}. [{}] {} - {} ({}, cost {:.2})",
                        position + 1,
                        track.id,
                        track.artist,
                        track.title,
                        track.genre,
                        track.cost
                    );
                }
            })?;
        }
        Command::Discover { username } => {
            let playlist = engine.weekly_discovery(&Username::new(username))?;
            emit(args.json, &playlist, |playlist| {
                println!("{} for {}", playlist.name, playlist.owner);
                if playlist.songs.is_empty() {
                    println!("  (no songs, add some favorites first)");
                }
                for song in &playlist.songs {
                    println!("  [{}] {} - {}", song.id, song.artist, song.title);
                }
            })?;
        }
        Command::Friends { username } => {
            let suggestions = engine.friend_suggestions(&Username::new(username))?;
            emit(args.json, &suggestions, |suggestions| {
                for user in suggestions {
                    println!("{} ({})", user.username, user.display_name);
                }
            })?;
        }
        Command::Route { from, to } => {
            let route = engine.route(SongId(from), SongId(to))?;
            emit(args.json, &route, |route| match route {
                Some(route) => {
                    let path: Vec<String> = route.path.iter().map(ToString::to_string).collect();
                    println!("{} (cost {:.2})", path.join(" -> "), route.cost);
                }
                None => println!("No route from {from} to {to}"),
            })?;
        }
        Command::RemoveSong { song } => {
            let removed = engine.remove_song(SongId(song))?;
            db::delete_song(&conn, removed.id)?;
            println!("Removed [{}] {}", removed.id, removed.title);
        }
        Command::Follow { follower, followed } => {
            engine.follow(&Username::new(follower), &Username::new(followed))?;
            persist(&engine, &mut conn)?;
        }
        Command::Unfollow { follower, followed } => {
            engine.unfollow(&Username::new(follower), &Username::new(followed))?;
            persist(&engine, &mut conn)?;
        }
        Command::Favorite { username, song, remove } => {
            let username = Username::new(username);
            if remove {
                engine.remove_favorite(&username, SongId(song))?;
            } else {
                engine.add_favorite(&username, SongId(song))?;
            }
            persist(&engine, &mut conn)?;
        }
        Command::Complete { prefix } => {
            let words = engine.autocomplete(&prefix);
            emit(args.json, &words, |words| {
                for word in words {
                    println!("{word}");
                }
            })?;
        }
        Command::CompleteTitles { prefix } => completion::print_title_completions(&engine, &prefix)?,
        Command::Stats => {
            let stats = engine.stats();
            emit(args.json, &stats, |stats| println!("{stats}"))?;
        }
        Command::InitDb { .. } | Command::Import { .. } | Command::Completion { .. } => {}
    }

    Ok(())
}

fn read_catalog_file(path: &Path) -> Result<Catalog> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
    let file: CatalogFile = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid catalog file {}", path.display()))?;
    Ok(file.into())
}

fn persist(engine: &RecommendationEngine, conn: &mut Connection) -> Result<()> {
    engine.with_catalog(|catalog| db::save_catalog(catalog, conn))
}

/// Prints `value` as JSON, or through `human` otherwise.
fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    } else {
        human(value);
    }
    Ok(())
}

fn list_songs(engine: &RecommendationEngine, json: bool) -> Result<()> {
    engine.with_catalog(|catalog| -> Result<()> {
        let songs: Vec<_> = catalog.songs().collect();
        if json {
            println!("{}", serde_json::to_string_pretty(&songs).context("Failed to serialize songs")?);
            return Ok(());
        }
        println!("{:<6} {:<30} {:<24} {:<10} Year", "Id", "Title", "Artist", "Genre");
        for song in &songs {
            let artist = catalog.primary_artist_name(song.id).unwrap_or("Unknown");
            let year = song.year.map_or_else(|| "-".to_string(), |year| year.to_string());
            println!(
                "{:<6} {:<30} {:<24} {:<10} {}",
                song.id.to_string(),
                song.title,
                artist,
                song.genre.to_string(),
                year
            );
        }
        println!("\n{} songs", songs.len());
        Ok(())
    })
}
