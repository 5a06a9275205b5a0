//! In-memory music recommendation core.
//!
//! Core modules:
//! - [`collections`] - List, Set and Map primitives
//! - [`trie`] - Prefix trie for autocompletion
//! - [`similarity`] - Weighted song graph with Dijkstra routes
//! - [`social`] - User graph with friend-of-friend search
//! - [`engine`] - Radio queues, weekly discovery, friend suggestions
//!
//! ### Supporting Modules
//!
//! - [`model`] - Songs, artists, users and the similarity rule
//! - [`catalog`] - Arena owning every entity
//! - [`error`] - Typed engine failures
//! - [`config`] - Configuration and data directory management
//! - [`db`] - SQLite persistence
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use sonograph::catalog::Catalog;
//! use sonograph::config::RuntimeConfig;
//! use sonograph::db;
//! use sonograph::engine::RecommendationEngine;
//! use sonograph::model::{SongId, Username};
//!
//! let config = RuntimeConfig::load()?;
//! let conn = db::connect(&config.db_path)?;
//! db::init(&conn)?;
//! let engine = RecommendationEngine::new(db::load_catalog(&conn)?, config.engine);
//!
//! for track in engine.radio_queue(SongId(1))? {
//!     println!("{} - {} ({:.2})", track.artist, track.title, track.cost);
//! }
//! let playlist = engine.weekly_discovery(&Username::from("ana"))?;
//! println!("{}: {} songs", playlist.name, playlist.songs.len());
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Engine operations return [`error::EngineError`] when a song, user or
//! artist is unknown. Configuration, persistence and the binary use
//! `anyhow::Result` with context messages.

pub mod catalog;
pub mod cli;
pub mod collections;
pub mod completion;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod model;
pub mod similarity;
pub mod social;
pub mod trie;
