//! # Command-Line Interface Module
//!
//! Clap derive definitions for the `sonograph` binary.
//!
//! ## Commands
//!
//! - `init-db`: Create the catalog tables
//! - `import` / `export`: Move a catalog between JSON and the database
//! - `list`: Display every catalogued song
//! - `radio`: Closest songs to a seed song
//! - `discover`: Weekly discovery playlist for a user
//! - `friends`: Friend-of-friend suggestions
//! - `route`: Cheapest similarity route between two songs
//! - `complete`: Title and artist autocompletion
//!
//! ## Examples
//!
//! ```bash
//! sonograph import catalog.json
//! sonograph radio 12
//! sonograph discover ana --json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser, Debug)]
#[command(name = "sonograph")]
#[command(about = "Sonograph: radio queues, weekly discovery and friend suggestions from a music catalog")]
#[command(version)]
pub struct Args {
    /// Catalog database to use instead of the configured one
    #[arg(long, global = true, env = "SONOGRAPH_DB", value_hint = clap::ValueHint::FilePath)]
    pub db: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the catalog tables
    ///
    /// Existing tables are kept unless `--force` is given.
    InitDb {
        /// Drop and recreate every table
        #[arg(long)]
        force: bool,
    },

    /// Import artists, songs and users from a JSON catalog file
    ///
    /// Records with an existing id or username are replaced. Follows of users
    /// found neither in the file nor in the database are skipped.
    Import {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        path: PathBuf,
    },

    /// Write the whole catalog to a JSON file
    Export {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        path: PathBuf,
    },

    /// List all songs in the database
    List,

    /// Closest songs to a seed song, cheapest first
    Radio {
        /// Seed song id
        song: u32,
    },

    /// Build the weekly discovery playlist for a user
    Discover { username: String },

    /// Suggest users exactly two hops away in the social graph
    Friends { username: String },

    /// Cheapest similarity route between two songs
    Route { from: u32, to: u32 },

    /// Delete a song from the catalog
    RemoveSong { song: u32 },

    /// Follow another user
    Follow { follower: String, followed: String },

    /// Stop following another user
    Unfollow { follower: String, followed: String },

    /// Mark a song as a favorite of a user
    Favorite {
        username: String,
        song: u32,

        /// Remove the favorite instead
        #[arg(long)]
        remove: bool,
    },

    /// Autocomplete titles and artist names
    Complete {
        #[arg(value_hint = clap::ValueHint::Other)]
        prefix: String,
    },

    /// Show catalog and graph sizes
    Stats,

    /// Generate shell completions
    ///
    /// Usage: sonograph completion bash > ~/.local/share/bash-completion/completions/sonograph
    Completion { shell: Shell },

    /// List completion words for shell scripts (hidden command)
    #[command(hide = true)]
    CompleteTitles {
        #[arg(default_value = "")]
        prefix: String,
    },
}
