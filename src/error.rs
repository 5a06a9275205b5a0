//! Typed failures of the recommendation engine.
//!
//! Graphs and the trie never fail; missing entities are caught here, before
//! anything is delegated to them.

use crate::model::{ArtistId, SongId, Username};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("song {0} not found")]
    SongNotFound(SongId),

    #[error("user `{0}` not found")]
    UserNotFound(Username),

    #[error("artist {0} not found")]
    ArtistNotFound(ArtistId),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
