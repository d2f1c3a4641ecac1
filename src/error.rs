//! Error types shared by the loading pipeline and the playback controller.
//!
//! Loading failures (fetch and decode) are values recorded on catalog entries
//! rather than fatal errors; a track that failed to load simply has no buffer.

use thiserror::Error;

use crate::playback::SourceId;

/// Reasons an envelope cannot be computed from a sample slice.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("block count must be at least 1")]
    ZeroBlocks,

    #[error("need at least {blocks} samples for {blocks} bars, got {samples}")]
    TooFewSamples { samples: usize, blocks: usize },
}

/// Failure while turning a track location into a decoded buffer.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("could not read {location}: {source}")]
    Io {
        location: String,
        source: std::io::Error,
    },

    #[error("request for {location} failed: {source}")]
    Http {
        location: String,
        source: reqwest::Error,
    },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("no audio in stream")]
    NoAudio,

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

/// Failure reported by an audio graph backend.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("unknown audio source {0:?}")]
    UnknownSource(SourceId),

    #[error("audio source {0:?} was already started")]
    AlreadyStarted(SourceId),

    #[error("audio backend error: {0}")]
    Backend(String),
}

/// Result type alias for the loading pipeline
pub type LoadResult<T> = std::result::Result<T, LoadError>;
