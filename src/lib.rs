//! Core of the wavebars player: decoding, envelope extraction, the track
//! catalog and the playback state machine. The terminal front end lives in
//! the binary behind the `player` feature.

pub mod audio;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod envelope;
pub mod error;
pub mod fetch;
pub mod playback;
pub mod utils;
pub mod visualizer;
