//! Project-wide constants used across multiple modules.

/// Spinner animation characters for progress indicators
pub const SPINNER_CHARS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Default number of envelope bars per track
pub const DEFAULT_BLOCK_COUNT: usize = 70;

/// Extensions `add` accepts without a warning
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "flac", "mp3", "ogg"];

/// Bar glyphs from empty to full, in eighths
pub const BAR_GLYPHS: &[&str] = &[" ", "▁", "▂", "▃", "▄", "▅", "▆", "▇", "█"];

/// User agent for HTTP requests
pub const USER_AGENT: &str = concat!("wavebars/", env!("CARGO_PKG_VERSION"));

/// Connection timeout in seconds
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Read timeout in seconds
pub const READ_TIMEOUT_SECS: u64 = 60;

/// Log file written by the terminal player
pub const PLAYER_LOG_FILE: &str = "wavebars.log";
