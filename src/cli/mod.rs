pub mod add;
pub mod config;
pub mod envelope;
pub mod init;
pub mod play;

use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::error::Error;

/// Install a stderr logger for the non-interactive commands.
pub fn init_term_logging(verbosity: u8) -> Result<(), Box<dyn Error>> {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let config = ConfigBuilder::new()
        .add_filter_allow_str("wavebars")
        .build();
    TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto)?;
    Ok(())
}
