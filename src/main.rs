//! wavebars - a terminal audio player that draws each track as bars.
//!
//! Tracks come from the command line or from the configured catalog. Every
//! track is fetched and decoded up front, reduced to a fixed number of
//! amplitude bars, and then played from a small keyboard-driven TUI where the
//! user unlocks playback, toggles play/pause and switches tracks.

use clap::{ArgAction, CommandFactory, Parser, Subcommand, builder::PossibleValuesParser};
use clap_complete::{Generator, Shell, generate};
use std::error::Error;
use std::io;

mod cli;

#[cfg(feature = "player")]
mod player;

#[derive(Parser)]
#[command(name = "wavebars")]
#[command(about = "Terminal audio player with amplitude bar visualization")]
#[command(version)]
struct Cli {
    /// Log to stderr (-v info, -vv debug); the player always logs to a file
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Add a track to the configured catalog
    Add {
        /// File path or http(s) URL of the track
        source: String,
        /// Track id (defaults to the file name without extension)
        #[arg(long)]
        id: Option<String>,
    },
    /// Print the amplitude envelope of a track
    Envelope {
        /// File path or http(s) URL of the track
        source: String,
        /// Number of bars (defaults to the configured block_count)
        #[arg(short, long)]
        blocks: Option<usize>,
        /// Print the normalized values as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Load tracks and open the player
    Play {
        /// Tracks to play; the configured catalog is used when none are given
        sources: Vec<String>,
    },
    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// View current configuration
    View,
    /// Set a configuration value
    Set {
        /// Configuration key
        #[arg(value_parser = PossibleValuesParser::new(wavebars::config::SETTABLE_KEYS.iter().copied()))]
        key: String,
        /// Configuration value
        value: String,
    },
    /// Edit configuration file in your editor
    Edit,
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // The player owns the terminal and installs its own file logger
    if !matches!(cli.command, Commands::Play { .. }) {
        cli::init_term_logging(cli.verbose)?;
    }

    match cli.command {
        Commands::Init => {
            cli::init::handle_init()?;
        }
        Commands::Config { action } => match action {
            ConfigAction::View => {
                cli::config::handle_config_view()?;
            }
            ConfigAction::Set { key, value } => {
                cli::config::handle_config_set(&key, &value)?;
            }
            ConfigAction::Edit => {
                cli::config::handle_config_edit()?;
            }
        },
        Commands::Add { source, id } => {
            cli::add::handle_add(&source, id.as_deref())?;
        }
        Commands::Envelope {
            source,
            blocks,
            json,
        } => {
            cli::envelope::handle_envelope(&source, blocks, json)?;
        }
        Commands::Play { sources } => {
            cli::play::handle_play(&sources)?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            print_completions(shell, &mut cmd);
        }
    }

    Ok(())
}
