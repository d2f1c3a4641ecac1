//! Append a track to the configured catalog

use owo_colors::OwoColorize;
use std::error::Error;
use std::path::Path;
use wavebars::catalog::default_track_id;
use wavebars::config::Config;
use wavebars::constants::AUDIO_EXTENSIONS;
use wavebars::fetch::{extension_hint, is_remote};

pub fn handle_add(source: &str, id: Option<&str>) -> Result<(), Box<dyn Error>> {
    if !is_remote(source) {
        let expanded = shellexpand::tilde(source);
        if !Path::new(expanded.as_ref()).is_file() {
            return Err(format!("No such file: {source}").into());
        }
    }

    match extension_hint(source) {
        Some(ext) if AUDIO_EXTENSIONS.contains(&ext.as_str()) => {}
        _ => println!(
            "{} {} does not look like a supported audio file; adding anyway",
            "Note:".yellow(),
            source
        ),
    }

    let id = id.map(str::to_string).unwrap_or_else(|| default_track_id(source));

    let mut config = Config::load()?;
    config.add_track(&id, source)?;
    config.save()?;

    println!("{} Added track {} ({})", "✓".green().bold(), id.bold(), source);

    Ok(())
}
