use std::error::Error;
use std::process::Command;
use wavebars::config::Config;

pub fn handle_config_view() -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;

    println!("Current wavebars configuration:");
    println!("  block_count: {}", config.block_count);
    println!("  bar_spacing: {}", config.bar_spacing);
    println!("  gain: {}", config.gain);
    println!("  loop_tracks: {}", config.loop_tracks);
    if config.tracks.is_empty() {
        println!("  tracks: (none)");
    } else {
        println!("  tracks:");
        for track in &config.tracks {
            println!("    {} = {}", track.id, track.source);
        }
    }

    Ok(())
}

pub fn handle_config_set(key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;

    config.set_value(key, value)?;
    config.save()?;

    println!("Configuration updated: {key} = {value}");

    Ok(())
}

pub fn handle_config_edit() -> Result<(), Box<dyn Error>> {
    if !Config::exists()? {
        return Err("wavebars not initialized. Run 'wavebars init' first.".into());
    }

    let config_path = Config::config_path()?;
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    println!("Opening {} in {}", config_path.display(), editor);

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                format!("Editor '{editor}' not found. Set $EDITOR to a valid editor path.")
            } else {
                format!("Failed to launch editor '{editor}': {e}")
            }
        })?;

    if !status.success() {
        return Err(format!("Editor '{editor}' exited with error").into());
    }

    let config =
        Config::load().map_err(|e| format!("Configuration is invalid after editing: {e}"))?;
    println!(
        "Configuration saved ({} track(s), {} bars per track)",
        config.tracks.len(),
        config.block_count
    );

    Ok(())
}
