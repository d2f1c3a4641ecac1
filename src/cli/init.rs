use owo_colors::OwoColorize;
use std::error::Error;
use wavebars::config::Config;

pub fn handle_init() -> Result<(), Box<dyn Error>> {
    if Config::exists()? {
        return Err(format!(
            "wavebars is already initialized. Edit {} or use 'wavebars config set'.",
            Config::config_path()?.display()
        )
        .into());
    }

    let config = Config::new();
    config.save()?;

    println!("{} wavebars initialized", "✓".green().bold());
    println!(
        "Configuration saved to: {}",
        Config::config_path()?.display()
    );
    println!(
        "Add tracks with {}",
        "wavebars add <path-or-url>".cyan()
    );

    Ok(())
}
