use std::error::Error;
use wavebars::catalog::{Catalog, CatalogLoader, LoadProgress, TrackSpec, specs_from_sources};
use wavebars::config::Config;

pub fn handle_play(sources: &[String]) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let specs = if sources.is_empty() {
        config.tracks.clone()
    } else {
        specs_from_sources(sources)
    };

    if specs.is_empty() {
        return Err(
            "No tracks to play. Pass file paths or URLs, or add tracks with 'wavebars add'.".into(),
        );
    }

    run_player(&config, &specs)
}

/// Fetch and decode every track in order, showing progress on the terminal.
pub fn load_catalog(config: &Config, specs: &[TrackSpec]) -> Catalog {
    use wavebars::audio::FormatDecoder;
    use wavebars::fetch::SourceFetcher;
    use wavebars::utils::progress::create_load_progress;

    let progress = create_load_progress(specs.len() as u64);
    let loader = CatalogLoader::new(SourceFetcher::new(), FormatDecoder, config.block_count);

    let catalog = loader.load_with_progress(specs, |event| match event {
        LoadProgress::Started { spec, total, .. } => {
            progress.set_length(total as u64);
            progress.set_message(spec.id.clone());
        }
        LoadProgress::Finished { ok, spec } => {
            if !ok {
                progress.println(format!("  could not load {} ({})", spec.id, spec.source));
            }
            progress.inc(1);
        }
    });

    progress.finish_and_clear();
    catalog
}

#[cfg(feature = "player")]
fn run_player(config: &Config, specs: &[TrackSpec]) -> Result<(), Box<dyn Error>> {
    crate::player::run(config, specs)
}

#[cfg(not(feature = "player"))]
fn run_player(config: &Config, specs: &[TrackSpec]) -> Result<(), Box<dyn Error>> {
    use owo_colors::OwoColorize;
    use wavebars::visualizer::sparkline;

    // Without the terminal player, report what would have been loaded
    let catalog = load_catalog(config, specs);
    for entry in catalog.entries() {
        match &entry.track {
            Ok(track) => println!("{:>16} {}", entry.id().bold(), sparkline(&track.envelope)),
            Err(e) => println!("{:>16} {}", entry.id().bold(), e.to_string().red()),
        }
    }
    println!();
    println!(
        "{} Playback requires the 'player' feature:",
        "Note:".yellow()
    );
    println!("  {}", "cargo install wavebars --features player".cyan());

    Ok(())
}
