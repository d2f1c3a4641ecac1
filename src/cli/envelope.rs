//! Print the normalized envelope of a single track

use std::error::Error;
use wavebars::audio::FormatDecoder;
use wavebars::catalog::CatalogLoader;
use wavebars::config::Config;
use wavebars::fetch::SourceFetcher;
use wavebars::utils::progress::create_progress_spinner;
use wavebars::visualizer::sparkline;

pub fn handle_envelope(source: &str, blocks: Option<usize>, json: bool) -> Result<(), Box<dyn Error>> {
    let block_count = match blocks {
        Some(n) => n,
        None => Config::load()?.block_count,
    };

    let spinner = create_progress_spinner();
    spinner.set_message(format!("Decoding {source}..."));

    let loader = CatalogLoader::new(SourceFetcher::new(), FormatDecoder, block_count);
    let result = loader.load_track(source);
    spinner.finish_and_clear();
    let track = result?;

    if json {
        println!("{}", serde_json::to_string(&track.envelope)?);
    } else {
        let buffer = &track.buffer;
        println!(
            "{source}: {:.1}s, {} Hz, {} channel(s), {} bars",
            buffer.duration().as_secs_f32(),
            buffer.sample_rate(),
            buffer.channel_count(),
            track.envelope.len()
        );
        println!("{}", sparkline(&track.envelope));
    }

    Ok(())
}
