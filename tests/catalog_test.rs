use std::path::Path;

use tempfile::TempDir;
use wavebars::audio::FormatDecoder;
use wavebars::catalog::{CatalogLoader, TrackSpec, specs_from_sources};
use wavebars::error::LoadError;
use wavebars::fetch::SourceFetcher;

/// Write a mono 16-bit WAV whose first half is loud and second half quiet.
fn write_wav(path: &Path, frames: usize) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        let amplitude = if i < frames / 2 { 16000 } else { 4000 };
        let sample = if i % 2 == 0 { amplitude } else { -amplitude };
        writer.write_sample(sample as i16).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn test_load_catalog_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let good = temp_dir.path().join("good.wav");
    let garbage = temp_dir.path().join("garbage.wav");
    write_wav(&good, 800);
    std::fs::write(&garbage, b"definitely not audio").unwrap();

    let sources = vec![
        good.to_string_lossy().to_string(),
        garbage.to_string_lossy().to_string(),
        temp_dir
            .path()
            .join("missing.flac")
            .to_string_lossy()
            .to_string(),
    ];
    let specs = specs_from_sources(&sources);
    assert_eq!(
        specs.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
        vec!["good", "garbage", "missing"]
    );

    let loader = CatalogLoader::new(SourceFetcher::new(), FormatDecoder, 4);
    let catalog = loader.load(&specs);

    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog.available_count(), 1);

    let track = catalog.track("good").unwrap();
    assert_eq!(track.buffer.sample_rate(), 8000);
    assert_eq!(track.buffer.frames(), 800);

    let values = track.envelope.values();
    assert_eq!(values.len(), 4);
    assert_eq!(values[0], 1.0);
    assert_eq!(values[1], 1.0);
    assert!((values[2] - 0.25).abs() < 1e-3);
    assert!((values[3] - 0.25).abs() < 1e-3);

    assert!(matches!(
        catalog.entry("garbage").unwrap().track,
        Err(LoadError::Decode(_))
    ));
    assert!(matches!(
        catalog.entry("missing").unwrap().track,
        Err(LoadError::Io { .. })
    ));
}

#[test]
fn test_track_shorter_than_block_count() {
    let temp_dir = TempDir::new().unwrap();
    let short = temp_dir.path().join("short.wav");
    write_wav(&short, 3);

    let loader = CatalogLoader::new(SourceFetcher::new(), FormatDecoder, 70);
    let catalog = loader.load(&[TrackSpec::new("short", short.to_string_lossy())]);

    assert!(catalog.buffer("short").is_none());
    assert!(matches!(
        catalog.entry("short").unwrap().track,
        Err(LoadError::Envelope(_))
    ));
}
