use tempfile::TempDir;
use wavebars::catalog::TrackSpec;

#[test]
fn test_config_lifecycle() {
    // Create a temporary directory for test config
    let temp_dir = TempDir::new().unwrap();

    // Override the config path for testing
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
    }

    // Test that config doesn't exist initially
    assert!(!wavebars::config::Config::exists().unwrap());

    // Create and save a config
    let config = wavebars::config::Config::new();
    config.save().unwrap();

    // Verify it exists now
    assert!(wavebars::config::Config::exists().unwrap());

    // Load and verify values
    let loaded = wavebars::config::Config::load().unwrap();
    assert_eq!(loaded.block_count, 70);
    assert!(loaded.loop_tracks);
    assert!(loaded.tracks.is_empty());

    // Test config mutation
    let mut config = wavebars::config::Config::load().unwrap();
    config.set_value("block_count", "32").unwrap();
    config.set_value("loop_tracks", "false").unwrap();
    config
        .add_track("sample", "https://example.com/sample_track.mp3")
        .unwrap();
    config.save().unwrap();

    // Verify mutations persisted
    let reloaded = wavebars::config::Config::load().unwrap();
    assert_eq!(reloaded.block_count, 32);
    assert!(!reloaded.loop_tracks);
    assert_eq!(
        reloaded.tracks,
        vec![TrackSpec::new("sample", "https://example.com/sample_track.mp3")]
    );

    // Test invalid key
    let mut config = wavebars::config::Config::load().unwrap();
    assert!(config.set_value("invalid_key", "value").is_err());

    // A hand-edited file with zero blocks is rejected on load
    let path = wavebars::config::Config::config_path().unwrap();
    std::fs::write(&path, "block_count = 0\n").unwrap();
    assert!(wavebars::config::Config::load().is_err());
}
