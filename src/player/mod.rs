pub mod app;
pub mod audio;
pub mod bars;
pub mod ui;

use std::error::Error;
use wavebars::catalog::TrackSpec;
use wavebars::config::Config;

/// Load `specs` and run the terminal player until the user quits.
pub fn run(config: &Config, specs: &[TrackSpec]) -> Result<(), Box<dyn Error>> {
    app::run(config, specs)
}
