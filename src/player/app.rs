//! Main application state and control flow for the player.
//!
//! The app owns the loaded catalog and the playback controller, maps key
//! presses to controller intents, and runs the draw/poll loop until the user
//! quits. Controller failures never end the session; they are logged and
//! shown briefly in the status line.

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};
use wavebars::catalog::{Catalog, TrackSpec};
use wavebars::config::Config;
use wavebars::constants::PLAYER_LOG_FILE;
use wavebars::error::GraphError;
use wavebars::playback::{AudioGraph, PlaybackController};
use wavebars::visualizer::Geometry;

use super::audio::RodioGraph;
use super::bars::BarView;
use super::ui;
use crate::cli::play::load_catalog;

const STATUS_MESSAGE_SECS: u64 = 3;

pub struct App<G: AudioGraph> {
    pub should_quit: bool,
    pub catalog: Catalog,
    pub controller: PlaybackController<G, BarView>,
    /// Highlighted row of the track list
    pub cursor: usize,
    pub status_message: Option<String>,
    status_timer: Option<Instant>,
    bar_spacing: f32,
}

impl<G: AudioGraph> App<G> {
    pub fn new(catalog: Catalog, controller: PlaybackController<G, BarView>, bar_spacing: u16) -> Self {
        let mut app = Self {
            should_quit: false,
            catalog,
            controller,
            cursor: 0,
            status_message: None,
            status_timer: None,
            bar_spacing: bar_spacing as f32,
        };

        // Show the first playable track straight away
        if let Some(index) = app
            .catalog
            .first_available()
            .and_then(|id| app.catalog.position(id))
        {
            app.select_at(index);
        }
        app
    }

    pub fn load(&mut self) {
        if !self.controller.can_load() {
            return;
        }
        let result = self.controller.load();
        self.report(result);
    }

    pub fn toggle_playback(&mut self) {
        let result = self.controller.toggle(&self.catalog);
        if let Ok(state) = &result {
            info!("Playback {state}");
        }
        self.report(result);
    }

    pub fn select_next(&mut self) {
        if self.catalog.is_empty() {
            return;
        }
        self.select_at((self.cursor + 1) % self.catalog.len());
    }

    pub fn select_previous(&mut self) {
        if self.catalog.is_empty() {
            return;
        }
        let len = self.catalog.len();
        self.select_at((self.cursor + len - 1) % len);
    }

    /// Move the cursor to `index` and switch to that track if it loaded.
    pub fn select_at(&mut self, index: usize) {
        let Some(entry) = self.catalog.entries().get(index) else {
            return;
        };
        self.cursor = index;

        if !entry.is_available() {
            let message = format!("'{}' could not be loaded", entry.id());
            self.set_status(message);
            return;
        }

        let id = entry.id().to_string();
        let result = self.controller.select_track(&id, &self.catalog);
        self.report(result);
    }

    /// Lay out the bars again for a new visualizer area.
    pub fn on_resize(&mut self, area: Rect) {
        let geometry = Geometry::new(area.width as f32, area.height as f32, self.bar_spacing);
        self.controller.resize(geometry, &self.catalog);
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_timer = Some(Instant::now());
    }

    fn report<T>(&mut self, result: Result<T, GraphError>) {
        if let Err(e) = result {
            log::error!("Audio error: {e}");
            self.set_status(format!("Audio error: {e}"));
        }
    }

    fn expire_status(&mut self) {
        if let Some(timer) = self.status_timer
            && timer.elapsed() > Duration::from_secs(STATUS_MESSAGE_SECS)
        {
            self.status_message = None;
            self.status_timer.take();
        }
    }
}

pub fn run(config: &Config, specs: &[TrackSpec]) -> Result<(), Box<dyn Error>> {
    init_logging()?;
    info!("Starting wavebars player with {} track(s)", specs.len());

    // Loading runs before the terminal switches to raw mode so the progress
    // bar stays visible
    let catalog = load_catalog(config, specs);
    if catalog.available_count() == 0 {
        return Err("None of the tracks could be loaded".into());
    }

    let graph = RodioGraph::new(config.gain)?;
    let geometry = Geometry::new(0.0, 0.0, config.bar_spacing as f32);
    let controller = PlaybackController::new(graph, BarView::default(), geometry, config.loop_tracks);
    let mut app = App::new(catalog, controller, config.bar_spacing);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = app.controller.shutdown() {
        log::warn!("Failed to stop playback cleanly: {e}");
    }

    if let Err(e) = res {
        eprintln!("Error: {e}");
        return Err(e);
    }

    info!("Player closed");
    Ok(())
}

fn run_app<B: ratatui::backend::Backend, G: AudioGraph>(
    terminal: &mut Terminal<B>,
    app: &mut App<G>,
) -> Result<(), Box<dyn Error>> {
    loop {
        app.expire_status();

        let size = terminal.size()?;
        app.on_resize(ui::visualizer_area(Rect::new(0, 0, size.width, size.height)));

        terminal.draw(|f| ui::draw(f, app))?;

        // Poll for events with a short timeout to allow continuous rendering
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            handle_key_event(app, key);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key_event<G: AudioGraph>(app: &mut App<G>, key: event::KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('l') => app.load(),
        KeyCode::Char(' ') => app.toggle_playback(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
            let index = c as usize - '1' as usize;
            app.select_at(index);
        }
        _ => {}
    }
}

fn init_logging() -> Result<(), Box<dyn Error>> {
    use simplelog::{CombinedLogger, LevelFilter, WriteLogger};
    use std::fs::File;

    let log_file = std::env::temp_dir().join(PLAYER_LOG_FILE);
    CombinedLogger::init(vec![WriteLogger::new(
        LevelFilter::Debug,
        simplelog::Config::default(),
        File::create(log_file)?,
    )])?;

    Ok(())
}
