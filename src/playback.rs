//! Playback state machine.
//!
//! The controller owns an [`AudioGraph`] and a [`Visualizer`] and turns user
//! intents (load, play, pause, toggle, select) into calls on them. An audio
//! source can be started only once, so pausing suspends the whole graph and
//! resuming resumes it; only a track switch discards the source.

use std::fmt;

use crate::audio::AudioBuffer;
use crate::catalog::Catalog;
use crate::error::GraphError;
use crate::visualizer::{Geometry, Visualizer};

/// Handle to a source created by an [`AudioGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub u64);

/// Audio output backend seen by the controller.
pub trait AudioGraph {
    /// Create a source for `buffer`, routed through the graph's gain stage to
    /// the output. The source is silent until started.
    fn create_source(&mut self, buffer: &AudioBuffer, looping: bool)
    -> Result<SourceId, GraphError>;

    /// Start `source` at `when` seconds on the graph clock. A source can only
    /// be started once.
    fn start(&mut self, source: SourceId, when: f64) -> Result<(), GraphError>;

    /// Stop and release `source`.
    fn stop(&mut self, source: SourceId) -> Result<(), GraphError>;

    /// Halt all output; started sources keep their position.
    fn suspend(&mut self) -> Result<(), GraphError>;

    fn resume(&mut self) -> Result<(), GraphError>;

    fn is_suspended(&self) -> bool;

    /// Graph clock in seconds; does not advance while suspended.
    fn current_time(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn is_playing(self) -> bool {
        self == PlaybackState::Playing
    }

    /// Label for the play/pause control.
    pub fn toggle_label(self) -> &'static str {
        if self.is_playing() { "pause" } else { "play" }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Stopped => "stopped",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
        };
        f.write_str(name)
    }
}

pub struct PlaybackController<G, V> {
    graph: G,
    visualizer: V,
    geometry: Geometry,
    looping: bool,
    state: PlaybackState,
    selected: Option<String>,
    source: Option<SourceId>,
    controls_enabled: bool,
}

impl<G: AudioGraph, V: Visualizer> PlaybackController<G, V> {
    pub fn new(graph: G, visualizer: V, geometry: Geometry, looping: bool) -> Self {
        Self {
            graph,
            visualizer,
            geometry,
            looping,
            state: PlaybackState::Stopped,
            selected: None,
            source: None,
            controls_enabled: false,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Whether the current track's source has been started.
    pub fn has_started(&self) -> bool {
        self.source.is_some()
    }

    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    /// The load control is only usable until it has been used once.
    pub fn can_load(&self) -> bool {
        !self.controls_enabled
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn visualizer(&self) -> &V {
        &self.visualizer
    }

    /// Unlock the playback controls and wake the graph if it starts suspended.
    pub fn load(&mut self) -> Result<(), GraphError> {
        if self.controls_enabled {
            return Ok(());
        }
        if self.graph.is_suspended() {
            self.graph.resume()?;
        }
        self.controls_enabled = true;
        log::info!("Playback controls enabled");
        Ok(())
    }

    pub fn play(&mut self, catalog: &Catalog) -> Result<PlaybackState, GraphError> {
        if !self.controls_enabled {
            log::debug!("Ignoring play before load");
            return Ok(self.state);
        }
        match self.state {
            PlaybackState::Playing => {}
            PlaybackState::Paused => {
                self.graph.resume()?;
                self.state = PlaybackState::Playing;
            }
            PlaybackState::Stopped => self.start_selected(catalog)?,
        }
        Ok(self.state)
    }

    pub fn pause(&mut self) -> Result<PlaybackState, GraphError> {
        if self.state == PlaybackState::Playing {
            self.graph.suspend()?;
            self.state = PlaybackState::Paused;
        }
        Ok(self.state)
    }

    pub fn toggle(&mut self, catalog: &Catalog) -> Result<PlaybackState, GraphError> {
        if !self.controls_enabled {
            log::debug!("Ignoring toggle before load");
            return Ok(self.state);
        }
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused | PlaybackState::Stopped => self.play(catalog),
        }
    }

    fn start_selected(&mut self, catalog: &Catalog) -> Result<(), GraphError> {
        let Some(buffer) = self.selected.as_deref().and_then(|id| catalog.buffer(id)) else {
            log::debug!("No decoded buffer for selection, nothing to play");
            return Ok(());
        };

        // A pause followed by a track switch leaves the graph suspended
        if self.graph.is_suspended() {
            self.graph.resume()?;
        }

        let source = self.graph.create_source(&buffer, self.looping)?;
        let when = self.graph.current_time();
        if let Err(e) = self.graph.start(source, when) {
            // Release the unstarted source so retries do not pile up
            if let Err(stop_err) = self.graph.stop(source) {
                log::warn!("Failed to release source {source:?}: {stop_err}");
            }
            return Err(e);
        }
        self.source = Some(source);
        self.state = PlaybackState::Playing;

        log::info!(
            "Started '{}' at {when:.3}s",
            self.selected.as_deref().unwrap_or_default()
        );
        Ok(())
    }

    /// Switch to track `id`.
    ///
    /// Returns `Ok(false)` without touching anything when `id` is already
    /// selected or has no decoded buffer.
    pub fn select_track(&mut self, id: &str, catalog: &Catalog) -> Result<bool, GraphError> {
        if self.selected.as_deref() == Some(id) {
            return Ok(false);
        }
        let Some(envelope) = catalog.envelope(id) else {
            log::debug!("Track '{id}' is not available, selection ignored");
            return Ok(false);
        };

        // The source is only forgotten once the graph has let go of it
        if let Some(source) = self.source {
            self.graph.stop(source)?;
            self.source = None;
        }

        self.visualizer.clear();
        self.visualizer.draw(envelope, &self.geometry);

        self.selected = Some(id.to_string());
        self.state = PlaybackState::Stopped;
        log::info!("Selected track '{id}'");
        Ok(true)
    }

    /// Redraw the selected track for a new drawing area.
    pub fn resize(&mut self, geometry: Geometry, catalog: &Catalog) {
        if geometry == self.geometry {
            return;
        }
        self.geometry = geometry;
        if let Some(envelope) = self.selected.as_deref().and_then(|id| catalog.envelope(id)) {
            self.visualizer.clear();
            self.visualizer.draw(envelope, &self.geometry);
        }
    }

    /// Stop the current source, if any.
    pub fn shutdown(&mut self) -> Result<(), GraphError> {
        if let Some(source) = self.source {
            self.graph.stop(source)?;
            self.source = None;
        }
        self.state = PlaybackState::Stopped;
        Ok(())
    }
}
