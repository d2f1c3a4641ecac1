//! rodio-backed audio graph.
//!
//! Every source becomes its own `Sink` on a shared output stream, with the
//! sink volume acting as the gain stage. Suspending the graph pauses every
//! started sink and freezes the graph clock; resuming plays them again from
//! where they stopped. The graph starts out suspended, so nothing is heard
//! until the user unlocks playback.

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use wavebars::audio::AudioBuffer;
use wavebars::error::GraphError;
use wavebars::playback::{AudioGraph, SourceId};

/// Clock that only advances while the graph is running.
#[derive(Debug, Clone)]
pub struct AudioClock {
    origin: Instant,
    suspended_total: Duration,
    suspended_at: Option<Instant>,
}

impl AudioClock {
    pub fn new_suspended(now: Instant) -> Self {
        Self {
            origin: now,
            suspended_total: Duration::ZERO,
            suspended_at: Some(now),
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended_at.is_some()
    }

    pub fn suspend_at(&mut self, now: Instant) {
        if self.suspended_at.is_none() {
            self.suspended_at = Some(now);
        }
    }

    pub fn resume_at(&mut self, now: Instant) {
        if let Some(since) = self.suspended_at.take() {
            self.suspended_total += now.saturating_duration_since(since);
        }
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        let end = self.suspended_at.unwrap_or(now);
        end.saturating_duration_since(self.origin)
            .saturating_sub(self.suspended_total)
    }
}

struct Voice {
    channels: u16,
    sample_rate: u32,
    looping: bool,
    samples: Option<Vec<f32>>,
    sink: Option<Sink>,
}

pub struct RodioGraph {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    gain: f32,
    next_id: u64,
    voices: HashMap<SourceId, Voice>,
    clock: AudioClock,
}

fn backend_error(e: impl std::fmt::Display) -> GraphError {
    GraphError::Backend(e.to_string())
}

impl RodioGraph {
    pub fn new(gain: f32) -> Result<Self, GraphError> {
        let (stream, stream_handle) = OutputStream::try_default().map_err(backend_error)?;
        log::info!("Opened default audio output, gain {gain}");

        Ok(Self {
            _stream: stream,
            stream_handle,
            gain,
            next_id: 0,
            voices: HashMap::new(),
            clock: AudioClock::new_suspended(Instant::now()),
        })
    }
}

impl AudioGraph for RodioGraph {
    fn create_source(
        &mut self,
        buffer: &AudioBuffer,
        looping: bool,
    ) -> Result<SourceId, GraphError> {
        let channels = u16::try_from(buffer.channel_count())
            .map_err(|_| backend_error("too many channels"))?;

        self.next_id += 1;
        let id = SourceId(self.next_id);
        self.voices.insert(
            id,
            Voice {
                channels,
                sample_rate: buffer.sample_rate(),
                looping,
                samples: Some(buffer.interleaved()),
                sink: None,
            },
        );

        log::debug!(
            "Created source {id:?}: {} Hz, {channels} channel(s), loop={looping}",
            buffer.sample_rate()
        );
        Ok(id)
    }

    fn start(&mut self, source: SourceId, when: f64) -> Result<(), GraphError> {
        let voice = self
            .voices
            .get_mut(&source)
            .ok_or(GraphError::UnknownSource(source))?;
        if voice.samples.is_none() {
            return Err(GraphError::AlreadyStarted(source));
        }

        // Samples stay with the voice until a sink exists to take them
        let sink = Sink::try_new(&self.stream_handle).map_err(backend_error)?;
        let Some(samples) = voice.samples.take() else {
            return Err(GraphError::AlreadyStarted(source));
        };
        sink.set_volume(self.gain);
        if self.clock.is_suspended() {
            sink.pause();
        }

        let now = self.clock.elapsed_at(Instant::now()).as_secs_f64();
        let delay = Duration::from_secs_f64((when - now).max(0.0));
        let buffer = SamplesBuffer::new(voice.channels, voice.sample_rate, samples);
        if voice.looping {
            sink.append(buffer.repeat_infinite().delay(delay));
        } else {
            sink.append(buffer.delay(delay));
        }

        voice.sink = Some(sink);
        log::debug!("Started source {source:?} (delay {delay:?})");
        Ok(())
    }

    fn stop(&mut self, source: SourceId) -> Result<(), GraphError> {
        let voice = self
            .voices
            .remove(&source)
            .ok_or(GraphError::UnknownSource(source))?;
        if let Some(sink) = voice.sink {
            sink.stop();
        }
        log::debug!("Stopped source {source:?}");
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), GraphError> {
        for sink in self.voices.values().filter_map(|v| v.sink.as_ref()) {
            sink.pause();
        }
        self.clock.suspend_at(Instant::now());
        log::debug!("Audio graph suspended");
        Ok(())
    }

    fn resume(&mut self) -> Result<(), GraphError> {
        for sink in self.voices.values().filter_map(|v| v.sink.as_ref()) {
            sink.play();
        }
        self.clock.resume_at(Instant::now());
        log::debug!("Audio graph resumed");
        Ok(())
    }

    fn is_suspended(&self) -> bool {
        self.clock.is_suspended()
    }

    fn current_time(&self) -> f64 {
        self.clock.elapsed_at(Instant::now()).as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_ci_environment() -> bool {
        // Check common CI environment variables
        std::env::var("CI").is_ok()
            || std::env::var("GITHUB_ACTIONS").is_ok()
            || std::env::var("TRAVIS").is_ok()
            || std::env::var("CIRCLECI").is_ok()
    }

    fn graph_or_skip() -> Option<RodioGraph> {
        if is_ci_environment() {
            eprintln!("Skipping audio test in CI environment");
            return None;
        }
        match RodioGraph::new(1.0) {
            Ok(graph) => Some(graph),
            Err(e) => {
                eprintln!("Skipping audio test, no output device: {e}");
                None
            }
        }
    }

    fn buffer() -> AudioBuffer {
        AudioBuffer::new(8000, vec![vec![0.0; 800], vec![0.0; 800]]).unwrap()
    }

    #[test]
    fn test_clock_frozen_while_suspended() {
        let t0 = Instant::now();
        let mut clock = AudioClock::new_suspended(t0);

        assert!(clock.is_suspended());
        assert_eq!(clock.elapsed_at(t0 + Duration::from_secs(5)), Duration::ZERO);

        clock.resume_at(t0 + Duration::from_secs(5));
        assert_eq!(
            clock.elapsed_at(t0 + Duration::from_secs(7)),
            Duration::from_secs(2)
        );

        clock.suspend_at(t0 + Duration::from_secs(8));
        assert_eq!(
            clock.elapsed_at(t0 + Duration::from_secs(20)),
            Duration::from_secs(3)
        );

        clock.resume_at(t0 + Duration::from_secs(20));
        assert_eq!(
            clock.elapsed_at(t0 + Duration::from_secs(21)),
            Duration::from_secs(4)
        );
    }

    #[test]
    fn test_clock_suspend_is_idempotent() {
        let t0 = Instant::now();
        let mut clock = AudioClock::new_suspended(t0);
        clock.resume_at(t0);
        clock.suspend_at(t0 + Duration::from_secs(1));
        clock.suspend_at(t0 + Duration::from_secs(3));
        clock.resume_at(t0 + Duration::from_secs(4));
        assert_eq!(
            clock.elapsed_at(t0 + Duration::from_secs(5)),
            Duration::from_secs(2)
        );
    }

    #[test]
    fn test_new_graph_is_suspended() {
        let Some(graph) = graph_or_skip() else {
            return;
        };
        assert!(graph.is_suspended());
        assert_eq!(graph.current_time(), 0.0);
    }

    #[test]
    fn test_source_starts_only_once() {
        let Some(mut graph) = graph_or_skip() else {
            return;
        };
        let id = graph.create_source(&buffer(), true).unwrap();
        graph.start(id, 0.0).unwrap();
        assert!(matches!(
            graph.start(id, 0.0),
            Err(GraphError::AlreadyStarted(_))
        ));
        graph.stop(id).unwrap();
    }

    #[test]
    fn test_unknown_source() {
        let Some(mut graph) = graph_or_skip() else {
            return;
        };
        assert!(matches!(
            graph.stop(SourceId(42)),
            Err(GraphError::UnknownSource(SourceId(42)))
        ));
        assert!(matches!(
            graph.start(SourceId(42), 0.0),
            Err(GraphError::UnknownSource(_))
        ));
    }

    #[test]
    fn test_suspend_and_resume() {
        let Some(mut graph) = graph_or_skip() else {
            return;
        };
        graph.resume().unwrap();
        assert!(!graph.is_suspended());
        graph.suspend().unwrap();
        assert!(graph.is_suspended());
    }
}
