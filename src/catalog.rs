//! Track catalog and the sequential loading pipeline that fills it.
//!
//! Each configured track is fetched, decoded and reduced to its envelope one
//! after another, in catalog order. A track that fails at any step keeps its
//! entry (so it still shows up in the track list) but carries the error
//! instead of a buffer, and every later lookup of it comes back empty.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audio::{AudioBuffer, AudioDecoder};
use crate::envelope::Envelope;
use crate::error::{LoadError, LoadResult};
use crate::fetch::{Fetcher, extension_hint};

/// A catalog entry as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSpec {
    pub id: String,
    pub source: String,
}

impl TrackSpec {
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
        }
    }
}

/// Build specs for bare locations, using file stems as ids.
///
/// Colliding stems get `-2`, `-3`, … suffixes so ids stay unique.
pub fn specs_from_sources(sources: &[String]) -> Vec<TrackSpec> {
    let mut taken = HashSet::new();
    sources
        .iter()
        .map(|source| {
            let stem = default_track_id(source);
            let mut id = stem.clone();
            let mut n = 2;
            while !taken.insert(id.clone()) {
                id = format!("{stem}-{n}");
                n += 1;
            }
            TrackSpec::new(id, source.clone())
        })
        .collect()
}

/// The file stem of a location, or the whole location if it has none.
pub fn default_track_id(source: &str) -> String {
    let path = source.split(['?', '#']).next().unwrap_or(source);
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(source)
        .to_string()
}

/// A successfully decoded track.
#[derive(Debug, Clone)]
pub struct Track {
    pub buffer: Arc<AudioBuffer>,
    pub envelope: Envelope,
}

#[derive(Debug)]
pub struct CatalogEntry {
    pub spec: TrackSpec,
    pub track: LoadResult<Track>,
}

impl CatalogEntry {
    pub fn id(&self) -> &str {
        &self.spec.id
    }

    pub fn is_available(&self) -> bool {
        self.track.is_ok()
    }
}

/// Ordered, immutable set of tracks produced by [`CatalogLoader::load`].
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    /// Decoded track for `id`; `None` when unknown or when loading failed.
    pub fn track(&self, id: &str) -> Option<&Track> {
        self.entry(id).and_then(|e| e.track.as_ref().ok())
    }

    pub fn buffer(&self, id: &str) -> Option<Arc<AudioBuffer>> {
        self.track(id).map(|t| Arc::clone(&t.buffer))
    }

    pub fn envelope(&self, id: &str) -> Option<&Envelope> {
        self.track(id).map(|t| &t.envelope)
    }

    /// Id of the first track that loaded.
    pub fn first_available(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.is_available())
            .map(CatalogEntry::id)
    }

    pub fn available_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_available()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &LoadError)> {
        self.entries
            .iter()
            .filter_map(|e| e.track.as_ref().err().map(|err| (e.id(), err)))
    }
}

/// Progress notifications emitted while the catalog loads.
#[derive(Debug, Clone, Copy)]
pub enum LoadProgress<'a> {
    Started { spec: &'a TrackSpec, index: usize, total: usize },
    Finished { spec: &'a TrackSpec, ok: bool },
}

/// Fetch → decode → envelope, one track at a time.
pub struct CatalogLoader<F, D> {
    fetcher: F,
    decoder: D,
    block_count: usize,
}

impl<F: Fetcher, D: AudioDecoder> CatalogLoader<F, D> {
    pub fn new(fetcher: F, decoder: D, block_count: usize) -> Self {
        Self {
            fetcher,
            decoder,
            block_count,
        }
    }

    /// Load one location without building a catalog.
    pub fn load_track(&self, source: &str) -> LoadResult<Track> {
        let bytes = self.fetcher.fetch(source)?;
        let hint = extension_hint(source);
        let buffer = self.decoder.decode(bytes, hint.as_deref())?;
        let samples = buffer.channel(0).ok_or(LoadError::NoAudio)?;
        let envelope = Envelope::extract(samples, self.block_count)?;
        Ok(Track {
            buffer: Arc::new(buffer),
            envelope,
        })
    }

    pub fn load(&self, specs: &[TrackSpec]) -> Catalog {
        self.load_with_progress(specs, |_| {})
    }

    pub fn load_with_progress<P>(&self, specs: &[TrackSpec], mut on_progress: P) -> Catalog
    where
        P: FnMut(LoadProgress<'_>),
    {
        let mut seen = HashSet::new();
        let unique: Vec<&TrackSpec> = specs
            .iter()
            .filter(|&spec| {
                let first = seen.insert(spec.id.as_str());
                if !first {
                    log::warn!("Duplicate track id '{}' ignored ({})", spec.id, spec.source);
                }
                first
            })
            .collect();

        // Progress counts only the tracks that will actually load
        let total = unique.len();
        let mut entries = Vec::with_capacity(total);

        for (index, spec) in unique.into_iter().enumerate() {
            on_progress(LoadProgress::Started { spec, index, total });
            let track = self.load_track(&spec.source);
            match &track {
                Ok(t) => log::info!(
                    "Loaded track '{}': {:.1}s, {} channel(s)",
                    spec.id,
                    t.buffer.duration().as_secs_f32(),
                    t.buffer.channel_count()
                ),
                Err(e) => log::warn!("Failed to load track '{}' from {}: {e}", spec.id, spec.source),
            }
            on_progress(LoadProgress::Finished {
                spec,
                ok: track.is_ok(),
            });

            entries.push(CatalogEntry {
                spec: spec.clone(),
                track,
            });
        }

        Catalog { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Serves canned bytes and records the order of requests.
    struct StubFetcher {
        files: HashMap<String, Vec<u8>>,
        requests: RefCell<Vec<String>>,
    }

    impl StubFetcher {
        fn new(files: &[(&str, Vec<u8>)]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl Fetcher for StubFetcher {
        fn fetch(&self, location: &str) -> LoadResult<Vec<u8>> {
            self.requests.borrow_mut().push(location.to_string());
            self.files.get(location).cloned().ok_or_else(|| LoadError::Io {
                location: location.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            })
        }
    }

    /// Treats every byte as one mono sample (byte / 100); `0xFF` marks corrupt data.
    struct ByteDecoder;

    impl AudioDecoder for ByteDecoder {
        fn decode(&self, bytes: Vec<u8>, _hint: Option<&str>) -> LoadResult<AudioBuffer> {
            if bytes.contains(&0xFF) {
                return Err(LoadError::Decode("corrupt".to_string()));
            }
            let samples = bytes.iter().map(|&b| b as f32 / 100.0).collect();
            AudioBuffer::new(8000, vec![samples])
        }
    }

    fn loader(files: &[(&str, Vec<u8>)]) -> CatalogLoader<StubFetcher, ByteDecoder> {
        CatalogLoader::new(StubFetcher::new(files), ByteDecoder, 4)
    }

    #[test]
    fn test_load_all_tracks_in_order() {
        let loader = loader(&[("a.wav", vec![0, 50, 0, 50]), ("b.wav", vec![10, 20, 30, 40])]);
        let specs = vec![TrackSpec::new("a", "a.wav"), TrackSpec::new("b", "b.wav")];

        let catalog = loader.load(&specs);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.available_count(), 2);
        assert_eq!(*loader.fetcher.requests.borrow(), vec!["a.wav", "b.wav"]);
        assert_eq!(catalog.envelope("a").unwrap().values(), &[0.0, 1.0, 0.0, 1.0]);
        assert_eq!(catalog.envelope("b").unwrap().values(), &[0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_partial_failure_keeps_loading() {
        let loader = loader(&[
            ("bad.wav", vec![1, 0xFF, 2, 3]),
            ("good.wav", vec![1, 2, 3, 4]),
        ]);
        let specs = vec![
            TrackSpec::new("missing", "missing.wav"),
            TrackSpec::new("bad", "bad.wav"),
            TrackSpec::new("good", "good.wav"),
        ];

        let catalog = loader.load(&specs);

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.available_count(), 1);
        assert!(catalog.buffer("missing").is_none());
        assert!(catalog.buffer("bad").is_none());
        assert!(catalog.buffer("good").is_some());
        assert_eq!(catalog.first_available(), Some("good"));

        let failures: Vec<&str> = catalog.failures().map(|(id, _)| id).collect();
        assert_eq!(failures, vec!["missing", "bad"]);
        assert!(matches!(
            catalog.entry("bad").unwrap().track,
            Err(LoadError::Decode(_))
        ));
        assert!(matches!(
            catalog.entry("missing").unwrap().track,
            Err(LoadError::Io { .. })
        ));
    }

    #[test]
    fn test_too_short_track_fails_envelope() {
        let loader = loader(&[("short.wav", vec![1, 2])]);
        let catalog = loader.load(&[TrackSpec::new("short", "short.wav")]);
        assert!(matches!(
            catalog.entry("short").unwrap().track,
            Err(LoadError::Envelope(_))
        ));
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let loader = loader(&[("a.wav", vec![1, 2, 3, 4]), ("b.wav", vec![4, 3, 2, 1])]);
        let specs = vec![TrackSpec::new("x", "a.wav"), TrackSpec::new("x", "b.wav")];

        let catalog = loader.load(&specs);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entry("x").unwrap().spec.source, "a.wav");
    }

    #[test]
    fn test_progress_events() {
        let loader = loader(&[("a.wav", vec![1, 2, 3, 4])]);
        let specs = vec![TrackSpec::new("a", "a.wav"), TrackSpec::new("b", "b.wav")];
        let mut events = Vec::new();

        loader.load_with_progress(&specs, |p| match p {
            LoadProgress::Started { spec, index, total } => {
                events.push(format!("start {} {index}/{total}", spec.id))
            }
            LoadProgress::Finished { spec, ok } => events.push(format!("done {} {ok}", spec.id)),
        });

        assert_eq!(
            events,
            vec!["start a 0/2", "done a true", "start b 1/2", "done b false"]
        );
    }

    #[test]
    fn test_progress_total_skips_duplicates() {
        let loader = loader(&[("a.wav", vec![1, 2, 3, 4]), ("b.wav", vec![4, 3, 2, 1])]);
        let specs = vec![
            TrackSpec::new("x", "a.wav"),
            TrackSpec::new("x", "b.wav"),
            TrackSpec::new("y", "b.wav"),
        ];
        let mut started = Vec::new();
        let mut finished = 0;

        loader.load_with_progress(&specs, |p| match p {
            LoadProgress::Started { index, total, .. } => started.push((index, total)),
            LoadProgress::Finished { .. } => finished += 1,
        });

        assert_eq!(started, vec![(0, 2), (1, 2)]);
        assert_eq!(finished, 2);
    }

    #[test]
    fn test_unknown_id_lookup() {
        let catalog = Catalog::default();
        assert!(catalog.track("nope").is_none());
        assert!(catalog.first_available().is_none());
    }

    #[test]
    fn test_specs_from_sources_unique_ids() {
        let specs = specs_from_sources(&[
            "music/intro.wav".to_string(),
            "other/intro.flac".to_string(),
            "https://host/sounds/intro.mp3?x=1".to_string(),
            "loop.ogg".to_string(),
        ]);
        let ids: Vec<&str> = specs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["intro", "intro-2", "intro-3", "loop"]);
    }
}
