//! Fetching raw track bytes from a path or URL.

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS, USER_AGENT};
use crate::error::{LoadError, LoadResult};

/// Produces the raw bytes stored at a track location.
pub trait Fetcher {
    fn fetch(&self, location: &str) -> LoadResult<Vec<u8>>;
}

pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Lowercase extension of a location, ignoring any URL query or fragment.
pub fn extension_hint(location: &str) -> Option<String> {
    let trimmed = location
        .split(['?', '#'])
        .next()
        .unwrap_or(location);
    Path::new(trimmed)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Reads local files directly and downloads `http(s)://` locations.
///
/// The HTTP client is built on first use so purely local catalogs never pay
/// for TLS setup.
pub struct SourceFetcher {
    client: std::sync::OnceLock<reqwest::blocking::Client>,
}

impl SourceFetcher {
    pub fn new() -> Self {
        Self {
            client: std::sync::OnceLock::new(),
        }
    }

    fn client(&self, location: &str) -> LoadResult<&reqwest::blocking::Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .build()
            .map_err(|source| LoadError::Http {
                location: location.to_string(),
                source,
            })?;
        Ok(self.client.get_or_init(|| client))
    }

    fn fetch_remote(&self, url: &str) -> LoadResult<Vec<u8>> {
        let http_error = |source| LoadError::Http {
            location: url.to_string(),
            source,
        };

        let response = self
            .client(url)?
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(http_error)?;
        let bytes = response.bytes().map_err(http_error)?;

        log::info!("Downloaded {} bytes from {url}", bytes.len());
        Ok(bytes.to_vec())
    }

    fn fetch_local(&self, location: &str) -> LoadResult<Vec<u8>> {
        let expanded = shellexpand::tilde(location);
        let bytes = fs::read(expanded.as_ref()).map_err(|source| LoadError::Io {
            location: location.to_string(),
            source,
        })?;
        log::info!("Read {} bytes from {location}", bytes.len());
        Ok(bytes)
    }
}

impl Default for SourceFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for SourceFetcher {
    fn fetch(&self, location: &str) -> LoadResult<Vec<u8>> {
        if is_remote(location) {
            self.fetch_remote(location)
        } else {
            self.fetch_local(location)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/a.mp3"));
        assert!(is_remote("http://example.com/a.mp3"));
        assert!(!is_remote("assets/sounds/sample_track.mp3"));
        assert!(!is_remote("/tmp/http.wav"));
    }

    #[test]
    fn test_extension_hint() {
        assert_eq!(extension_hint("a/b/track.MP3"), Some("mp3".to_string()));
        assert_eq!(
            extension_hint("https://host/x/track.flac?token=abc#t=3"),
            Some("flac".to_string())
        );
        assert_eq!(extension_hint("noext"), None);
    }

    #[test]
    fn test_fetch_local_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bytes.bin");
        fs::write(&path, [1u8, 2, 3]).unwrap();

        let bytes = SourceFetcher::new()
            .fetch(path.to_str().unwrap())
            .unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_fetch_missing_file() {
        let result = SourceFetcher::new().fetch("/nonexistent/track.wav");
        match result {
            Err(LoadError::Io { location, .. }) => assert_eq!(location, "/nonexistent/track.wav"),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_fetch_refused_connection() {
        // Port 1 on loopback has no listener, so this fails without DNS
        let result = SourceFetcher::new().fetch("http://127.0.0.1:1/a.wav");
        assert!(matches!(result, Err(LoadError::Http { .. })));
    }
}
