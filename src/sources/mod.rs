//! Lyrics sources and the resolver that walks them in priority order.
//!
//! Each source turns an artist/title pair into lyrics text or a
//! [`SourceError`]. The [`Resolver`] tries the enabled sources one after the
//! other, stopping at the first valid result. Sources are never retried.

pub mod az_lyrics;
pub mod chartlyrics;
pub mod html;
pub mod http;
pub mod lyric_wikia;
pub mod lyrics_n_music;
pub mod lyricsmode;
pub mod musix_match;

use async_trait::async_trait;
use std::fmt;

pub use http::HttpClient;

pub const NOT_FOUND: &str = "Lyrics not found. Check artist or title name and retry.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    LyricWikia,
    LyricsNMusic,
    MusixMatch,
    LyricsMode,
    AzLyrics,
    ChartLyrics,
}

impl SourceId {
    /// Order in which enabled sources are tried.
    pub const PRIORITY: [SourceId; 6] = [
        SourceId::LyricWikia,
        SourceId::LyricsNMusic,
        SourceId::MusixMatch,
        SourceId::LyricsMode,
        SourceId::AzLyrics,
        SourceId::ChartLyrics,
    ];

    /// Key used in the config file and on the command line.
    pub fn key(self) -> &'static str {
        match self {
            SourceId::LyricWikia => "lyric_wikia",
            SourceId::LyricsNMusic => "lyrics_n_music",
            SourceId::MusixMatch => "musix_match",
            SourceId::LyricsMode => "lyricsmode",
            SourceId::AzLyrics => "az_lyrics",
            SourceId::ChartLyrics => "chartlyrics",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::PRIORITY.into_iter().find(|id| id.key() == key)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SourceId::LyricWikia => "Lyric Wikia",
            SourceId::LyricsNMusic => "LYRICSnMUSIC",
            SourceId::MusixMatch => "musiXmatch",
            SourceId::LyricsMode => "LYRICSMODE",
            SourceId::AzLyrics => "AZLyrics",
            SourceId::ChartLyrics => "ChartLyrics",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("No network connectivity.")]
    Connectivity,
    #[error("Request timed out. Check network connectivity.")]
    Timeout,
    #[error("Bad request. Lyrics not found. Check artist or title name. Error code: {0}")]
    Status(u16),
    #[error("Lyrics not found. Check artist or title name and retry.")]
    NotFound,
}

impl SourceError {
    /// Transport level failures, as opposed to a page without lyrics.
    pub fn is_network(&self) -> bool {
        !matches!(self, SourceError::NotFound)
    }
}

/// What a source is asked for: the sanitized artist and title plus the
/// wiki-style lookup key derived from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub artist: String,
    pub title: String,
    pub lookup_key: String,
}

impl Query {
    pub fn new(artist: &str, title: &str) -> Self {
        Self {
            artist: artist.to_string(),
            title: title.to_string(),
            lookup_key: crate::song::lookup_key(artist, title),
        }
    }
}

#[async_trait]
pub trait LyricsSource: Send + Sync {
    fn id(&self) -> SourceId;

    async fn fetch(&self, query: &Query) -> Result<String, SourceError>;
}

/// A non-blank string counts as lyrics.
pub fn test_lyrics(lyrics: &str) -> bool {
    crate::song::sanitize(lyrics).is_some()
}

/// Normalize line endings and trim, keeping the line structure intact.
pub fn clean_lyrics(raw: &str) -> String {
    raw.replace("\r\n", "\n").replace('\r', "\n").trim().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub lyrics: Option<String>,
    pub source: Option<SourceId>,
    pub error: Option<SourceError>,
}

impl Resolution {
    /// Error text to record on the song when nothing was found.
    pub fn error_message(&self) -> Option<String> {
        if self.lyrics.is_some() {
            return None;
        }
        Some(
            self.error
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| NOT_FOUND.to_string()),
        )
    }
}

/// Keep the first network error; a not-found only fills an empty slot and is
/// replaced by any later network error.
fn record_error(slot: &mut Option<SourceError>, err: SourceError) {
    match slot {
        None => *slot = Some(err),
        Some(existing) if !existing.is_network() && err.is_network() => *slot = Some(err),
        Some(_) => {}
    }
}

pub struct Resolver {
    sources: Vec<Box<dyn LyricsSource>>,
}

impl Resolver {
    pub fn new(sources: Vec<Box<dyn LyricsSource>>) -> Self {
        Self { sources }
    }

    /// Build the enabled sources, in the order given.
    pub fn from_ids(ids: &[SourceId], http: &HttpClient) -> Self {
        let sources = ids
            .iter()
            .map(|id| -> Box<dyn LyricsSource> {
                match id {
                    SourceId::LyricWikia => Box::new(lyric_wikia::LyricWikia::new(http.clone())),
                    SourceId::LyricsNMusic => {
                        Box::new(lyrics_n_music::LyricsNMusic::new(http.clone()))
                    }
                    SourceId::MusixMatch => Box::new(musix_match::MusixMatch::new(http.clone())),
                    SourceId::LyricsMode => Box::new(lyricsmode::LyricsMode::new(http.clone())),
                    SourceId::AzLyrics => Box::new(az_lyrics::AzLyrics::new(http.clone())),
                    SourceId::ChartLyrics => {
                        Box::new(chartlyrics::ChartLyrics::new(http.clone()))
                    }
                }
            })
            .collect();
        Self::new(sources)
    }

    pub fn source_ids(&self) -> Vec<SourceId> {
        self.sources.iter().map(|s| s.id()).collect()
    }

    pub async fn resolve(&self, query: &Query) -> Resolution {
        let mut error = None;

        for source in &self.sources {
            println!("\tTrying {}...", source.id());
            match source.fetch(query).await {
                Ok(text) if test_lyrics(&text) => {
                    tracing::debug!(
                        source = %source.id(),
                        artist = %query.artist,
                        title = %query.title,
                        "lyrics found"
                    );
                    return Resolution {
                        lyrics: Some(clean_lyrics(&text)),
                        source: Some(source.id()),
                        error: None,
                    };
                }
                Ok(_) => {
                    tracing::debug!(source = %source.id(), "blank lyrics");
                    record_error(&mut error, SourceError::NotFound);
                }
                Err(err) => {
                    tracing::debug!(source = %source.id(), error = %err, "source failed");
                    record_error(&mut error, err);
                }
            }
        }

        Resolution {
            lyrics: None,
            source: None,
            error,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Replays canned results and records every call.
    pub struct FakeSource {
        pub id: SourceId,
        pub result: Result<String, SourceError>,
        pub calls: Mutex<Vec<(String, String)>>,
    }

    impl FakeSource {
        pub fn new(id: SourceId, result: Result<&str, SourceError>) -> Self {
            Self {
                id,
                result: result.map(str::to_string),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LyricsSource for std::sync::Arc<FakeSource> {
        fn id(&self) -> SourceId {
            self.id
        }

        async fn fetch(&self, query: &Query) -> Result<String, SourceError> {
            self.calls
                .lock()
                .unwrap()
                .push((query.artist.clone(), query.title.clone()));
            self.result.clone()
        }
    }
}
