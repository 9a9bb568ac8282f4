//! Song records built from audio files on disk.
//!
//! A [`Song`] is created once per scanned file: tags are read and sanitized,
//! the lookup key and output file name are derived, and the presence of
//! existing lyrics is frozen for the rest of the run.

pub mod keys;
pub mod tags;

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::download::decision::Presence;
use crate::sources::{Query, SourceId};
pub use tags::{LoftyCodec, RawTags, TagCodec, TagError};

pub const MISSING_METADATA: &str = "Artist name or song title not found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SongFormat {
    Mp3,
    M4a,
    Mp4,
    Flac,
    Ogg,
    Oga,
    Wma,
}

impl SongFormat {
    /// Format for `path`, by case-insensitive extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "mp3" => Some(SongFormat::Mp3),
            "m4a" => Some(SongFormat::M4a),
            "mp4" => Some(SongFormat::Mp4),
            "flac" => Some(SongFormat::Flac),
            "ogg" => Some(SongFormat::Ogg),
            "oga" => Some(SongFormat::Oga),
            "wma" => Some(SongFormat::Wma),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SongFormat::Mp3 => "mp3",
            SongFormat::M4a => "m4a",
            SongFormat::Mp4 => "mp4",
            SongFormat::Flac => "flac",
            SongFormat::Ogg => "ogg",
            SongFormat::Oga => "oga",
            SongFormat::Wma => "wma",
        }
    }
}

impl fmt::Display for SongFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Empty or whitespace-only input becomes `None`; anything else is trimmed
/// with internal whitespace runs collapsed to one space.
pub fn sanitize(s: &str) -> Option<String> {
    let out = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if out.is_empty() { None } else { Some(out) }
}

/// Canonical `artist:title` identity used by wiki-style sources: spaces become
/// underscores and everything else is percent-encoded.
pub fn lookup_key(artist: &str, title: &str) -> String {
    format!(
        "{}:{}",
        urlencoding::encode(&artist.replace(' ', "_")),
        urlencoding::encode(&title.replace(' ', "_"))
    )
}

pub fn lyrics_file_name(artist: &str, title: &str) -> String {
    format!("{artist} - {title}.txt")
}

#[derive(Debug, Clone)]
pub struct Song {
    pub path: PathBuf,
    pub format: SongFormat,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    /// What the sources are asked for. Present only when artist and title
    /// are both known.
    pub query: Option<Query>,
    pub lyrics_file_path: Option<PathBuf>,
    pub lyrics: Option<String>,
    pub lyrics_file_present: bool,
    pub lyrics_tag_present: bool,
    pub source: Option<SourceId>,
    pub error: Option<String>,
    pub saved_to_file: bool,
    pub saved_to_tag: bool,
}

impl Song {
    /// Read `path` through `codec` and build its record. Tag read failures
    /// are logged and leave the metadata fields empty.
    pub fn load(
        path: PathBuf,
        format: SongFormat,
        codec: &dyn TagCodec,
        lyrics_dir: &Path,
        existing_lyrics_files: &HashSet<PathBuf>,
    ) -> Self {
        let raw = match codec.read(&path, format) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to read tags");
                RawTags::default()
            }
        };
        Self::from_tags(path, format, raw, lyrics_dir, existing_lyrics_files)
    }

    pub fn from_tags(
        path: PathBuf,
        format: SongFormat,
        raw: RawTags,
        lyrics_dir: &Path,
        existing_lyrics_files: &HashSet<PathBuf>,
    ) -> Self {
        let artist = raw.artist.as_deref().and_then(sanitize);
        let title = raw.title.as_deref().and_then(sanitize);
        let album = raw.album.as_deref().and_then(sanitize);
        let embedded = raw.lyrics.as_deref().and_then(sanitize);

        let (query, lyrics_file_path, error) = match (&artist, &title) {
            (Some(a), Some(t)) => (
                Some(Query::new(a, t)),
                Some(lyrics_dir.join(lyrics_file_name(a, t))),
                None,
            ),
            _ => (None, None, Some(MISSING_METADATA.to_string())),
        };

        let lyrics_file_present = lyrics_file_path
            .as_ref()
            .is_some_and(|p| existing_lyrics_files.contains(p));

        Self {
            path,
            format,
            artist,
            title,
            album,
            query,
            lyrics_file_path,
            lyrics: None,
            lyrics_file_present,
            lyrics_tag_present: embedded.is_some(),
            source: None,
            error,
            saved_to_file: false,
            saved_to_tag: false,
        }
    }

    /// Artist and title, when both are known.
    pub fn metadata(&self) -> Option<(&str, &str)> {
        match (&self.artist, &self.title) {
            (Some(a), Some(t)) => Some((a.as_str(), t.as_str())),
            _ => None,
        }
    }

    pub fn presence(&self) -> Presence {
        Presence {
            file: self.lyrics_file_present,
            tag: self.lyrics_tag_present,
        }
    }

    /// `"artist - title"`, or the file path when metadata is missing.
    pub fn display_name(&self) -> String {
        match self.metadata() {
            Some((a, t)) => format!("{a} - {t}"),
            None => self.path.display().to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory tag store keyed by path. Unknown paths read as empty tags.
    #[derive(Default)]
    pub struct MemoryCodec {
        tags: RefCell<HashMap<PathBuf, RawTags>>,
        writes: RefCell<Vec<(PathBuf, String)>>,
        fail_writes: bool,
    }

    impl MemoryCodec {
        pub fn failing_writes() -> Self {
            Self {
                fail_writes: true,
                ..Self::default()
            }
        }

        pub fn insert(&self, path: impl Into<PathBuf>, artist: Option<&str>, title: Option<&str>) {
            self.tags.borrow_mut().insert(
                path.into(),
                RawTags {
                    artist: artist.map(str::to_string),
                    title: title.map(str::to_string),
                    ..RawTags::default()
                },
            );
        }

        pub fn written(&self) -> Vec<(PathBuf, String)> {
            self.writes.borrow().clone()
        }
    }

    impl TagCodec for MemoryCodec {
        fn read(&self, path: &Path, _format: SongFormat) -> Result<RawTags, TagError> {
            Ok(self.tags.borrow().get(path).cloned().unwrap_or_default())
        }

        fn write_lyrics(&self, path: &Path, format: SongFormat, lyrics: &str) -> Result<(), TagError> {
            if self.fail_writes {
                return Err(TagError::NoTags);
            }
            if !format.supports_lyrics_tag() {
                return Err(TagError::Unsupported(format));
            }
            self.tags
                .borrow_mut()
                .entry(path.to_path_buf())
                .or_default()
                .lyrics = Some(lyrics.to_string());
            self.writes
                .borrow_mut()
                .push((path.to_path_buf(), lyrics.to_string()));
            Ok(())
        }
    }
}
