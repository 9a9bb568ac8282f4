//! Per-format tag keys.
//!
//! Each supported container stores artist/title/album/lyrics under different
//! names. The table is looked up once per song and handed to the codec.

use super::SongFormat;

/// A tag field, either one of the well-known fields or a raw key as it
/// appears in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKey {
    Artist,
    Title,
    Album,
    Lyrics,
    /// Raw key, matched case-insensitively.
    Native(&'static str),
}

/// How lyrics are written back into the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LyricsTarget {
    /// Structured lyrics frame (ID3v2 USLT) with a fixed language and description.
    Frame {
        key: TagKey,
        lang: [u8; 3],
        description: &'static str,
    },
    /// Plain key assignment.
    Field(TagKey),
    /// Raw Vorbis comment key, written through `FlacFile`. The generic tag
    /// rejects unknown Vorbis keys.
    VorbisComment(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatKeys {
    pub artist: TagKey,
    pub title: TagKey,
    pub album: TagKey,
    /// Candidate lyrics keys, first match wins.
    pub lyrics: &'static [TagKey],
    /// `None` for formats we scan but never write lyrics into.
    pub lyrics_target: Option<LyricsTarget>,
}

const ID3_KEYS: FormatKeys = FormatKeys {
    artist: TagKey::Artist,
    title: TagKey::Title,
    album: TagKey::Album,
    lyrics: &[TagKey::Lyrics],
    lyrics_target: Some(LyricsTarget::Frame {
        key: TagKey::Lyrics,
        lang: *b"eng",
        description: "lyrics.wikia",
    }),
};

const MP4_KEYS: FormatKeys = FormatKeys {
    artist: TagKey::Artist,
    title: TagKey::Title,
    album: TagKey::Album,
    lyrics: &[TagKey::Lyrics],
    lyrics_target: Some(LyricsTarget::Field(TagKey::Lyrics)),
};

const VORBIS_LYRICS: &[TagKey] = &[
    TagKey::Native("UNSYNCED LYRICS"),
    TagKey::Lyrics,
    TagKey::Native("SYNCED LYRICS"),
];

const FLAC_KEYS: FormatKeys = FormatKeys {
    artist: TagKey::Artist,
    title: TagKey::Title,
    album: TagKey::Album,
    lyrics: VORBIS_LYRICS,
    lyrics_target: Some(LyricsTarget::VorbisComment("UNSYNCED LYRICS")),
};

const OGG_KEYS: FormatKeys = FormatKeys {
    lyrics_target: None,
    ..FLAC_KEYS
};

const WMA_KEYS: FormatKeys = FormatKeys {
    artist: TagKey::Artist,
    title: TagKey::Title,
    album: TagKey::Album,
    lyrics: &[TagKey::Native("WM/Lyrics")],
    lyrics_target: None,
};

impl SongFormat {
    pub fn keys(self) -> &'static FormatKeys {
        match self {
            SongFormat::Mp3 => &ID3_KEYS,
            SongFormat::M4a | SongFormat::Mp4 => &MP4_KEYS,
            SongFormat::Flac => &FLAC_KEYS,
            SongFormat::Ogg | SongFormat::Oga => &OGG_KEYS,
            SongFormat::Wma => &WMA_KEYS,
        }
    }

    /// Whether lyrics can be saved into this format's tag.
    pub fn supports_lyrics_tag(self) -> bool {
        self.keys().lyrics_target.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writable_formats() {
        assert!(SongFormat::Mp3.supports_lyrics_tag());
        assert!(SongFormat::M4a.supports_lyrics_tag());
        assert!(SongFormat::Mp4.supports_lyrics_tag());
        assert!(SongFormat::Flac.supports_lyrics_tag());
        assert!(!SongFormat::Ogg.supports_lyrics_tag());
        assert!(!SongFormat::Wma.supports_lyrics_tag());
    }

    #[test]
    fn test_flac_prefers_unsynced_lyrics() {
        let keys = SongFormat::Flac.keys();
        assert_eq!(keys.lyrics[0], TagKey::Native("UNSYNCED LYRICS"));
        assert_eq!(keys.lyrics.len(), 3);
        assert_eq!(
            keys.lyrics_target,
            Some(LyricsTarget::VorbisComment("UNSYNCED LYRICS"))
        );
    }

    #[test]
    fn test_mp3_writes_uslt_frame() {
        match SongFormat::Mp3.keys().lyrics_target {
            Some(LyricsTarget::Frame { lang, description, .. }) => {
                assert_eq!(&lang, b"eng");
                assert_eq!(description, "lyrics.wikia");
            }
            other => panic!("unexpected target {other:?}"),
        }
    }
}
