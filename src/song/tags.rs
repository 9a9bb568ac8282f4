//! Tag access through `lofty`.

use lofty::config::{ParseOptions, WriteOptions};
use lofty::error::LoftyError;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::flac::FlacFile;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, ItemValue, Tag, TagExt, TagItem};
use std::fs::File;
use std::path::Path;

use super::SongFormat;
use super::keys::{LyricsTarget, TagKey};

#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error(transparent)]
    Lofty(#[from] lofty::error::LoftyError),
    #[error("no tags found")]
    NoTags,
    #[error("{0} files do not support lyrics tags")]
    Unsupported(SongFormat),
}

/// Raw, unsanitized values read from a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTags {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub lyrics: Option<String>,
}

/// Read and write access to an audio file's tag container.
pub trait TagCodec {
    fn read(&self, path: &Path, format: SongFormat) -> Result<RawTags, TagError>;

    /// Store `lyrics` in the format's lyrics field and persist the tag.
    fn write_lyrics(&self, path: &Path, format: SongFormat, lyrics: &str)
    -> Result<(), TagError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyCodec;

impl TagCodec for LoftyCodec {
    fn read(&self, path: &Path, format: SongFormat) -> Result<RawTags, TagError> {
        let tagged_file = Probe::open(path)?.read()?;
        let tag = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
            .ok_or(TagError::NoTags)?;

        let keys = format.keys();
        Ok(RawTags {
            artist: get_text(tag, keys.artist),
            title: get_text(tag, keys.title),
            album: get_text(tag, keys.album),
            lyrics: keys.lyrics.iter().find_map(|k| get_text(tag, *k)),
        })
    }

    fn write_lyrics(
        &self,
        path: &Path,
        format: SongFormat,
        lyrics: &str,
    ) -> Result<(), TagError> {
        let target = format
            .keys()
            .lyrics_target
            .ok_or(TagError::Unsupported(format))?;

        let item = match target {
            LyricsTarget::VorbisComment(key) => return write_flac_comment(path, key, lyrics),
            LyricsTarget::Frame {
                key,
                lang,
                description,
            } => {
                let mut item = TagItem::new(item_key(key), ItemValue::Text(lyrics.to_string()));
                item.set_lang(lang);
                item.set_description(description.to_string());
                item
            }
            LyricsTarget::Field(key) => {
                TagItem::new(item_key(key), ItemValue::Text(lyrics.to_string()))
            }
        };

        let mut tagged_file = Probe::open(path)?.read()?;
        let tag_type = tagged_file.primary_tag_type();
        if tagged_file.tag(tag_type).is_none() {
            tagged_file.insert_tag(Tag::new(tag_type));
        }
        let tag = tagged_file
            .tag_mut(tag_type)
            .ok_or(TagError::Unsupported(format))?;

        if !tag.insert(item) {
            return Err(TagError::Unsupported(format));
        }
        tag.save_to_path(path, WriteOptions::default())?;
        Ok(())
    }
}

/// Set a raw Vorbis comment in a FLAC file, replacing any existing value
/// under the same key (case-insensitive).
fn write_flac_comment(path: &Path, key: &str, lyrics: &str) -> Result<(), TagError> {
    let mut flac = {
        let mut file = File::open(path).map_err(LoftyError::from)?;
        FlacFile::read_from(&mut file, ParseOptions::default())?
    };

    let mut comments = flac.vorbis_comments().cloned().unwrap_or_default();
    comments.insert(key.to_string(), lyrics.to_string());
    flac.set_vorbis_comments(comments);

    flac.save_to_path(path, WriteOptions::default())?;
    Ok(())
}

fn item_key(key: TagKey) -> ItemKey {
    match key {
        TagKey::Artist => ItemKey::TrackArtist,
        TagKey::Title => ItemKey::TrackTitle,
        TagKey::Album => ItemKey::AlbumTitle,
        TagKey::Lyrics => ItemKey::Lyrics,
        TagKey::Native(name) => ItemKey::Unknown(name.to_string()),
    }
}

fn get_text(tag: &Tag, key: TagKey) -> Option<String> {
    match key {
        TagKey::Native(name) => tag
            .items()
            .find(|item| match item.key() {
                ItemKey::Unknown(k) => k.eq_ignore_ascii_case(name),
                _ => false,
            })
            .and_then(|item| item.value().text())
            .map(str::to_string),
        other => tag.get_string(&item_key(other)).map(str::to_string),
    }
}
