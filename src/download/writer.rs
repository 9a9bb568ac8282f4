//! Saving fetched lyrics to sidecar text files and audio tags.

use std::fs;
use std::io;
use std::path::Path;

use super::RunStats;
use crate::config::Actions;
use crate::song::{Song, TagCodec, TagError};

pub const UNKNOWN_ALBUM: &str = "Unknown";

pub const LYRICS_DIR_MISSING: &str =
    "\"lyrics_dir\" does not exist. Please set a \"lyrics_dir\" which exists.";
pub const FILE_IN_USE: &str = "Cannot save lyrics to file. The file is opened or in use.";
pub const BAD_FILE_NAME: &str =
    "Cannot save lyrics to file. Unable to create file with song metadata.";
pub const TAG_IN_USE: &str = "Cannot save lyrics to tag. The file is opened or in use.";
pub const TAG_UNSUPPORTED: &str = "Cannot save lyrics to tag. Format does not support lyrics.";

/// Text file body: three header lines, a blank line, then the lyrics.
pub fn file_contents(artist: &str, title: &str, album: Option<&str>, lyrics: &str) -> String {
    format!(
        "Artist - {artist}\nTitle - {title}\nAlbum - {}\n\n{lyrics}",
        album.unwrap_or(UNKNOWN_ALBUM)
    )
}

/// Map a failed file write to a message the user can act on.
pub fn classify_file_error(err: &io::Error, lyrics_dir: &Path) -> String {
    match err.kind() {
        io::ErrorKind::NotFound if !lyrics_dir.is_dir() => LYRICS_DIR_MISSING.to_string(),
        io::ErrorKind::PermissionDenied => FILE_IN_USE.to_string(),
        // A missing sub-directory here means the name itself contains a separator.
        io::ErrorKind::NotFound | io::ErrorKind::InvalidInput => BAD_FILE_NAME.to_string(),
        _ if err.raw_os_error() == Some(22) => BAD_FILE_NAME.to_string(),
        _ => format!("Cannot save lyrics to file. {err}"),
    }
}

fn classify_tag_error(err: &TagError) -> &'static str {
    match err {
        TagError::Unsupported(_) => TAG_UNSUPPORTED,
        TagError::Lofty(_) | TagError::NoTags => TAG_IN_USE,
    }
}

/// Write `song.lyrics` to every enabled channel. Without lyrics nothing is
/// written and the song's error is left as it is. A failure on one channel
/// does not stop the other.
pub fn save_lyrics(
    song: &mut Song,
    actions: &Actions,
    lyrics_dir: &Path,
    codec: &dyn TagCodec,
    stats: &mut RunStats,
) {
    let Some(lyrics) = song.lyrics.clone() else {
        return;
    };

    if actions.save_to_file {
        save_to_file(song, &lyrics, lyrics_dir, stats);
    }

    if actions.save_to_tag {
        if !song.format.supports_lyrics_tag() {
            println!("Failed: {TAG_UNSUPPORTED}");
            song.error = Some(TAG_UNSUPPORTED.to_string());
            return;
        }
        match codec.write_lyrics(&song.path, song.format, &lyrics) {
            Ok(()) => {
                song.saved_to_tag = true;
                stats.saved_to_tag += 1;
                tracing::info!(path = %song.path.display(), "lyrics saved to tag");
                println!("Success: Lyrics saved to tag.");
            }
            Err(err) => {
                tracing::warn!(path = %song.path.display(), error = %err, "tag write failed");
                let msg = classify_tag_error(&err);
                println!("Failed: {msg}");
                song.error = Some(msg.to_string());
            }
        }
    }
}

fn save_to_file(song: &mut Song, lyrics: &str, lyrics_dir: &Path, stats: &mut RunStats) {
    let (Some((artist, title)), Some(path)) = (song.metadata(), song.lyrics_file_path.as_ref())
    else {
        return;
    };

    let body = file_contents(artist, title, song.album.as_deref(), lyrics);
    match fs::write(path, body) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "lyrics saved to file");
            println!("Success: Lyrics saved to file.");
            song.saved_to_file = true;
            stats.saved_to_file += 1;
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "file write failed");
            let msg = classify_file_error(&err, lyrics_dir);
            println!("Failed: {msg}");
            song.error = Some(msg);
        }
    }
}
