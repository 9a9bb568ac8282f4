//! End of run log written to `log.txt` in the lyrics directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::macros::format_description;

use super::RunStats;
use super::decision::{ChannelStatus, download_required};
use crate::config::Actions;
use crate::song::Song;

pub const LOG_FILE_NAME: &str = "log.txt";

/// File and tag status of one song.
pub fn statuses(song: &Song, actions: &Actions) -> (ChannelStatus, ChannelStatus) {
    // No artist/title means the song never reached the decision step.
    if song.metadata().is_none() {
        return (ChannelStatus::Ignored, ChannelStatus::Ignored);
    }
    let required = download_required(actions, song.presence());
    (
        ChannelStatus::derive(actions.save_to_file, required, song.saved_to_file),
        ChannelStatus::derive(actions.save_to_tag, required, song.saved_to_tag),
    )
}

pub fn log_line(index: usize, song: &Song, actions: &Actions) -> String {
    let (file, tag) = statuses(song, actions);
    format!(
        "{index}. \t{file}\t{tag}\t\t{}\t\t{}\n",
        song.display_name(),
        song.error.as_deref().unwrap_or("")
    )
}

pub fn render(songs: &[Song], stats: &RunStats, actions: &Actions, log_date: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("Log Date {log_date}\n\n"));
    out.push_str(&format!("Audio files detected: {}\n", stats.detected));
    out.push_str(&format!("Metadata extracted for: {}\n", stats.with_metadata));
    out.push_str(&format!("Lyrics files saved: {}\n", stats.saved_to_file));
    out.push_str(&format!("Tags saved: {}\n\n", stats.saved_to_tag));
    out.push_str("  \t[FILE]\t[TAG]\t\t\t[ARTIST-TITLE]\t\t\t\t[ERROR]\n");
    out.push_str(&"=".repeat(100));
    out.push('\n');

    for (i, song) in songs.iter().enumerate() {
        out.push_str(&log_line(i + 1, song, actions));
    }
    out
}

pub fn log_date(now: OffsetDateTime) -> String {
    now.format(format_description!(
        "[hour]:[minute]:[second]  [day]-[month]-[year repr:last_two]"
    ))
    .unwrap_or_else(|_| now.to_string())
}

/// Write the report into `lyrics_dir`, returning the log path.
pub fn write_log(
    lyrics_dir: &Path,
    songs: &[Song],
    stats: &RunStats,
    actions: &Actions,
) -> io::Result<PathBuf> {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let path = lyrics_dir.join(LOG_FILE_NAME);
    fs::write(&path, render(songs, stats, actions, &log_date(now)))?;
    Ok(path)
}
