//! Directory scanning for audio files and existing lyrics files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::song::SongFormat;

/// Every audio file under `root` whose extension maps to a [`SongFormat`],
/// sorted by path.
pub fn scan_audio_files(root: &Path) -> Vec<(PathBuf, SongFormat)> {
    let mut files: Vec<(PathBuf, SongFormat)> = walk_files(root)
        .filter_map(|p| SongFormat::from_path(&p).map(|f| (p, f)))
        .collect();
    files.sort_by(|a, b| a.0.cmp(&b.0));
    files
}

/// All `.txt` files under `lyrics_dir`, captured once before a run so the
/// presence check never sees files written during it.
pub fn scan_lyrics_files(lyrics_dir: &Path) -> HashSet<PathBuf> {
    walk_files(lyrics_dir)
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
        })
        .collect()
}

fn walk_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| match e {
            Ok(e) => Some(e),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
}
