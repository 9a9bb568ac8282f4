//! The download pass: scan, decide, fetch, save, report.

pub mod decision;
pub mod report;
pub mod writer;

use crate::config::Settings;
use crate::library;
use crate::song::{Song, TagCodec};
use crate::sources::Resolver;

use decision::download_required;

/// Counters for one run. Created zeroed and returned at the end.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub detected: usize,
    pub with_metadata: usize,
    pub saved_to_file: usize,
    pub saved_to_tag: usize,
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub songs: Vec<Song>,
    pub stats: RunStats,
}

/// Scan `source_dir` and build one [`Song`] per audio file. Lyrics files are
/// listed once here, so files written later in the run do not count.
pub fn discover(settings: &Settings, codec: &dyn TagCodec) -> (Vec<Song>, RunStats) {
    let existing = library::scan_lyrics_files(&settings.lyrics_dir);
    let songs: Vec<Song> = library::scan_audio_files(&settings.source_dir)
        .into_iter()
        .map(|(path, format)| Song::load(path, format, codec, &settings.lyrics_dir, &existing))
        .collect();

    let stats = RunStats {
        detected: songs.len(),
        with_metadata: songs.iter().filter(|s| s.metadata().is_some()).count(),
        ..RunStats::default()
    };
    (songs, stats)
}

/// Handle one song: skip, or fetch and save.
pub async fn process_song(
    song: &mut Song,
    settings: &Settings,
    codec: &dyn TagCodec,
    resolver: &Resolver,
    stats: &mut RunStats,
) {
    let Some(query) = song.query.clone() else {
        println!(
            "{} was ignored. {}",
            song.path.display(),
            song.error.as_deref().unwrap_or_default()
        );
        return;
    };

    if !download_required(&settings.actions, song.presence()) {
        println!("Skipping {}. Lyrics already present.", song.display_name());
        return;
    }

    println!("Downloading {}", song.display_name());
    let resolution = resolver.resolve(&query).await;
    let error = resolution.error_message();
    match resolution.lyrics {
        Some(lyrics) => {
            song.lyrics = Some(lyrics);
            song.source = resolution.source;
            song.error = None;
        }
        None => {
            tracing::warn!(song = %song.display_name(), error = ?error, "no lyrics found");
            if let Some(msg) = &error {
                println!("Failed: {msg}");
            }
            song.error = error;
        }
    }

    writer::save_lyrics(song, &settings.actions, &settings.lyrics_dir, codec, stats);
}

/// Run a full pass over `settings.source_dir` and write `log.txt`.
pub async fn run(settings: &Settings, codec: &dyn TagCodec, resolver: &Resolver) -> RunOutcome {
    let (mut songs, mut stats) = discover(settings, codec);
    println!("{} songs detected.", stats.detected);
    println!(
        "Metadata extracted for {}/{} songs.",
        stats.with_metadata, stats.detected
    );
    tracing::info!(
        detected = stats.detected,
        with_metadata = stats.with_metadata,
        sources = ?resolver.source_ids(),
        "starting download pass"
    );

    for song in &mut songs {
        process_song(song, settings, codec, resolver, &mut stats).await;
    }

    match report::write_log(&settings.lyrics_dir, &songs, &stats, &settings.actions) {
        Ok(path) => tracing::info!(path = %path.display(), "log written"),
        Err(err) => {
            tracing::warn!(error = %err, "failed to write log");
            println!("Unable to build log. \"lyrics_dir\" does not exist.");
        }
    }

    println!("FINISHED");
    RunOutcome { songs, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Actions;
    use crate::song::testing::MemoryCodec;
    use crate::sources::testing::FakeSource;
    use crate::sources::{LyricsSource, NOT_FOUND, SourceError, SourceId};
    use decision::ChannelStatus;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;

    const BOHEMIAN: &str = "Is this the real life?\nIs this just fantasy?";

    fn settings(root: &Path, actions: Actions) -> Settings {
        let source_dir = root.join("music");
        let lyrics_dir = root.join("lyrics");
        fs::create_dir_all(&source_dir).unwrap();
        fs::create_dir_all(&lyrics_dir).unwrap();
        Settings {
            source_dir,
            lyrics_dir,
            actions,
            sources: vec![SourceId::LyricWikia, SourceId::AzLyrics],
        }
    }

    fn resolver(sources: &[Arc<FakeSource>]) -> Resolver {
        Resolver::new(
            sources
                .iter()
                .map(|s| Box::new(s.clone()) as Box<dyn LyricsSource>)
                .collect(),
        )
    }

    fn add_song(settings: &Settings, codec: &MemoryCodec, name: &str, artist: Option<&str>, title: Option<&str>) {
        let path = settings.source_dir.join(name);
        fs::write(&path, b"").unwrap();
        codec.insert(path, artist, title);
    }

    const FILE_ONLY: Actions = Actions {
        save_to_file: true,
        save_to_tag: false,
        overwrite: false,
    };

    #[tokio::test]
    async fn test_queen_end_to_end() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = settings(tmp.path(), FILE_ONLY);
        let codec = MemoryCodec::default();
        add_song(&settings, &codec, "queen.mp3", Some("Queen"), Some("Bohemian Rhapsody"));

        let wikia = Arc::new(FakeSource::new(SourceId::LyricWikia, Err(SourceError::Connectivity)));
        let az = Arc::new(FakeSource::new(SourceId::AzLyrics, Ok(BOHEMIAN)));
        let out = run(&settings, &codec, &resolver(&[wikia, az])).await;

        assert_eq!(
            out.stats,
            RunStats {
                detected: 1,
                with_metadata: 1,
                saved_to_file: 1,
                saved_to_tag: 0,
            }
        );
        let song = &out.songs[0];
        assert_eq!(song.source, Some(SourceId::AzLyrics));
        assert!(song.error.is_none());
        assert_eq!(
            report::statuses(song, &settings.actions),
            (ChannelStatus::Saved, ChannelStatus::Ignored)
        );

        let text = fs::read_to_string(settings.lyrics_dir.join("Queen - Bohemian Rhapsody.txt")).unwrap();
        assert_eq!(
            text,
            format!("Artist - Queen\nTitle - Bohemian Rhapsody\nAlbum - Unknown\n\n{BOHEMIAN}")
        );

        let log = fs::read_to_string(settings.lyrics_dir.join(report::LOG_FILE_NAME)).unwrap();
        assert!(log.contains("1. \tSaved\tIgnored\t\tQueen - Bohemian Rhapsody\t\t\n"));
    }

    #[tokio::test]
    async fn test_all_sources_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let actions = Actions {
            save_to_tag: true,
            ..FILE_ONLY
        };
        let settings = settings(tmp.path(), actions);
        let codec = MemoryCodec::default();
        add_song(&settings, &codec, "a.mp3", Some("Nobody"), Some("Nothing"));

        let a = Arc::new(FakeSource::new(SourceId::LyricWikia, Err(SourceError::NotFound)));
        let b = Arc::new(FakeSource::new(SourceId::AzLyrics, Err(SourceError::NotFound)));
        let out = run(&settings, &codec, &resolver(&[a, b])).await;

        let song = &out.songs[0];
        assert!(song.lyrics.is_none());
        assert_eq!(song.error.as_deref(), Some(NOT_FOUND));
        assert_eq!(
            report::statuses(song, &settings.actions),
            (ChannelStatus::Failed, ChannelStatus::Failed)
        );
        assert_eq!(out.stats.saved_to_file, 0);
        assert!(codec.written().is_empty());
        assert!(!settings.lyrics_dir.join("Nobody - Nothing.txt").exists());
    }

    #[tokio::test]
    async fn test_songs_without_metadata_never_fetch() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = settings(tmp.path(), FILE_ONLY);
        let codec = MemoryCodec::default();
        add_song(&settings, &codec, "no_title.flac", Some("Queen"), None);
        add_song(&settings, &codec, "no_artist.mp3", None, Some("Bohemian Rhapsody"));

        let src = Arc::new(FakeSource::new(SourceId::LyricWikia, Ok(BOHEMIAN)));
        let out = run(&settings, &codec, &resolver(&[src.clone()])).await;

        assert!(src.calls.lock().unwrap().is_empty());
        assert_eq!(out.stats.detected, 2);
        assert_eq!(out.stats.with_metadata, 0);
        for song in &out.songs {
            assert_eq!(
                report::statuses(song, &settings.actions),
                (ChannelStatus::Ignored, ChannelStatus::Ignored)
            );
            assert_eq!(song.error.as_deref(), Some(crate::song::MISSING_METADATA));
        }
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let actions = Actions {
            save_to_tag: true,
            ..FILE_ONLY
        };
        let settings = settings(tmp.path(), actions);
        let codec = MemoryCodec::default();
        add_song(&settings, &codec, "queen.mp3", Some("Queen"), Some("Bohemian Rhapsody"));

        let src = Arc::new(FakeSource::new(SourceId::LyricWikia, Ok(BOHEMIAN)));
        let first = run(&settings, &codec, &resolver(&[src.clone()])).await;
        assert_eq!(first.stats.saved_to_file, 1);
        assert_eq!(first.stats.saved_to_tag, 1);
        assert_eq!(src.calls.lock().unwrap().len(), 1);

        let second = run(&settings, &codec, &resolver(&[src.clone()])).await;
        assert_eq!(src.calls.lock().unwrap().len(), 1);
        assert_eq!(second.stats.saved_to_file, 0);
        assert_eq!(second.stats.saved_to_tag, 0);
        assert_eq!(
            report::statuses(&second.songs[0], &settings.actions),
            (ChannelStatus::Present, ChannelStatus::Present)
        );
    }

    #[tokio::test]
    async fn test_overwrite_refetches_present_lyrics() {
        let tmp = tempfile::tempdir().unwrap();
        let actions = Actions {
            overwrite: true,
            ..FILE_ONLY
        };
        let settings = settings(tmp.path(), actions);
        let codec = MemoryCodec::default();
        add_song(&settings, &codec, "queen.mp3", Some("Queen"), Some("Bohemian Rhapsody"));
        fs::write(settings.lyrics_dir.join("Queen - Bohemian Rhapsody.txt"), "old").unwrap();

        let src = Arc::new(FakeSource::new(SourceId::LyricWikia, Ok(BOHEMIAN)));
        let out = run(&settings, &codec, &resolver(&[src.clone()])).await;

        assert_eq!(src.calls.lock().unwrap().len(), 1);
        assert!(out.songs[0].lyrics_file_present);
        assert_eq!(out.stats.saved_to_file, 1);
        let text = fs::read_to_string(settings.lyrics_dir.join("Queen - Bohemian Rhapsody.txt")).unwrap();
        assert!(text.ends_with(BOHEMIAN));
    }

    #[tokio::test]
    async fn test_missing_lyrics_dir_keeps_running() {
        let tmp = tempfile::tempdir().unwrap();
        let mut settings = settings(tmp.path(), FILE_ONLY);
        settings.lyrics_dir = tmp.path().join("gone");
        let codec = MemoryCodec::default();
        add_song(&settings, &codec, "a.mp3", Some("A"), Some("B"));
        add_song(&settings, &codec, "c.mp3", Some("C"), Some("D"));

        let src = Arc::new(FakeSource::new(SourceId::LyricWikia, Ok("la la")));
        let out = run(&settings, &codec, &resolver(&[src.clone()])).await;

        assert_eq!(src.calls.lock().unwrap().len(), 2);
        assert_eq!(out.stats.saved_to_file, 0);
        for song in &out.songs {
            assert_eq!(song.error.as_deref(), Some(writer::LYRICS_DIR_MISSING));
        }
    }
}
