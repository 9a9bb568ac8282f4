use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::sources::SourceId;

pub mod defaults;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub actions: Actions,
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Folder scanned (recursively) for audio files.
    pub source_dir: Option<PathBuf>,
    /// Folder where `"{artist} - {title}.txt"` files and the run log go.
    pub lyrics_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Actions {
    pub save_to_file: bool,
    pub save_to_tag: bool,
    /// Download and save again even when lyrics are already present.
    pub overwrite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub lyric_wikia: bool,
    pub lyrics_n_music: bool,
    pub musix_match: bool,
    pub lyricsmode: bool,
    pub az_lyrics: bool,
    pub chartlyrics: bool,
}

impl Default for Config {
    fn default() -> Self {
        defaults::defaults()
    }
}

impl Default for Actions {
    fn default() -> Self {
        Self {
            save_to_file: true,
            save_to_tag: false,
            overwrite: false,
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            lyric_wikia: true,
            lyrics_n_music: true,
            musix_match: true,
            lyricsmode: true,
            az_lyrics: true,
            chartlyrics: true,
        }
    }
}

impl SourcesConfig {
    pub fn is_enabled(&self, id: SourceId) -> bool {
        match id {
            SourceId::LyricWikia => self.lyric_wikia,
            SourceId::LyricsNMusic => self.lyrics_n_music,
            SourceId::MusixMatch => self.musix_match,
            SourceId::LyricsMode => self.lyricsmode,
            SourceId::AzLyrics => self.az_lyrics,
            SourceId::ChartLyrics => self.chartlyrics,
        }
    }

    fn flag_mut(&mut self, id: SourceId) -> &mut bool {
        match id {
            SourceId::LyricWikia => &mut self.lyric_wikia,
            SourceId::LyricsNMusic => &mut self.lyrics_n_music,
            SourceId::MusixMatch => &mut self.musix_match,
            SourceId::LyricsMode => &mut self.lyricsmode,
            SourceId::AzLyrics => &mut self.az_lyrics,
            SourceId::ChartLyrics => &mut self.chartlyrics,
        }
    }

    /// Enabled sources in priority order.
    pub fn enabled(&self) -> Vec<SourceId> {
        SourceId::PRIORITY
            .iter()
            .copied()
            .filter(|id| self.is_enabled(*id))
            .collect()
    }
}

/// Settings for a download run. Only produced by [`Config::validate`], so a
/// value of this type always has both directories, a save mode and a source.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source_dir: PathBuf,
    pub lyrics_dir: PathBuf,
    pub actions: Actions,
    pub sources: Vec<SourceId>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("\"{0}\" is not set. Please use the \"set\" command to set {0}.")]
    DirNotSet(DirType),
    #[error("Both \"save_to_file\" and \"save_to_tag\" modes are disabled. Please enable one.")]
    NoSaveMode,
    #[error("All lyrics sources are disabled. Please enable one.")]
    NoSources,
    #[error("\"source_dir\" does not exist: {}. Please enter path to an existing folder.", .0.display())]
    MissingSourceDir(PathBuf),
    #[error("Invalid directory type \"{0}\". Only \"source_dir\" or \"lyrics_dir\" are valid types.")]
    UnknownDirType(String),
    #[error(
        "Invalid setting \"{0}\". \"save_to_file\", \"save_to_tag\" and \"overwrite\" are the only actions; \"lyric_wikia\", \"lyrics_n_music\", \"musix_match\", \"lyricsmode\", \"az_lyrics\" and \"chartlyrics\" are the only sources."
    )]
    UnknownToggle(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirType {
    Source,
    Lyrics,
}

impl fmt::Display for DirType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DirType::Source => "source_dir",
            DirType::Lyrics => "lyrics_dir",
        })
    }
}

impl FromStr for DirType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "source_dir" => Ok(DirType::Source),
            "lyrics_dir" => Ok(DirType::Lyrics),
            other => Err(ConfigError::UnknownDirType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SaveToFile,
    SaveToTag,
    Overwrite,
}

/// Anything `enable`/`disable` can flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Action(Action),
    Source(SourceId),
}

impl FromStr for Toggle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "save_to_file" => Ok(Toggle::Action(Action::SaveToFile)),
            "save_to_tag" => Ok(Toggle::Action(Action::SaveToTag)),
            "overwrite" => Ok(Toggle::Action(Action::Overwrite)),
            other => SourceId::from_key(other)
                .map(Toggle::Source)
                .ok_or_else(|| ConfigError::UnknownToggle(other.to_string())),
        }
    }
}

impl Toggle {
    /// Console feedback after the toggle has been saved.
    pub fn describe(self, enabled: bool) -> String {
        let not = if enabled { "" } else { "not " };
        match self {
            Toggle::Action(Action::SaveToFile) => {
                format!("lyrico will {not}save the downloaded lyrics to text files.")
            }
            Toggle::Action(Action::SaveToTag) => {
                format!("lyrico will {not}embed the downloaded lyrics into song tags.")
            }
            Toggle::Action(Action::Overwrite) if enabled => "lyrico will download lyrics for all songs detected in \"source_dir\" and overwrite lyrics if already present.".to_string(),
            Toggle::Action(Action::Overwrite) => {
                "lyrico will detect the songs that already have lyrics, and will ignore them."
                    .to_string()
            }
            Toggle::Source(id) => {
                format!("lyrico will {not}use {} as a source for lyrics.", id.display_name())
            }
        }
    }
}

impl fmt::Display for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Toggle::Action(Action::SaveToFile) => f.write_str("save_to_file"),
            Toggle::Action(Action::SaveToTag) => f.write_str("save_to_tag"),
            Toggle::Action(Action::Overwrite) => f.write_str("overwrite"),
            Toggle::Source(id) => f.write_str(id.key()),
        }
    }
}

impl Config {
    /// Check everything a download run needs.
    pub fn validate(&self) -> Result<Settings, ConfigError> {
        let source_dir = self
            .paths
            .source_dir
            .clone()
            .ok_or(ConfigError::DirNotSet(DirType::Source))?;
        let lyrics_dir = self
            .paths
            .lyrics_dir
            .clone()
            .ok_or(ConfigError::DirNotSet(DirType::Lyrics))?;

        if !self.actions.save_to_file && !self.actions.save_to_tag {
            return Err(ConfigError::NoSaveMode);
        }

        let sources = self.sources.enabled();
        if sources.is_empty() {
            return Err(ConfigError::NoSources);
        }

        Ok(Settings {
            source_dir,
            lyrics_dir,
            actions: self.actions,
            sources,
        })
    }

    pub fn set_toggle(&mut self, toggle: Toggle, enabled: bool) {
        match toggle {
            Toggle::Action(Action::SaveToFile) => self.actions.save_to_file = enabled,
            Toggle::Action(Action::SaveToTag) => self.actions.save_to_tag = enabled,
            Toggle::Action(Action::Overwrite) => self.actions.overwrite = enabled,
            Toggle::Source(id) => *self.sources.flag_mut(id) = enabled,
        }
    }

    /// Point `source_dir` or `lyrics_dir` at `path`.
    ///
    /// `source_dir` must already exist. `lyrics_dir` is created when missing.
    pub fn set_dir(&mut self, dir_type: DirType, path: &Path) -> anyhow::Result<()> {
        match dir_type {
            DirType::Source => {
                if !path.is_dir() {
                    return Err(ConfigError::MissingSourceDir(path.to_path_buf()).into());
                }
            }
            DirType::Lyrics => {
                if !path.is_dir() {
                    fs::create_dir_all(path)
                        .with_context(|| format!("create dir {}", path.display()))?;
                    tracing::info!(path = %path.display(), "created lyrics_dir");
                }
            }
        }

        let abs = std::path::absolute(path)
            .with_context(|| format!("resolve {}", path.display()))?;
        match dir_type {
            DirType::Source => self.paths.source_dir = Some(abs),
            DirType::Lyrics => self.paths.lyrics_dir = Some(abs),
        }
        Ok(())
    }

    /// Human readable dump of every section, used by `lyrico settings` and
    /// after configuration errors.
    pub fn render(&self) -> String {
        let dir = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "None".to_string())
        };

        let mut out = String::from("Your current settings:\n\nPATHS\n");
        out.push_str(&format!("    source_dir = {}\n", dir(&self.paths.source_dir)));
        out.push_str(&format!("    lyrics_dir = {}\n", dir(&self.paths.lyrics_dir)));

        out.push_str("\nACTIONS\n");
        out.push_str(&format!("    save_to_file = {}\n", self.actions.save_to_file));
        out.push_str(&format!("    save_to_tag = {}\n", self.actions.save_to_tag));
        out.push_str(&format!("    overwrite = {}\n", self.actions.overwrite));

        out.push_str("\nSOURCES\n");
        for id in SourceId::PRIORITY {
            out.push_str(&format!("    {} = {}\n", id.key(), self.sources.is_enabled(id)));
        }
        out
    }
}

pub fn save(cfg: &Config, override_path: Option<&Path>) -> anyhow::Result<()> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let raw = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&path, raw).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let proj =
        ProjectDirs::from("dev", "lyrico", "lyrico").context("ProjectDirs unavailable")?;
    Ok(proj.config_dir().join("config.toml"))
}

pub fn load(override_path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        let cfg = defaults::defaults();
        save(&cfg, Some(&path)).context("write default config")?;
        return Ok(cfg);
    }

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg = toml::from_str::<Config>(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(dir: &Path) -> Config {
        let mut cfg = defaults::defaults();
        cfg.paths.source_dir = Some(dir.join("music"));
        cfg.paths.lyrics_dir = Some(dir.join("lyrics"));
        cfg
    }

    #[test]
    fn test_defaults_need_directories() {
        let cfg = defaults::defaults();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::DirNotSet(DirType::Source))
        ));
    }

    #[test]
    fn test_validate_rejects_no_save_mode() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = configured(tmp.path());
        cfg.set_toggle(Toggle::Action(Action::SaveToFile), false);
        cfg.set_toggle(Toggle::Action(Action::SaveToTag), false);
        assert!(matches!(cfg.validate(), Err(ConfigError::NoSaveMode)));
    }

    #[test]
    fn test_validate_rejects_no_sources() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = configured(tmp.path());
        for id in SourceId::PRIORITY {
            cfg.set_toggle(Toggle::Source(id), false);
        }
        assert!(matches!(cfg.validate(), Err(ConfigError::NoSources)));
    }

    #[test]
    fn test_enabled_sources_keep_priority_order() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = configured(tmp.path());
        cfg.set_toggle(Toggle::Source(SourceId::LyricWikia), false);
        cfg.set_toggle(Toggle::Source(SourceId::LyricsMode), false);

        let settings = cfg.validate().unwrap();
        assert_eq!(
            settings.sources,
            vec![
                SourceId::LyricsNMusic,
                SourceId::MusixMatch,
                SourceId::AzLyrics,
                SourceId::ChartLyrics,
            ]
        );
    }

    #[test]
    fn test_parse_toggle() {
        assert_eq!(
            "overwrite".parse::<Toggle>().unwrap(),
            Toggle::Action(Action::Overwrite)
        );
        assert_eq!(
            "az_lyrics".parse::<Toggle>().unwrap(),
            Toggle::Source(SourceId::AzLyrics)
        );
        assert!("save_to_cloud".parse::<Toggle>().is_err());
        assert!("music_dir".parse::<DirType>().is_err());
    }

    #[test]
    fn test_set_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = defaults::defaults();

        let missing = tmp.path().join("nope");
        assert!(cfg.set_dir(DirType::Source, &missing).is_err());
        assert!(cfg.paths.source_dir.is_none());

        let lyrics = tmp.path().join("lyrics");
        cfg.set_dir(DirType::Lyrics, &lyrics).unwrap();
        assert!(lyrics.is_dir());
        assert_eq!(cfg.paths.lyrics_dir.as_deref(), Some(lyrics.as_path()));
    }

    #[test]
    fn test_load_creates_and_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");

        let mut cfg = load(Some(&path)).unwrap();
        assert!(path.exists());
        assert!(cfg.actions.save_to_file);

        cfg.set_toggle(Toggle::Action(Action::SaveToTag), true);
        cfg.set_toggle(Toggle::Source(SourceId::ChartLyrics), false);
        save(&cfg, Some(&path)).unwrap();

        let reloaded = load(Some(&path)).unwrap();
        assert!(reloaded.actions.save_to_tag);
        assert!(!reloaded.sources.chartlyrics);
    }
}
