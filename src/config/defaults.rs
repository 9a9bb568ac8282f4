use super::{Actions, Config, PathsConfig, SourcesConfig};

/// Config written on first launch. Directories stay unset so the user has
/// to pick them before the first download run.
pub fn defaults() -> Config {
    Config {
        paths: PathsConfig {
            source_dir: None,
            lyrics_dir: None,
        },
        actions: Actions::default(),
        sources: SourcesConfig::default(),
    }
}
