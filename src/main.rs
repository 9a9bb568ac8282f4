mod config;
mod download;
mod library;
mod song;
mod sources;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use config::{Config, ConfigError, DirType, Toggle};
use song::LoftyCodec;
use sources::{HttpClient, Resolver};

#[derive(Debug, Parser)]
#[command(name = "lyrico", version, about = "Download lyrics for your music library")]
struct Cli {
    /// Override config file path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Folder to scan. Saved as `source_dir` before the run.
    source_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    /// The command to run; a bare `lyrico [SOURCE_DIR]` is `run`.
    fn into_command(self) -> Result<Command, clap::Error> {
        match (self.command, self.source_dir) {
            (None, source_dir) => Ok(Command::Run { source_dir }),
            (Some(command), None) => Ok(command),
            (Some(_), Some(dir)) => Err(Cli::command().error(
                ErrorKind::ArgumentConflict,
                format!(
                    "SOURCE_DIR '{}' cannot be combined with a subcommand",
                    dir.display()
                ),
            )),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Download lyrics for every song in `source_dir` (default).
    Run { source_dir: Option<PathBuf> },
    /// Enable an action (save_to_file, save_to_tag, overwrite) or a source.
    Enable { name: String },
    /// Disable an action or a source.
    Disable { name: String },
    /// Set `source_dir` or `lyrics_dir`.
    Set { dir_type: String, path: PathBuf },
    /// Print the current settings.
    Settings,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();

    let mut cli = Cli::parse();
    let cfg_override = cli.config.take();
    let command = cli.into_command().unwrap_or_else(|err| err.exit());

    let cfg_path = cfg_override.as_deref();
    let mut cfg = config::load(cfg_path).context("load config")?;

    match command {
        Command::Run { source_dir } => {
            if let Some(dir) = source_dir {
                cfg.set_dir(DirType::Source, &dir)?;
                config::save(&cfg, cfg_path).context("save config")?;
            }
            download(&cfg).await?;
        }
        Command::Enable { name } => toggle(&mut cfg, cfg_path, &name, true)?,
        Command::Disable { name } => toggle(&mut cfg, cfg_path, &name, false)?,
        Command::Set { dir_type, path } => {
            let dir_type: DirType = dir_type.parse()?;
            cfg.set_dir(dir_type, &path)?;
            config::save(&cfg, cfg_path).context("save config")?;
            println!("{dir_type} updated.");
            print!("{}", cfg.render());
        }
        Command::Settings => print!("{}", cfg.render()),
    }

    Ok(())
}

fn toggle(cfg: &mut Config, cfg_path: Option<&Path>, name: &str, enabled: bool) -> anyhow::Result<()> {
    let toggle: Toggle = name.parse()?;
    cfg.set_toggle(toggle, enabled);
    config::save(cfg, cfg_path).context("save config")?;
    println!("{}", toggle.describe(enabled));
    Ok(())
}

async fn download(cfg: &Config) -> anyhow::Result<()> {
    let settings = match cfg.validate().and_then(|s| {
        if s.source_dir.is_dir() {
            Ok(s)
        } else {
            Err(ConfigError::MissingSourceDir(s.source_dir))
        }
    }) {
        Ok(s) => s,
        Err(err) => {
            println!("{err}");
            print!("{}", cfg.render());
            return Err(err).context("settings not loaded");
        }
    };

    let http = HttpClient::new().context("build http client")?;
    let resolver = Resolver::from_ids(&settings.sources, &http);
    let outcome = download::run(&settings, &LoftyCodec, &resolver).await;

    let with_errors = outcome.songs.iter().filter(|s| s.error.is_some()).count();
    if with_errors > 0 {
        println!(
            "{with_errors} of {} songs reported errors. See {} for details.",
            outcome.stats.detected,
            settings.lyrics_dir.join(download::report::LOG_FILE_NAME).display()
        );
    }
    Ok(())
}
