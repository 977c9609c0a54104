use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::info;

use dashkit::{ClientConfig, check_invariants, import_from_json};

use crate::error::{DemoError, Result};
use crate::outline::render_outline;
use crate::session::run_session;

#[derive(Debug, Parser)]
#[command(
    name = "dashkit-demo",
    about = "Drive a dashkit tree through a scripted edit session",
    version
)]
pub struct Cli {
    /// Emit logs as JSON lines instead of text.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build a sample dashboard, edit it, and print the result.
    Session(SessionArgs),

    /// Load a snapshot file, print its outline, and check its invariants.
    Inspect(InspectArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SessionArgs {
    /// Client config (`.toml` or `.json`).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the final snapshot here instead of stdout.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    /// Snapshot produced by `session --export` or any compatible writer.
    pub snapshot: PathBuf,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    crate::init_logging(cli.log_json)?;
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Session(args) => {
            let config = load_config(args.config.as_deref())?;
            let report = run_session(config)?;
            print!("{}", report.outline);
            match args.export {
                Some(path) => {
                    std::fs::write(&path, &report.snapshot).map_err(|e| DemoError::io(&path, e))?;
                    info!(path = %path.display(), "snapshot written");
                }
                None => println!("{}", report.snapshot),
            }
            Ok(())
        }
        Commands::Inspect(args) => {
            let text = std::fs::read_to_string(&args.snapshot)
                .map_err(|e| DemoError::io(&args.snapshot, e))?;
            let Some(root) = import_from_json(&text)? else {
                println!("(empty dashboard)");
                return Ok(());
            };
            print!("{}", render_outline(&root));
            let report = check_invariants(&root);
            for issue in &report.issues {
                println!("! {:?} {}: {}", issue.code, issue.node_id, issue.message);
            }
            Ok(())
        }
    }
}

/// Config from `path` (format by extension), or the defaults with the sample
/// tree seeded.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig> {
    let Some(path) = path else {
        return Ok(ClientConfig {
            seed_children: true,
            ..ClientConfig::default()
        });
    };
    let config = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => ClientConfig::from_json_file(path)?,
        _ => ClientConfig::from_toml_file(path)?,
    };
    let problems = config.validate();
    if !problems.is_empty() {
        return Err(DemoError::InvalidConfig(problems));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_seeds_sample_tree() {
        let config = load_config(None).expect("defaults");
        assert!(config.seed_children);
    }

    #[test]
    fn json_config_by_extension() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("dashkit.json");
        std::fs::write(&path, r#"{"indentation_width": 30.0}"#).expect("write");
        let config = load_config(Some(&path)).expect("valid");
        assert_eq!(config.indentation_width, 30.0);
        assert!(!config.seed_children);
    }

    #[test]
    fn toml_config_drives_seeded_client() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("dashkit.toml");
        std::fs::write(&path, "seed_children = true\nindentation_width = 20.0\n").expect("write");
        let config = load_config(Some(&path)).expect("valid");

        let client = dashkit::TreeClient::with_config(None, config);
        assert!(client.contains("Collections"));
        let projection = client
            .projected_depth("Summer", "Summer", 20.0)
            .expect("visible");
        assert_eq!(projection.depth, 3);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("dashkit.toml");
        std::fs::write(&path, "indentation_width = -1.0\n").expect("write");
        let err = load_config(Some(&path)).expect_err("negative width");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn session_export_then_inspect() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("snapshot.json");
        run(Cli {
            log_json: false,
            command: Commands::Session(SessionArgs {
                config: None,
                export: Some(path.clone()),
            }),
        })
        .expect("session");
        assert!(path.exists());
        run(Cli {
            log_json: false,
            command: Commands::Inspect(InspectArgs { snapshot: path }),
        })
        .expect("inspect");
    }

    #[test]
    fn inspect_missing_file_is_io_error() {
        let err = run(Cli {
            log_json: false,
            command: Commands::Inspect(InspectArgs {
                snapshot: PathBuf::from("/definitely/not/here.json"),
            }),
        })
        .expect_err("missing");
        assert_eq!(err.exit_code(), 2);
    }
}
