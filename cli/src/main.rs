/// Sequencer CLI - inspect, validate and edit saved process-sequence documents
use clap::{Parser, Subcommand};
use sequencer_core::{ConfigManager, SequencerConfig};
use std::path::{Path, PathBuf};

mod commands;

use commands::{check, group, init_config, link, show, unlink, zone, Workspace};

/// Load configuration from the given path or default location, with
/// environment overrides applied
fn load_config(config_path: Option<&Path>) -> anyhow::Result<SequencerConfig> {
    let mut manager = ConfigManager::load(config_path)?;
    manager.load_from_env();
    manager.validate()?;
    Ok(manager.config().clone())
}

#[derive(Parser)]
#[command(name = "sequencer")]
#[command(about = "Process-sequence graph editor", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (defaults to .sequencer/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Document store directory (overrides storage.base_path)
    #[arg(long, global = true)]
    store: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the nodes, edges and groups of a sequence
    Show {
        bom: String,
        spec: String,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Report cycles, broken edges and undersized groups
    Check { bom: String, spec: String },

    /// Add a validated edge and save
    Link {
        bom: String,
        spec: String,
        source: String,
        target: String,
    },

    /// Remove an edge and save
    Unlink {
        bom: String,
        spec: String,
        edge: String,
    },

    /// Compute the zone between two nodes (nothing is saved)
    Zone {
        bom: String,
        spec: String,
        start: String,
        end: String,

        /// Zone name
        #[arg(short, long, default_value = "zone")]
        name: String,
    },

    /// Group nodes and save
    Group {
        bom: String,
        spec: String,

        /// Node ids (at least two)
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,

        /// Label instead of the numbered default
        #[arg(short, long)]
        label: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // init-config must work even when the current file does not parse
    if let Commands::InitConfig { force } = args.command {
        init_tracing(args.log_level.as_deref(), "info");
        return init_config::execute(args.config.as_deref(), force);
    }

    let config = load_config(args.config.as_deref())?;
    init_tracing(args.log_level.as_deref(), &config.logging.level);

    let workspace = Workspace::new(config, args.store.as_deref());

    match args.command {
        Commands::InitConfig { .. } => {}

        Commands::Show { bom, spec, format } => {
            show::execute(&workspace, &bom, &spec, &format)?;
        }

        Commands::Check { bom, spec } => {
            check::execute(&workspace, &bom, &spec)?;
        }

        Commands::Link {
            bom,
            spec,
            source,
            target,
        } => {
            link::execute(&workspace, &bom, &spec, &source, &target)?;
        }

        Commands::Unlink { bom, spec, edge } => {
            unlink::execute(&workspace, &bom, &spec, &edge)?;
        }

        Commands::Zone {
            bom,
            spec,
            start,
            end,
            name,
        } => {
            zone::execute(&workspace, &bom, &spec, &start, &end, &name)?;
        }

        Commands::Group {
            bom,
            spec,
            ids,
            label,
        } => {
            group::execute(&workspace, &bom, &spec, &ids, label.as_deref())?;
        }
    }

    Ok(())
}

/// Logs go to stderr so that `show --format json` stays parseable.
/// Level precedence: --log-level, then RUST_LOG, then the config.
fn init_tracing(explicit: Option<&str>, configured: &str) {
    let filter = match explicit {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(configured)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
