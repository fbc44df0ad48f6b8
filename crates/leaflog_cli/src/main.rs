mod config;
mod console;
mod menu;
mod plant_cmds;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use leaflog_core::db::open_db;
use leaflog_core::{init_logging, PlantService, SqlitePlantStore};
use leaflog_http::run_serve;

use config::{ConfigFlags, LeafLogConfig};
use console::ConsoleIo;
use plant_cmds::{write_report, PlantCommands};

#[derive(Parser)]
#[command(name = "leaflog", version, about = "Track houseplants and their watering schedule")]
struct Cli {
    /// SQLite database file (overrides LEAFLOG_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Log verbosity: trace|debug|info|warn|error (overrides LEAFLOG_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Absolute or working-directory-relative log directory (overrides LEAFLOG_LOG_DIR)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive console menu (default)
    Menu,
    /// Serve the REST API until Ctrl+C
    Serve {
        /// Address to bind (overrides LEAFLOG_BIND)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides LEAFLOG_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Import plants from a text file, one `name-species-days-notes` record per line
    Import {
        /// Path to the import file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (bind, port) = match &cli.command {
        Some(Commands::Serve { bind, port }) => (bind.clone(), *port),
        _ => (None, None),
    };
    let config = LeafLogConfig::resolve(&ConfigFlags {
        db_path: cli.db.clone(),
        log_level: cli.log_level.clone(),
        log_dir: cli.log_dir.clone(),
        bind,
        port,
    })?;

    if let Err(err) = init_logging(config.log_level, &config.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open database at {}", config.db_path.display()))?;
    let service = PlantService::new(SqlitePlantStore::new(conn));
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        config.db_path.display()
    );

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => {
            let commands = PlantCommands::new(&service);
            let mut io = ConsoleIo::stdio();
            commands.main_menu().run(&mut io)?;
        }
        Commands::Serve { .. } => {
            let shared = Arc::new(Mutex::new(service));
            let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
            runtime.block_on(run_serve(shared, &config.serve))?;
        }
        Commands::Import { file } => {
            let report = service
                .import_file(&file)
                .with_context(|| format!("failed to import {}", file.display()))?;
            let mut io = ConsoleIo::stdio();
            write_report(&mut io, &report)?;
        }
    }

    Ok(())
}
