use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use dayblock::cli::{self, Cli, Commands};
use dayblock::notify::TerminalBell;
use dayblock::{Config, Database, KeyValueStore, MemoryStore, Planner, Profile, time};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let config = match &cli.config {
        Some(path) => {
            let mut config = Config::load_from_path(&PathBuf::from(path))?;
            config.apply_profile(profile);
            config
        }
        None => Config::load_with_profile(profile)?,
    };

    init_logging(&config.get_log_path(), &config.log_level);
    tracing::info!(?profile, ephemeral = cli.ephemeral, "dayblock starting");

    let store: Box<dyn KeyValueStore> = if cli.ephemeral {
        Box::new(MemoryStore::new())
    } else {
        let db_path = config.get_database_path();
        let db_path = db_path
            .to_str()
            .ok_or_else(|| eyre!("Database path contains invalid UTF-8"))?;
        Box::new(Database::new(db_path).wrap_err("Failed to open database")?)
    };

    let notifier = Box::new(TerminalBell::new(config.sound_enabled));
    // Rollover happens here, before any command looks at the schedule
    let mut planner = Planner::open(store, notifier, time::today());

    // Dispatch to appropriate command handler
    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let app = dayblock::tui::App::new(config, planner)?;
            dayblock::tui::run_event_loop(app)?;
        }
        Commands::Add { title, start, end } => {
            cli::handle_add(title, start, end, &mut planner)?;
        }
        Commands::List => {
            cli::handle_list(&planner)?;
        }
        Commands::Now => {
            cli::handle_now(&planner)?;
        }
        Commands::Remove { id } => {
            cli::handle_remove(id, &mut planner)?;
        }
        Commands::Clear => {
            cli::handle_clear(&mut planner)?;
        }
        Commands::Rate { rating } => {
            cli::handle_rate(rating, &mut planner)?;
        }
        Commands::History { limit } => {
            cli::handle_history(limit.unwrap_or(config.history_length), &planner)?;
        }
    }

    Ok(())
}

/// Send tracing output to the log file; the terminal belongs to the TUI.
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(log_path: &Path, default_level: &str) {
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: logging disabled, cannot open {}: {}", log_path.display(), e);
            return;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}
