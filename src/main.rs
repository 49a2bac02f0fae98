use clap::Parser;
use color_eyre::Result;
use std::time::Instant;

use daynotes::cli::{Cli, Commands};
use daynotes::{Config, Database, Daybook, Gateway, Profile, SystemClock};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let (mut config, config_path) = match &cli.config {
        Some(path) => {
            let path = daynotes::utils::expand_path(path);
            (Config::load_from_path(&path)?, path)
        }
        None => (
            Config::load_with_profile(profile)?,
            Config::get_config_path(profile)?,
        ),
    };

    if let Err(e) = daynotes::logging::init_logging(&config.log_level, &config.get_log_dir()) {
        eprintln!("warning: logging disabled: {}", e);
    }

    let db_path = config.get_database_path();
    let db = Database::new(
        db_path
            .to_str()
            .ok_or_else(|| color_eyre::eyre::eyre!("Database path contains invalid UTF-8"))?,
    )?;
    tracing::info!(path = %db_path.display(), "opened database");

    let mut daybook = Daybook::open(
        Gateway::new(db),
        Box::new(SystemClock),
        config.timing.navigation(),
        config.timing.tick_interval(),
        Instant::now(),
    )?;

    let mut stdout = std::io::stdout();
    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let app = daynotes::tui::App::new(config, daybook)?;
            daynotes::tui::run_event_loop(app)?;
        }
        Commands::Add { text, workspace } => {
            daynotes::cli::handle_add(text, workspace, &mut daybook, &mut stdout)?;
        }
        Commands::List { back, workspace } => {
            daynotes::cli::handle_list(back, workspace, &mut daybook, &mut stdout)?;
        }
        Commands::Done { number, workspace } => {
            daynotes::cli::handle_done(number, workspace, &mut daybook, &mut stdout)?;
        }
        Commands::Pin { number, workspace } => {
            daynotes::cli::handle_pin(number, workspace, &mut daybook, &mut stdout)?;
        }
        Commands::History { limit } => {
            daynotes::cli::handle_history(limit, &daybook, &mut stdout)?;
        }
        Commands::Workspaces => {
            daynotes::cli::handle_workspaces(&daybook, &mut stdout)?;
        }
        Commands::Theme { name } => {
            daynotes::cli::handle_theme(name, &mut config, &config_path, &mut stdout)?;
        }
    }

    Ok(())
}
