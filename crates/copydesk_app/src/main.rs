mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use cli::{Cli, Command};
use config::AppConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();
    // A missing .env is fine; the environment may already carry the key.
    let _ = dotenvy::dotenv();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    copydesk_logging::initialize(cli.log.into(), level);

    let config = AppConfig::load(&cli.config)?;
    match cli.command {
        Command::Generate {
            file,
            client,
            language,
            tone,
        } => commands::generate(
            &config,
            file.as_deref(),
            client.as_deref(),
            language,
            tone,
        ),
        Command::Brainstorm {
            keyword,
            language,
            tone,
        } => commands::brainstorm(&config, &keyword, &language, &tone),
        Command::List => commands::list(&config),
        Command::FixFormat { ids, all } => commands::fix_format(&config, &ids, all),
        Command::Delete { ids } => commands::delete(&config, &ids),
        Command::Publish { ids, draft } => commands::publish(&config, &ids, draft),
    }
}
