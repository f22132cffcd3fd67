mod cli;
mod commands;
mod db;
mod logging;

use clap::Parser;
use services::{AppServices, Clock};
use tracing::info;

use cli::{Cli, Command};
use commands::{code, library, profile, quiz, run as runner};

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // Commands that never touch storage or the gateway.
    match &cli.command {
        Command::Detect { file } => return code::detect(file),
        Command::Template { language } => {
            code::template(*language);
            return Ok(());
        }
        _ => {}
    }

    let ai_config = cli.ai_config()?;
    let db_url = db::normalize_sqlite_url(&cli.db);
    db::prepare_sqlite_file(&db_url)?;
    info!(%db_url, ai = ai_config.is_some(), "opening services");
    let services = AppServices::new_sqlite(&db_url, Clock::default_clock(), ai_config).await?;

    match cli.command {
        Command::Quiz(args) => quiz::play(&services, args).await,
        Command::Run(args) => runner::play(&services, args).await,
        Command::Analyze(args) => code::analyze(&services, args).await,
        Command::Suggest(args) => code::suggest(&services, args).await,
        Command::Library(command) => library::run(&services, command).await,
        Command::Profile(command) => profile::run(&services, command).await,
        Command::Detect { .. } | Command::Template { .. } => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err:#}");
        std::process::exit(2);
    }
}
