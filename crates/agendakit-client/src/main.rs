//! agendakit CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use agendakit_core::{LogProfile, TracingConfig, init_tracing};

use agendakit_client::cli::{Cli, Command, ConfigAction};
use agendakit_client::commands;
use agendakit_client::config::ClientConfig;
use agendakit_client::error::ClientResult;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Config is loaded before tracing so config.debug can raise the level
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let debug = cli.debug || config.debug;
    let tracing_config = if matches!(cli.command, Some(Command::Serve)) {
        let daemon = TracingConfig::from(LogProfile::Daemon);
        if debug {
            daemon.with_level(Level::DEBUG)
        } else {
            daemon
        }
    } else if debug {
        TracingConfig::from(LogProfile::Verbose)
    } else {
        TracingConfig::from(LogProfile::Quiet)
    };

    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: failed to initialize logging: {}", e);
    }

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> ClientResult<ClientConfig> {
    match cli.config {
        Some(ref path) => ClientConfig::load_from(path),
        None => ClientConfig::load(),
    }
}

async fn run(mut cli: Cli, config: ClientConfig) -> ClientResult<()> {
    let command = cli.command.take();

    match command {
        Some(Command::Add {
            topic,
            owner,
            start,
            duration,
            notes,
        }) => commands::agenda::add(&cli, &config, topic, owner, start, duration, notes).await,
        // Bare invocation shows the agenda
        Some(Command::Show) | None => commands::agenda::show(&cli, &config).await,
        Some(Command::Example) => commands::agenda::example(&cli, &config).await,
        Some(Command::Clear) => commands::agenda::clear(&cli, &config).await,
        Some(Command::Meta {
            title,
            date,
            location,
            host,
        }) => commands::agenda::meta(&cli, &config, title, date, location, host).await,
        Some(Command::Export { format, output }) => {
            commands::agenda::export(&cli, &config, format, output).await
        }
        Some(Command::Status) => commands::server::status(&cli, &config).await,
        Some(Command::Serve) => commands::server::run(&cli, &config).await,
        Some(Command::Shutdown) => commands::server::shutdown(&cli, &config).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
    }
}
