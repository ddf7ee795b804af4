pub mod commands;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use registrar_client::CompaniesQuery;
use registrar_core::config::{AppConfig, LoadOptions, LogFormat};
use registrar_core::ApplicationError;
use tracing::Level;

use crate::commands::register::RegisterArgs;
use crate::commands::CommandResult;

#[derive(Debug, Parser)]
#[command(
    name = "registrar",
    about = "Company registration CLI",
    long_about = "Validate and submit company registrations, and manage the stored API session.",
    after_help = "Examples:\n  registrar validate --form company.toml\n  registrar register --form company.toml --document license.pdf --accept-terms\n  registrar status"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Config file (defaults to registrar.toml or config/registrar.toml)")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run the four-step registration wizard over a form file and submit it")]
    Register {
        #[arg(long, help = "TOML form file with [company], [company.address] and [user] tables")]
        form: PathBuf,
        #[arg(long = "document", help = "Supporting document to upload (repeatable)")]
        documents: Vec<PathBuf>,
        #[arg(long, help = "Accept the terms and conditions")]
        accept_terms: bool,
    },
    #[command(about = "Validate a form file offline and report every field error")]
    Validate {
        #[arg(long)]
        form: PathBuf,
        #[arg(long = "document", help = "Document to include in the review summary (repeatable)")]
        documents: Vec<PathBuf>,
    },
    #[command(about = "Log in and store the session token")]
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "REGISTRAR_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    #[command(about = "Fetch the profile of the logged-in user")]
    Profile,
    #[command(about = "Clear the stored session")]
    Logout,
    #[command(about = "Show whether the stored session selects the dashboard or registration view")]
    Status,
    #[command(about = "List registered companies")]
    Companies {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long)]
        search: Option<String>,
    },
    #[command(about = "Check API health")]
    Health,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::Validate { .. } => "validate",
            Self::Login { .. } => "login",
            Self::Profile => "profile",
            Self::Logout => "logout",
            Self::Status => "status",
            Self::Companies { .. } => "companies",
            Self::Health => "health",
            Self::Config => "config",
        }
    }
}

pub fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let result = execute(cli);

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", result.output).context("failed to write command output")?;
    Ok(ExitCode::from(result.exit_code))
}

fn execute(cli: Cli) -> CommandResult {
    let Cli { config: config_path, command } = cli;

    let options = LoadOptions {
        config_path: config_path.clone(),
        require_file: config_path.is_some(),
        ..LoadOptions::default()
    };
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::from_error(command.name(), &ApplicationError::from(error));
        }
    };
    init_logging(&config);

    match command {
        Command::Register { form, documents, accept_terms } => {
            let args = RegisterArgs { form, documents, accept_terms };
            commands::block_on("register", commands::register::run(&config, &args))
        }
        Command::Validate { form, documents } => commands::validate::run(&form, &documents),
        Command::Login { email, password } => commands::block_on(
            "login",
            commands::login::run(&config, &email, password.as_deref()),
        ),
        Command::Profile => commands::block_on("profile", commands::profile::run(&config)),
        Command::Logout => commands::logout::run(&config),
        Command::Status => commands::status::run(&config),
        Command::Companies { page, limit, search } => {
            let query = CompaniesQuery { page, limit, search };
            commands::block_on("companies", commands::companies::run(&config, &query))
        }
        Command::Health => commands::block_on("health", commands::health::run(&config)),
        Command::Config => commands::config::run(&config, config_path.as_deref()),
    }
}

/// Logs go to stderr so stdout carries only the JSON result line.
pub fn init_logging(config: &AppConfig) {
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder =
        tracing_subscriber::fmt().with_target(false).with_max_level(log_level).with_writer(io::stderr);

    let installed = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_err() {
        tracing::debug!(event_name = "cli.logging_already_initialized", "subscriber already set");
    }
}
