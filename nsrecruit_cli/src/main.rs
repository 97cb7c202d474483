mod commands;
mod output;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "nsrecruit")]
#[command(about = "Recruit newly founded NationStates nations by telegram")]
struct Cli {
    /// Output format: table or json
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// Path to the YAML config file
    #[arg(long, default_value = "config.yml", global = true)]
    config: PathBuf,

    /// Directory holding telegram templates
    #[arg(long, default_value = "telegrams", global = true)]
    telegrams: PathBuf,

    /// Append logs to this file instead of writing them to stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or inspect the config file
    Config(commands::config::ConfigArgs),
    /// Manage the allow and block lists
    Recipients(commands::recipients::RecipientsArgs),
    /// Manage telegram templates
    Telegram(commands::telegram::TelegramArgs),
    /// Start recruiting until interrupted
    Recruit(commands::recruit::RecruitArgs),
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter =
        tracing_subscriber::EnvFilter::from_default_env().add_directive("nsrecruit=info".parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Table,
    };

    match &cli.command {
        Commands::Config(args) => commands::config::run(args, &cli.config, &format)?,
        Commands::Recipients(args) => commands::recipients::run(args, &cli.config, &format)?,
        Commands::Telegram(args) => commands::telegram::run(args, &cli.telegrams, &format)?,
        Commands::Recruit(args) => {
            commands::recruit::run(args, &cli.config, &cli.telegrams, &format).await?
        }
    }

    Ok(())
}
