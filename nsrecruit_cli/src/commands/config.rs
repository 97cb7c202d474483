//! The `config` subcommand: write a starter file or print the effective settings.

use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};
use nsrecruit_lib::RecruitConfig;

use crate::output::{print_config, OutputFormat};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write a default config file (never overwrites)
    Init,
    /// Show the effective configuration, with the client key redacted
    Show,
}

pub fn run(args: &ConfigArgs, path: &Path, format: &OutputFormat) -> Result<()> {
    match args.action {
        ConfigAction::Init => {
            RecruitConfig::init(path)?;
            eprintln!(
                "Wrote {}. Fill in client_key and client_name before recruiting.",
                path.display()
            );
        }
        ConfigAction::Show => {
            let mut config = RecruitConfig::load(path)?;
            config.apply_env();
            print_config(&config, format);
        }
    }
    Ok(())
}
