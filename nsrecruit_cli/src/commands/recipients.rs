//! The `recipients` subcommand: edit the allow and block lists in place.

use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};
use nsrecruit_lib::RecruitConfig;

use crate::output::{print_recipients, OutputFormat};

#[derive(Args)]
pub struct RecipientsArgs {
    #[command(subcommand)]
    pub action: RecipientsAction,
}

#[derive(Subcommand)]
pub enum RecipientsAction {
    /// Always message this nation first (removes it from the block list)
    Allow { nation: String },
    /// Never message this nation (removes it from the allow list)
    Block { nation: String },
    /// Remove this nation from both lists
    Unlist { nation: String },
    /// Show both lists
    List,
}

pub fn run(args: &RecipientsArgs, path: &Path, format: &OutputFormat) -> Result<()> {
    let mut config = RecruitConfig::load(path)?;

    match &args.action {
        RecipientsAction::Allow { nation } => {
            let nation = config.allow(nation)?;
            config.save(path)?;
            tracing::info!("{} will be messaged", nation);
            eprintln!("{} will be messaged.", nation);
        }
        RecipientsAction::Block { nation } => {
            let nation = config.block(nation)?;
            config.save(path)?;
            tracing::info!("{} will not be messaged", nation);
            eprintln!("{} will not be messaged.", nation);
        }
        RecipientsAction::Unlist { nation } => {
            if config.unlist(nation)? {
                config.save(path)?;
                eprintln!("{} removed from both lists.", nation.trim());
            } else {
                eprintln!("{} was not on either list.", nation.trim());
            }
        }
        RecipientsAction::List => print_recipients(&config, format),
    }
    Ok(())
}
