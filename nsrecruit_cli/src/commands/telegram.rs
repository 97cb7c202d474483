//! The `telegram` subcommand: manage stored telegram templates.

use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};
use nsrecruit_lib::{TelegramKind, TelegramStore, TelegramTemplate};

use crate::output::{print_telegrams, OutputFormat};

#[derive(Args)]
pub struct TelegramArgs {
    #[command(subcommand)]
    pub action: TelegramAction,
}

#[derive(Subcommand)]
pub enum TelegramAction {
    /// Store a new telegram template
    Create {
        /// Name used to pick the template when recruiting
        name: String,

        /// Telegram ID from the game's telegram API page
        #[arg(long)]
        tgid: String,

        /// Secret key of the telegram
        #[arg(long)]
        secret_key: String,

        /// Mark as a non-recruitment telegram (30s cooldown instead of 180s)
        #[arg(long)]
        non_recruitment: bool,

        /// Replace an existing template with the same name
        #[arg(long)]
        force: bool,
    },
    /// List stored templates
    List,
    /// Show one template
    Show { name: String },
    /// Delete one template
    Delete { name: String },
}

pub fn run(args: &TelegramArgs, dir: &Path, format: &OutputFormat) -> Result<()> {
    let store = TelegramStore::new(dir);

    match &args.action {
        TelegramAction::Create {
            name,
            tgid,
            secret_key,
            non_recruitment,
            force,
        } => {
            let kind = if *non_recruitment {
                TelegramKind::NonRecruitment
            } else {
                TelegramKind::Recruitment
            };
            let template = TelegramTemplate::new(name, tgid, secret_key, kind);
            let path = store.save(&template, *force)?;
            eprintln!("Saved {} telegram {} to {}", kind, template.name, path.display());
        }
        TelegramAction::List => print_telegrams(&store.list()?, format),
        TelegramAction::Show { name } => {
            let template = store.load(name)?;
            print_telegrams(std::slice::from_ref(&template), format);
        }
        TelegramAction::Delete { name } => {
            store.delete(name)?;
            eprintln!("Deleted telegram {}", name.trim());
        }
    }
    Ok(())
}
