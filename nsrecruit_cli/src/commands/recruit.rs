//! The `recruit` subcommand: confirm the run, then select and dispatch until Ctrl+C.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;
use nsrecruit_lib::{
    build_user_agent, seeded_rng, Classifier, Client, Dispatcher, EventFeed, Mode, Paced,
    RecruitConfig, RecruitSession, RecruitmentLoop, TargetSelector, TelegramStore,
    TelegramTemplate,
};

use crate::output::{print_run_report, print_summary, OutputFormat};

#[derive(Args)]
pub struct RecruitArgs {
    /// Telegram template to send (optional when exactly one is stored)
    #[arg(long)]
    pub telegram: Option<String>,

    /// Pick roughly this many nations per round instead of one at a time
    #[arg(long)]
    pub batch: Option<usize>,

    /// Start without asking for confirmation
    #[arg(long)]
    pub yes: bool,
}

fn pick_template(store: &TelegramStore, name: Option<&str>) -> Result<TelegramTemplate> {
    if let Some(name) = name {
        return Ok(store.load(name)?);
    }
    let mut templates = store.list()?;
    match templates.len() {
        0 => bail!(
            "no telegram templates in {}; create one with `nsrecruit telegram create`",
            store.dir().display()
        ),
        1 => Ok(templates.remove(0)),
        _ => bail!("several telegram templates are stored; pick one with --telegram"),
    }
}

fn confirm() -> Result<bool> {
    eprint!("Start recruiting? [y/N] ");
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

pub async fn run(
    args: &RecruitArgs,
    config_path: &Path,
    telegrams: &Path,
    format: &OutputFormat,
) -> Result<()> {
    let mut config = RecruitConfig::load(config_path)?;
    config.apply_env();
    config.require_credentials()?;

    let mode = match args.batch {
        Some(0) => bail!("--batch must be at least 1"),
        Some(n)
            if config.recruiting.allow_list.is_empty()
                && config.recruiting.ratio.batch_slots(n).is_empty() =>
        {
            bail!(
                "--batch {} is too small: no category gets a slot with the configured ratio",
                n
            )
        }
        Some(n) => Mode::Batch(n),
        None => Mode::Single,
    };

    let template = pick_template(&TelegramStore::new(telegrams), args.telegram.as_deref())?;
    let policy = config.rate_limit_policy()?;

    print_summary(&config, &template, mode);
    if !args.yes && !confirm()? {
        eprintln!("Cancelled.");
        return Ok(());
    }

    let client = Client::new(&build_user_agent(&config.client_name))?;
    let api = Arc::new(Paced::new(client, config.request_interval()));

    let selector = TargetSelector::new(
        EventFeed::new(Arc::clone(&api), config.feed_retry()),
        Classifier::new(Arc::clone(&api), config.recruiting.optimization)?,
        config.selector_settings(),
        seeded_rng(config.recruiting.seed),
    );
    let dispatcher = Dispatcher::new(Arc::clone(&api), &config.client_key, template, policy);
    let mut recruitment = RecruitmentLoop::new(selector, dispatcher, mode);

    let stop = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to wait for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    eprintln!("Recruiting. Press Ctrl+C to stop.");
    let mut session = RecruitSession::new();
    let counters = recruitment.run(&mut session, stop).await;

    let stats = api.stats().await;
    print_run_report(&counters, &stats, format);
    Ok(())
}
