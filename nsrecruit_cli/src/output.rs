use nsrecruit_lib::{
    Mode, PacerStats, RecruitConfig, RunCounters, TelegramTemplate,
};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Tabled, Serialize, Debug, PartialEq)]
struct SettingRow {
    #[tabled(rename = "Setting")]
    #[serde(rename = "Setting")]
    setting: String,
    #[tabled(rename = "Value")]
    #[serde(rename = "Value")]
    value: String,
}

#[derive(Tabled, Serialize, Debug, PartialEq)]
struct RecipientRow {
    #[tabled(rename = "Nation")]
    #[serde(rename = "Nation")]
    nation: String,
    #[tabled(rename = "List")]
    #[serde(rename = "List")]
    list: String,
}

#[derive(Tabled, Serialize, Debug, PartialEq)]
struct TelegramRow {
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Telegram ID")]
    #[serde(rename = "Telegram ID")]
    tgid: String,
    #[tabled(rename = "Type")]
    #[serde(rename = "Type")]
    kind: String,
}

/// End-of-run numbers, shaped for JSON output.
#[derive(Serialize, Debug)]
struct RunReport {
    found: u64,
    sent: u64,
    failed: u64,
    throttled: u64,
    rejected: u64,
    api_requests: u64,
    api_throttled: u64,
    api_failed: u64,
    paced_secs: f64,
}

fn redact(key: &str) -> String {
    let key = key.trim();
    if key.chars().count() <= 4 {
        return "****".to_string();
    }
    let tail: String = key.chars().skip(key.chars().count() - 4).collect();
    format!("****{}", tail)
}

fn percent(weight: f64) -> String {
    format!("{:.0}%", weight * 100.0)
}

fn setting(setting: &str, value: impl ToString) -> SettingRow {
    SettingRow {
        setting: setting.to_string(),
        value: value.to_string(),
    }
}

fn build_config_rows(config: &RecruitConfig) -> Vec<SettingRow> {
    let r = &config.recruiting;
    let l = &config.limits;
    vec![
        setting("client_key", redact(&config.client_key)),
        setting("client_name", &config.client_name),
        setting("allow_list", r.allow_list.join(", ")),
        setting("block_list", r.block_list.join(", ")),
        setting("optimization", r.optimization),
        setting("filter_batches", r.filter_batches),
        setting("ratio.found", percent(r.ratio.found)),
        setting("ratio.refound", percent(r.ratio.refound)),
        setting("ratio.ejected", percent(r.ratio.ejected)),
        setting(
            "seed",
            r.seed.map(|s| s.to_string()).unwrap_or_else(|| "random".into()),
        ),
        setting("feed_retry_max", l.feed_retry_max),
        setting("feed_cooldown_secs", l.feed_cooldown_secs),
        setting("empty_round_max", l.empty_round_max),
        setting("empty_round_backoff_secs", l.empty_round_backoff_secs),
        setting("empty_round_backoff_max_secs", l.empty_round_backoff_max_secs),
        setting("recruitment_delay_secs", l.recruitment_delay_secs),
        setting("non_recruitment_delay_secs", l.non_recruitment_delay_secs),
        setting("request_interval_ms", l.request_interval_ms),
    ]
}

fn build_recipient_rows(config: &RecruitConfig) -> Vec<RecipientRow> {
    let allowed = config.recruiting.allow_list.iter().map(|n| RecipientRow {
        nation: n.clone(),
        list: "allow".into(),
    });
    let blocked = config.recruiting.block_list.iter().map(|n| RecipientRow {
        nation: n.clone(),
        list: "block".into(),
    });
    allowed.chain(blocked).collect()
}

fn build_telegram_rows(templates: &[TelegramTemplate]) -> Vec<TelegramRow> {
    templates
        .iter()
        .map(|t| TelegramRow {
            name: t.name.clone(),
            tgid: t.tgid.clone(),
            kind: t.kind.to_string(),
        })
        .collect()
}

fn build_run_report(counters: &RunCounters, stats: &PacerStats) -> RunReport {
    RunReport {
        found: counters.found,
        sent: counters.sent,
        failed: counters.failed,
        throttled: counters.throttled,
        rejected: counters.rejected,
        api_requests: stats.requests,
        api_throttled: stats.throttled,
        api_failed: stats.failed,
        paced_secs: stats.held.as_secs_f64(),
    }
}

fn print_rows<T: Tabled + Serialize>(rows: Vec<T>, format: &OutputFormat) {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{}", table);
        }
        OutputFormat::Json => print_json(&rows),
    }
}

pub fn print_config(config: &RecruitConfig, format: &OutputFormat) {
    print_rows(build_config_rows(config), format);
}

pub fn print_recipients(config: &RecruitConfig, format: &OutputFormat) {
    print_rows(build_recipient_rows(config), format);
}

pub fn print_telegrams(templates: &[TelegramTemplate], format: &OutputFormat) {
    print_rows(build_telegram_rows(templates), format);
}

/// Pre-flight summary shown before a run; always on stderr.
pub fn print_summary(config: &RecruitConfig, template: &TelegramTemplate, mode: Mode) {
    let r = &config.recruiting;
    eprintln!("Operator:      {}", config.client_name);
    eprintln!("Telegram:      {} ({}, id {})", template.name, template.kind, template.tgid);
    match mode {
        Mode::Single => eprintln!("Mode:          one nation at a time"),
        Mode::Batch(n) => eprintln!("Mode:          batches of about {}", n),
    }
    for (label, weight) in [
        ("Founding", r.ratio.found),
        ("Refounding", r.ratio.refound),
        ("Ejected", r.ratio.ejected),
    ] {
        if weight > 0.0 {
            eprintln!("{:<14} messaged with {} probability", label, percent(weight));
        }
    }
    for nation in &r.allow_list {
        eprintln!("Allow listed:  {}", nation);
    }
    for nation in &r.block_list {
        eprintln!("Blocked:       {}", nation);
    }
    if r.optimization {
        eprintln!("Optimization:  puppets and ineligible nations are skipped");
    } else {
        eprintln!("Optimization:  off, every nation is messaged");
    }
}

pub fn print_run_report(counters: &RunCounters, stats: &PacerStats, format: &OutputFormat) {
    match format {
        OutputFormat::Table => {
            println!("Recruitment {}.", counters);
            println!(
                "API requests: {} made, {} rate limited, {} failed, {:.1}s paced",
                stats.requests,
                stats.throttled,
                stats.failed,
                stats.held.as_secs_f64()
            );
        }
        OutputFormat::Json => print_json(&build_run_report(counters, stats)),
    }
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsrecruit_lib::TelegramKind;
    use std::time::Duration;

    #[test]
    fn redact_keeps_only_the_tail() {
        assert_eq!(redact("abcdef123456"), "****3456");
        assert_eq!(redact("abc"), "****");
    }

    #[test]
    fn config_rows_hide_the_client_key() {
        let mut config = RecruitConfig::default();
        config.client_key = "supersecretkey".into();
        let rows = build_config_rows(&config);
        assert_eq!(rows[0], setting("client_key", "****tkey"));
        assert!(rows.iter().all(|r| !r.value.contains("supersecret")));
        assert!(rows.contains(&setting("ratio.found", "80%")));
        assert!(rows.contains(&setting("seed", "random")));
    }

    #[test]
    fn recipient_rows_list_allow_then_block() {
        let mut config = RecruitConfig::default();
        config.allow("Foo").unwrap();
        config.block("Bar").unwrap();
        let rows = build_recipient_rows(&config);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].nation, "Foo");
        assert_eq!(rows[0].list, "allow");
        assert_eq!(rows[1].list, "block");
    }

    #[test]
    fn telegram_rows_omit_the_secret() {
        let t = TelegramTemplate::new("drive", "123", "topsecret", TelegramKind::NonRecruitment);
        let rows = build_telegram_rows(&[t]);
        assert_eq!(rows[0].kind, "Non-Recruitment");
        let json = serde_json::to_string(&rows).unwrap();
        assert!(!json.contains("topsecret"));
        assert!(json.contains("\"Telegram ID\":\"123\""));
    }

    #[test]
    fn run_report_merges_counters_and_pacer_stats() {
        let counters = RunCounters {
            found: 3,
            sent: 2,
            failed: 1,
            throttled: 0,
            rejected: 4,
        };
        let stats = PacerStats {
            requests: 9,
            throttled: 0,
            failed: 1,
            held: Duration::from_millis(1500),
        };
        let report = build_run_report(&counters, &stats);
        assert_eq!(report.sent, 2);
        assert_eq!(report.api_requests, 9);
        assert_eq!(report.paced_secs, 1.5);
    }
}
