use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};

use nba_uv::config::AppConfig;
use nba_uv::notify::notify;
use nba_uv::predict::predict_today;
use nba_uv::reconcile::{DateRange, SyncSummary, reconcile};
use nba_uv::schedule::us_game_date;
use nba_uv::store;
use nba_uv::teams::TeamDirectory;

fn main() -> Result<()> {
    let cfg = AppConfig::from_env();
    let teams = TeamDirectory::nba();

    // The store is the one collaborator the run cannot degrade without:
    // failing to open it aborts before any work starts.
    let mut conn = store::open(&cfg.db_path)
        .with_context(|| format!("prediction store unavailable at {}", cfg.db_path.display()))?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("predict") => {
            let run = predict_today(&cfg, &teams, &mut conn)?;
            println!("{}", run.report);
            println!(
                "[DONE] {} prediction(s) stored for {}",
                run.predictions.len(),
                run.date
            );
            notify(cfg.slack.as_ref(), &run.report);
        }
        Some("reconcile") => {
            let start = parse_date_arg(args.get(1))?.unwrap_or(cfg.sync_start);
            let end = parse_date_arg(args.get(2))?.unwrap_or_else(|| us_game_date(Utc::now()));
            if end < start {
                anyhow::bail!("reconcile range is empty ({start} .. {end})");
            }
            let summary = reconcile(&mut conn, &teams, DateRange { start, end })?;
            let report = reconcile_report(&summary, start, end);
            println!("{report}");
            notify(cfg.slack.as_ref(), &report);
        }
        Some(other) => {
            eprintln!("unknown command: {other}");
            eprintln!("usage: nba_uv [predict | reconcile [START [END]]]  (dates as YYYY-MM-DD)");
            std::process::exit(2);
        }
    }
    Ok(())
}

fn parse_date_arg(raw: Option<&String>) -> Result<Option<NaiveDate>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(Some)
        .with_context(|| format!("bad date argument {raw} (expected YYYY-MM-DD)"))
}

fn reconcile_report(summary: &SyncSummary, start: NaiveDate, end: NaiveDate) -> String {
    let mut out = format!("NBA prediction scorecard ({start} .. {end})\n");
    match summary.accuracy.percent() {
        Some(pct) => out.push_str(&format!(
            "accuracy: {pct:.1}% ({}/{})\n(postponed games excluded)\n",
            summary.accuracy.correct, summary.accuracy.graded
        )),
        None => out.push_str("no graded games yet\n"),
    }
    out.push_str(&format!(
        "{} prediction(s) updated across {} date(s)\n",
        summary.updated_count, summary.dates_checked
    ));
    if !summary.dates_skipped.is_empty() {
        let skipped: Vec<String> = summary.dates_skipped.iter().map(|d| d.to_string()).collect();
        out.push_str(&format!("skipped (feed unavailable): {}\n", skipped.join(", ")));
    }
    out
}
