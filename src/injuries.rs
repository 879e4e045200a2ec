use anyhow::{Context, Result};
use scraper::{Html, Selector};

use crate::http_client::http_client;
use crate::roster::{Availability, PlayerSeasonStat};

const INJURY_URL_BASE: &str = "https://www.espn.com/nba/team/injuries/_/name/";

/// Similarity floor (0-100) for treating an injury-report name as the same
/// player as an official roster name. Tolerates diacritic and spelling
/// drift between the two sources ("Jokic" vs "Jokić").
pub const OUT_MATCH_THRESHOLD: u32 = 80;

/// Names listed as Out on the team injury page. Best-effort: any failure
/// here must degrade to "everyone available", never sink the run, so the
/// caller is expected to `.unwrap_or_default()` the result.
pub fn fetch_out_names(team_slug: &str) -> Result<Vec<String>> {
    let client = http_client()?;
    let url = format!("{INJURY_URL_BASE}{team_slug}");
    let resp = client
        .get(&url)
        .header("User-Agent", "Mozilla/5.0")
        .send()
        .context("injury page request failed")?;
    let status = resp.status();
    let body = resp.text().context("injury page body failed")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("injury page http {status}"));
    }
    Ok(parse_injury_page(&body))
}

/// The injury table is one row per player; the name sits in an
/// Athlete__PlayerName span and the status ("Out", "Day-To-Day", ...)
/// appears elsewhere in the same row.
pub fn parse_injury_page(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let row_sel = Selector::parse("tr").expect("static selector");
    let name_sel = Selector::parse("span.Athlete__PlayerName").expect("static selector");

    let mut out = Vec::new();
    for row in doc.select(&row_sel) {
        let Some(name_el) = row.select(&name_sel).next() else {
            continue;
        };
        let name = name_el.text().collect::<String>().trim().to_string();
        if name.is_empty() {
            continue;
        }
        let row_text = row.text().collect::<Vec<_>>().join(" ").to_lowercase();
        if row_text.contains("out") {
            out.push(name);
        }
    }
    out
}

/// Case-insensitive partial similarity on a 0-100 scale: the shorter
/// string is slid across the longer one and the best windowed
/// Levenshtein similarity wins.
pub fn partial_ratio(a: &str, b: &str) -> u32 {
    let a: Vec<char> = a.trim().to_lowercase().chars().collect();
    let b: Vec<char> = b.trim().to_lowercase().chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return 0;
    }

    let needle: String = short.iter().collect();
    let mut best = 0.0f64;
    for start in 0..=(long.len() - short.len()) {
        let window: String = long[start..start + short.len()].iter().collect();
        let score = strsim::normalized_levenshtein(&needle, &window);
        if score > best {
            best = score;
        }
        if best >= 1.0 {
            break;
        }
    }
    (best * 100.0).round() as u32
}

/// Marks each official roster player Out on the first injury-report name
/// that clears the threshold; no best-match search across the list. An
/// empty out-list (or an unreachable feed upstream) leaves everyone OK.
pub fn resolve_availability(stats: &[PlayerSeasonStat], out_names: &[String]) -> Vec<Availability> {
    stats
        .iter()
        .map(|stat| {
            let is_out = out_names
                .iter()
                .any(|out_name| partial_ratio(out_name, &stat.name) >= OUT_MATCH_THRESHOLD);
            if is_out {
                Availability::Out
            } else {
                Availability::Ok
            }
        })
        .collect()
}
