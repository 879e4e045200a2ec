use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// The upstream stats host is intermittently slow; every provider call goes
/// through the same fixed-attempt, fixed-delay policy.
const FETCH_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(3);

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

/// Runs `call` up to FETCH_ATTEMPTS times with a fixed pause in between.
/// An exhausted Err means the caller should skip that unit of work, not
/// abort the batch.
pub fn fetch_with_retry<T>(what: &str, mut call: impl FnMut() -> Result<T>) -> Result<T> {
    let mut last_err = None;
    for attempt in 1..=FETCH_ATTEMPTS {
        match call() {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt < FETCH_ATTEMPTS {
                    eprintln!("[WARN] {what}: attempt {attempt}/{FETCH_ATTEMPTS} failed: {err:#}");
                    thread::sleep(RETRY_DELAY);
                }
                last_err = Some(err);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("{what}: failed with no attempts")))
        .with_context(|| format!("{what}: giving up after {FETCH_ATTEMPTS} attempts"))
}

/// GET against the stats provider with the header set it insists on, parsed
/// as JSON. The host rejects bare clients, hence the browser-ish headers.
pub fn get_stats_json(client: &Client, url: &str) -> Result<serde_json::Value> {
    let resp = client
        .get(url)
        .header("User-Agent", "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)")
        .header("Accept", "application/json")
        .header("Referer", "https://www.nba.com/")
        .header("Origin", "https://www.nba.com")
        .header("x-nba-stats-origin", "stats")
        .header("x-nba-stats-token", "true")
        .send()
        .context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!(
            "http {status}: {}",
            body.chars().take(200).collect::<String>()
        ));
    }
    serde_json::from_str(body.trim()).context("invalid provider json")
}
