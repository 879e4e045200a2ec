use std::env;
use std::path::PathBuf;

use chrono::NaiveDate;

const DATA_DIR: &str = "nba_uv";
const DB_FILE: &str = "nba_uv.sqlite";
const DEFAULT_SEASON: &str = "2025-26";

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub bot_token: String,
    pub channel_id: String,
    /// TEST mode prefixes messages and posts to the test channel.
    pub test_mode: bool,
}

/// Everything tunable, read once at startup and passed explicitly. No
/// component reads the environment after this point.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub season: String,
    pub db_path: PathBuf,
    /// First date the reconcile walk covers when none is given.
    pub sync_start: NaiveDate,
    pub slack: Option<SlackConfig>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let season = env::var("NBA_UV_SEASON")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SEASON.to_string());

        let db_path = env::var("NBA_UV_DB_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .or_else(default_db_path)
            .unwrap_or_else(|| PathBuf::from(DB_FILE));

        let sync_start = env::var("NBA_UV_SYNC_START")
            .ok()
            .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok())
            .unwrap_or_else(default_sync_start);

        Self {
            season,
            db_path,
            sync_start,
            slack: slack_from_env(),
        }
    }
}

fn slack_from_env() -> Option<SlackConfig> {
    let bot_token = env::var("SLACK_BOT_TOKEN")
        .ok()
        .filter(|s| !s.trim().is_empty())?;
    let test_mode = !env::var("NBA_UV_MODE")
        .map(|m| m.trim().eq_ignore_ascii_case("real"))
        .unwrap_or(false);
    let channel_var = if test_mode {
        "SLACK_TEST_CHANNEL_ID"
    } else {
        "SLACK_REAL_CHANNEL_ID"
    };
    let channel_id = env::var(channel_var)
        .ok()
        .filter(|s| !s.trim().is_empty())?;
    Some(SlackConfig {
        bot_token,
        channel_id,
        test_mode,
    })
}

/// Season opening night; reconciling earlier dates can never find rows.
fn default_sync_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 21).expect("valid constant date")
}

fn default_db_path() -> Option<PathBuf> {
    // Prefer XDG cache, like the rest of our on-disk state.
    if let Ok(base) = env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(DATA_DIR).join(DB_FILE));
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(DATA_DIR).join(DB_FILE))
}
