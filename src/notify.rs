use anyhow::{Context, Result, anyhow};
use serde_json::json;

use crate::config::SlackConfig;
use crate::http_client::http_client;

const SLACK_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// One message per run. Delivery failure is reported and never retried;
/// predictions are already persisted by the time this runs.
pub fn notify(slack: Option<&SlackConfig>, text: &str) {
    let Some(slack) = slack else {
        println!("[INFO] slack not configured, skipping notification");
        return;
    };
    if let Err(err) = send_to_slack(slack, text) {
        eprintln!("[WARN] slack delivery failed: {err:#}");
    } else {
        println!("[INFO] slack report delivered");
    }
}

fn send_to_slack(slack: &SlackConfig, text: &str) -> Result<()> {
    let client = http_client()?;
    let body = if slack.test_mode {
        format!("[test] {text}")
    } else {
        text.to_string()
    };

    let resp = client
        .post(SLACK_POST_MESSAGE_URL)
        .bearer_auth(&slack.bot_token)
        .json(&json!({ "channel": slack.channel_id, "text": body }))
        .send()
        .context("slack request failed")?;

    let status = resp.status();
    let payload: serde_json::Value = resp.json().context("slack response was not json")?;
    let ok = payload.get("ok").and_then(|v| v.as_bool()).unwrap_or(false);
    if !status.is_success() || !ok {
        return Err(anyhow!("slack rejected message ({status}): {payload}"));
    }
    Ok(())
}
