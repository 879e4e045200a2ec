use std::collections::HashMap;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::http_client::{get_stats_json, http_client};
use crate::result_sets::{f64_cell, find_result_set, str_cell};
use crate::roster::PlayerSeasonStat;
use crate::teams::TeamEntry;

const PLAYER_STATS_URL: &str = "https://stats.nba.com/stats/leaguedashplayerstats";
const TEAM_ROSTER_URL: &str = "https://stats.nba.com/stats/commonteamroster";

/// Rotation-player floor: below either threshold the season line is too
/// thin to value.
const MIN_GAMES_PLAYED: f64 = 3.0;
const MIN_MINUTES: f64 = 10.0;

/// Players with no roster-sheet position are slotted as forwards.
const DEFAULT_POSITION: &str = "F";

/// Per-game advanced season stats for one team, joined with the roster
/// sheet for positions and pre-filtered to rotation players.
pub fn get_team_stats(team: &TeamEntry, season: &str) -> Result<Vec<PlayerSeasonStat>> {
    let client = http_client()?;

    let stats_url = format!(
        "{PLAYER_STATS_URL}?Season={season}&TeamID={id}&MeasureType=Advanced&PerMode=PerGame\
         &SeasonType=Regular%20Season&LastNGames=0&Month=0&OpponentTeamID=0&PaceAdjust=N\
         &Period=0&PlusMinus=N&Rank=N",
        id = team.provider_id
    );
    let stats_payload =
        get_stats_json(client, &stats_url).context("player stats request failed")?;

    let roster_url = format!(
        "{TEAM_ROSTER_URL}?Season={season}&TeamID={id}",
        id = team.provider_id
    );
    let roster_payload =
        get_stats_json(client, &roster_url).context("team roster request failed")?;
    let positions = parse_roster_positions(&roster_payload)?;

    parse_team_stats(&stats_payload, &positions)
}

/// PLAYER -> POSITION off the CommonTeamRoster sheet.
pub fn parse_roster_positions(payload: &Value) -> Result<HashMap<String, String>> {
    let table =
        find_result_set(payload, "CommonTeamRoster").context("roster missing CommonTeamRoster")?;
    let player_col = table.column("PLAYER")?;
    let position_col = table.column("POSITION")?;

    let mut positions = HashMap::with_capacity(table.rows().len());
    for row in table.rows() {
        let Some(player) = str_cell(row, player_col) else {
            continue;
        };
        let position = str_cell(row, position_col).unwrap_or_default().trim();
        if !position.is_empty() {
            positions.insert(player.to_string(), position.to_string());
        }
    }
    Ok(positions)
}

pub fn parse_team_stats(
    payload: &Value,
    positions: &HashMap<String, String>,
) -> Result<Vec<PlayerSeasonStat>> {
    let table = find_result_set(payload, "LeagueDashPlayerStats")
        .context("stats missing LeagueDashPlayerStats")?;
    let name_col = table.column("PLAYER_NAME")?;
    let gp_col = table.column("GP")?;
    let min_col = table.column("MIN")?;
    let pie_col = table.column("PIE")?;
    let usg_col = table.column("USG_PCT")?;
    let ts_col = table.column("TS_PCT")?;

    let mut out = Vec::with_capacity(table.rows().len());
    for row in table.rows() {
        let Some(name) = str_cell(row, name_col) else {
            continue;
        };
        let gp = f64_cell(row, gp_col).unwrap_or(0.0);
        let minutes = f64_cell(row, min_col).unwrap_or(0.0);
        if gp < MIN_GAMES_PLAYED || minutes < MIN_MINUTES {
            continue;
        }
        out.push(PlayerSeasonStat {
            name: name.to_string(),
            position: positions
                .get(name)
                .cloned()
                .unwrap_or_else(|| DEFAULT_POSITION.to_string()),
            minutes,
            pie: f64_cell(row, pie_col).unwrap_or(0.0),
            usage: f64_cell(row, usg_col).unwrap_or(0.0),
            true_shooting: f64_cell(row, ts_col).unwrap_or(0.0),
        });
    }
    Ok(out)
}
