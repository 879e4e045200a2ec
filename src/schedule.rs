use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::Value;

use crate::http_client::{get_stats_json, http_client};
use crate::result_sets::{f64_cell, find_result_set, i64_cell, str_cell, u64_cell};

const SCOREBOARD_URL: &str = "https://stats.nba.com/stats/scoreboardv2";

/// Scheduled-game status id used by the provider: 1 scheduled, 2 live,
/// 3 final.
const STATUS_FINAL: i64 = 3;

/// One matchup as the results feed reports it for a given date. Scores are
/// only present once the line score rows have landed.
#[derive(Debug, Clone)]
pub struct GameResult {
    pub game_id: String,
    pub home_team_id: u64,
    pub visitor_team_id: u64,
    pub status_id: i64,
    pub status_text: String,
    pub home_score: Option<i64>,
    pub visitor_score: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinningSide {
    Home,
    Visitor,
}

impl GameResult {
    /// "7:30 pm ET - PPD" and friends; the marker can appear anywhere in
    /// the status text.
    pub fn is_postponed(&self) -> bool {
        let status = self.status_text.to_uppercase();
        status.contains("PPD") || status.contains("POSTPONED")
    }

    pub fn is_finished(&self) -> bool {
        self.status_id == STATUS_FINAL || self.status_text.to_uppercase().contains("FINAL")
    }

    /// The winning side of a finished game, None while in progress or when
    /// the feed claims finished but a score is missing (never guess).
    pub fn final_side(&self) -> Option<WinningSide> {
        if !self.is_finished() || self.is_postponed() {
            return None;
        }
        let (home, visitor) = (self.home_score?, self.visitor_score?);
        if home > visitor {
            Some(WinningSide::Home)
        } else {
            Some(WinningSide::Visitor)
        }
    }
}

/// The provider's scoreboard dates roll over on US Eastern time; derive the
/// authoritative game date from UTC rather than the observer's local date.
pub fn us_game_date(now: DateTime<Utc>) -> NaiveDate {
    (now - Duration::hours(5)).date_naive()
}

/// All games the feed lists for one date. One call per date per sync pass.
pub fn get_games(date: NaiveDate) -> Result<Vec<GameResult>> {
    let client = http_client()?;
    let url = format!(
        "{SCOREBOARD_URL}?GameDate={}&LeagueID=00&DayOffset=0",
        date.format("%Y-%m-%d")
    );
    let payload = get_stats_json(client, &url).context("scoreboard request failed")?;
    parse_scoreboard(&payload)
}

/// Joins the GameHeader table (matchup + status) with the LineScore table
/// (per-team points) on game id.
pub fn parse_scoreboard(payload: &Value) -> Result<Vec<GameResult>> {
    let header = find_result_set(payload, "GameHeader").context("scoreboard missing GameHeader")?;
    let game_id_col = header.column("GAME_ID")?;
    let status_id_col = header.column("GAME_STATUS_ID")?;
    let status_text_col = header.column("GAME_STATUS_TEXT")?;
    let home_col = header.column("HOME_TEAM_ID")?;
    let visitor_col = header.column("VISITOR_TEAM_ID")?;

    // (game_id, team_id) -> points. The line score table is absent or
    // partial before games tip off; missing entries stay None.
    let mut points: HashMap<(String, u64), i64> = HashMap::new();
    if let Ok(lines) = find_result_set(payload, "LineScore") {
        let line_game_col = lines.column("GAME_ID")?;
        let line_team_col = lines.column("TEAM_ID")?;
        let pts_col = lines.column("PTS")?;
        for row in lines.rows() {
            let Some(game_id) = str_cell(row, line_game_col) else {
                continue;
            };
            let Some(team_id) = u64_cell(row, line_team_col) else {
                continue;
            };
            // PTS arrives as a float for some season types.
            let Some(pts) = i64_cell(row, pts_col).or_else(|| f64_cell(row, pts_col).map(|p| p as i64))
            else {
                continue;
            };
            points.insert((game_id.to_string(), team_id), pts);
        }
    }

    let mut out = Vec::with_capacity(header.rows().len());
    for row in header.rows() {
        let Some(game_id) = str_cell(row, game_id_col) else {
            continue;
        };
        let Some(home_team_id) = u64_cell(row, home_col) else {
            continue;
        };
        let Some(visitor_team_id) = u64_cell(row, visitor_col) else {
            continue;
        };
        let status_id = i64_cell(row, status_id_col).unwrap_or(0);
        let status_text = str_cell(row, status_text_col).unwrap_or_default().to_string();

        out.push(GameResult {
            game_id: game_id.to_string(),
            home_team_id,
            visitor_team_id,
            status_id,
            status_text,
            home_score: points.get(&(game_id.to_string(), home_team_id)).copied(),
            visitor_score: points.get(&(game_id.to_string(), visitor_team_id)).copied(),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn scoreboard_fixture() -> Value {
        serde_json::from_str(
            r#"{
            "resultSets": [
                {
                    "name": "GameHeader",
                    "headers": ["GAME_ID", "GAME_STATUS_ID", "GAME_STATUS_TEXT", "HOME_TEAM_ID", "VISITOR_TEAM_ID"],
                    "rowSet": [
                        ["0022500101", 3, "Final", 1610612747, 1610612743],
                        ["0022500102", 1, "7:30 pm ET - PPD", 1610612744, 1610612738],
                        ["0022500103", 2, "Q3 4:12", 1610612752, 1610612760],
                        ["0022500104", 3, "Final", 1610612756, 1610612742]
                    ]
                },
                {
                    "name": "LineScore",
                    "headers": ["GAME_ID", "TEAM_ID", "PTS"],
                    "rowSet": [
                        ["0022500101", 1610612747, 110],
                        ["0022500101", 1610612743, 100],
                        ["0022500103", 1610612752, 61],
                        ["0022500103", 1610612760, 66],
                        ["0022500104", 1610612756, 99]
                    ]
                }
            ]
        }"#,
        )
        .expect("valid fixture")
    }

    #[test]
    fn parses_headers_joined_with_line_scores() {
        let games = parse_scoreboard(&scoreboard_fixture()).unwrap();
        assert_eq!(games.len(), 4);

        let final_game = &games[0];
        assert_eq!(final_game.home_score, Some(110));
        assert_eq!(final_game.visitor_score, Some(100));
        assert_eq!(final_game.final_side(), Some(WinningSide::Home));
    }

    #[test]
    fn postponed_marker_is_detected_anywhere_in_status() {
        let games = parse_scoreboard(&scoreboard_fixture()).unwrap();
        assert!(games[1].is_postponed());
        assert!(games[1].final_side().is_none());
    }

    #[test]
    fn live_games_have_no_final_side() {
        let games = parse_scoreboard(&scoreboard_fixture()).unwrap();
        assert!(!games[2].is_finished());
        assert!(games[2].final_side().is_none());
    }

    #[test]
    fn finished_without_both_scores_is_not_graded() {
        // Game 104 is Final but the visitor line score row is missing:
        // ambiguous, so no winner is derived.
        let games = parse_scoreboard(&scoreboard_fixture()).unwrap();
        assert!(games[3].is_finished());
        assert_eq!(games[3].home_score, Some(99));
        assert_eq!(games[3].visitor_score, None);
        assert!(games[3].final_side().is_none());
    }

    #[test]
    fn game_date_rolls_over_on_eastern_time() {
        // 03:00 UTC is still the previous day's slate on the US east coast.
        let late_night = Utc.with_ymd_and_hms(2026, 1, 20, 3, 0, 0).unwrap();
        assert_eq!(us_game_date(late_night), NaiveDate::from_ymd_opt(2026, 1, 19).unwrap());

        let afternoon = Utc.with_ymd_and_hms(2026, 1, 20, 20, 0, 0).unwrap();
        assert_eq!(us_game_date(afternoon), NaiveDate::from_ymd_opt(2026, 1, 20).unwrap());
    }
}
