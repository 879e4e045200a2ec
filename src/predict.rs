use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::http_client::fetch_with_retry;
use crate::injuries::{fetch_out_names, resolve_availability};
use crate::player_stats::get_team_stats;
use crate::power::{TeamPowerScore, team_power};
use crate::roster::{RosterSlot, TeamRoster};
use crate::schedule::{GameResult, get_games, us_game_date};
use crate::store::{self, Prediction};
use crate::teams::{TeamDirectory, TeamEntry};

/// Winner and absolute margin for one game context.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchupForecast {
    pub winner: String,
    pub gap: f64,
}

/// The visitor must beat the home score strictly; an exact tie predicts
/// the home side. Kept for behavioral compatibility with the historical
/// grading record.
pub fn predict_matchup(
    home_team: &str,
    home: &TeamPowerScore,
    visit_team: &str,
    visitor: &TeamPowerScore,
) -> MatchupForecast {
    let winner = if visitor.final_score > home.final_score {
        visit_team
    } else {
        home_team
    };
    MatchupForecast {
        winner: winner.to_string(),
        gap: (home.final_score - visitor.final_score).abs(),
    }
}

/// Everything one daily run produced: the persisted predictions, the
/// formatted report for the notification sink, and the games that had to
/// be skipped.
#[derive(Debug, Clone)]
pub struct DailyRun {
    pub date: NaiveDate,
    pub predictions: Vec<Prediction>,
    pub report: String,
    pub skipped: Vec<String>,
}

/// Scores every game on today's US-Eastern slate and persists one
/// prediction per game. The run replaces any predictions already stored
/// for the date, so re-running it is safe. Per-game failures skip that
/// game and the slate continues.
pub fn predict_today(
    cfg: &AppConfig,
    teams: &TeamDirectory,
    conn: &mut Connection,
) -> Result<DailyRun> {
    let date = us_game_date(Utc::now());
    println!("[PREDICT] target date (US): {date}");

    store::clear_date(conn, date).context("clear existing predictions")?;

    let games = match fetch_with_retry("scoreboard", || get_games(date)) {
        Ok(games) => games,
        Err(err) => {
            eprintln!("[WARN] schedule feed unavailable, nothing to predict: {err:#}");
            return Ok(DailyRun {
                date,
                predictions: Vec::new(),
                report: format!("NBA unit-value report ({date})\nschedule feed unavailable\n"),
                skipped: vec!["schedule".to_string()],
            });
        }
    };

    let mut run = DailyRun {
        date,
        predictions: Vec::new(),
        report: format!("NBA unit-value report ({date} US)\n================================\n"),
        skipped: Vec::new(),
    };

    if games.is_empty() {
        run.report.push_str("no games scheduled\n");
        return Ok(run);
    }

    for game in &games {
        let (Some(home_entry), Some(visit_entry)) = (
            teams.entry_for_id(game.home_team_id),
            teams.entry_for_id(game.visitor_team_id),
        ) else {
            eprintln!(
                "[WARN] unknown team id in game {} ({} vs {}), skipping",
                game.game_id, game.visitor_team_id, game.home_team_id
            );
            run.skipped.push(game.game_id.clone());
            continue;
        };
        let (home_code, visit_code) = (home_entry.code, visit_entry.code);
        println!("[PREDICT] {visit_code} (visitor) vs {home_code} (home)");

        let (home_roster, visit_roster) =
            match (build_roster(cfg, home_entry), build_roster(cfg, visit_entry)) {
                (Ok(h), Ok(v)) => (h, v),
                (home, visit) => {
                    for err in [home.err(), visit.err()].into_iter().flatten() {
                        eprintln!("[WARN] {visit_code} vs {home_code}: {err:#}");
                    }
                    run.skipped.push(game.game_id.clone());
                    continue;
                }
            };

        let home_power = team_power(&home_roster, true);
        let visit_power = team_power(&visit_roster, false);
        let forecast = predict_matchup(home_code, &home_power, visit_code, &visit_power);

        let prediction = Prediction {
            game_id: game.game_id.clone(),
            date,
            home_team: home_code.to_string(),
            visit_team: visit_code.to_string(),
            predicted_winner: forecast.winner.clone(),
            predicted_gap: forecast.gap,
            outcome: None,
        };
        store::upsert_prediction(conn, &prediction).context("persist prediction")?;
        store::save_daily_stats(conn, date, &home_roster).context("persist home stats")?;
        store::save_daily_stats(conn, date, &visit_roster).context("persist visitor stats")?;

        append_game_report(&mut run.report, game, &home_roster, &home_power, &visit_roster, &visit_power, &forecast);
        run.predictions.push(prediction);
    }

    if !run.skipped.is_empty() {
        run.report
            .push_str(&format!("skipped games: {}\n", run.skipped.join(", ")));
    }
    Ok(run)
}

/// Stats are mandatory (retried, then the game is skipped); the injury
/// feed is best-effort and an unreachable page simply leaves every player
/// available.
fn build_roster(cfg: &AppConfig, team: &TeamEntry) -> Result<TeamRoster> {
    let stats = fetch_with_retry(&format!("stats {}", team.code), || {
        get_team_stats(team, &cfg.season)
    })?;
    if stats.is_empty() {
        return Err(anyhow::anyhow!("{}: provider returned no rotation players", team.code));
    }

    let out_names = fetch_out_names(team.injury_slug).unwrap_or_else(|err| {
        eprintln!("[WARN] injury feed for {} unavailable ({err:#}), assuming all OK", team.code);
        Vec::new()
    });

    let availability = resolve_availability(&stats, &out_names);
    let slots = stats
        .into_iter()
        .zip(availability)
        .map(|(stat, availability)| RosterSlot { stat, availability })
        .collect();
    Ok(TeamRoster::new(team.code, slots))
}

fn append_game_report(
    report: &mut String,
    game: &GameResult,
    home_roster: &TeamRoster,
    home_power: &TeamPowerScore,
    visit_roster: &TeamRoster,
    visit_power: &TeamPowerScore,
    forecast: &MatchupForecast,
) {
    let home = &home_roster.team;
    let visit = &visit_roster.team;
    report.push_str(&format!("\n[{visit}] at [{home}]  (game {})\n", game.game_id));
    report.push_str(&format!(
        "  {home}: {:.3}  =  {}\n",
        home_power.final_score, home_power.detail
    ));
    report.push_str(&format!(
        "  {visit}: {:.3}  =  {}\n",
        visit_power.final_score, visit_power.detail
    ));

    for (team, roster) in [(home, home_roster), (visit, visit_roster)] {
        let out = roster.out_names();
        if !out.is_empty() {
            report.push_str(&format!("  {team} out: {}\n", out.join(", ")));
        }
    }

    report.push_str(&format!(
        "  pick: {} (gap +{:.2})\n--------------------------------\n",
        forecast.winner, forecast.gap
    ));
}
