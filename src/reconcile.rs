use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;

use crate::http_client::fetch_with_retry;
use crate::schedule::{GameResult, WinningSide, get_games};
use crate::store::{self, GradedOutcome, Prediction};
use crate::teams::TeamDirectory;

/// Explicit join key between a stored prediction and the feed: the ordered
/// (visitor, home) pair under one date. No string mashing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchupKey {
    pub visitor: String,
    pub home: String,
}

#[derive(Debug, Clone, Copy)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(|d| *d <= self.end)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    pub updated_count: usize,
    pub dates_checked: usize,
    pub dates_skipped: Vec<NaiveDate>,
    pub accuracy: store::AccuracySummary,
}

/// One grading decision for one stored prediction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    ToPostponed,
    ToFinal { winner: String, correct: bool },
    StayPending,
}

/// The transition rule, evaluated against the feed entry for the
/// prediction's own date:
/// - a postponement marker wins unconditionally over any prior state;
/// - a finished game with both scores grades against the predicted winner;
/// - a matchup missing from the feed was moved off this date and is
///   treated the same as a cancellation (the two are indistinguishable
///   here);
/// - anything else (scheduled, live, or "finished" with a missing score)
///   stays pending with no write.
pub fn grade(
    prediction: &Prediction,
    game: Option<&GameResult>,
    teams: &TeamDirectory,
) -> Transition {
    let Some(game) = game else {
        return Transition::ToPostponed;
    };
    if game.is_postponed() {
        return Transition::ToPostponed;
    }
    if let Some(side) = game.final_side() {
        let winner_id = match side {
            WinningSide::Home => game.home_team_id,
            WinningSide::Visitor => game.visitor_team_id,
        };
        if let Some(winner) = teams.code_for_id(winner_id) {
            return Transition::ToFinal {
                winner: winner.to_string(),
                correct: winner == prediction.predicted_winner,
            };
        }
    }
    Transition::StayPending
}

/// Reconciles every stored prediction for one date against one fetched
/// feed snapshot, inside a single transaction. Re-running with the same
/// snapshot rewrites identical values: a no-op in effect.
pub fn reconcile_date(
    conn: &mut Connection,
    teams: &TeamDirectory,
    date: NaiveDate,
    games: &[GameResult],
) -> Result<usize> {
    let predictions = store::load_predictions_for_date(conn, date)?;
    if predictions.is_empty() {
        return Ok(0);
    }

    let by_matchup = index_by_matchup(teams, games);

    let tx = conn.transaction().context("begin reconcile transaction")?;
    let mut updated = 0usize;
    for prediction in &predictions {
        let key = MatchupKey {
            visitor: prediction.visit_team.clone(),
            home: prediction.home_team.clone(),
        };
        match grade(prediction, by_matchup.get(&key).copied(), teams) {
            Transition::ToPostponed => {
                store::apply_outcome(
                    &tx,
                    date,
                    &prediction.home_team,
                    &prediction.visit_team,
                    &GradedOutcome::Postponed,
                )?;
                updated += 1;
            }
            Transition::ToFinal { winner, correct } => {
                store::apply_outcome(
                    &tx,
                    date,
                    &prediction.home_team,
                    &prediction.visit_team,
                    &GradedOutcome::Final { winner, correct },
                )?;
                updated += 1;
            }
            Transition::StayPending => {}
        }
    }
    tx.commit().context("commit reconcile transaction")?;
    Ok(updated)
}

/// Walks the range one date per pass: fetch that date's feed once, grade
/// its predictions, commit, advance. A feed failure skips that date and
/// the walk continues; the whole range is safe to re-run at any time.
pub fn reconcile(
    conn: &mut Connection,
    teams: &TeamDirectory,
    range: DateRange,
) -> Result<SyncSummary> {
    let mut summary = SyncSummary::default();

    for date in range.days() {
        let pending = store::load_predictions_for_date(conn, date)?;
        if pending.is_empty() {
            continue;
        }
        summary.dates_checked += 1;

        let games = match fetch_with_retry(&format!("scoreboard {date}"), || get_games(date)) {
            Ok(games) => games,
            Err(err) => {
                eprintln!("[WARN] skipping {date}: {err:#}");
                summary.dates_skipped.push(date);
                continue;
            }
        };

        let updated = reconcile_date(conn, teams, date, &games)?;
        println!("[SYNC] {date}: {} prediction(s) updated", updated);
        summary.updated_count += updated;
    }

    summary.accuracy = store::accuracy(conn)?;
    Ok(summary)
}

fn index_by_matchup<'a>(
    teams: &TeamDirectory,
    games: &'a [GameResult],
) -> HashMap<MatchupKey, &'a GameResult> {
    let mut map = HashMap::with_capacity(games.len());
    for game in games {
        let (Some(home), Some(visitor)) = (
            teams.code_for_id(game.home_team_id),
            teams.code_for_id(game.visitor_team_id),
        ) else {
            continue;
        };
        map.insert(
            MatchupKey {
                visitor: visitor.to_string(),
                home: home.to_string(),
            },
            game,
        );
    }
    map
}
