use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, params};

use crate::roster::TeamRoster;

/// Stored marker for a game that was postponed or vanished from its date.
pub const POSTPONED_MARKER: &str = "Postponed";

/// Terminal grade of a prediction. `correct` exists only alongside a real
/// winner, never for a postponed game, which keeps the table invariant
/// (is_correct non-null iff actual_winner is a team code) by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GradedOutcome {
    Final { winner: String, correct: bool },
    Postponed,
}

/// The durable entity of record, one row per game per date.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub game_id: String,
    pub date: NaiveDate,
    pub home_team: String,
    pub visit_team: String,
    pub predicted_winner: String,
    pub predicted_gap: f64,
    pub outcome: Option<GradedOutcome>,
}

pub fn open(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn = Connection::open(path)
        .with_context(|| format!("open prediction store {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("open in-memory store")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS predictions (
            game_id TEXT NOT NULL,
            date TEXT NOT NULL,
            home_team TEXT NOT NULL,
            visit_team TEXT NOT NULL,
            predicted_winner TEXT NOT NULL,
            predicted_gap REAL NOT NULL,
            actual_winner TEXT NULL,
            is_correct INTEGER NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (date, home_team, visit_team)
        );
        CREATE INDEX IF NOT EXISTS idx_predictions_game ON predictions(game_id);

        CREATE TABLE IF NOT EXISTS daily_stats (
            date TEXT NOT NULL,
            team TEXT NOT NULL,
            player_name TEXT NOT NULL,
            availability TEXT NOT NULL,
            pos TEXT NOT NULL,
            min REAL NOT NULL,
            pie REAL NOT NULL,
            usg_pct REAL NOT NULL,
            ts_pct REAL NOT NULL,
            PRIMARY KEY (date, player_name)
        );
        "#,
    )
    .context("create store schema")?;
    Ok(())
}

/// A re-run for a date replaces that date's predictions wholesale instead
/// of accumulating duplicates.
pub fn clear_date(conn: &Connection, date: NaiveDate) -> Result<usize> {
    conn.execute(
        "DELETE FROM predictions WHERE date = ?1",
        params![date_key(date)],
    )
    .context("clear date predictions")
}

pub fn upsert_prediction(conn: &Connection, p: &Prediction) -> Result<()> {
    let (actual_winner, is_correct) = encode_outcome(&p.outcome);
    conn.execute(
        r#"
        INSERT INTO predictions (
            game_id, date, home_team, visit_team,
            predicted_winner, predicted_gap, actual_winner, is_correct, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(date, home_team, visit_team) DO UPDATE SET
            game_id = excluded.game_id,
            predicted_winner = excluded.predicted_winner,
            predicted_gap = excluded.predicted_gap,
            actual_winner = excluded.actual_winner,
            is_correct = excluded.is_correct,
            updated_at = excluded.updated_at
        "#,
        params![
            p.game_id,
            date_key(p.date),
            p.home_team,
            p.visit_team,
            p.predicted_winner,
            p.predicted_gap,
            actual_winner,
            is_correct,
            Utc::now().to_rfc3339(),
        ],
    )
    .context("upsert prediction")?;
    Ok(())
}

/// Grading writes touch only the outcome columns, by the row's natural key.
pub fn apply_outcome(
    conn: &Connection,
    date: NaiveDate,
    home_team: &str,
    visit_team: &str,
    outcome: &GradedOutcome,
) -> Result<usize> {
    let (actual_winner, is_correct) = encode_outcome(&Some(outcome.clone()));
    conn.execute(
        r#"
        UPDATE predictions
        SET actual_winner = ?1, is_correct = ?2, updated_at = ?3
        WHERE date = ?4 AND home_team = ?5 AND visit_team = ?6
        "#,
        params![
            actual_winner,
            is_correct,
            Utc::now().to_rfc3339(),
            date_key(date),
            home_team,
            visit_team,
        ],
    )
    .context("apply graded outcome")
}

pub fn load_predictions_for_date(conn: &Connection, date: NaiveDate) -> Result<Vec<Prediction>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT game_id, date, home_team, visit_team,
                   predicted_winner, predicted_gap, actual_winner, is_correct
            FROM predictions
            WHERE date = ?1
            ORDER BY game_id ASC
            "#,
        )
        .context("prepare predictions query")?;

    let rows = stmt
        .query_map(params![date_key(date)], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, f64>(5)?,
                row.get::<_, Option<String>>(6)?,
                row.get::<_, Option<i64>>(7)?,
            ))
        })
        .context("query predictions")?;

    let mut out = Vec::new();
    for row in rows {
        let (game_id, date_raw, home_team, visit_team, predicted_winner, predicted_gap, actual, correct) =
            row.context("decode prediction row")?;
        let date = NaiveDate::parse_from_str(&date_raw, "%Y-%m-%d")
            .with_context(|| format!("bad stored date {date_raw}"))?;
        out.push(Prediction {
            game_id,
            date,
            home_team,
            visit_team,
            predicted_winner,
            predicted_gap,
            outcome: decode_outcome(actual, correct),
        });
    }
    Ok(out)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccuracySummary {
    pub correct: i64,
    pub graded: i64,
}

impl AccuracySummary {
    /// Percentage over graded games only; postponed and pending rows sit
    /// outside both numerator and denominator.
    pub fn percent(&self) -> Option<f64> {
        if self.graded == 0 {
            return None;
        }
        Some(self.correct as f64 / self.graded as f64 * 100.0)
    }
}

pub fn accuracy(conn: &Connection) -> Result<AccuracySummary> {
    conn.query_row(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN is_correct = 1 THEN 1 ELSE 0 END), 0),
            COUNT(is_correct)
        FROM predictions
        WHERE is_correct IS NOT NULL
        "#,
        [],
        |row| {
            Ok(AccuracySummary {
                correct: row.get(0)?,
                graded: row.get(1)?,
            })
        },
    )
    .context("query accuracy")
}

/// Snapshot of the valued inputs behind a day's prediction, for later
/// audit. Insert-or-replace keyed by (date, player).
pub fn save_daily_stats(conn: &Connection, date: NaiveDate, roster: &TeamRoster) -> Result<()> {
    let mut stmt = conn
        .prepare(
            r#"
            INSERT OR REPLACE INTO daily_stats
                (date, team, player_name, availability, pos, min, pie, usg_pct, ts_pct)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .context("prepare daily stats insert")?;
    for slot in &roster.slots {
        stmt.execute(params![
            date_key(date),
            roster.team,
            slot.stat.name,
            slot.availability.as_str(),
            slot.stat.position,
            slot.stat.minutes,
            slot.stat.pie,
            slot.stat.usage,
            slot.stat.true_shooting,
        ])
        .context("insert daily stat row")?;
    }
    Ok(())
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn encode_outcome(outcome: &Option<GradedOutcome>) -> (Option<String>, Option<i64>) {
    match outcome {
        None => (None, None),
        Some(GradedOutcome::Postponed) => (Some(POSTPONED_MARKER.to_string()), None),
        Some(GradedOutcome::Final { winner, correct }) => {
            (Some(winner.clone()), Some(i64::from(*correct)))
        }
    }
}

/// Reads defensively: a row that violates the invariant (winner without a
/// correctness flag) decodes as ungraded and will simply be re-graded.
fn decode_outcome(actual: Option<String>, correct: Option<i64>) -> Option<GradedOutcome> {
    match (actual, correct) {
        (Some(winner), _) if winner == POSTPONED_MARKER => Some(GradedOutcome::Postponed),
        (Some(winner), Some(flag)) => Some(GradedOutcome::Final {
            winner,
            correct: flag != 0,
        }),
        _ => None,
    }
}
