use chrono::NaiveDate;
use rusqlite::Connection;

use nba_uv::reconcile::reconcile_date;
use nba_uv::schedule::GameResult;
use nba_uv::store::{self, GradedOutcome, Prediction};
use nba_uv::teams::TeamDirectory;

const LAL: u64 = 1610612747;
const DEN: u64 = 1610612743;
const BOS: u64 = 1610612738;
const NYK: u64 = 1610612752;
const GSW: u64 = 1610612744;
const SAC: u64 = 1610612758;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 19).unwrap()
}

fn seed(conn: &Connection, game_id: &str, home: &str, visit: &str, pick: &str) {
    store::upsert_prediction(
        conn,
        &Prediction {
            game_id: game_id.to_string(),
            date: date(),
            home_team: home.to_string(),
            visit_team: visit.to_string(),
            predicted_winner: pick.to_string(),
            predicted_gap: 0.8,
            outcome: None,
        },
    )
    .unwrap();
}

fn final_game(id: &str, home: u64, home_pts: i64, visitor: u64, visitor_pts: i64) -> GameResult {
    GameResult {
        game_id: id.to_string(),
        home_team_id: home,
        visitor_team_id: visitor,
        status_id: 3,
        status_text: "Final".to_string(),
        home_score: Some(home_pts),
        visitor_score: Some(visitor_pts),
    }
}

fn ppd_game(id: &str, home: u64, visitor: u64) -> GameResult {
    GameResult {
        game_id: id.to_string(),
        home_team_id: home,
        visitor_team_id: visitor,
        status_id: 1,
        status_text: "7:30 pm ET - PPD".to_string(),
        home_score: None,
        visitor_score: None,
    }
}

fn outcome_of(conn: &Connection, home: &str) -> Option<GradedOutcome> {
    store::load_predictions_for_date(conn, date())
        .unwrap()
        .into_iter()
        .find(|p| p.home_team == home)
        .unwrap()
        .outcome
}

#[test]
fn wrong_side_pick_grades_to_zero() {
    // Feed: home wins 110-100; we stored the visitor as predicted winner.
    let teams = TeamDirectory::nba();
    let mut conn = store::open_in_memory().unwrap();
    seed(&conn, "g1", "LAL", "DEN", "DEN");

    let games = vec![final_game("g1", LAL, 110, DEN, 100)];
    let updated = reconcile_date(&mut conn, &teams, date(), &games).unwrap();
    assert_eq!(updated, 1);

    assert_eq!(
        outcome_of(&conn, "LAL"),
        Some(GradedOutcome::Final {
            winner: "LAL".to_string(),
            correct: false
        })
    );
}

#[test]
fn postponed_status_overrides_a_prior_final_grade() {
    let teams = TeamDirectory::nba();
    let mut conn = store::open_in_memory().unwrap();
    seed(&conn, "g1", "LAL", "DEN", "DEN");

    // First pass grades the game as final...
    let finished = vec![final_game("g1", LAL, 101, DEN, 113)];
    reconcile_date(&mut conn, &teams, date(), &finished).unwrap();
    assert_eq!(
        outcome_of(&conn, "LAL"),
        Some(GradedOutcome::Final {
            winner: "DEN".to_string(),
            correct: true
        })
    );

    // ...then the provider flips the status to PPD: postponed wins.
    let postponed = vec![ppd_game("g1", LAL, DEN)];
    reconcile_date(&mut conn, &teams, date(), &postponed).unwrap();
    assert_eq!(outcome_of(&conn, "LAL"), Some(GradedOutcome::Postponed));
}

#[test]
fn matchup_missing_from_the_feed_is_postponed() {
    // The provider moved the game to another date; under this date it no
    // longer exists, which is indistinguishable from a cancellation.
    let teams = TeamDirectory::nba();
    let mut conn = store::open_in_memory().unwrap();
    seed(&conn, "g1", "GSW", "SAC", "GSW");

    let updated = reconcile_date(&mut conn, &teams, date(), &[]).unwrap();
    assert_eq!(updated, 1);
    assert_eq!(outcome_of(&conn, "GSW"), Some(GradedOutcome::Postponed));
}

#[test]
fn unfinished_games_stay_pending_without_writes() {
    let teams = TeamDirectory::nba();
    let mut conn = store::open_in_memory().unwrap();
    seed(&conn, "g1", "LAL", "DEN", "LAL");

    let live = vec![GameResult {
        game_id: "g1".to_string(),
        home_team_id: LAL,
        visitor_team_id: DEN,
        status_id: 2,
        status_text: "Q2 0:44".to_string(),
        home_score: Some(55),
        visitor_score: Some(51),
    }];
    let updated = reconcile_date(&mut conn, &teams, date(), &live).unwrap();
    assert_eq!(updated, 0);
    assert_eq!(outcome_of(&conn, "LAL"), None);
}

#[test]
fn reconciling_twice_with_the_same_feed_is_idempotent() {
    let teams = TeamDirectory::nba();
    let mut conn = store::open_in_memory().unwrap();
    seed(&conn, "g1", "LAL", "DEN", "LAL");
    seed(&conn, "g2", "BOS", "NYK", "BOS");
    seed(&conn, "g3", "GSW", "SAC", "GSW");

    let games = vec![
        final_game("g1", LAL, 120, DEN, 99),
        ppd_game("g2", BOS, NYK),
        // g3 missing from the feed entirely
    ];

    reconcile_date(&mut conn, &teams, date(), &games).unwrap();
    let first = store::load_predictions_for_date(&conn, date()).unwrap();

    reconcile_date(&mut conn, &teams, date(), &games).unwrap();
    let second = store::load_predictions_for_date(&conn, date()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn accuracy_counts_only_graded_games() {
    // Three predictions: one postponed, one correct, one incorrect.
    // Accuracy is 50% over the two graded games.
    let teams = TeamDirectory::nba();
    let mut conn = store::open_in_memory().unwrap();
    seed(&conn, "g1", "LAL", "DEN", "LAL");
    seed(&conn, "g2", "BOS", "NYK", "BOS");
    seed(&conn, "g3", "GSW", "SAC", "GSW");

    let games = vec![
        final_game("g1", LAL, 120, DEN, 99),   // picked LAL, LAL won
        final_game("g2", BOS, 95, NYK, 104),   // picked BOS, NYK won
        ppd_game("g3", GSW, SAC),
    ];
    reconcile_date(&mut conn, &teams, date(), &games).unwrap();

    let summary = store::accuracy(&conn).unwrap();
    assert_eq!(summary.correct, 1);
    assert_eq!(summary.graded, 2);
    assert!((summary.percent().unwrap() - 50.0).abs() < 1e-9);
}
