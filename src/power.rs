use crate::lineup::{Lineup, select_best_lineup};
use crate::roster::TeamRoster;

/// Full-game minutes denominator; rosters summing short of it are padded
/// with replacement-level production so thin samples cannot inflate the
/// per-minute rate.
pub const FULL_GAME_MINUTES: f64 = 240.0;
pub const REPLACEMENT_UNIT_VALUE: f64 = 0.5;

pub const HOME_ADVANTAGE: f64 = 0.15;

/// Teams whose two heaviest-usage players exceed this combined share pay a
/// fragility penalty.
pub const USAGE_PENALTY_KNEE: f64 = 0.60;
pub const USAGE_PENALTY_SLOPE: f64 = 3.0;

const NO_DATA: &str = "no data";

#[derive(Debug, Clone)]
pub struct TeamPowerScore {
    pub raw_score: f64,
    pub penalty: f64,
    pub final_score: f64,
    /// Presentation only: best five with unit values, bench size, and the
    /// home/penalty annotations.
    pub detail: String,
}

/// Scores one team from its full available roster (bench included, Out
/// players excluded). An empty available roster scores 0.0 with a "no
/// data" marker rather than failing the game.
pub fn team_power(roster: &TeamRoster, is_home: bool) -> TeamPowerScore {
    let available = roster.valued_available();
    if available.is_empty() {
        return TeamPowerScore {
            raw_score: 0.0,
            penalty: 0.0,
            final_score: 0.0,
            detail: NO_DATA.to_string(),
        };
    }

    let mut total_minutes: f64 = available.iter().map(|p| p.stat.minutes).sum();
    let mut total_contribution: f64 = available.iter().map(|p| p.contribution).sum();

    if total_minutes < FULL_GAME_MINUTES {
        let missing = FULL_GAME_MINUTES - total_minutes;
        total_contribution += REPLACEMENT_UNIT_VALUE * missing;
        total_minutes = FULL_GAME_MINUTES;
    }

    let mut raw_score = (total_contribution / total_minutes) * 5.0;
    if is_home {
        raw_score += HOME_ADVANTAGE;
    }

    let penalty = concentration_penalty(&available.iter().map(|p| p.stat.usage).collect::<Vec<_>>());
    let final_score = raw_score - penalty;

    let lineup = select_best_lineup(&available);
    let detail = compose_detail(&lineup, is_home, penalty);

    TeamPowerScore {
        raw_score,
        penalty,
        final_score,
        detail,
    }
}

/// Sum of the two largest usage shares, charged past the knee.
fn concentration_penalty(usages: &[f64]) -> f64 {
    let mut top = 0.0f64;
    let mut second = 0.0f64;
    for &u in usages {
        if u > top {
            second = top;
            top = u;
        } else if u > second {
            second = u;
        }
    }
    let top2 = top + second;
    if top2 > USAGE_PENALTY_KNEE {
        (top2 - USAGE_PENALTY_KNEE) * USAGE_PENALTY_SLOPE
    } else {
        0.0
    }
}

fn compose_detail(lineup: &Lineup, is_home: bool, penalty: f64) -> String {
    let mut parts: Vec<String> = lineup
        .starters
        .iter()
        .map(|p| {
            let pos = if p.stat.position.is_empty() {
                "?"
            } else {
                p.stat.position.as_str()
            };
            format!("{}({}/{:.1})", p.stat.name, pos, p.unit_value)
        })
        .collect();

    if !lineup.bench.is_empty() {
        parts.push(format!("bench({})", lineup.bench.len()));
    }
    if is_home {
        parts.push(format!("home(+{HOME_ADVANTAGE:.2})"));
    }
    if penalty > 0.0 {
        parts.push(format!("penalty(-{penalty:.2})"));
    }
    parts.join(" + ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{Availability, PlayerSeasonStat, RosterSlot};

    fn slot(name: &str, pos: &str, minutes: f64, pie: f64, usage: f64) -> RosterSlot {
        RosterSlot {
            stat: PlayerSeasonStat {
                name: name.to_string(),
                position: pos.to_string(),
                minutes,
                pie,
                usage,
                true_shooting: 0.55,
            },
            availability: Availability::Ok,
        }
    }

    fn league_average_roster() -> TeamRoster {
        // Eight players at PIE 0.10 (unit value exactly 1.0), 30 min each:
        // 240 total minutes, no padding, raw score exactly 5.0.
        TeamRoster::new(
            "DEN",
            (0..8)
                .map(|i| slot(&format!("P{i}"), ["G", "F", "C"][i % 3], 30.0, 0.10, 0.12))
                .collect(),
        )
    }

    #[test]
    fn average_roster_scores_five_away() {
        let power = team_power(&league_average_roster(), false);
        assert!((power.raw_score - 5.0).abs() < 1e-9);
        assert!((power.penalty - 0.0).abs() < 1e-9);
        assert!((power.final_score - 5.0).abs() < 1e-9);
    }

    #[test]
    fn home_side_gets_the_fixed_bump() {
        let away = team_power(&league_average_roster(), false);
        let home = team_power(&league_average_roster(), true);
        assert!((home.final_score - away.final_score - HOME_ADVANTAGE).abs() < 1e-9);
        assert!(home.detail.contains("home(+0.15)"));
    }

    #[test]
    fn short_minutes_are_padded_to_a_full_game() {
        // One player, 40 minutes at unit value 1.0: padded with 200
        // replacement minutes -> (40 + 100) / 240 * 5.
        let roster = TeamRoster::new("LAL", vec![slot("Solo", "G", 40.0, 0.10, 0.20)]);
        let power = team_power(&roster, false);
        let expected = ((40.0 + 0.5 * 200.0) / 240.0) * 5.0;
        assert!((power.raw_score - expected).abs() < 1e-9);
    }

    #[test]
    fn concentration_penalty_kicks_in_past_the_knee() {
        assert_eq!(concentration_penalty(&[0.30, 0.30, 0.10]), 0.0);
        let p = concentration_penalty(&[0.35, 0.30, 0.10]);
        assert!((p - 0.15).abs() < 1e-9);
        // exactly at the knee is free
        assert_eq!(concentration_penalty(&[0.30, 0.30]), 0.0);
    }

    #[test]
    fn penalty_subtracts_from_the_final_score() {
        let mut slots = league_average_roster().slots;
        slots[0].stat.usage = 0.35;
        slots[1].stat.usage = 0.30;
        let roster = TeamRoster::new("DAL", slots);
        let power = team_power(&roster, false);
        assert!((power.penalty - 0.15).abs() < 1e-9);
        assert!((power.final_score - (power.raw_score - 0.15)).abs() < 1e-9);
        assert!(power.detail.contains("penalty(-0.15)"));
    }

    #[test]
    fn all_out_roster_scores_zero_without_panicking() {
        let mut slots = league_average_roster().slots;
        for s in &mut slots {
            s.availability = Availability::Out;
        }
        let roster = TeamRoster::new("GSW", slots);
        let power = team_power(&roster, true);
        assert_eq!(power.final_score, 0.0);
        assert_eq!(power.detail, "no data");
    }

    #[test]
    fn detail_lists_starters_and_bench() {
        let power = team_power(&league_average_roster(), false);
        assert!(power.detail.contains("bench(3)"));
        assert!(power.detail.contains("(G/1.0)") || power.detail.contains("(C/1.0)"));
    }
}
