use serde::{Deserialize, Serialize};

/// League-normalized efficiency centers around 0.10; the unit-value scale
/// pivots there and is clamped so one player can neither dominate nor zero
/// out a team score.
pub const LEAGUE_AVG_PIE: f64 = 0.10;
pub const UNIT_VALUE_MIN: f64 = 0.1;
pub const UNIT_VALUE_MAX: f64 = 3.5;
const PIE_SLOPE: f64 = 20.0;

/// One player's season line as the stat provider hands it over, already
/// filtered to rotation players. Immutable for the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeasonStat {
    pub name: String,
    /// "G", "F", "C" or a combination such as "F-C".
    pub position: String,
    pub minutes: f64,
    pub pie: f64,
    pub usage: f64,
    pub true_shooting: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    Ok,
    Out,
}

impl Availability {
    pub fn as_str(self) -> &'static str {
        match self {
            Availability::Ok => "OK",
            Availability::Out => "Out",
        }
    }
}

/// A player with availability attached. Rosters are derived per run and
/// never mutated in place; valuation produces new records.
#[derive(Debug, Clone)]
pub struct RosterSlot {
    pub stat: PlayerSeasonStat,
    pub availability: Availability,
}

#[derive(Debug, Clone)]
pub struct TeamRoster {
    pub team: String,
    pub slots: Vec<RosterSlot>,
}

/// A valued, available player: unit value from efficiency, contribution
/// from unit value and floor time.
#[derive(Debug, Clone)]
pub struct ValuedPlayer {
    pub stat: PlayerSeasonStat,
    pub unit_value: f64,
    pub contribution: f64,
}

pub fn unit_value(pie: f64) -> f64 {
    (1.0 + (pie - LEAGUE_AVG_PIE) * PIE_SLOPE).clamp(UNIT_VALUE_MIN, UNIT_VALUE_MAX)
}

impl TeamRoster {
    pub fn new(team: impl Into<String>, slots: Vec<RosterSlot>) -> Self {
        Self {
            team: team.into(),
            slots,
        }
    }

    /// Out players are excluded entirely, not zeroed: they contribute to
    /// neither the contribution total nor the minutes total.
    pub fn valued_available(&self) -> Vec<ValuedPlayer> {
        self.slots
            .iter()
            .filter(|slot| slot.availability == Availability::Ok)
            .map(|slot| {
                let uv = unit_value(slot.stat.pie);
                ValuedPlayer {
                    stat: slot.stat.clone(),
                    unit_value: uv,
                    contribution: uv * slot.stat.minutes,
                }
            })
            .collect()
    }

    pub fn out_names(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|slot| slot.availability == Availability::Out)
            .map(|slot| slot.stat.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(name: &str, pos: &str, minutes: f64, pie: f64, usage: f64) -> PlayerSeasonStat {
        PlayerSeasonStat {
            name: name.to_string(),
            position: pos.to_string(),
            minutes,
            pie,
            usage,
            true_shooting: 0.55,
        }
    }

    #[test]
    fn unit_value_anchors_and_clamps() {
        assert!((unit_value(0.10) - 1.0).abs() < 1e-9);
        assert!((unit_value(0.15) - 2.0).abs() < 1e-9);
        // 1.0 + 0.20 * 20 = 5.0, clamped to the ceiling
        assert!((unit_value(0.30) - UNIT_VALUE_MAX).abs() < 1e-9);
        // 1.0 - 2.0 = -1.0, clamped to the floor
        assert!((unit_value(0.00) - UNIT_VALUE_MIN).abs() < 1e-9);
    }

    #[test]
    fn unit_value_is_non_decreasing_in_pie() {
        let mut prev = f64::MIN;
        for step in 0..=60 {
            let pie = step as f64 * 0.005;
            let uv = unit_value(pie);
            assert!(uv >= prev);
            assert!((UNIT_VALUE_MIN..=UNIT_VALUE_MAX).contains(&uv));
            prev = uv;
        }
    }

    #[test]
    fn out_players_are_excluded_not_zeroed() {
        let roster = TeamRoster::new(
            "LAL",
            vec![
                RosterSlot {
                    stat: stat("A", "G", 30.0, 0.12, 0.25),
                    availability: Availability::Ok,
                },
                RosterSlot {
                    stat: stat("B", "C", 32.0, 0.18, 0.30),
                    availability: Availability::Out,
                },
            ],
        );
        let valued = roster.valued_available();
        assert_eq!(valued.len(), 1);
        assert_eq!(valued[0].stat.name, "A");
        assert_eq!(roster.out_names(), vec!["B"]);
        // contribution = unit_value * minutes
        assert!((valued[0].contribution - unit_value(0.12) * 30.0).abs() < 1e-9);
    }
}
