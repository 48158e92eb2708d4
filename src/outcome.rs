use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const NEUTRAL_OUTCOME: f64 = 1.0;
pub const MAX_OUTCOME: f64 = 1.5;

const GOAL_BONUS: f64 = 0.10;
const ASSIST_BONUS: f64 = 0.05;

/// Recorded match statistics for one player in one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRecord {
    pub player: String,
    pub match_id: i64,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub big_chance_conversions: u32,
    #[serde(default)]
    pub dribbles: u32,
    pub timestamp: DateTime<Utc>,
}

impl StatRecord {
    pub fn new(player: impl Into<String>, match_id: i64, goals: u32, assists: u32) -> Self {
        Self {
            player: player.into(),
            match_id,
            goals,
            assists,
            big_chance_conversions: 0,
            dribbles: 0,
            timestamp: Utc::now(),
        }
    }
}

/// Outcome multiplier from goals and assists; neutral when nothing was recorded.
pub fn resolve_outcome_multiplier(stats: Option<&StatRecord>) -> f64 {
    let Some(stats) = stats else {
        return NEUTRAL_OUTCOME;
    };
    let bonus = GOAL_BONUS * f64::from(stats.goals) + ASSIST_BONUS * f64::from(stats.assists);
    (NEUTRAL_OUTCOME + bonus).min(MAX_OUTCOME)
}
