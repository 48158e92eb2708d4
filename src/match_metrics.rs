use serde::{Deserialize, Serialize};

use crate::action_value::{Action, HIGH_IMPACT_THRESHOLD, compute_cav};

// EC = 1 - stddev / EC_SPREAD, so a spread of 5 points reads as zero consistency.
const EC_SPREAD: f64 = 5.0;

/// Match-level summary of a player's logged actions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchMetrics {
    pub action_count: usize,
    /// Mean CAV, on the 1-10 action scale. 0.0 when nothing was logged.
    pub aqc: f64,
    /// Share of actions with CAV >= 7.0, as a fraction.
    pub his: f64,
    /// Advisory consistency estimate, as a fraction. Pre-fill only.
    pub ec: f64,
}

impl MatchMetrics {
    pub fn empty() -> Self {
        Self {
            action_count: 0,
            aqc: 0.0,
            his: 0.0,
            ec: 1.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.action_count == 0
    }

    pub fn his_pct(&self) -> f64 {
        self.his * 100.0
    }

    pub fn ec_pct(&self) -> f64 {
        self.ec * 100.0
    }
}

pub fn aggregate(actions: &[Action]) -> MatchMetrics {
    let values: Vec<f64> = actions.iter().map(compute_cav).collect();
    aggregate_values(&values)
}

/// Same as [`aggregate`] for CAVs that were already computed.
pub fn aggregate_values(cavs: &[f64]) -> MatchMetrics {
    if cavs.is_empty() {
        return MatchMetrics::empty();
    }

    let n = cavs.len() as f64;
    let aqc = cavs.iter().sum::<f64>() / n;
    let high = cavs.iter().filter(|v| **v >= HIGH_IMPACT_THRESHOLD).count();
    let ec = match sample_std(cavs, aqc) {
        Some(std) => (1.0 - std / EC_SPREAD).clamp(0.0, 1.0),
        None => 1.0,
    };

    MatchMetrics {
        action_count: cavs.len(),
        aqc,
        his: high as f64 / n,
        ec,
    }
}

fn sample_std(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let var = values
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d
        })
        .sum::<f64>()
        / (values.len() as f64 - 1.0);
    Some(var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_std_uses_bessel_correction() {
        let std = sample_std(&[2.0, 4.0], 3.0).unwrap();
        assert!((std - 2.0_f64.sqrt()).abs() < 1e-12);
        assert!(sample_std(&[5.0], 5.0).is_none());
    }

    #[test]
    fn wide_spread_clips_consistency_to_zero() {
        let m = aggregate_values(&[1.0, 10.0, 1.0, 10.0]);
        assert_eq!(m.ec, 0.0);
    }
}
