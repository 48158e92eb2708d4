use serde::{Deserialize, Serialize};

use crate::match_metrics::MatchMetrics;
use crate::role_weights::RoleWeights;

pub const SCI_MIN: f64 = 1.00;
pub const SCI_MAX: f64 = 1.08;
pub const MULTIPLIER_MIN: f64 = 0.5;
pub const MULTIPLIER_MAX: f64 = 1.5;

// AQC lives on the 1-10 action scale, every other component on 0-100.
const AQC_SCALE: f64 = 10.0;

/// Component values fed into the weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchRatingInputs {
    pub aqc: f64,
    pub his_pct: f64,
    pub ec_pct: f64,
    pub tii: f64,
    pub ibi: f64,
}

impl MatchRatingInputs {
    /// Pre-fills HIS and EC from the aggregator; TII and IBI are always judged.
    pub fn from_metrics(metrics: &MatchMetrics, tii: f64, ibi: f64) -> Self {
        Self {
            aqc: metrics.aqc,
            his_pct: metrics.his_pct(),
            ec_pct: metrics.ec_pct(),
            tii,
            ibi,
        }
    }
}

/// Contextual modifiers applied on top of the weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Stability bonus, applied to the EC term only.
    pub sci: f64,
    pub om: f64,
    /// Presence index. `None` is the same as 1.0.
    #[serde(default)]
    pub pi: Option<f64>,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            sci: SCI_MIN,
            om: 1.0,
            pi: None,
        }
    }
}

impl Modifiers {
    pub fn new(sci: f64, om: f64, pi: Option<f64>) -> Self {
        Self { sci, om, pi }
    }

    /// Bounded copy: SCI in [1.00, 1.08], OM and PI in [0.5, 1.5].
    pub fn clamped(&self) -> Self {
        Self {
            sci: bounded("sci", self.sci, SCI_MIN, SCI_MAX),
            om: bounded("om", self.om, MULTIPLIER_MIN, MULTIPLIER_MAX),
            pi: self
                .pi
                .map(|pi| bounded("pi", pi, MULTIPLIER_MIN, MULTIPLIER_MAX)),
        }
    }

    pub fn presence(&self) -> f64 {
        self.pi.unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MprBreakdown {
    pub aqc: f64,
    pub his: f64,
    pub ec: f64,
    pub tii: f64,
    pub ibi: f64,
    pub weighted_sum: f64,
    pub om: f64,
    pub pi: f64,
    pub mpr: f64,
}

impl MprBreakdown {
    pub fn components(&self) -> [(&'static str, f64); 5] {
        [
            ("AQC", self.aqc),
            ("HIS", self.his),
            ("EC", self.ec),
            ("TII", self.tii),
            ("IBI", self.ibi),
        ]
    }
}

pub fn compute_mpr(inputs: &MatchRatingInputs, weights: &RoleWeights, modifiers: &Modifiers) -> f64 {
    mpr_breakdown(inputs, weights, modifiers).mpr
}

pub fn mpr_breakdown(
    inputs: &MatchRatingInputs,
    weights: &RoleWeights,
    modifiers: &Modifiers,
) -> MprBreakdown {
    let m = modifiers.clamped();

    let aqc = weights.w_aqc * (inputs.aqc * AQC_SCALE);
    let his = weights.w_his * inputs.his_pct;
    let ec = weights.w_ec * (inputs.ec_pct * m.sci);
    let tii = weights.w_tii * inputs.tii;
    let ibi = weights.w_ibi * inputs.ibi;
    let weighted_sum = aqc + his + ec + tii + ibi;
    let pi = m.presence();

    MprBreakdown {
        aqc,
        his,
        ec,
        tii,
        ibi,
        weighted_sum,
        om: m.om,
        pi,
        mpr: weighted_sum * m.om * pi,
    }
}

fn bounded(name: &'static str, value: f64, lo: f64, hi: f64) -> f64 {
    if !value.is_finite() {
        tracing::debug!(modifier = name, value, "non-finite modifier, using 1.0");
        return 1.0;
    }
    let clamped = value.clamp(lo, hi);
    if clamped != value {
        tracing::debug!(modifier = name, value, clamped, "modifier out of bounds");
    }
    clamped
}
