use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_REPEATABILITY_THRESHOLD: f64 = 70.0;
pub const PEAK_MATCHES: usize = 5;

/// Which season formula to apply. Both revisions of the model are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CsrMode {
    /// 0.45 avg + 0.20 repeatability + 0.15 role transfer + 0.20 peak5.
    #[default]
    Weighted,
    /// 0.5 avg + 0.5 peak5.
    AvgPeak,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsrWeights {
    pub avg: f64,
    pub repeatability: f64,
    pub role_transfer: f64,
    pub peak5: f64,
}

impl CsrWeights {
    pub const fn sum(&self) -> f64 {
        self.avg + self.repeatability + self.role_transfer + self.peak5
    }
}

pub const WEIGHTED: CsrWeights = CsrWeights {
    avg: 0.45,
    repeatability: 0.20,
    role_transfer: 0.15,
    peak5: 0.20,
};

pub const AVG_PEAK: CsrWeights = CsrWeights {
    avg: 0.5,
    repeatability: 0.0,
    role_transfer: 0.0,
    peak5: 0.5,
};

const _: () = {
    assert!(WEIGHTED.sum() > 1.0 - 1e-9 && WEIGHTED.sum() < 1.0 + 1e-9);
    assert!(AVG_PEAK.sum() > 1.0 - 1e-9 && AVG_PEAK.sum() < 1.0 + 1e-9);
};

impl CsrMode {
    pub fn weights(self) -> CsrWeights {
        match self {
            CsrMode::Weighted => WEIGHTED,
            CsrMode::AvgPeak => AVG_PEAK,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CsrMode::Weighted => "weighted",
            CsrMode::AvgPeak => "avg-peak",
        }
    }
}

impl FromStr for CsrMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "weighted" | "canonical" | "four-term" => Ok(CsrMode::Weighted),
            "avg-peak" | "avgpeak" | "simple" | "two-term" => Ok(CsrMode::AvgPeak),
            other => Err(format!("unknown CSR mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub matches: usize,
    pub avg_mpr: f64,
    pub peak5: f64,
    /// Percentage of matches at or above the threshold.
    pub repeatability: f64,
    pub role_transfer: f64,
}

impl SeasonSummary {
    pub fn csr(&self, mode: CsrMode) -> f64 {
        let w = mode.weights();
        w.avg * self.avg_mpr
            + w.repeatability * self.repeatability
            + w.role_transfer * self.role_transfer
            + w.peak5 * self.peak5
    }
}

pub fn summarize_season(mprs: &[f64], role_transfer: f64) -> Option<SeasonSummary> {
    summarize_season_with_threshold(mprs, role_transfer, DEFAULT_REPEATABILITY_THRESHOLD)
}

pub fn summarize_season_with_threshold(
    mprs: &[f64],
    role_transfer: f64,
    threshold: f64,
) -> Option<SeasonSummary> {
    let mut values: Vec<f64> = mprs.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return None;
    }
    if values.len() != mprs.len() {
        tracing::debug!(skipped = mprs.len() - values.len(), "ignoring non-finite MPR values");
    }

    let n = values.len() as f64;
    let avg_mpr = values.iter().sum::<f64>() / n;
    let at_or_above = values.iter().filter(|v| **v >= threshold).count();

    values.sort_by(|a, b| b.total_cmp(a));
    let peak = &values[..values.len().min(PEAK_MATCHES)];
    let peak5 = peak.iter().sum::<f64>() / peak.len() as f64;

    Some(SeasonSummary {
        matches: values.len(),
        avg_mpr,
        peak5,
        repeatability: at_or_above as f64 / n * 100.0,
        role_transfer,
    })
}

/// Season rating, or `None` when the season has no matches.
pub fn compute_csr(mprs: &[f64], role_transfer: f64, mode: CsrMode) -> Option<f64> {
    summarize_season(mprs, role_transfer).map(|s| s.csr(mode))
}
