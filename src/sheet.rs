use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::action_value::Action;

/// One player's logged match: the action grid plus the judged inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSheet {
    pub player: String,
    pub match_label: String,
    /// Key into the stat records. Without it OM stays neutral unless overridden.
    #[serde(default)]
    pub match_id: Option<i64>,
    pub role: String,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub tii: f64,
    #[serde(default)]
    pub ibi: f64,
    #[serde(default)]
    pub sci: Option<f64>,
    #[serde(default)]
    pub om: Option<f64>,
    #[serde(default)]
    pub pi: Option<f64>,
    /// Analyst overrides for the aggregated values. HIS and EC in percent.
    #[serde(default)]
    pub aqc: Option<f64>,
    #[serde(default)]
    pub his: Option<f64>,
    #[serde(default)]
    pub ec: Option<f64>,
}

impl MatchSheet {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("parse match sheet json")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read match sheet {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("load match sheet {}", path.display()))
    }
}
