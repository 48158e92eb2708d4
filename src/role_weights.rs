use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;
pub const DEFAULT_TABLE_VERSION: &str = "2024.1";

/// How much each match component counts for one positional role.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleWeights {
    #[serde(rename = "wAQC")]
    pub w_aqc: f64,
    #[serde(rename = "wHIS")]
    pub w_his: f64,
    #[serde(rename = "wEC")]
    pub w_ec: f64,
    #[serde(rename = "wTII")]
    pub w_tii: f64,
    #[serde(rename = "wIBI")]
    pub w_ibi: f64,
}

impl RoleWeights {
    pub const fn new(w_aqc: f64, w_his: f64, w_ec: f64, w_tii: f64, w_ibi: f64) -> Self {
        Self {
            w_aqc,
            w_his,
            w_ec,
            w_tii,
            w_ibi,
        }
    }

    pub fn as_array(&self) -> [f64; 5] {
        [self.w_aqc, self.w_his, self.w_ec, self.w_tii, self.w_ibi]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    fn validate(&self, role: &str) -> Result<(), ModelError> {
        let invalid = |reason: String| ModelError::InvalidWeights {
            role: role.to_string(),
            reason,
        };
        for w in self.as_array() {
            if !w.is_finite() {
                return Err(invalid(format!("non-finite weight {w}")));
            }
            if w < 0.0 {
                return Err(invalid(format!("negative weight {w}")));
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(invalid(format!("weights sum to {sum}, expected 1.0")));
        }
        Ok(())
    }
}

const DEFAULT_ROLES: [(&str, RoleWeights); 5] = [
    ("CF / Striker", RoleWeights::new(0.15, 0.35, 0.10, 0.10, 0.30)),
    ("Winger", RoleWeights::new(0.20, 0.30, 0.15, 0.10, 0.25)),
    ("AM / 10", RoleWeights::new(0.25, 0.25, 0.15, 0.15, 0.20)),
    ("CM / 8", RoleWeights::new(0.30, 0.15, 0.30, 0.20, 0.05)),
    ("DM / 6", RoleWeights::new(0.35, 0.10, 0.35, 0.20, 0.00)),
];

static DEFAULT_TABLE: Lazy<RoleWeightTable> = Lazy::new(|| {
    RoleWeightTable::new(
        DEFAULT_TABLE_VERSION,
        DEFAULT_ROLES.iter().map(|(name, w)| (name.to_string(), *w)),
    )
    .expect("built-in role weights must sum to 1.0")
});

/// Validated role -> weights table. Rows are checked once, when the table is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleWeightTable {
    version: String,
    roles: BTreeMap<String, RoleWeights>,
}

#[derive(Debug, Deserialize)]
struct RoleWeightFile {
    #[serde(default)]
    version: Option<String>,
    roles: BTreeMap<String, RoleWeights>,
}

impl Default for RoleWeightTable {
    fn default() -> Self {
        DEFAULT_TABLE.clone()
    }
}

impl RoleWeightTable {
    pub fn new(
        version: impl Into<String>,
        roles: impl IntoIterator<Item = (String, RoleWeights)>,
    ) -> Result<Self, ModelError> {
        let mut out = BTreeMap::new();
        for (name, weights) in roles {
            let name = name.trim().to_string();
            weights.validate(&name)?;
            if out.contains_key(&name) {
                return Err(ModelError::DuplicateRole { role: name });
            }
            out.insert(name, weights);
        }
        if out.is_empty() {
            return Err(ModelError::EmptyRoleTable);
        }
        Ok(Self {
            version: version.into(),
            roles: out,
        })
    }

    /// The built-in table shared by every default pipeline.
    pub fn standard() -> &'static RoleWeightTable {
        &DEFAULT_TABLE
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let file: RoleWeightFile =
            serde_json::from_str(raw).context("parse role weight table json")?;
        let version = file.version.unwrap_or_else(|| "custom".to_string());
        let table = Self::new(version, file.roles)?;
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read role weight table {}", path.display()))?;
        let table = Self::from_json_str(&raw)
            .with_context(|| format!("load role weight table {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            version = %table.version,
            roles = table.roles.len(),
            "loaded role weight table"
        );
        Ok(table)
    }

    pub fn weights_for(&self, role: &str) -> Result<RoleWeights, ModelError> {
        self.roles
            .get(role.trim())
            .copied()
            .ok_or_else(|| ModelError::InvalidRole {
                role: role.to_string(),
                known: self.role_names().map(str::to_string).collect(),
            })
    }

    pub fn role_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.roles.keys().map(String::as_str)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_trims_whitespace_only() {
        let table = RoleWeightTable::standard();
        assert!(table.weights_for("  Winger ").is_ok());
        assert!(table.weights_for("winger").is_err());
    }

    #[test]
    fn json_table_without_version_is_custom() {
        let raw = r#"{"roles":{"Sweeper":{"wAQC":0.4,"wHIS":0.1,"wEC":0.3,"wTII":0.2,"wIBI":0.0}}}"#;
        let table = RoleWeightTable::from_json_str(raw).unwrap();
        assert_eq!(table.version(), "custom");
        assert_eq!(table.len(), 1);
    }
}
