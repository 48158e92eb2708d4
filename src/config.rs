use std::path::PathBuf;

use anyhow::Result;

use crate::logging::LoggingConfig;
use crate::role_weights::RoleWeightTable;
use crate::season_rating::{CsrMode, DEFAULT_REPEATABILITY_THRESHOLD};
use crate::sqlite_store::default_db_path;

const CACHE_DIR: &str = "footy_model";

/// Runtime settings, read from the environment.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// JSON role table. `None` uses the built-in table.
    pub role_weights_path: Option<PathBuf>,
    pub csr_mode: CsrMode,
    /// When off, any presence index on a sheet is ignored.
    pub presence_index: bool,
    pub repeatability_threshold: f64,
    pub db_path: Option<PathBuf>,
    pub logging: LoggingConfig,
    /// Rejected values, held until a subscriber exists to report them.
    pub warnings: Vec<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            role_weights_path: None,
            csr_mode: CsrMode::Weighted,
            presence_index: true,
            repeatability_threshold: DEFAULT_REPEATABILITY_THRESHOLD,
            db_path: None,
            logging: LoggingConfig::default(),
            warnings: Vec::new(),
        }
    }
}

impl ModelConfig {
    /// Loads `.env.local` / `.env` if present, then reads `FOOTY_*` variables.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Bad values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut cfg = Self::default();

        cfg.role_weights_path = get("FOOTY_ROLE_WEIGHTS").map(PathBuf::from);
        cfg.db_path = get("FOOTY_DB").map(PathBuf::from);

        if let Some(raw) = get("FOOTY_CSR_MODE") {
            match raw.parse::<CsrMode>() {
                Ok(mode) => cfg.csr_mode = mode,
                Err(err) => cfg
                    .warnings
                    .push(format!("FOOTY_CSR_MODE: {err}; using {}", cfg.csr_mode.as_str())),
            }
        }
        if let Some(raw) = get("FOOTY_PRESENCE_INDEX") {
            match parse_switch(&raw) {
                Some(on) => cfg.presence_index = on,
                None => cfg
                    .warnings
                    .push(format!("bad FOOTY_PRESENCE_INDEX '{raw}', keeping it on")),
            }
        }
        if let Some(raw) = get("FOOTY_REPEATABILITY_THRESHOLD") {
            match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => cfg.repeatability_threshold = v,
                _ => cfg.warnings.push(format!(
                    "bad FOOTY_REPEATABILITY_THRESHOLD '{raw}', using {DEFAULT_REPEATABILITY_THRESHOLD}"
                )),
            }
        }
        if let Some(level) = get("FOOTY_LOG_LEVEL") {
            cfg.logging.level = level;
        }
        if let Some(format) = get("FOOTY_LOG_FORMAT") {
            cfg.logging.format = format;
        }
        cfg
    }

    /// Installs the subscriber, then reports anything rejected while reading the config.
    pub fn init_logging(&self) {
        self.logging.init();
        for warning in &self.warnings {
            tracing::warn!("{warning}");
        }
    }

    pub fn role_table(&self) -> Result<RoleWeightTable> {
        match &self.role_weights_path {
            Some(path) => RoleWeightTable::load(path),
            None => Ok(RoleWeightTable::standard().clone()),
        }
    }

    pub fn resolved_db_path(&self) -> Option<PathBuf> {
        self.db_path.clone().or_else(default_db_path)
    }
}

pub fn app_cache_dir() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn parse_switch(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Some(true),
        "0" | "off" | "false" | "no" => Some(false),
        _ => None,
    }
}
