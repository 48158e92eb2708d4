use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::action_value::compute_cav;
use crate::config::ModelConfig;
use crate::match_metrics::{MatchMetrics, aggregate_values};
use crate::match_rating::{MatchRatingInputs, Modifiers, MprBreakdown, mpr_breakdown};
use crate::outcome::resolve_outcome_multiplier;
use crate::role_weights::RoleWeightTable;
use crate::season_rating::{CsrMode, SeasonSummary, summarize_season_with_threshold};
use crate::sheet::MatchSheet;
use crate::store::{MprHistoryEntry, RatingStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub player: String,
    pub match_label: String,
    pub match_id: Option<i64>,
    pub role: String,
    pub cavs: Vec<f64>,
    pub metrics: MatchMetrics,
    /// Values that went into the weighted sum, after analyst overrides.
    pub inputs: MatchRatingInputs,
    /// Modifiers as applied, after clamping.
    pub modifiers: Modifiers,
    pub breakdown: MprBreakdown,
    pub mpr: f64,
    pub timestamp: DateTime<Utc>,
}

impl MatchReport {
    pub fn history_entry(&self) -> MprHistoryEntry {
        MprHistoryEntry {
            id: None,
            player: self.player.clone(),
            match_label: self.match_label.clone(),
            match_id: self.match_id,
            role: self.role.clone(),
            mpr: self.mpr,
            timestamp: self.timestamp,
            aqc: self.inputs.aqc,
            his: self.inputs.his_pct,
            ec: self.inputs.ec_pct,
            tii: self.inputs.tii,
            ibi: self.inputs.ibi,
            sci: self.modifiers.sci,
            om: self.modifiers.om,
            pi: self.modifiers.pi,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonReport {
    pub player: String,
    pub summary: SeasonSummary,
    pub mode: CsrMode,
    pub csr: f64,
}

/// Runs sheets through the scoring layers against an injected store.
pub struct RatingPipeline<S> {
    table: RoleWeightTable,
    config: ModelConfig,
    store: S,
}

impl<S: RatingStore> RatingPipeline<S> {
    pub fn new(table: RoleWeightTable, store: S) -> Self {
        Self::with_config(table, ModelConfig::default(), store)
    }

    pub fn with_config(table: RoleWeightTable, config: ModelConfig, store: S) -> Self {
        Self {
            table,
            config,
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn table(&self) -> &RoleWeightTable {
        &self.table
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn rate_match(&self, sheet: &MatchSheet) -> Result<MatchReport> {
        let weights = self.table.weights_for(&sheet.role)?;

        let cavs: Vec<f64> = sheet.actions.iter().map(compute_cav).collect();
        let metrics = aggregate_values(&cavs);
        if metrics.is_empty() {
            tracing::warn!(player = %sheet.player, match_label = %sheet.match_label, "no actions logged");
        }

        let mut inputs = MatchRatingInputs::from_metrics(&metrics, sheet.tii, sheet.ibi);
        if let Some(aqc) = sheet.aqc {
            inputs.aqc = aqc;
        }
        if let Some(his) = sheet.his {
            inputs.his_pct = his;
        }
        if let Some(ec) = sheet.ec {
            inputs.ec_pct = ec;
        }

        let om = match sheet.om {
            Some(om) => om,
            None => self.resolve_om(sheet)?,
        };
        let pi = if self.config.presence_index { sheet.pi } else { None };
        let modifiers = Modifiers::new(sheet.sci.unwrap_or(1.0), om, pi).clamped();
        let breakdown = mpr_breakdown(&inputs, &weights, &modifiers);

        tracing::info!(
            player = %sheet.player,
            match_label = %sheet.match_label,
            role = %sheet.role,
            actions = metrics.action_count,
            mpr = breakdown.mpr,
            "rated match"
        );

        Ok(MatchReport {
            player: sheet.player.clone(),
            match_label: sheet.match_label.clone(),
            match_id: sheet.match_id,
            role: sheet.role.trim().to_string(),
            cavs,
            metrics,
            inputs,
            modifiers,
            mpr: breakdown.mpr,
            breakdown,
            timestamp: Utc::now(),
        })
    }

    pub fn save_report(&self, report: &MatchReport) -> Result<i64> {
        let id = self
            .store
            .append_history(&report.history_entry())
            .with_context(|| format!("save rating for {}", report.player))?;
        tracing::debug!(id, player = %report.player, "appended rating history");
        Ok(id)
    }

    pub fn season_report(
        &self,
        player: &str,
        role_transfer: f64,
        since: Option<DateTime<Utc>>,
    ) -> Result<Option<SeasonReport>> {
        let history = self.store.history_for(player, since)?;
        let mprs: Vec<f64> = history.iter().map(|e| e.mpr).collect();
        Ok(season_from_mprs(player, &mprs, role_transfer, &self.config))
    }

    /// Season reports for every player with history, best CSR first.
    /// Players without an entry in `role_transfer` get `fallback`.
    pub fn season_reports(
        &self,
        role_transfer: &HashMap<String, f64>,
        fallback: f64,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<SeasonReport>> {
        let mut seasons: Vec<(String, Vec<f64>)> = Vec::new();
        for player in self.store.players()? {
            let history = self.store.history_for(&player, since)?;
            seasons.push((player, history.iter().map(|e| e.mpr).collect()));
        }

        let config = &self.config;
        let mut out: Vec<SeasonReport> = seasons
            .par_iter()
            .filter_map(|(player, mprs)| {
                let rt = role_transfer.get(player).copied().unwrap_or(fallback);
                season_from_mprs(player, mprs, rt, config)
            })
            .collect();
        out.sort_by(|a, b| b.csr.total_cmp(&a.csr).then_with(|| a.player.cmp(&b.player)));
        Ok(out)
    }

    fn resolve_om(&self, sheet: &MatchSheet) -> Result<f64> {
        let Some(match_id) = sheet.match_id else {
            return Ok(resolve_outcome_multiplier(None));
        };
        let stats = self
            .store
            .stats_for(&sheet.player, match_id)
            .with_context(|| format!("load stats for {} / {match_id}", sheet.player))?;
        Ok(resolve_outcome_multiplier(stats.as_ref()))
    }
}

fn season_from_mprs(
    player: &str,
    mprs: &[f64],
    role_transfer: f64,
    config: &ModelConfig,
) -> Option<SeasonReport> {
    let summary =
        summarize_season_with_threshold(mprs, role_transfer, config.repeatability_threshold)?;
    let mode = config.csr_mode;
    Some(SeasonReport {
        player: player.to_string(),
        csr: summary.csr(mode),
        summary,
        mode,
    })
}
