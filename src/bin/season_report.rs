use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};

use footy_model::config::ModelConfig;
use footy_model::pipeline::{RatingPipeline, SeasonReport};
use footy_model::role_weights::RoleWeightTable;
use footy_model::season_rating::CsrMode;
use footy_model::sqlite_store::SqliteStore;

const DEFAULT_ROLE_TRANSFER: f64 = 50.0;

fn main() -> Result<()> {
    let mut config = ModelConfig::from_env();
    config.init_logging();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if let Some(path) = flag_value(&args, "--db") {
        config.db_path = Some(PathBuf::from(path));
    }
    if let Some(raw) = flag_value(&args, "--mode") {
        config.csr_mode = raw.parse::<CsrMode>().map_err(|err| anyhow!(err))?;
    }
    let role_transfer = match flag_value(&args, "--role-transfer") {
        Some(raw) => parse_role_transfer(&raw)?,
        None => DEFAULT_ROLE_TRANSFER,
    };
    let since = flag_value(&args, "--since")
        .map(|raw| parse_since(&raw))
        .transpose()?;
    let player = flag_value(&args, "--player");

    let db_path = config
        .resolved_db_path()
        .context("unable to resolve sqlite path")?;
    let store = SqliteStore::open(&db_path)?;
    // Season reports only read stored MPRs, so a custom role table is never needed.
    let mode = config.csr_mode;
    let pipeline =
        RatingPipeline::with_config(RoleWeightTable::standard().clone(), config, store);

    println!("Season report ({})", mode.as_str());
    println!("DB: {}", db_path.display());

    let reports = match player {
        Some(name) => pipeline
            .season_report(&name, role_transfer, since)?
            .into_iter()
            .collect::<Vec<_>>(),
        None => pipeline.season_reports(&HashMap::new(), role_transfer, since)?,
    };
    if reports.is_empty() {
        println!("No ratings saved for this selection.");
        return Ok(());
    }

    println!(
        "{:<24} {:>4} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "Player", "N", "Avg", "Peak5", "Rep%", "RoleTr", "CSR"
    );
    for report in &reports {
        print_row(report);
    }
    Ok(())
}

fn print_row(report: &SeasonReport) {
    let s = &report.summary;
    println!(
        "{:<24} {:>4} {:>8.1} {:>8.1} {:>8.1} {:>8.1} {:>8.1}",
        report.player, s.matches, s.avg_mpr, s.peak5, s.repeatability, s.role_transfer, report.csr
    );
}

fn parse_role_transfer(raw: &str) -> Result<f64> {
    let value = raw
        .trim()
        .parse::<f64>()
        .with_context(|| format!("invalid --role-transfer '{raw}'"))?;
    if !value.is_finite() {
        return Err(anyhow!("invalid --role-transfer '{raw}', expected a finite number"));
    }
    Ok(value)
}

fn parse_since(raw: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid --since '{raw}', expected YYYY-MM-DD"))?;
    let start = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow!("invalid --since '{raw}'"))?;
    Ok(start.and_utc())
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.clone());
        }
    }
    None
}
