use std::path::PathBuf;

use anyhow::{Context, Result};

use footy_model::config::ModelConfig;
use footy_model::pipeline::{MatchReport, RatingPipeline};
use footy_model::sheet::MatchSheet;
use footy_model::sqlite_store::SqliteStore;
use footy_model::store::{MemoryStore, RatingStore};

fn main() -> Result<()> {
    let mut config = ModelConfig::from_env();
    config.init_logging();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if let Some(path) = flag_value(&args, "--roles") {
        config.role_weights_path = Some(PathBuf::from(path));
    }
    if let Some(path) = flag_value(&args, "--db") {
        config.db_path = Some(PathBuf::from(path));
    }
    let save = args.iter().any(|a| a == "--save");
    let sheet_path = positional(&args)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/match_sheet.json"));

    let sheet = MatchSheet::load(&sheet_path)?;
    let table = config.role_table()?;

    // Stat records and history only exist in a database; without one OM stays neutral.
    if save || config.db_path.is_some() {
        let db_path = config
            .resolved_db_path()
            .context("unable to resolve sqlite path")?;
        let store = SqliteStore::open(&db_path)?;
        rate_and_print(RatingPipeline::with_config(table, config, store), &sheet, save)
    } else {
        rate_and_print(
            RatingPipeline::with_config(table, config, MemoryStore::new()),
            &sheet,
            false,
        )
    }
}

fn rate_and_print<S: RatingStore>(
    pipeline: RatingPipeline<S>,
    sheet: &MatchSheet,
    save: bool,
) -> Result<()> {
    let report = pipeline.rate_match(sheet)?;
    print_report(sheet, &report);
    if save {
        let id = pipeline.save_report(&report)?;
        println!("Saved rating #{id}");
    }
    Ok(())
}

fn print_report(sheet: &MatchSheet, report: &MatchReport) {
    println!("{} | {} | {}", report.player, report.match_label, report.role);
    println!();
    println!(
        "{:<22} {:>5} {:>5} {:>5} {:>5} {:>5}  {:<20} {:>7}",
        "Phase", "DQ", "EQ", "CD", "TA", "LOP", "Mistake", "CAV"
    );
    for (action, cav) in sheet.actions.iter().zip(&report.cavs) {
        println!(
            "{:<22} {:>5} {:>5} {:>5} {:>5} {:>5}  {:<20} {:>7.3}",
            if action.phase.is_empty() { "-" } else { action.phase.as_str() },
            cell(action.dq),
            cell(action.eq),
            cell(action.cd),
            cell(action.ta),
            cell(action.lop),
            action.mistake.label(),
            cav
        );
    }
    println!();

    let m = &report.metrics;
    if m.is_empty() {
        println!("Actions logged: 0 (aggregates are neutral defaults)");
    } else {
        println!("Actions logged: {}", m.action_count);
    }
    println!("AQC (avg CAV): {:.2}", m.aqc);
    println!("HIS (high impact): {:.1}%", m.his_pct());
    println!("EC estimate: {:.1}%", m.ec_pct());
    println!();

    for (name, value) in report.breakdown.components() {
        println!("  {name:<4} {value:>7.2}");
    }
    println!("  SUM  {:>7.2}", report.breakdown.weighted_sum);
    println!(
        "  x OM {:.2} x PI {:.2} (SCI {:.2})",
        report.modifiers.om,
        report.breakdown.pi,
        report.modifiers.sci
    );
    println!("MPR: {:.1}", report.mpr);
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string())
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

fn positional(args: &[String]) -> Option<String> {
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--roles" || arg == "--db" {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        return Some(arg.clone());
    }
    None
}
