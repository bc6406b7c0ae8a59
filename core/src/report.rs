//! Flat-file exports of a finished estimate.
//!
//!   - `cost_estimate.csv`: the presentation table
//!   - `parameters.csv`:    every design parameter the samples saw
//!   - tracked-cost CSV:   one appended row per parametric run

use crate::{
    capital::{
        OCC, OCC_EXCL_FUEL, OCC_EXCL_FUEL_PER_KW, OCC_ITC, OCC_ITC_PER_KW, OCC_PER_KW, TCI,
        TCI_ITC, TCI_ITC_PER_KW, TCI_PER_KW,
    },
    config::{ITC_CREDIT_LEVEL, PTC_CREDIT_VALUE},
    error::CostResult,
    estimate::{CostEstimate, EstimateRow},
    lcoe::{AC, AC_PER_MWH, LCOE, LCOE_ITC, LCOE_WITH_PTC},
    params::DesignParams,
    types::CostColumn,
};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

pub const ESTIMATE_FILE: &str = "cost_estimate.csv";
pub const PARAMETERS_FILE: &str = "parameters.csv";

/// Summary accounts tracked in every parametric run.
pub const TRACKED_BASE_ACCOUNTS: [&str; 9] = [
    OCC,
    OCC_PER_KW,
    OCC_EXCL_FUEL,
    OCC_EXCL_FUEL_PER_KW,
    TCI,
    TCI_PER_KW,
    AC,
    AC_PER_MWH,
    LCOE,
];
pub const TRACKED_ITC_ACCOUNTS: [&str; 5] =
    [OCC_ITC, OCC_ITC_PER_KW, TCI_ITC, TCI_ITC_PER_KW, LCOE_ITC];
pub const TRACKED_PTC_ACCOUNTS: [&str; 1] = [LCOE_WITH_PTC];

/// Physics safety metrics carried along when the design run produced them.
pub const PHYSICS_METRICS: [&str; 2] = ["Temp Coeff 3D (2D corrected)", "SDM 3D (2D corrected)"];

/// A row as presented: numeric cells truncated to whole dollars.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentedRow {
    pub account: String,
    pub title:   String,
    /// FOAK, NOAK, FOAK std, NOAK std. `None` for cells with no value.
    pub values:  [Option<i64>; 4],
}

fn numeric_cells(row: &EstimateRow) -> [f64; 4] {
    [row.foak, row.noak, row.foak_std, row.noak_std]
}

/// Drop rows whose numeric cells are all zero and truncate the rest.
pub fn presentation_rows(estimate: &CostEstimate) -> Vec<PresentedRow> {
    estimate
        .rows
        .iter()
        .filter(|r| !numeric_cells(r).iter().all(|&v| v == 0.0))
        .map(|r| PresentedRow {
            account: r.account.to_string(),
            title:   r.title.clone(),
            values:  numeric_cells(r).map(|v| v.is_finite().then(|| v.trunc() as i64)),
        })
        .collect()
}

pub fn estimate_headers(estimate: &CostEstimate) -> Vec<String> {
    let year = estimate.escalation_year;
    vec![
        "Account".to_string(),
        "Account Title".to_string(),
        CostColumn::Foak.header(year),
        CostColumn::Noak.header(year),
        CostColumn::Foak.std_header(year),
        CostColumn::Noak.std_header(year),
    ]
}

pub fn write_estimate(estimate: &CostEstimate, path: &Path) -> CostResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(estimate_headers(estimate))?;
    for row in presentation_rows(estimate) {
        let mut record = vec![row.account, row.title];
        record.extend(row.values.iter().map(|v| v.map(|n| n.to_string()).unwrap_or_default()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_parameters(params: &DesignParams, path: &Path) -> CostResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Parameter", "Value"])?;
    for (name, value) in params.iter() {
        writer.write_record([name.as_str(), value.to_string().as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the estimate and parameter tables into `out_dir`.
pub fn export_detailed(estimate: &CostEstimate, out_dir: &Path) -> CostResult<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(out_dir)?;
    let estimate_path = out_dir.join(ESTIMATE_FILE);
    let params_path = out_dir.join(PARAMETERS_FILE);
    write_estimate(estimate, &estimate_path)?;
    write_parameters(&estimate.params, &params_path)?;
    log::info!(
        "The cost estimate and all the parameters are saved at {}",
        out_dir.display()
    );
    Ok((estimate_path, params_path))
}

/// Ordered (column, value) pairs for one parametric-study row.
pub type TrackedRecord = Vec<(String, String)>;

fn format_cost(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => v.to_string(),
        _ => String::new(),
    }
}

/// Selected parameters, physics metrics and summary-account costs.
///
/// Tracked parameters missing from the set are skipped. Accounts absent
/// from the estimate keep empty cells.
pub fn tracked_costs(estimate: &CostEstimate, tracked_params: &[&str]) -> TrackedRecord {
    let params = &estimate.params;
    let mut record: TrackedRecord = Vec::new();

    let param_names = tracked_params
        .iter()
        .copied()
        .chain(PHYSICS_METRICS.iter().copied().filter(|m| !tracked_params.contains(m)));
    for name in param_names {
        if let Some(value) = params.get(name) {
            record.push((name.to_string(), value.to_string()));
        }
    }

    let mut accounts: Vec<&str> = TRACKED_BASE_ACCOUNTS.to_vec();
    if params.contains(ITC_CREDIT_LEVEL) {
        accounts.extend(TRACKED_ITC_ACCOUNTS);
    }
    if params.contains(PTC_CREDIT_VALUE) {
        accounts.extend(TRACKED_PTC_ACCOUNTS);
    }

    for account in accounts {
        let row = estimate.row(account);
        for column in CostColumn::BOTH {
            record.push((
                format!("{account}_{} Estimated Cost", column.label()),
                format_cost(row.map(|r| r.cost(column))),
            ));
        }
        for column in CostColumn::BOTH {
            record.push((
                format!("{account}_{} Estimated Cost std", column.label()),
                format_cost(row.map(|r| r.std(column))),
            ));
        }
    }
    record
}

/// Append `record` to the CSV at `path`, writing the header only when the
/// file is new or empty.
pub fn append_tracked_costs(record: &TrackedRecord, path: &Path) -> CostResult<()> {
    let needs_header = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    if needs_header {
        writer.write_record(record.iter().map(|(name, _)| name.as_str()))?;
    }
    writer.write_record(record.iter().map(|(_, value)| value.as_str()))?;
    writer.flush()?;
    log::info!("Results are being saved on {}", path.display());
    Ok(())
}
