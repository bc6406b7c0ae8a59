//! Escalation loader. Brings every catalog cost to a common dollar year.
//!
//! For each row with a Fixed or Unit cost:
//!   1. Resolve parameter-referenced cost fields to numbers.
//!   2. Multiply nominal/low/high Fixed and Unit costs by
//!      `index[Dollar Year][Type] / index[Escalation Year][Type]`.
//!
//! Rows with neither cost get multiplier 0. Unknown years only warn; the
//! resulting NaN multiplier shows up as a visibly wrong cost downstream.

use crate::{
    catalog::{Catalog, CatalogRow},
    config::EconomicsParameters,
    error::{CostError, CostResult},
    params::DesignParams,
    types::DollarYear,
};
use std::collections::BTreeMap;
use std::io::Read;

/// Cost type that is never escalated.
pub const NO_ESCALATION_TYPE: &str = "NA";

/// Year × index-type inflation table.
#[derive(Debug, Clone, Default)]
pub struct InflationTable {
    indices: BTreeMap<DollarYear, BTreeMap<String, f64>>,
}

impl InflationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, year: DollarYear, cost_type: &str, index: f64) {
        self.indices
            .entry(year)
            .or_default()
            .insert(cost_type.to_string(), index);
    }

    pub fn has_year(&self, year: DollarYear) -> bool {
        self.indices.contains_key(&year)
    }

    pub fn index(&self, year: DollarYear, cost_type: &str) -> Option<f64> {
        self.indices.get(&year).and_then(|row| row.get(cost_type)).copied()
    }

    /// Read a `Year, <type>, <type>, ...` table. Rows without a year are skipped.
    pub fn from_reader<R: Read>(reader: R) -> CostResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let year_col = headers
            .iter()
            .position(|h| h == "Year")
            .ok_or_else(|| CostError::InvalidCatalog {
                row: 0,
                reason: "inflation table has no 'Year' column".into(),
            })?;

        let mut table = Self::new();
        for (i, record) in csv_reader.records().enumerate() {
            let record = record?;
            let year = match record.get(year_col).map(str::trim) {
                Some(y) if !y.is_empty() => y.parse::<f64>().map_err(|_| CostError::InvalidCatalog {
                    row: i + 1,
                    reason: format!("inflation year is not a number: {y}"),
                })? as DollarYear,
                _ => continue,
            };
            for (col, header) in headers.iter().enumerate() {
                if col == year_col {
                    continue;
                }
                if let Some(index) = record.get(col).and_then(|v| v.trim().parse::<f64>().ok()) {
                    table.insert(year, header, index);
                }
            }
        }
        Ok(table)
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Ok(Self::from_reader(file)?)
    }

    /// Multiplier that converts a `base_year` cost to `escalation_year` dollars.
    pub fn multiplier(
        &self,
        base_year: Option<DollarYear>,
        cost_type: Option<&str>,
        escalation_year: DollarYear,
    ) -> f64 {
        match base_year {
            Some(year) if !self.has_year(year) => {
                log::warn!("Base year {year} not found in the inflation table");
            }
            None => log::warn!("Row has a cost but no base dollar year"),
            _ => {}
        }
        if !self.has_year(escalation_year) {
            log::warn!("Escalation year {escalation_year} not found in the inflation table");
        }

        let cost_type = cost_type.unwrap_or(NO_ESCALATION_TYPE);
        if cost_type == NO_ESCALATION_TYPE {
            return 1.0;
        }
        let base = base_year.and_then(|y| self.index(y, cost_type));
        let target = self.index(escalation_year, cost_type);
        match (base, target) {
            (Some(b), Some(t)) => b / t,
            _ => f64::NAN,
        }
    }
}

/// Fixed and Unit cost terms after reference resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CostTerms {
    pub fixed:      Option<f64>,
    pub fixed_low:  Option<f64>,
    pub fixed_high: Option<f64>,
    pub unit:       Option<f64>,
    pub unit_low:   Option<f64>,
    pub unit_high:  Option<f64>,
}

impl CostTerms {
    fn resolve(row: &CatalogRow, params: &DesignParams) -> CostResult<Self> {
        Ok(Self {
            fixed:      row.fixed_cost.resolve(params)?,
            fixed_low:  row.fixed_cost_low.resolve(params)?,
            fixed_high: row.fixed_cost_high.resolve(params)?,
            unit:       row.unit_cost.resolve(params)?,
            unit_low:   row.unit_cost_low.resolve(params)?,
            unit_high:  row.unit_cost_high.resolve(params)?,
        })
    }

    fn scaled(&self, multiplier: f64) -> Self {
        let m = |v: Option<f64>| v.map(|x| x * multiplier);
        Self {
            fixed:      m(self.fixed),
            fixed_low:  m(self.fixed_low),
            fixed_high: m(self.fixed_high),
            unit:       m(self.unit),
            unit_low:   m(self.unit_low),
            unit_high:  m(self.unit_high),
        }
    }
}

/// A catalog row with its costs resolved and escalated.
#[derive(Debug, Clone, PartialEq)]
pub struct EscalatedRow {
    pub row:        CatalogRow,
    /// Resolved costs in the row's own dollar year.
    pub base:       CostTerms,
    pub multiplier: f64,
    /// Resolved costs in escalation-year dollars.
    pub adjusted:   CostTerms,
}

impl EscalatedRow {
    /// True if the row carries a positive Fixed or Unit cost and is scaled.
    pub fn is_costed(&self) -> bool {
        self.base.fixed.is_some_and(|v| v > 0.0) || self.base.unit.is_some_and(|v| v > 0.0)
    }
}

/// Resolve and escalate every row, then merge the auxiliary economics
/// parameters into `params` (overwriting existing keys).
///
/// References are resolved against `params` as given, before the merge.
pub fn escalate_cost_database(
    catalog: &Catalog,
    inflation: &InflationTable,
    economics: &EconomicsParameters,
    escalation_year: DollarYear,
    params: &mut DesignParams,
) -> CostResult<Vec<EscalatedRow>> {
    let mut escalated = Vec::with_capacity(catalog.len());
    for row in &catalog.rows {
        let base = CostTerms::resolve(row, params)?;
        let multiplier = if base.fixed.is_some() || base.unit.is_some() {
            inflation.multiplier(row.dollar_year, row.cost_type.as_deref(), escalation_year)
        } else {
            0.0
        };
        escalated.push(EscalatedRow {
            row: row.clone(),
            base,
            multiplier,
            adjusted: base.scaled(multiplier),
        });
    }

    params.merge(economics.entries.iter().cloned());
    log::debug!(
        "Escalated {} catalog rows to ${escalation_year}; merged {} economics parameters",
        escalated.len(),
        economics.entries.len()
    );
    Ok(escalated)
}
