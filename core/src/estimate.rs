//! Aggregated Monte-Carlo estimate: per-account mean and standard deviation.

use crate::{
    error::{CostError, CostResult},
    params::FrozenParams,
    table::CostTable,
    types::{AccountId, CostColumn, DollarYear},
};

#[derive(Debug, Clone, PartialEq)]
pub struct EstimateRow {
    pub account:  AccountId,
    pub title:    String,
    pub foak:     f64,
    pub noak:     f64,
    pub foak_std: f64,
    pub noak_std: f64,
}

impl EstimateRow {
    pub fn cost(&self, column: CostColumn) -> f64 {
        match column {
            CostColumn::Foak => self.foak,
            CostColumn::Noak => self.noak,
        }
    }

    pub fn std(&self, column: CostColumn) -> f64 {
        match column {
            CostColumn::Foak => self.foak_std,
            CostColumn::Noak => self.noak_std,
        }
    }
}

/// The final annotated cost table of one run.
#[derive(Debug, Clone)]
pub struct CostEstimate {
    pub escalation_year: DollarYear,
    pub samples:         u64,
    pub rows:            Vec<EstimateRow>,
    /// Parameters as seen by every sample.
    pub params:          FrozenParams,
}

impl CostEstimate {
    pub fn row(&self, account: &str) -> Option<&EstimateRow> {
        let id = AccountId::parse(account);
        self.rows.iter().find(|r| r.account == id)
    }

    pub fn cost(&self, account: &str, column: CostColumn) -> Option<f64> {
        self.row(account).map(|r| r.cost(column))
    }
}

/// Mean and standard deviation over the non-empty, non-NaN values.
///
/// `ddof` is 1 for a multi-sample run and 0 for a single sample; fewer
/// than `ddof + 1` values gives a NaN deviation.
pub fn mean_and_std(values: impl IntoIterator<Item = f64>, ddof: usize) -> (f64, f64) {
    let values: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    let n = values.len();
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    if n <= ddof {
        return (mean, f64::NAN);
    }
    let sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (mean, (sq / (n - ddof) as f64).sqrt())
}

/// Collapse per-sample tables into one estimate, row by row.
///
/// Every sample runs the same stages over the same rows, so tables line up
/// by position; titles come from the first sample.
pub fn aggregate(
    tables: &[CostTable],
    escalation_year: DollarYear,
    params: FrozenParams,
) -> CostResult<CostEstimate> {
    let Some(first) = tables.first() else {
        return Err(CostError::Other(anyhow::anyhow!("No samples to aggregate")));
    };
    if let Some(t) = tables.iter().find(|t| t.len() != first.len()) {
        return Err(CostError::Other(anyhow::anyhow!(
            "Sample tables differ in length: {} vs {}",
            first.len(),
            t.len()
        )));
    }
    let ddof = if tables.len() > 1 { 1 } else { 0 };

    let column_stats = |idx: usize, column: CostColumn| {
        mean_and_std(
            tables.iter().map(|t| t.row(idx).cost(column).unwrap_or(f64::NAN)),
            ddof,
        )
    };

    let rows = first
        .rows()
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let (foak, foak_std) = column_stats(idx, CostColumn::Foak);
            let (noak, noak_std) = column_stats(idx, CostColumn::Noak);
            EstimateRow {
                account: row.account.clone(),
                title: row.title.clone(),
                foak,
                noak,
                foak_std,
                noak_std,
            }
        })
        .collect();

    Ok(CostEstimate {
        escalation_year,
        samples: tables.len() as u64,
        rows,
        params,
    })
}
