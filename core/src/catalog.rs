//! The cost catalog (Code of Accounts database).
//!
//! Rows are kept in catalog order. Order plus `Level` is the only source of
//! tree structure; see `account_tree.rs`.

use crate::{
    distribution::DistributionKind,
    error::{CostError, CostResult},
    params::DesignParams,
    types::{AccountId, DollarYear},
};
use serde::Deserialize;
use std::io::Read;

/// A cost term that is either a literal, a reference to a design
/// parameter, or absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CostField {
    #[default]
    Missing,
    Value(f64),
    Reference(String),
}

impl CostField {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::Missing,
            Some(s) => match s.parse::<f64>() {
                Ok(v) if v.is_nan() => Self::Missing,
                Ok(v) => Self::Value(v),
                Err(_) => Self::Reference(s.to_string()),
            },
        }
    }

    /// Resolve to a number, looking references up in `params`.
    pub fn resolve(&self, params: &DesignParams) -> CostResult<Option<f64>> {
        match self {
            Self::Missing => Ok(None),
            Self::Value(v) => Ok(Some(*v)),
            Self::Reference(name) => params.number(name).map(Some),
        }
    }
}

/// Which cost equation a row uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CostEquation {
    #[default]
    Standard,
    Nonstandard,
}

/// A row's conditional-inclusion rule: keep it only if `variable == value`.
#[derive(Debug, Clone, PartialEq)]
pub struct InclusionCondition {
    pub variable: String,
    pub value:    String,
}

impl InclusionCondition {
    pub fn is_satisfied(&self, params: &DesignParams) -> bool {
        params
            .get(&self.variable)
            .map(|v| v.matches(&self.value))
            .unwrap_or(false)
    }
}

/// One Code-of-Accounts entry as read from the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogRow {
    pub account: AccountId,
    pub level:   u8,
    pub title:   String,

    pub fixed_cost:              CostField,
    pub fixed_cost_low:          CostField,
    pub fixed_cost_high:         CostField,
    pub fixed_cost_distribution: Option<DistributionKind>,

    pub unit_cost:              CostField,
    pub unit_cost_low:          CostField,
    pub unit_cost_high:         CostField,
    pub unit_cost_distribution: Option<DistributionKind>,

    pub scaling_variable:           Option<String>,
    pub scaling_variable_ref_value: Option<f64>,
    pub exponent:                   Option<f64>,
    pub exponent_min:               Option<f64>,
    pub exponent_max:               Option<f64>,
    pub exponent_std:               Option<f64>,
    pub exponent_distribution:      Option<DistributionKind>,

    pub dollar_year: Option<DollarYear>,
    /// Inflation-index category; `NA` means no escalation.
    pub cost_type:   Option<String>,
    pub equation:    CostEquation,
    /// `FOAK to NOAK Multiplier Type`.
    pub learning_tag: Option<String>,

    pub optional:     Option<InclusionCondition>,
    pub sec_optional: Option<InclusionCondition>,
}

/// The catalog as it appears on disk, one column per field.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCatalogRow {
    #[serde(rename = "Account")]
    account: Option<String>,
    #[serde(rename = "Level")]
    level: Option<String>,
    #[serde(rename = "Account Title")]
    title: Option<String>,
    #[serde(rename = "Fixed Cost ($)")]
    fixed_cost: Option<String>,
    #[serde(rename = "Fixed Cost Low End")]
    fixed_cost_low: Option<String>,
    #[serde(rename = "Fixed Cost High End")]
    fixed_cost_high: Option<String>,
    #[serde(rename = "Fixed Cost Distribution")]
    fixed_cost_distribution: Option<String>,
    #[serde(rename = "Unit Cost")]
    unit_cost: Option<String>,
    #[serde(rename = "Unit Cost Low End")]
    unit_cost_low: Option<String>,
    #[serde(rename = "Unit Cost High End")]
    unit_cost_high: Option<String>,
    #[serde(rename = "Unit Cost Distribution")]
    unit_cost_distribution: Option<String>,
    #[serde(rename = "Scaling Variable")]
    scaling_variable: Option<String>,
    #[serde(rename = "Scaling Variable Ref Value")]
    scaling_variable_ref_value: Option<String>,
    #[serde(rename = "Exponent")]
    exponent: Option<String>,
    #[serde(rename = "Exponent Min")]
    exponent_min: Option<String>,
    #[serde(rename = "Exponent Max")]
    exponent_max: Option<String>,
    #[serde(rename = "Exponent std")]
    exponent_std: Option<String>,
    #[serde(rename = "Exponent Distribution")]
    exponent_distribution: Option<String>,
    #[serde(rename = "Dollar Year")]
    dollar_year: Option<String>,
    #[serde(rename = "Type")]
    cost_type: Option<String>,
    #[serde(rename = "Standard Cost Equation?")]
    equation: Option<String>,
    #[serde(rename = "FOAK to NOAK Multiplier Type")]
    learning_tag: Option<String>,
    #[serde(rename = "Optional Variable")]
    optional_variable: Option<String>,
    #[serde(rename = "Optional Value")]
    optional_value: Option<String>,
    #[serde(rename = "Sec Optional Variable")]
    sec_optional_variable: Option<String>,
    #[serde(rename = "Sec Optional Value")]
    sec_optional_value: Option<String>,
}

fn text(cell: Option<String>) -> Option<String> {
    cell.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn number(cell: &Option<String>, row: usize, column: &str) -> CostResult<Option<f64>> {
    match cell.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<f64>()
            .map(|v| if v.is_nan() { None } else { Some(v) })
            .map_err(|_| CostError::InvalidCatalog {
                row,
                reason: format!("'{column}' is not a number: {s}"),
            }),
    }
}

fn condition(variable: Option<String>, value: Option<String>) -> Option<InclusionCondition> {
    text(variable).map(|variable| InclusionCondition {
        variable,
        value: text(value).unwrap_or_default(),
    })
}

impl RawCatalogRow {
    fn into_row(self, row: usize) -> CostResult<CatalogRow> {
        let account = text(self.account).ok_or_else(|| CostError::InvalidCatalog {
            row,
            reason: "missing 'Account'".into(),
        })?;
        let level = number(&self.level, row, "Level")?.ok_or_else(|| CostError::InvalidCatalog {
            row,
            reason: "missing 'Level'".into(),
        })?;
        if !(0.0..=4.0).contains(&level) || level.fract() != 0.0 {
            return Err(CostError::InvalidCatalog {
                row,
                reason: format!("'Level' must be a whole number between 0 and 4, got {level}"),
            });
        }
        let equation = match text(self.equation).as_deref() {
            Some("nonstandard") => CostEquation::Nonstandard,
            _ => CostEquation::Standard,
        };

        Ok(CatalogRow {
            account: AccountId::parse(&account),
            level: level as u8,
            title: text(self.title).unwrap_or_default(),
            fixed_cost: CostField::parse(self.fixed_cost.as_deref()),
            fixed_cost_low: CostField::parse(self.fixed_cost_low.as_deref()),
            fixed_cost_high: CostField::parse(self.fixed_cost_high.as_deref()),
            fixed_cost_distribution: text(self.fixed_cost_distribution)
                .and_then(|d| DistributionKind::parse(&d)),
            unit_cost: CostField::parse(self.unit_cost.as_deref()),
            unit_cost_low: CostField::parse(self.unit_cost_low.as_deref()),
            unit_cost_high: CostField::parse(self.unit_cost_high.as_deref()),
            unit_cost_distribution: text(self.unit_cost_distribution)
                .and_then(|d| DistributionKind::parse(&d)),
            scaling_variable: text(self.scaling_variable),
            scaling_variable_ref_value: number(
                &self.scaling_variable_ref_value,
                row,
                "Scaling Variable Ref Value",
            )?,
            exponent: number(&self.exponent, row, "Exponent")?,
            exponent_min: number(&self.exponent_min, row, "Exponent Min")?,
            exponent_max: number(&self.exponent_max, row, "Exponent Max")?,
            exponent_std: number(&self.exponent_std, row, "Exponent std")?,
            exponent_distribution: text(self.exponent_distribution)
                .and_then(|d| DistributionKind::parse(&d)),
            dollar_year: number(&self.dollar_year, row, "Dollar Year")?.map(|y| y as DollarYear),
            cost_type: text(self.cost_type),
            equation,
            learning_tag: text(self.learning_tag),
            optional: condition(self.optional_variable, self.optional_value),
            sec_optional: condition(self.sec_optional_variable, self.sec_optional_value),
        })
    }
}

/// The ordered list of catalog rows.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub rows: Vec<CatalogRow>,
}

impl Catalog {
    pub fn new(rows: Vec<CatalogRow>) -> Self {
        Self { rows }
    }

    pub fn from_reader<R: Read>(reader: R) -> CostResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut rows = Vec::new();
        for (i, record) in csv_reader.deserialize::<RawCatalogRow>().enumerate() {
            let raw = record?;
            // Spreadsheet exports often carry fully blank trailing lines.
            if raw.account.as_deref().map(str::trim).unwrap_or("").is_empty()
                && raw.level.as_deref().map(str::trim).unwrap_or("").is_empty()
            {
                continue;
            }
            rows.push(raw.into_row(i + 1)?);
        }
        Ok(Self { rows })
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Ok(Self::from_reader(file)?)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
