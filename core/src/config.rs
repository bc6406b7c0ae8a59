use crate::{
    catalog::Catalog,
    error::{CostError, CostResult},
    escalation::InflationTable,
    params::{DesignParams, ParamValue},
};
use serde::Deserialize;
use std::io::Read;

pub const CATALOG_FILE: &str = "cost_database.csv";
pub const INFLATION_FILE: &str = "inflation.csv";
pub const ECONOMICS_FILE: &str = "economics_parameters.csv";
pub const PARAMS_FILE: &str = "params.json";

// ── Well-known parameter names ─────────────────────────────────────

pub const ESCALATION_YEAR: &str = "Escalation Year";
pub const NUMBER_OF_SAMPLES: &str = "Number of Samples";
pub const INTEREST_RATE: &str = "Interest Rate";
pub const LEVELIZATION_PERIOD: &str = "Levelization Period";
pub const POWER_MWE: &str = "Power MWe";
pub const CAPACITY_FACTOR: &str = "Capacity Factor";
pub const ANNUAL_ELECTRICITY_PRODUCTION: &str = "Annual Electricity Production";
pub const ITC_CREDIT_LEVEL: &str = "ITC credit level";
pub const PTC_CREDIT_VALUE: &str = "PTC credit value";
pub const PTC_CREDIT_PERIOD: &str = "PTC credit period";
pub const TAX_RATE: &str = "Tax Rate";
pub const DEFAULT_TAX_RATE: f64 = 0.21;

/// `Parameter, Value` rows from the auxiliary economics table.
#[derive(Debug, Clone, Default)]
pub struct EconomicsParameters {
    pub entries: Vec<(String, ParamValue)>,
}

#[derive(Debug, Deserialize)]
struct RawEconomicsRow {
    #[serde(rename = "Parameter")]
    parameter: Option<String>,
    #[serde(rename = "Value")]
    value: Option<String>,
}

fn parse_cell(raw: &str) -> ParamValue {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<f64>() {
        return ParamValue::Number(v);
    }
    match raw.to_ascii_lowercase().as_str() {
        "true"  => ParamValue::Bool(true),
        "false" => ParamValue::Bool(false),
        _ => ParamValue::Text(raw.to_string()),
    }
}

impl EconomicsParameters {
    pub fn from_reader<R: Read>(reader: R) -> CostResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut entries = Vec::new();
        for record in csv_reader.deserialize::<RawEconomicsRow>() {
            let raw = record?;
            let Some(name) = raw.parameter.filter(|p| !p.is_empty()) else {
                continue;
            };
            let Some(value) = raw.value.filter(|v| !v.is_empty()) else {
                continue;
            };
            entries.push((name, parse_cell(&value)));
        }
        Ok(Self { entries })
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Ok(Self::from_reader(file)?)
    }
}

/// Everything the estimate reads from disk, apart from the design parameters.
#[derive(Debug, Clone, Default)]
pub struct CostInputs {
    pub catalog:   Catalog,
    pub inflation: InflationTable,
    pub economics: EconomicsParameters,
}

impl CostInputs {
    /// Load the catalog, inflation table and economics parameters from `data_dir`.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let catalog = Catalog::load(&format!("{data_dir}/{CATALOG_FILE}"))?;
        let inflation = InflationTable::load(&format!("{data_dir}/{INFLATION_FILE}"))?;

        // The economics table is optional; every key it carries can also be
        // supplied directly in the design parameters.
        let economics_path = format!("{data_dir}/{ECONOMICS_FILE}");
        let economics = if std::path::Path::new(&economics_path).exists() {
            EconomicsParameters::load(&economics_path)?
        } else {
            log::info!("No {ECONOMICS_FILE} in {data_dir}; using design parameters only");
            EconomicsParameters::default()
        };

        log::info!(
            "Loaded {} catalog rows from {data_dir}",
            catalog.len()
        );
        Ok(Self { catalog, inflation, economics })
    }

    /// Load inputs plus `params.json` from the same directory.
    pub fn load_with_params(data_dir: &str) -> anyhow::Result<(Self, DesignParams)> {
        let inputs = Self::load(data_dir)?;
        let params = DesignParams::load(&format!("{data_dir}/{PARAMS_FILE}"))?;
        Ok((inputs, params))
    }
}

/// Run-wide settings read from the parameter set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSettings {
    pub escalation_year: i32,
    pub samples:         u64,
}

impl RunSettings {
    pub fn from_params(params: &DesignParams) -> CostResult<Self> {
        let escalation_year = params.number(ESCALATION_YEAR)? as i32;
        let samples = params.number_or(NUMBER_OF_SAMPLES, 1.0)?;
        if samples < 1.0 {
            return Err(CostError::Other(anyhow::anyhow!(
                "'{NUMBER_OF_SAMPLES}' must be at least 1, got {samples}"
            )));
        }
        Ok(Self {
            escalation_year,
            samples: samples as u64,
        })
    }

    /// Monte-Carlo sampling is active only with more than one sample.
    pub fn sampling_enabled(&self) -> bool {
        self.samples > 1
    }
}
