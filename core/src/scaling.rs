//! Scaling engine: FOAK cost of every directly-costed account.
//!
//! Standard rows use the power law
//!   cost = fixed + unit · value^exponent / ref^(exponent − 1)
//! (or `fixed + unit · value` without a reference value). Nonstandard rows
//! dispatch on their account id to one of a closed set of formulas.
//!
//! With sampling enabled, Fixed/Unit costs and exponents are drawn from their
//! declared distributions once per sample, in that order, row by row.

use crate::{
    catalog::CostEquation,
    distribution::CostDistribution,
    error::{CostError, CostResult},
    escalation::EscalatedRow,
    params::DesignParams,
    rng::SampleRng,
    table::CostTable,
    types::{AccountId, CostColumn},
};

/// Exponent assumed when a row needs one but declares none.
pub const DEFAULT_EXPONENT: f64 = 1.0;

/// Enrichment at or above this is outside the cost correlation's range.
pub const MAX_ENRICHMENT: f64 = 0.2;

/// Correlation used for the primary-loop compressor (account 222.13).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompressorCorrelation {
    /// Multi-loop designs: outlet temperature (K) and compressor power (W).
    LoopPower { outlet_temperature: f64, compressor_power: f64 },
    /// Single-loop fallback from isentropic efficiency and pressure ratio.
    PressureRatio { isentropic_efficiency: f64, pressure_ratio: f64 },
}

/// Account-specific cost formulas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NonstandardFormula {
    /// 222.11, 222.12
    Pump { isentropic_efficiency: f64 },
    /// 222.13
    Compressor(CompressorCorrelation),
    /// 253
    EnrichmentPremium { premium: f64 },
    /// 711
    OnsiteOperators { fte_ratio: f64 },
    /// 712; scales with the inverse of the scaling variable.
    OffsiteOperators { fte_ratio: f64 },
    /// 713
    SecurityStaff { fte_ratio: f64 },
    /// 721; linear in the scaling variable.
    CoolantResupply { annual_frequency: f64 },
    /// 81
    RefuelingOperators { fte_ratio: f64 },
}

/// Premium applied to enriched fuel: 1.0 below 10%, 1.15 below 20%.
pub fn enrichment_premium(enrichment: f64) -> CostResult<f64> {
    if enrichment < 0.1 {
        Ok(1.0)
    } else if enrichment < MAX_ENRICHMENT {
        Ok(1.15)
    } else {
        Err(CostError::EnrichmentTooHigh { enrichment })
    }
}

impl NonstandardFormula {
    /// Pick the formula for `account` and read its coefficients from `params`.
    pub fn resolve(account: &AccountId, params: &DesignParams) -> CostResult<Self> {
        let formula = match account.as_str() {
            "222.11" | "222.12" => Self::Pump {
                isentropic_efficiency: params.number("Pump Isentropic Efficiency")?,
            },
            "222.13" => Self::Compressor(Self::compressor_correlation(params)?),
            "253" => Self::EnrichmentPremium {
                premium: enrichment_premium(params.number("Enrichment")?)?,
            },
            "711" => Self::OnsiteOperators {
                fte_ratio: params.number("FTEs Per Onsite Operator Per Year")?,
            },
            "712" => Self::OffsiteOperators {
                fte_ratio: params.number("FTEs Per Offsite Operator (24/7)")?,
            },
            "713" => Self::SecurityStaff {
                fte_ratio: params.number("FTEs Per Security Staff (24/7)")?,
            },
            "721" => Self::CoolantResupply {
                annual_frequency: params.number("Annual Coolant Supply Frequency")?,
            },
            "81" => Self::RefuelingOperators {
                fte_ratio: params.number("FTEs Per Operator Per Year Per Refueling")?,
            },
            _ => {
                return Err(CostError::UnknownNonstandardAccount {
                    account: account.to_string(),
                })
            }
        };
        Ok(formula)
    }

    fn compressor_correlation(params: &DesignParams) -> CostResult<CompressorCorrelation> {
        if params.contains("Primary Loop Count") {
            return Ok(CompressorCorrelation::LoopPower {
                outlet_temperature: params.number("Primary Loop Outlet Temperature")?,
                compressor_power:   params.number("Primary Loop Compressor Power")?,
            });
        }
        match (
            params.number_opt("Compressor Isentropic Efficiency")?,
            params.number_opt("Compressor Pressure Ratio")?,
        ) {
            (Some(isentropic_efficiency), Some(pressure_ratio)) => {
                Ok(CompressorCorrelation::PressureRatio { isentropic_efficiency, pressure_ratio })
            }
            _ => Err(CostError::CompressorCorrelationUnavailable),
        }
    }

    /// Evaluate the formula. Fixed costs do not enter nonstandard formulas.
    pub fn evaluate(&self, unit_cost: f64, value: f64, exponent: f64) -> f64 {
        let scaled = unit_cost * value.powf(exponent);
        match *self {
            Self::Pump { isentropic_efficiency } => {
                (0.2 / (1.0 - isentropic_efficiency) + 1.0) * scaled
            }
            Self::Compressor(CompressorCorrelation::LoopPower {
                outlet_temperature,
                compressor_power,
            }) => {
                let multiplier = ((outlet_temperature - 273.15) / 650.0).powf(1.29)
                    * (compressor_power / 1e6 / 2.6).powf(0.74);
                multiplier * unit_cost
            }
            Self::Compressor(CompressorCorrelation::PressureRatio {
                isentropic_efficiency,
                pressure_ratio,
            }) => {
                let multiplier =
                    (1.0 / (0.95 - isentropic_efficiency)) * pressure_ratio * pressure_ratio.ln();
                multiplier * scaled
            }
            Self::EnrichmentPremium { premium } => premium * scaled,
            Self::OnsiteOperators { fte_ratio } => fte_ratio * scaled,
            Self::OffsiteOperators { fte_ratio } => {
                fte_ratio * unit_cost * (1.0 / value).powf(exponent)
            }
            Self::SecurityStaff { fte_ratio } => fte_ratio * scaled,
            Self::CoolantResupply { annual_frequency } => annual_frequency * unit_cost * value,
            Self::RefuelingOperators { fte_ratio } => fte_ratio * scaled,
        }
    }
}

/// Standard power-law cost.
pub fn standard_cost(
    fixed: f64,
    unit: f64,
    value: f64,
    exponent: f64,
    reference: Option<f64>,
) -> f64 {
    match reference {
        Some(r) if r > 0.0 => fixed + unit * value.powf(exponent) / r.powf(exponent - 1.0),
        _ => fixed + unit * value,
    }
}

/// Draw (or take nominally) the Fixed, Unit and exponent terms of one row.
fn draw_terms(row: &EscalatedRow, sampling: bool, rng: &mut SampleRng) -> (f64, f64, f64) {
    let catalog = &row.row;
    let adjusted = &row.adjusted;
    let mut draw = |nominal: f64, dist: CostDistribution| {
        if sampling { dist.sample(&mut *rng) } else { nominal }
    };

    let fixed = match adjusted.fixed {
        Some(nominal) => draw(nominal, CostDistribution::for_cost(
            catalog.fixed_cost_distribution,
            nominal,
            adjusted.fixed_low,
            adjusted.fixed_high,
        )),
        None => 0.0,
    };
    let unit = match adjusted.unit {
        Some(nominal) => draw(nominal, CostDistribution::for_cost(
            catalog.unit_cost_distribution,
            nominal,
            adjusted.unit_low,
            adjusted.unit_high,
        )),
        None => 0.0,
    };
    let exponent = match catalog.exponent {
        Some(mean) => draw(mean, CostDistribution::for_exponent(
            catalog.exponent_distribution,
            mean,
            catalog.exponent_std,
            catalog.exponent_min,
            catalog.exponent_max,
        )),
        None => DEFAULT_EXPONENT,
    };
    (fixed, unit, exponent)
}

/// FOAK cost of a single escalated row, or `None` if the row is not costed.
pub fn estimate_row_cost(
    row: &EscalatedRow,
    params: &DesignParams,
    sampling: bool,
    rng: &mut SampleRng,
) -> CostResult<Option<f64>> {
    if !row.is_costed() {
        return Ok(None);
    }
    let catalog = &row.row;
    let value = match &catalog.scaling_variable {
        Some(name) => params.number(name)?,
        None => 0.0,
    };
    let (fixed, unit, exponent) = draw_terms(row, sampling, rng);

    if catalog.scaling_variable.is_some() && value == 0.0 {
        return Ok(Some(0.0));
    }
    let cost = match catalog.equation {
        CostEquation::Standard => {
            standard_cost(fixed, unit, value, exponent, catalog.scaling_variable_ref_value)
        }
        CostEquation::Nonstandard => {
            NonstandardFormula::resolve(&catalog.account, params)?.evaluate(unit, value, exponent)
        }
    };
    Ok(Some(cost))
}

/// Write the FOAK cost of every costed row into `table`.
///
/// `rows` must be the rows `table` was built from, in the same order.
pub fn scale_cost(
    table: &mut CostTable,
    rows: &[EscalatedRow],
    params: &DesignParams,
    sampling: bool,
    rng: &mut SampleRng,
) -> CostResult<()> {
    for (idx, row) in rows.iter().enumerate() {
        if let Some(cost) = estimate_row_cost(row, params, sampling, rng)? {
            table.set_row_cost(idx, CostColumn::Foak, Some(cost));
        }
    }
    Ok(())
}

/// Multiply primary-loop, balance-of-plant and purification FOAK costs by
/// their redundancy counts, when the design declares them.
pub fn scale_redundant_bop_and_primary_loop(
    table: &mut CostTable,
    params: &DesignParams,
) -> CostResult<()> {
    if let Some(loops) = params.number_opt("Primary Loop Count")? {
        table.scale_where(CostColumn::Foak, loops, |a| a.starts_with("222"));
    }
    if let Some(bop) = params.number_opt("BoP Count")? {
        table.scale_where(CostColumn::Foak, bop, |a| a.starts_with("232"));
        // BoP building, one CONEX container per BoP loop.
        table.scale_where(CostColumn::Foak, bop, |a| a.starts_with("213.1"));
    }
    if let Some(purification) = params.number_opt("Primary Loop Purification")? {
        let flag = purification.trunc();
        table.scale_where(CostColumn::Foak, flag, |a| a.as_str() == "226");
    }
    Ok(())
}
