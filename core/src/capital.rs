//! Capital aggregation: OCC, financing (Account 62) and TCI, with the
//! optional Investment Tax Credit adjustment.

use crate::{
    config::{ITC_CREDIT_LEVEL, INTEREST_RATE, POWER_MWE},
    error::CostResult,
    params::DesignParams,
    table::CostTable,
    types::CostColumn,
};
use std::f64::consts::PI;

pub const OCC: &str = "OCC";
pub const OCC_PER_KW: &str = "OCC per kW";
pub const OCC_EXCL_FUEL: &str = "OCC excl. fuel";
pub const OCC_EXCL_FUEL_PER_KW: &str = "OCC excl. fuel per kW";
pub const TCI: &str = "TCI";
pub const TCI_PER_KW: &str = "TCI per kW";
pub const OCC_ITC: &str = "OCC (ITC-adjusted)";
pub const OCC_ITC_PER_KW: &str = "OCC (ITC-adjusted) per kW";
pub const TCI_ITC: &str = "TCI (ITC-adjusted)";
pub const TCI_ITC_PER_KW: &str = "TCI (ITC-adjusted) per kW";

/// Top-level capital accounts summed into OCC.
const OCC_ACCOUNTS: [&str; 5] = ["10", "20", "30", "40", "50"];

/// (credit level, OCC reduction factor), ascending by level.
const ITC_BREAKPOINTS: [(f64, f64); 5] = [
    (0.00, 1.00),
    (0.06, 0.95),
    (0.30, 0.73),
    (0.40, 0.63),
    (0.50, 0.53),
];

/// Run-constant inputs for capital aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapitalInputs {
    pub power_kwe:             f64,
    pub interest_rate:         f64,
    /// Months.
    pub construction_duration: f64,
    pub debt_to_equity:        f64,
    pub itc_credit_level:      Option<f64>,
}

impl CapitalInputs {
    pub fn from_params(params: &DesignParams) -> CostResult<Self> {
        Ok(Self {
            power_kwe: 1000.0 * params.number(POWER_MWE)?,
            interest_rate: params.number(INTEREST_RATE)?,
            construction_duration: params.number("Construction Duration")?,
            debt_to_equity: params.number("Debt To Equity Ratio")?,
            itc_credit_level: params.number_opt(ITC_CREDIT_LEVEL)?,
        })
    }
}

/// Interest during construction (Account 62):
/// `D/E · OCC · (0.5·B/C − 1)`.
pub fn interest_during_construction(inputs: &CapitalInputs, occ: f64) -> f64 {
    let growth = (1.0 + inputs.interest_rate).ln() * inputs.construction_duration / 12.0;
    let b = 1.0 + growth.exp();
    let c = (growth / PI).powi(2) + 1.0;
    inputs.debt_to_equity * occ * (0.5 * b / c - 1.0)
}

/// OCC reduction factor for an ITC credit level, linearly interpolated
/// between breakpoints and clamped outside them.
pub fn itc_reduction_factor(credit_level: f64) -> f64 {
    let (first_level, first_factor) = ITC_BREAKPOINTS[0];
    if credit_level <= first_level {
        return first_factor;
    }
    for pair in ITC_BREAKPOINTS.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if credit_level == x1 {
            return y1;
        }
        if credit_level < x1 {
            return y0 + (y1 - y0) * (credit_level - x0) / (x1 - x0);
        }
    }
    ITC_BREAKPOINTS[ITC_BREAKPOINTS.len() - 1].1
}

/// Append the OCC summary rows and write Account 62.
pub fn calculate_high_level_capital_costs(
    table: &mut CostTable,
    inputs: &CapitalInputs,
) -> CostResult<()> {
    table.push_summary(OCC, "Overnight Capital Cost");
    table.push_summary(OCC_PER_KW, "Overnight Capital Cost per kW");
    table.push_summary(OCC_EXCL_FUEL, "Overnight Capital Cost Excluding Fuel");
    table.push_summary(OCC_EXCL_FUEL_PER_KW, "Overnight Capital Cost Excluding Fuel per kW");

    for column in CostColumn::BOTH {
        let occ = table.sum(&OCC_ACCOUNTS, column);
        table.set_cost(OCC, column, occ);
        table.set_cost(OCC_PER_KW, column, occ / inputs.power_kwe);

        let excl_fuel = occ - table.sum(&["25"], column);
        table.set_cost(OCC_EXCL_FUEL, column, excl_fuel);
        table.set_cost(OCC_EXCL_FUEL_PER_KW, column, excl_fuel / inputs.power_kwe);

        table.set_cost("62", column, interest_during_construction(inputs, occ));
    }
    Ok(())
}

/// Append the TCI rows (and ITC-adjusted OCC/TCI when a credit level is set).
/// Financing (Account 60) must already be rolled up.
pub fn calculate_tci(table: &mut CostTable, inputs: &CapitalInputs) -> CostResult<()> {
    table.push_summary(TCI, "Total Capital Investment");
    table.push_summary(TCI_PER_KW, "Total Capital Investment per kW");
    if inputs.itc_credit_level.is_some() {
        table.push_summary(OCC_ITC, "Overnight Capital Cost (ITC-adjusted)");
        table.push_summary(OCC_ITC_PER_KW, "Overnight Capital Cost (ITC-adjusted) per kW");
        table.push_summary(TCI_ITC, "Total Capital Investment (ITC-adjusted)");
        table.push_summary(TCI_ITC_PER_KW, "Total Capital Investment (ITC-adjusted) per kW");
    }

    for column in CostColumn::BOTH {
        let occ = table.cost(OCC, column)?;
        let financing = table.sum(&["60"], column);
        let tci = occ + financing;
        table.set_cost(TCI, column, tci);
        table.set_cost(TCI_PER_KW, column, tci / inputs.power_kwe);

        if let Some(level) = inputs.itc_credit_level {
            // Financing is not reduced by the credit.
            let occ_itc = occ * itc_reduction_factor(level);
            let tci_itc = occ_itc + financing;
            table.set_cost(OCC_ITC, column, occ_itc);
            table.set_cost(OCC_ITC_PER_KW, column, occ_itc / inputs.power_kwe);
            table.set_cost(TCI_ITC, column, tci_itc);
            table.set_cost(TCI_ITC_PER_KW, column, tci_itc / inputs.power_kwe);
        }
    }
    Ok(())
}
