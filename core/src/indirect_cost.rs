//! Indirect and annualized cost accounts.
//!
//! Runs after the base-group rollup, once per cost column:
//!   - A31 field indirect costs, A32 supervision
//!   - A75 annualized capital replacement (itemized or flat ratio)
//!   - A82 annualized fuel
//!   - A78 annualized decommissioning

use crate::{
    error::CostResult,
    params::DesignParams,
    table::CostTable,
    types::CostColumn,
};

pub const DAYS_PER_YEAR: f64 = 365.0;
pub const DECOMMISSIONING_RATIO: &str = "A78: CAPEX to Decommissioning Cost Ratio";
pub const DEFAULT_DECOMMISSIONING_RATIO: f64 = 0.15;
pub const MAINTENANCE_RATIO: &str = "Maintenance to Direct Cost Ratio";

/// Itemized replacement: (CAPEX accounts, annualized account).
/// Order matches `ReplacementSchedule::periods_years`.
const REPLACED_COMPONENTS: [(&[&str], &str); 6] = [
    (&["221.12"], "751"),                            // vessel
    (&["221.13"], "752"),                            // core barrel
    (&["221.33"], "753"),                            // moderator block
    (&["221.31"], "754"),                            // reflector
    (&["221.2"], "755"),                             // drums
    (&["222.1", "222.2", "222.3", "222.61"], "756"), // integrated HX
];
const NON_ITEMIZED_REPLACEMENT: &str = "759";

/// Capital Recovery Factor `r(1+r)^p / ((1+r)^p − 1)`.
///
/// Zero for `p == 0` (component never replaced); `1/p` when `r == 0`.
pub fn capital_recovery_factor(rate: f64, period: f64) -> f64 {
    if period == 0.0 {
        return 0.0;
    }
    if rate == 0.0 {
        return 1.0 / period;
    }
    let growth = (1.0 + rate).powf(period);
    rate * growth / (growth - 1.0)
}

/// Converts a future lump sum into equal annual deposits.
pub fn future_value_to_annuity(annual_return: f64, periods: f64) -> f64 {
    -annual_return / (1.0 - (1.0 + annual_return).powf(periods))
}

/// Length of one refueling cycle in years:
/// (fuel lifetime + refueling outage + restart) days / 365.
pub fn refueling_cycle_years(params: &DesignParams) -> CostResult<f64> {
    let days = params.number("Fuel Lifetime")?
        + params.number("Refueling Period")?
        + params.number("Startup Duration after Refueling")?;
    Ok(days / DAYS_PER_YEAR)
}

/// Replacement cycle lengths in years, one per itemized component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplacementSchedule {
    pub periods_years: [f64; 6],
}

impl ReplacementSchedule {
    /// Component periods are given in refueling cycles; the moderator
    /// block is replaced every cycle and the integrated HX defaults to never.
    pub fn from_params(params: &DesignParams, cycle_years: f64) -> CostResult<Self> {
        let cycles = [
            params.number("A75: Vessel Replacement Period (cycles)")?,
            params.number("A75: Core Barrel Replacement Period (cycles)")?,
            1.0,
            params.number("A75: Reflector Replacement Period (cycles)")?,
            params.number("A75: Drum Replacement Period (cycles)")?,
            params.number_or("A75: Integrated HX Replacement Period (cycles)", 0.0)?,
        ];
        Ok(Self {
            periods_years: cycles.map(|c| c * cycle_years),
        })
    }
}

/// Run-constant inputs for the indirect/annualized accounts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnualizationInputs {
    pub indirect_ratio:        f64,
    pub interest_rate:         f64,
    pub maintenance_ratio:     f64,
    pub cycle_years:           f64,
    pub replacement:           Option<ReplacementSchedule>,
    pub annual_return:         f64,
    pub levelization_period:   f64,
    pub decommissioning_ratio: f64,
}

impl AnnualizationInputs {
    /// Itemized replacement is used when any parameter name mentions
    /// "replacement".
    pub fn from_params(params: &DesignParams) -> CostResult<Self> {
        let cycle_years = refueling_cycle_years(params)?;
        let replacement = if params.any_key_contains("replacement") {
            Some(ReplacementSchedule::from_params(params, cycle_years)?)
        } else {
            None
        };
        Ok(Self {
            indirect_ratio: params.number("indirect to direct field-related cost")?,
            interest_rate: params.number("Interest Rate")?,
            maintenance_ratio: params.number(MAINTENANCE_RATIO)?,
            cycle_years,
            replacement,
            annual_return: params.number("Annual Return")?,
            levelization_period: params.number("Levelization Period")?,
            decommissioning_ratio: params
                .number_or(DECOMMISSIONING_RATIO, DEFAULT_DECOMMISSIONING_RATIO)?,
        })
    }
}

/// Accounts 31, 32, 75 (or 751–756 + 759) and 82, for both columns.
pub fn calculate_accounts_31_32_75_82_cost(
    table: &mut CostTable,
    inputs: &AnnualizationInputs,
) -> CostResult<()> {
    for column in CostColumn::BOTH {
        let field_direct = table.sum(&["21", "22", "23"], column);
        let a31 = inputs.indirect_ratio * field_direct;
        table.set_cost("31", column, a31);

        // Supervision scales structures (A21) by the indirect-to-reactor-systems ratio.
        let a21 = table.sum(&["21"], column);
        let a22 = table.sum(&["22"], column);
        let a32 = if a22 == 0.0 {
            log::warn!("Account 22 has zero {} cost; setting Account 32 to 0", column.label());
            0.0
        } else {
            a21 * (a31 / a22)
        };
        table.set_cost("32", column, a32);

        let a20 = table.sum(&["20"], column);
        match &inputs.replacement {
            Some(schedule) => {
                let mut itemized = 0.0;
                for ((accounts, target), period) in
                    REPLACED_COMPONENTS.iter().zip(schedule.periods_years)
                {
                    let capital = table.sum(accounts, column);
                    itemized += capital;
                    let annualized =
                        capital * capital_recovery_factor(inputs.interest_rate, period);
                    table.set_cost(target, column, annualized);
                }
                let other = (a20 - itemized) * inputs.maintenance_ratio;
                table.set_cost(NON_ITEMIZED_REPLACEMENT, column, other);
            }
            None => {
                table.set_cost("75", column, a20 * inputs.maintenance_ratio);
            }
        }

        let lump_fuel = table.sum(&["25"], column);
        let a82 = lump_fuel * capital_recovery_factor(inputs.interest_rate, inputs.cycle_years);
        table.set_cost("82", column, a82);
    }
    Ok(())
}

/// Account 78: decommissioning as a fraction of CAPEX (A10 + A20), saved
/// for as an annuity over the levelization period.
pub fn calculate_decommissioning_cost(
    table: &mut CostTable,
    inputs: &AnnualizationInputs,
) -> CostResult<()> {
    let annuity = future_value_to_annuity(inputs.annual_return, inputs.levelization_period);
    for column in CostColumn::BOTH {
        let capex = table.sum(&["10", "20"], column);
        let future_cost = capex * inputs.decommissioning_ratio;
        table.set_cost("78", column, future_cost * annuity);
    }
    Ok(())
}
