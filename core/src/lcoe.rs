//! Levelized cost of energy.
//!
//! Year 0 carries the full TCI and no generation; years 1..=period carry
//! the annual cost (A70 + A80) and a full year of generation, all
//! discounted at the interest rate.

use crate::{
    capital::{TCI, TCI_ITC},
    config::{
        ANNUAL_ELECTRICITY_PRODUCTION, CAPACITY_FACTOR, INTEREST_RATE, ITC_CREDIT_LEVEL,
        LEVELIZATION_PERIOD, POWER_MWE, PTC_CREDIT_PERIOD, PTC_CREDIT_VALUE, TAX_RATE,
        DEFAULT_TAX_RATE,
    },
    error::{CostError, CostResult},
    params::DesignParams,
    table::CostTable,
    types::CostColumn,
};

pub const HOURS_PER_YEAR: f64 = 8760.0;

pub const AC: &str = "AC";
pub const AC_PER_MWH: &str = "AC per MWh";
pub const LCOE: &str = "LCOE";
pub const LCOE_CAPITAL: &str = "LCOE_cap";
pub const LCOE_OANDM: &str = "LCOE_oandm";
pub const LCOE_FUEL: &str = "LCOE_fuel";
pub const LCOE_WITH_PTC: &str = "LCOE with PTC";
pub const LCOE_ITC: &str = "LCOE (ITC-adjusted)";

pub const DOMESTIC_CONTENT_BONUS: &str = "domestic_content_bonus";
pub const ENERGY_COMMUNITY_BONUS: &str = "energy_community_bonus";

/// ITC and PTC are mutually exclusive, and a PTC needs a credit period.
/// Checked before anything else runs.
pub fn validate_tax_credits(params: &DesignParams) -> CostResult<()> {
    let itc = params.contains(ITC_CREDIT_LEVEL);
    let ptc = params.contains(PTC_CREDIT_VALUE);
    if itc && ptc {
        return Err(CostError::ConflictingTaxCredits);
    }
    if ptc && !params.contains(PTC_CREDIT_PERIOD) {
        return Err(CostError::MissingPtcCreditPeriod);
    }
    Ok(())
}

/// Annual generation in MWh at the rated power and capacity factor.
pub fn annual_production_mwh(power_mwe: f64, capacity_factor: f64) -> f64 {
    power_mwe * capacity_factor * HOURS_PER_YEAR
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtcInputs {
    /// $/MWh.
    pub value:            f64,
    /// Years of generation that earn the credit.
    pub period:           f64,
    pub bonus_multiplier: f64,
    pub tax_rate:         f64,
}

impl PtcInputs {
    pub fn from_params(params: &DesignParams) -> CostResult<Option<Self>> {
        let Some(value) = params.number_opt(PTC_CREDIT_VALUE)? else {
            return Ok(None);
        };
        let period = params
            .number_opt(PTC_CREDIT_PERIOD)?
            .ok_or(CostError::MissingPtcCreditPeriod)?;
        let bonus_multiplier = match (
            params.number_opt(DOMESTIC_CONTENT_BONUS)?,
            params.number_opt(ENERGY_COMMUNITY_BONUS)?,
        ) {
            (Some(domestic), Some(community)) => 1.0 + domestic + community,
            _ => {
                log::warn!("PTC bonus parameters not given; assuming no extra percentage on the credit");
                1.0
            }
        };
        Ok(Some(Self {
            value,
            period,
            bonus_multiplier,
            tax_rate: params.number_or(TAX_RATE, DEFAULT_TAX_RATE)?,
        }))
    }

    /// Before-tax equivalent credit per MWh generated.
    pub fn grossed_up_value(&self) -> f64 {
        self.value * self.bonus_multiplier / (1.0 - self.tax_rate)
    }
}

/// Run-constant inputs for the LCOE stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LcoeInputs {
    pub interest_rate:       f64,
    pub levelization_period: u32,
    /// Discounting basis, MWh per year.
    pub production_mwh:      f64,
    /// Denominator of `AC per MWh`.
    pub annual_electricity:  f64,
    pub ptc:                 Option<PtcInputs>,
    pub itc:                 bool,
}

impl LcoeInputs {
    pub fn from_params(params: &DesignParams) -> CostResult<Self> {
        let production_mwh =
            annual_production_mwh(params.number(POWER_MWE)?, params.number(CAPACITY_FACTOR)?);
        Ok(Self {
            interest_rate: params.number(INTEREST_RATE)?,
            levelization_period: params.number(LEVELIZATION_PERIOD)?.max(0.0) as u32,
            production_mwh,
            annual_electricity: params.number_or(ANNUAL_ELECTRICITY_PRODUCTION, production_mwh)?,
            ptc: PtcInputs::from_params(params)?,
            itc: params.contains(ITC_CREDIT_LEVEL),
        })
    }

    fn discount(&self, year: u32) -> f64 {
        (1.0 + self.interest_rate).powi(year as i32)
    }

    /// Σ production / (1+r)^i over the operating years.
    pub fn discounted_production(&self) -> f64 {
        (1..=self.levelization_period)
            .map(|i| self.production_mwh / self.discount(i))
            .sum()
    }
}

/// LCOE and its capital / O&M / fuel split, $/MWh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LcoeBreakdown {
    pub total:   f64,
    pub capital: f64,
    pub oandm:   f64,
    pub fuel:    f64,
}

pub fn levelized_cost(inputs: &LcoeInputs, capital: f64, oandm: f64, fuel: f64) -> LcoeBreakdown {
    let mut discounted_oandm = 0.0;
    let mut discounted_fuel = 0.0;
    for i in 1..=inputs.levelization_period {
        let d = inputs.discount(i);
        discounted_oandm += oandm / d;
        discounted_fuel += fuel / d;
    }
    let production = inputs.discounted_production();
    LcoeBreakdown {
        total:   (capital + discounted_oandm + discounted_fuel) / production,
        capital: capital / production,
        oandm:   discounted_oandm / production,
        fuel:    discounted_fuel / production,
    }
}

/// Levelized PTC value, $/MWh, to subtract from the LCOE.
pub fn levelized_ptc_credit(inputs: &LcoeInputs, ptc: &PtcInputs) -> f64 {
    let credit_per_mwh = ptc.grossed_up_value();
    let credited: f64 = (1..=inputs.levelization_period)
        .filter(|&i| f64::from(i) <= ptc.period)
        .map(|i| inputs.production_mwh * credit_per_mwh / inputs.discount(i))
        .sum();
    credited / inputs.discounted_production()
}

/// Append AC and LCOE rows and fill them for both columns.
pub fn energy_cost_levelized(table: &mut CostTable, inputs: &LcoeInputs) -> CostResult<()> {
    table.push_summary(AC, "Annualized Cost");
    table.push_summary(AC_PER_MWH, "Annualized Cost per MWh");
    table.push_summary(LCOE, "Levelized Cost Of Energy ($/MWh)");
    table.push_summary(LCOE_CAPITAL, "Levelized Cost Of Energy (capital) ($/MWh)");
    table.push_summary(LCOE_OANDM, "Levelized Cost Of Energy (O&M) ($/MWh)");
    table.push_summary(LCOE_FUEL, "Levelized Cost Of Energy (Fuel) ($/MWh)");
    if inputs.ptc.is_some() {
        table.push_summary(LCOE_WITH_PTC, "Levelized Cost Of Energy with PTC ($/MWh)");
    }
    if inputs.itc {
        table.push_summary(LCOE_ITC, "Levelized Cost Of Energy (ITC-adjusted) ($/MWh)");
    }

    let ptc_credit = inputs.ptc.as_ref().map(|ptc| levelized_ptc_credit(inputs, ptc));

    for column in CostColumn::BOTH {
        let tci = table.cost(TCI, column)?;
        let oandm = table.sum(&["70"], column);
        let fuel = table.sum(&["80"], column);
        let annual = oandm + fuel;
        table.set_cost(AC, column, annual);
        table.set_cost(AC_PER_MWH, column, annual / inputs.annual_electricity);

        let lcoe = levelized_cost(inputs, tci, oandm, fuel);
        table.set_cost(LCOE, column, lcoe.total);
        table.set_cost(LCOE_CAPITAL, column, lcoe.capital);
        table.set_cost(LCOE_OANDM, column, lcoe.oandm);
        table.set_cost(LCOE_FUEL, column, lcoe.fuel);

        if let Some(credit) = ptc_credit {
            table.set_cost(LCOE_WITH_PTC, column, lcoe.total - credit);
        }
        if inputs.itc {
            let tci_itc = table.cost(TCI_ITC, column)?;
            let lcoe_itc = levelized_cost(inputs, tci_itc, oandm, fuel);
            table.set_cost(LCOE_ITC, column, lcoe_itc.total);
        }
    }
    Ok(())
}
