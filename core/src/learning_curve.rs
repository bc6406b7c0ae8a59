//! FOAK → NOAK learning-curve adjustment (Wright's law).
//!
//! Each catalog row carries a learning tag. The tag's rate parameter gives
//! a cost multiplier `(1 − rate)^log2(units)`, with learning assumed to
//! plateau after the 100th unit.

use crate::{
    error::{CostError, CostResult},
    escalation::EscalatedRow,
    params::DesignParams,
    table::CostTable,
    types::CostColumn,
};

pub const NOAK_UNIT_NUMBER: &str = "NOAK Unit Number";
pub const DEFAULT_NOAK_UNIT_NUMBER: f64 = 10.0;
pub const ONSITE_LEARNING_UNITS: &str = "Assumed Number Of Units For Onsite Learning";
pub const ONSITE_LEARNING: &str = "Onsite Learning";

/// Units after which no further learning is assumed.
pub const LEARNING_PLATEAU_UNITS: f64 = 100.0;

/// Tags whose multiplier uses the NOAK unit number directly.
pub const FACTORY_LEARNING_TAGS: [&str; 8] = [
    "No Learning",
    "Licensing Learning",
    "Factory Primary Structure",
    "Factory Drums",
    "Factory Other",
    "Factory Be",
    "Factory BeO",
    "Non-nuclear off-the-shelf",
];

pub fn learning_rate_multiplier(learning_rate: f64, number_of_units: f64) -> f64 {
    (1.0 - learning_rate).powf(number_of_units.min(LEARNING_PLATEAU_UNITS).log2())
}

fn multiplier_key(tag: &str) -> String {
    format!("{tag} Cost Multiplier")
}

fn is_learning_tag(tag: &str) -> bool {
    tag == ONSITE_LEARNING || FACTORY_LEARNING_TAGS.contains(&tag)
}

/// Write `NOAK Unit Number` (default 10), the onsite-learning unit count
/// and a `<tag> Cost Multiplier` for every tag whose rate is configured.
pub fn prepare_learning_multipliers(params: &mut DesignParams) -> CostResult<()> {
    if params.set_default(NOAK_UNIT_NUMBER, DEFAULT_NOAK_UNIT_NUMBER) {
        log::debug!("'{NOAK_UNIT_NUMBER}' not given; assuming {DEFAULT_NOAK_UNIT_NUMBER}");
    }
    let noak_units = params.number(NOAK_UNIT_NUMBER)?;
    let onsite_units = 2.0 * noak_units;
    params.set(ONSITE_LEARNING_UNITS, onsite_units);

    for tag in FACTORY_LEARNING_TAGS {
        if let Some(rate) = params.number_opt(tag)? {
            params.set(multiplier_key(tag), learning_rate_multiplier(rate, noak_units));
        }
    }
    if let Some(rate) = params.number_opt(ONSITE_LEARNING)? {
        params.set(multiplier_key(ONSITE_LEARNING), learning_rate_multiplier(rate, onsite_units));
    }
    Ok(())
}

/// Fill the NOAK column from FOAK costs and each row's tag multiplier.
///
/// Untagged rows, rows with an unrecognised tag and rows without a FOAK
/// cost get an empty NOAK cell; rollup fills those later.
pub fn foak_to_noak(
    table: &mut CostTable,
    rows: &[EscalatedRow],
    params: &DesignParams,
) -> CostResult<()> {
    for (idx, row) in rows.iter().enumerate() {
        let multiplier = match row.row.learning_tag.as_deref() {
            Some(tag) if is_learning_tag(tag) => {
                let key = multiplier_key(tag);
                Some(params.number(&key).map_err(|_| CostError::ParameterNotFound {
                    name: tag.to_string(),
                })?)
            }
            _ => None,
        };
        let foak = table.row(idx).foak;
        let noak = foak.zip(multiplier).map(|(cost, m)| cost * m);
        table.set_row_cost(idx, CostColumn::Noak, noak);
    }
    Ok(())
}
