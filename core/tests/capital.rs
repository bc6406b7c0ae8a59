//! OCC, financing, TCI and the Investment Tax Credit.

mod common;

use coa_core::{
    account_tree::AccountTree,
    capital::{
        calculate_high_level_capital_costs, calculate_tci, interest_during_construction,
        itc_reduction_factor, CapitalInputs, OCC, OCC_EXCL_FUEL, OCC_ITC, OCC_PER_KW, TCI,
        TCI_ITC, TCI_PER_KW,
    },
    catalog::Catalog,
    config::EconomicsParameters,
    escalation::escalate_cost_database,
    params::DesignParams,
    table::CostTable,
    types::CostColumn,
};
use common::{close, summary};
use std::f64::consts::PI;
use std::sync::Arc;

fn capital_table() -> CostTable {
    let accounts = [
        ("10", 100.0),
        ("20", 1_000.0),
        ("25", 200.0),
        ("30", 300.0),
        ("40", 40.0),
        ("50", 60.0),
        ("60", 0.0),
        ("62", 0.0),
    ];
    let rows = accounts
        .iter()
        .map(|(a, _)| summary(a, if a.len() == 2 && a.ends_with('0') { 0 } else { 1 }, "Account"))
        .collect();
    let mut params = DesignParams::new();
    let escalated = escalate_cost_database(
        &Catalog::new(rows),
        &common::flat_inflation(),
        &EconomicsParameters::default(),
        2020,
        &mut params,
    )
    .unwrap();
    let tree = Arc::new(AccountTree::from_levels(escalated.iter().map(|r| r.row.level)));
    let mut table = CostTable::from_escalated(&escalated, tree);
    for (idx, (_, cost)) in accounts.iter().enumerate() {
        for column in CostColumn::BOTH {
            table.set_row_cost(idx, column, Some(*cost));
        }
    }
    table
}

fn capital_inputs(itc: Option<f64>) -> CapitalInputs {
    let mut params = common::plant_params();
    if let Some(level) = itc {
        params.set("ITC credit level", level);
    }
    CapitalInputs::from_params(&params).unwrap()
}

#[test]
fn itc_factor_hits_every_breakpoint_exactly() {
    let expected = [(0.0, 1.0), (0.06, 0.95), (0.30, 0.73), (0.40, 0.63), (0.50, 0.53)];
    for (level, factor) in expected {
        assert_eq!(itc_reduction_factor(level), factor, "credit level {level}");
    }
}

#[test]
fn itc_factor_interpolates_between_breakpoints() {
    // 0.95 + (0.73 − 0.95) · (0.20 − 0.06) / (0.30 − 0.06)
    let factor = itc_reduction_factor(0.20);
    let expected = 0.95 + (0.73 - 0.95) * (0.14 / 0.24);
    assert!((factor - expected).abs() < 1e-12, "got {factor}");
    assert!((factor - 0.8217).abs() < 1e-3);
}

#[test]
fn itc_factor_is_clamped_outside_the_table() {
    assert_eq!(itc_reduction_factor(-0.1), 1.0);
    assert_eq!(itc_reduction_factor(0.7), 0.53);
}

#[test]
fn interest_during_construction_formula() {
    let inputs = capital_inputs(None);
    let occ = 1_000_000.0;
    let growth = 1.07f64.ln() * 12.0 / 12.0;
    let b = 1.0 + growth.exp();
    let c = (growth / PI).powi(2) + 1.0;
    let expected = 0.5 * occ * (0.5 * b / c - 1.0);
    assert!(close(interest_during_construction(&inputs, occ), expected));
}

#[test]
fn occ_sums_top_level_capital_accounts() {
    let mut table = capital_table();
    let inputs = capital_inputs(None);
    calculate_high_level_capital_costs(&mut table, &inputs).unwrap();

    for column in CostColumn::BOTH {
        let occ = table.cost(OCC, column).unwrap();
        assert_eq!(occ, 1_500.0);
        assert!(close(table.cost(OCC_PER_KW, column).unwrap(), 1_500.0 / 10_000.0));
        assert_eq!(table.cost(OCC_EXCL_FUEL, column).unwrap(), 1_300.0);
        assert!(close(
            table.cost("62", column).unwrap(),
            interest_during_construction(&inputs, 1_500.0)
        ));
    }
}

#[test]
fn tci_adds_financing_to_occ() {
    let mut table = capital_table();
    let inputs = capital_inputs(None);
    calculate_high_level_capital_costs(&mut table, &inputs).unwrap();
    table.set_cost("60", CostColumn::Foak, 250.0);
    calculate_tci(&mut table, &inputs).unwrap();

    assert_eq!(table.cost(TCI, CostColumn::Foak).unwrap(), 1_750.0);
    assert!(close(table.cost(TCI_PER_KW, CostColumn::Foak).unwrap(), 0.175));
    assert_eq!(table.cost_opt(TCI_ITC, CostColumn::Foak), None, "no ITC rows without a credit level");
}

#[test]
fn itc_reduces_occ_but_not_financing() {
    let mut table = capital_table();
    let inputs = capital_inputs(Some(0.30));
    calculate_high_level_capital_costs(&mut table, &inputs).unwrap();
    table.set_cost("60", CostColumn::Foak, 250.0);
    calculate_tci(&mut table, &inputs).unwrap();

    let occ_itc = table.cost(OCC_ITC, CostColumn::Foak).unwrap();
    assert!(close(occ_itc, 1_500.0 * 0.73));
    assert!(close(table.cost(TCI_ITC, CostColumn::Foak).unwrap(), occ_itc + 250.0));
    assert_eq!(table.cost(TCI, CostColumn::Foak).unwrap(), 1_750.0, "unadjusted TCI kept");
}
