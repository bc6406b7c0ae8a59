//! Indirect, replacement, fuel and decommissioning accounts.

mod common;

use coa_core::{
    account_tree::AccountTree,
    catalog::{Catalog, CatalogRow},
    config::EconomicsParameters,
    escalation::escalate_cost_database,
    indirect_cost::{
        calculate_accounts_31_32_75_82_cost, calculate_decommissioning_cost,
        capital_recovery_factor, future_value_to_annuity, refueling_cycle_years,
        AnnualizationInputs,
    },
    params::DesignParams,
    table::CostTable,
    types::CostColumn,
};
use common::{close, summary};
use std::sync::Arc;

/// Table with FOAK costs set directly on the listed accounts.
fn table_with(accounts: &[(&str, u8, Option<f64>)]) -> CostTable {
    let rows: Vec<CatalogRow> = accounts
        .iter()
        .map(|(account, level, _)| summary(account, *level, "Account"))
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
    for (idx, (_, _, cost)) in accounts.iter().enumerate() {
        table.set_row_cost(idx, CostColumn::Foak, *cost);
        table.set_row_cost(idx, CostColumn::Noak, cost.map(|c| c / 2.0));
    }
    table
}

fn direct_costs() -> CostTable {
    table_with(&[
        ("10", 0, Some(1_000.0)),
        ("20", 0, Some(10_000.0)),
        ("21", 1, Some(2_000.0)),
        ("22", 1, Some(5_000.0)),
        ("221.12", 2, Some(1_000.0)),
        ("221.13", 2, Some(500.0)),
        ("221.2", 2, Some(800.0)),
        ("222.1", 2, Some(300.0)),
        ("222.2", 2, Some(200.0)),
        ("23", 1, Some(1_000.0)),
        ("25", 1, Some(2_000.0)),
        ("31", 1, None),
        ("32", 1, None),
        ("75", 1, None),
        ("751", 2, None),
        ("752", 2, None),
        ("753", 2, None),
        ("754", 2, None),
        ("755", 2, None),
        ("756", 2, None),
        ("759", 2, None),
        ("78", 1, None),
        ("82", 1, None),
    ])
}

fn inputs(replacement: bool) -> AnnualizationInputs {
    let mut params = common::plant_params();
    if replacement {
        params.set("A75: Vessel Replacement Period (cycles)", 2);
        params.set("A75: Core Barrel Replacement Period (cycles)", 1);
        params.set("A75: Reflector Replacement Period (cycles)", 3);
        params.set("A75: Drum Replacement Period (cycles)", 0);
    }
    AnnualizationInputs::from_params(&params).unwrap()
}

#[test]
fn crf_is_zero_for_a_zero_period() {
    for rate in [0.0, 0.03, 0.07, 0.5] {
        assert_eq!(capital_recovery_factor(rate, 0.0), 0.0);
    }
}

#[test]
fn crf_matches_the_annuity_factor() {
    for (rate, period) in [(0.07_f64, 10.0_f64), (0.03, 30.0), (0.1, 1.0), (0.05, 2.5)] {
        let annuity = rate / (1.0 - (1.0 + rate).powf(-period));
        let crf = capital_recovery_factor(rate, period);
        assert!(close(crf, annuity), "CRF({rate}, {period}) = {crf}, expected {annuity}");
    }
}

#[test]
fn crf_without_interest_spreads_evenly() {
    assert!(close(capital_recovery_factor(0.0, 4.0), 0.25));
}

#[test]
fn one_period_crf_repays_principal_plus_interest() {
    assert!(close(capital_recovery_factor(0.07, 1.0), 1.07));
}

#[test]
fn refueling_cycle_is_measured_in_years() {
    let mut params = DesignParams::new();
    params.set("Fuel Lifetime", 700);
    params.set("Refueling Period", 20);
    params.set("Startup Duration after Refueling", 10);
    assert!(close(refueling_cycle_years(&params).unwrap(), 2.0));
}

#[test]
fn indirect_and_supervision_accounts() {
    let mut table = direct_costs();
    calculate_accounts_31_32_75_82_cost(&mut table, &inputs(false)).unwrap();

    // 0.1 · (2000 + 5000 + 1000)
    assert!(close(table.cost("31", CostColumn::Foak).unwrap(), 800.0));
    // 2000 · 800 / 5000
    assert!(close(table.cost("32", CostColumn::Foak).unwrap(), 320.0));
    assert!(close(table.cost("31", CostColumn::Noak).unwrap(), 400.0));
    assert!(close(table.cost("32", CostColumn::Noak).unwrap(), 160.0));
}

#[test]
fn supervision_is_zero_without_reactor_systems() {
    let mut table = table_with(&[
        ("21", 1, Some(2_000.0)),
        ("22", 1, Some(0.0)),
        ("31", 1, None),
        ("32", 1, None),
    ]);
    calculate_accounts_31_32_75_82_cost(&mut table, &inputs(false)).unwrap();
    assert_eq!(table.cost("32", CostColumn::Foak).unwrap(), 0.0);
}

#[test]
fn flat_maintenance_ratio_without_replacement_schedule() {
    let mut table = direct_costs();
    calculate_accounts_31_32_75_82_cost(&mut table, &inputs(false)).unwrap();

    assert!(close(table.cost("75", CostColumn::Foak).unwrap(), 10_000.0 * 0.015));
    assert_eq!(table.cost_opt("751", CostColumn::Foak), Some(None));
}

#[test]
fn itemized_replacement_uses_component_cycles() {
    let mut table = direct_costs();
    let inputs = inputs(true);
    calculate_accounts_31_32_75_82_cost(&mut table, &inputs).unwrap();

    // Fuel lifetime 3650 days: one cycle is 10 years.
    let r = 0.07;
    let cost = |a: &str| table.cost(a, CostColumn::Foak).unwrap();
    assert!(close(cost("751"), 1_000.0 * capital_recovery_factor(r, 20.0)));
    assert!(close(cost("752"), 500.0 * capital_recovery_factor(r, 10.0)));
    assert_eq!(cost("753"), 0.0, "no moderator block in this plant");
    assert_eq!(cost("755"), 0.0, "drums are never replaced");
    assert_eq!(cost("756"), 0.0, "integrated HX defaults to never");
    // Non-itemized: (10000 − 1000 − 500 − 800 − 300 − 200) · 0.015
    assert!(close(cost("759"), 7_200.0 * 0.015));
    assert_eq!(table.cost_opt("75", CostColumn::Foak), Some(None), "left for rollup");
}

#[test]
fn annualized_fuel_recovers_the_inventory_each_cycle() {
    let mut table = direct_costs();
    calculate_accounts_31_32_75_82_cost(&mut table, &inputs(false)).unwrap();
    let expected = 2_000.0 * capital_recovery_factor(0.07, 10.0);
    assert!(close(table.cost("82", CostColumn::Foak).unwrap(), expected));
}

#[test]
fn decommissioning_defaults_to_fifteen_percent_of_capex() {
    let mut table = direct_costs();
    calculate_decommissioning_cost(&mut table, &inputs(false)).unwrap();

    let annuity = future_value_to_annuity(0.0475, 60.0);
    let expected = 11_000.0 * 0.15 * annuity;
    assert!(close(table.cost("78", CostColumn::Foak).unwrap(), expected));
    assert!(annuity > 0.0 && annuity < 1.0 / 60.0, "sinking-fund factor {annuity}");
}

#[test]
fn decommissioning_ratio_can_be_overridden() {
    let mut params = common::plant_params();
    params.set("A78: CAPEX to Decommissioning Cost Ratio", 0.3);
    let inputs = AnnualizationInputs::from_params(&params).unwrap();
    assert_eq!(inputs.decommissioning_ratio, 0.3);
}
