//! THE MOST IMPORTANT TEST IN THE PROJECT.
//!
//! Two engines, same seed, same inputs.
//! They must produce bit-identical estimates, however rayon schedules
//! the samples. Any divergence is a blocker; do not merge until fixed.

mod common;

use coa_core::{
    catalog::CatalogRow,
    engine::CostEngine,
    estimate::CostEstimate,
    types::CostColumn,
};
use common::{plant_params, plant_rows, uncertain};

fn uncertain_plant() -> Vec<CatalogRow> {
    let mut rows = plant_rows();
    rows[1] = uncertain("11", 1, "Land and Land Rights", 1_000.0, "No Learning");
    rows[3] = uncertain("21", 1, "Structures and Improvements", 5_000.0, "Factory Other");
    rows[5] = uncertain("221.12", 2, "Vessel", 2_000.0, "Factory Primary Structure");
    rows
}

fn run(seed: u64, samples: i32) -> CostEstimate {
    let mut params = plant_params();
    params.set("Number of Samples", samples);
    CostEngine::build(seed)
        .run(&common::inputs(uncertain_plant()), params)
        .expect("estimate")
}

fn cells(estimate: &CostEstimate) -> Vec<(String, [u64; 4])> {
    estimate
        .rows
        .iter()
        .map(|r| {
            (
                r.account.to_string(),
                [r.foak, r.noak, r.foak_std, r.noak_std].map(f64::to_bits),
            )
        })
        .collect()
}

#[test]
fn same_seed_produces_identical_estimates() {
    const SEED: u64 = 0xDEAD_BEEF_CAFE_1234;

    let a = cells(&run(SEED, 64));
    let b = cells(&run(SEED, 64));

    assert_eq!(a.len(), b.len(), "Row counts differ: {} vs {}", a.len(), b.len());
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        assert_eq!(x, y, "Estimate diverged at row {i}:\n  A: {x:?}\n  B: {y:?}");
    }
}

#[test]
fn different_seeds_produce_different_estimates() {
    let a = run(42, 16);
    let b = run(99, 16);

    // The lognormal leaves make the seed observable in every summary row.
    let occ_a = a.cost("OCC", CostColumn::Foak).unwrap();
    let occ_b = b.cost("OCC", CostColumn::Foak).unwrap();
    assert_ne!(occ_a, occ_b, "Different seeds produced identical OCC; seed is not being used");
}

#[test]
fn single_sample_ignores_distributions() {
    let a = run(1, 1);
    let b = run(2, 1);
    assert_eq!(cells(&a), cells(&b), "one sample must use nominal costs");
    assert_eq!(a.cost("21", CostColumn::Foak), Some(5_000.0));
}
