//! Pipeline stage trait and the per-sample stages.
//!
//! RULE: Every per-sample step implements CostStage.
//! The engine applies each registered stage in registration order,
//! once per sample, to that sample's own cost table.
//! Execution order is fixed and documented in engine.rs.

use crate::{
    account_tree::update_high_level_costs,
    capital::{calculate_high_level_capital_costs, calculate_tci},
    engine::PreparedRun,
    error::CostResult,
    indirect_cost::{calculate_accounts_31_32_75_82_cost, calculate_decommissioning_cost},
    lcoe::energy_cost_levelized,
    learning_curve::foak_to_noak,
    rng::SampleRng,
    scaling::{scale_cost, scale_redundant_bop_and_primary_loop},
    table::CostTable,
    types::AccountGroup,
};

/// The contract every pipeline stage must fulfill.
pub trait CostStage: Send + Sync {
    /// Unique stable name for this stage.
    fn name(&self) -> &'static str;

    /// Called once per sample by the engine.
    ///
    /// - `table`: this sample's cost table, mutated in place
    /// - `run`:   run-constant inputs and the frozen parameter snapshot
    /// - `rng`:   this sample's deterministic RNG
    fn apply(&self, table: &mut CostTable, run: &PreparedRun, rng: &mut SampleRng)
        -> CostResult<()>;
}

pub struct ScaleCosts;

impl CostStage for ScaleCosts {
    fn name(&self) -> &'static str { "scale_cost" }

    fn apply(&self, table: &mut CostTable, run: &PreparedRun, rng: &mut SampleRng) -> CostResult<()> {
        scale_cost(table, &run.rows, &run.params, run.settings.sampling_enabled(), rng)
    }
}

pub struct RedundantLoops;

impl CostStage for RedundantLoops {
    fn name(&self) -> &'static str { "scale_redundant_bop_and_primary_loop" }

    fn apply(&self, table: &mut CostTable, run: &PreparedRun, _rng: &mut SampleRng) -> CostResult<()> {
        scale_redundant_bop_and_primary_loop(table, &run.params)
    }
}

pub struct LearningCurve;

impl CostStage for LearningCurve {
    fn name(&self) -> &'static str { "foak_to_noak" }

    fn apply(&self, table: &mut CostTable, run: &PreparedRun, _rng: &mut SampleRng) -> CostResult<()> {
        foak_to_noak(table, &run.rows, &run.params)
    }
}

/// Roll one account group up the tree.
pub struct Rollup(pub AccountGroup);

impl CostStage for Rollup {
    fn name(&self) -> &'static str {
        match self.0 {
            AccountGroup::Base    => "rollup_base",
            AccountGroup::Other   => "rollup_other",
            AccountGroup::Finance => "rollup_finance",
            AccountGroup::Annual  => "rollup_annual",
        }
    }

    fn apply(&self, table: &mut CostTable, _run: &PreparedRun, rng: &mut SampleRng) -> CostResult<()> {
        update_high_level_costs(table, self.0, rng.sample);
        Ok(())
    }
}

pub struct IndirectCosts;

impl CostStage for IndirectCosts {
    fn name(&self) -> &'static str { "accounts_31_32_75_82" }

    fn apply(&self, table: &mut CostTable, run: &PreparedRun, _rng: &mut SampleRng) -> CostResult<()> {
        calculate_accounts_31_32_75_82_cost(table, &run.annualization)
    }
}

pub struct Decommissioning;

impl CostStage for Decommissioning {
    fn name(&self) -> &'static str { "decommissioning" }

    fn apply(&self, table: &mut CostTable, run: &PreparedRun, _rng: &mut SampleRng) -> CostResult<()> {
        calculate_decommissioning_cost(table, &run.annualization)
    }
}

pub struct CapitalCosts;

impl CostStage for CapitalCosts {
    fn name(&self) -> &'static str { "high_level_capital" }

    fn apply(&self, table: &mut CostTable, run: &PreparedRun, _rng: &mut SampleRng) -> CostResult<()> {
        calculate_high_level_capital_costs(table, &run.capital)
    }
}

pub struct TotalCapital;

impl CostStage for TotalCapital {
    fn name(&self) -> &'static str { "tci" }

    fn apply(&self, table: &mut CostTable, run: &PreparedRun, _rng: &mut SampleRng) -> CostResult<()> {
        calculate_tci(table, &run.capital)
    }
}

pub struct Levelized;

impl CostStage for Levelized {
    fn name(&self) -> &'static str { "energy_cost_levelized" }

    fn apply(&self, table: &mut CostTable, run: &PreparedRun, _rng: &mut SampleRng) -> CostResult<()> {
        energy_cost_levelized(table, &run.lcoe)
    }
}
