//! The Monte-Carlo cost engine.
//!
//! PREPARATION (once per run, before any sample):
//!   1. Tax-credit configuration check
//!   2. Escalation to the target dollar year (merges economics parameters)
//!   3. Optional-variable account selection, account tree
//!   4. Learning multipliers and parameter defaults
//!   5. Parameter freeze; run-constant stage inputs derived from the snapshot
//!
//! EXECUTION ORDER (per sample, fixed, documented, never reordered):
//!   1. Scale FOAK costs
//!   2. Redundant primary loop / BoP / purification
//!   3. FOAK → NOAK
//!   4. Rollup: base (1x, 2x)
//!   5. Accounts 31, 32, 75, 82
//!   6. Account 78
//!   7. Rollup: other (3x–5x)
//!   8. OCC and Account 62
//!   9. Rollup: finance (6x)
//!  10. TCI
//!  11. Rollup: annual (7x, 8x)
//!  12. AC and LCOE
//!
//! RULES:
//!   - Stages execute in registration order, every sample.
//!   - Each sample owns its cost table; samples share only read-only inputs.
//!   - Samples never write parameters.
//!   - All randomness flows through the RngBank.

use crate::{
    account_tree::{remove_irrelevant_accounts, AccountTree},
    capital::CapitalInputs,
    config::{
        CostInputs, RunSettings, ANNUAL_ELECTRICITY_PRODUCTION, CAPACITY_FACTOR,
        DEFAULT_TAX_RATE, POWER_MWE, PTC_CREDIT_VALUE, TAX_RATE,
    },
    error::CostResult,
    escalation::{escalate_cost_database, EscalatedRow},
    estimate::{aggregate, CostEstimate},
    indirect_cost::{AnnualizationInputs, DECOMMISSIONING_RATIO, DEFAULT_DECOMMISSIONING_RATIO},
    lcoe::{annual_production_mwh, validate_tax_credits, LcoeInputs},
    learning_curve::prepare_learning_multipliers,
    params::{DesignParams, FrozenParams},
    rng::RngBank,
    stage::{
        CapitalCosts, CostStage, Decommissioning, IndirectCosts, LearningCurve, Levelized,
        RedundantLoops, Rollup, ScaleCosts, TotalCapital,
    },
    table::CostTable,
    types::{AccountGroup, SampleIndex},
};
use rayon::prelude::*;
use std::sync::Arc;

/// Progress is logged every this many samples.
pub const PROGRESS_INTERVAL: u64 = 100;

/// Everything a sample reads. Built once by `CostEngine::prepare`.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub settings:      RunSettings,
    pub rows:          Arc<Vec<EscalatedRow>>,
    pub tree:          Arc<AccountTree>,
    pub params:        FrozenParams,
    pub annualization: AnnualizationInputs,
    pub capital:       CapitalInputs,
    pub lcoe:          LcoeInputs,
}

impl PreparedRun {
    /// A fresh, empty-cost table for one sample.
    pub fn new_table(&self) -> CostTable {
        CostTable::from_escalated(&self.rows, Arc::clone(&self.tree))
    }
}

pub struct CostEngine {
    pub rng_bank: RngBank,
    stages:       Vec<Box<dyn CostStage>>,
}

impl CostEngine {
    pub fn new(seed: u64) -> Self {
        Self {
            rng_bank: RngBank::new(seed),
            stages:   Vec::new(),
        }
    }

    /// Build a fully wired engine with all stages registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(seed: u64) -> Self {
        let mut engine = CostEngine::new(seed);

        // EXECUTION ORDER: fixed and documented. Never reordered.
        engine.register(Box::new(ScaleCosts));
        engine.register(Box::new(RedundantLoops));
        engine.register(Box::new(LearningCurve));
        engine.register(Box::new(Rollup(AccountGroup::Base)));
        engine.register(Box::new(IndirectCosts));
        engine.register(Box::new(Decommissioning));
        engine.register(Box::new(Rollup(AccountGroup::Other)));
        engine.register(Box::new(CapitalCosts));
        engine.register(Box::new(Rollup(AccountGroup::Finance)));
        engine.register(Box::new(TotalCapital));
        engine.register(Box::new(Rollup(AccountGroup::Annual)));
        engine.register(Box::new(Levelized));
        engine
    }

    /// Register a stage. Call in the documented execution order.
    pub fn register(&mut self, stage: Box<dyn CostStage>) {
        self.stages.push(stage);
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every preparation step and freeze the parameter set.
    pub fn prepare(&self, inputs: &CostInputs, mut params: DesignParams) -> CostResult<PreparedRun> {
        validate_tax_credits(&params)?;
        let settings = RunSettings::from_params(&params)?;

        let escalated = escalate_cost_database(
            &inputs.catalog,
            &inputs.inflation,
            &inputs.economics,
            settings.escalation_year,
            &mut params,
        )?;
        // Economics parameters may have introduced a credit.
        validate_tax_credits(&params)?;

        let rows = remove_irrelevant_accounts(escalated, &params);
        let tree = AccountTree::from_levels(rows.iter().map(|r| r.row.level));

        prepare_learning_multipliers(&mut params)?;
        apply_defaults(&mut params)?;

        let params = params.freeze();
        log::debug!(
            "Prepared {} accounts; parameters frozen at revision {}",
            rows.len(),
            params.revision()
        );
        Ok(PreparedRun {
            settings,
            annualization: AnnualizationInputs::from_params(&params)?,
            capital: CapitalInputs::from_params(&params)?,
            lcoe: LcoeInputs::from_params(&params)?,
            rows: Arc::new(rows),
            tree: Arc::new(tree),
            params,
        })
    }

    /// Evaluate one sample on its own table.
    pub fn run_sample(&self, run: &PreparedRun, sample: SampleIndex) -> CostResult<CostTable> {
        if (sample + 1) % PROGRESS_INTERVAL == 0 {
            log::info!("Sample # {}", sample + 1);
        }
        let mut rng = self.rng_bank.for_sample(sample);
        let mut table = run.new_table();
        for stage in &self.stages {
            stage.apply(&mut table, run, &mut rng)?;
        }
        Ok(table)
    }

    /// Run all samples of a prepared run and aggregate them.
    pub fn run_prepared(&self, run: &PreparedRun) -> CostResult<CostEstimate> {
        let tables = (0..run.settings.samples as usize)
            .into_par_iter()
            .map(|sample| self.run_sample(run, sample as SampleIndex))
            .collect::<CostResult<Vec<_>>>()?;
        aggregate(&tables, run.settings.escalation_year, run.params.clone())
    }

    /// Full estimate: prepare once, sample, aggregate.
    pub fn run(&self, inputs: &CostInputs, params: DesignParams) -> CostResult<CostEstimate> {
        let run = self.prepare(inputs, params)?;
        log::info!(
            "Estimating costs in ${} dollars over {} sample(s), seed {}",
            run.settings.escalation_year,
            run.settings.samples,
            self.rng_bank.master_seed()
        );
        log::debug!("Stages: {}", self.stage_names().join(" -> "));
        let estimate = self.run_prepared(&run)?;
        log::info!("Estimate complete: {} accounts", estimate.rows.len());
        Ok(estimate)
    }
}

/// Defaults for parameters the pipeline can do without.
fn apply_defaults(params: &mut DesignParams) -> CostResult<()> {
    if params.set_default(DECOMMISSIONING_RATIO, DEFAULT_DECOMMISSIONING_RATIO) {
        log::debug!("'{DECOMMISSIONING_RATIO}' not given; assuming {DEFAULT_DECOMMISSIONING_RATIO}");
    }
    if params.contains(PTC_CREDIT_VALUE) && params.set_default(TAX_RATE, DEFAULT_TAX_RATE) {
        log::debug!("'{TAX_RATE}' not given; assuming {DEFAULT_TAX_RATE}");
    }
    if let (Some(power), Some(cf)) =
        (params.number_opt(POWER_MWE)?, params.number_opt(CAPACITY_FACTOR)?)
    {
        params.set_default(ANNUAL_ELECTRICITY_PRODUCTION, annual_production_mwh(power, cf));
    }
    Ok(())
}
