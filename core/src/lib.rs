pub mod account_tree;
pub mod capital;
pub mod catalog;
pub mod config;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod escalation;
pub mod estimate;
pub mod indirect_cost;
pub mod lcoe;
pub mod learning_curve;
pub mod params;
pub mod report;
pub mod rng;
pub mod scaling;
pub mod stage;
pub mod table;
pub mod types;
