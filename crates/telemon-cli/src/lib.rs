//! Embedding example and operator tooling for the telemon alert engine:
//! configuration loading, the shipped default rule set, and a dry-run
//! evaluator for replaying recorded readings against a rule set.

pub mod config;
pub mod dry_run;
pub mod rule_seed;
