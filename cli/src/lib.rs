//! Command-line front end of the mask evaluation engine.
//!
//! Pairs prediction and ground-truth directories per dataset, evaluates them on the
//! backend selected by cargo features and appends one summary record per dataset.

pub mod backend;
pub mod config;
pub mod evaluation;

pub use config::EvaluationSettings;
pub use evaluation::run_evaluation;
