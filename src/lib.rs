//! Postura
//!
//! A posture-assessment pipeline for cloud infrastructure-as-code: scans
//! declarative infrastructure for risk-relevant patterns, normalizes findings
//! into a provider-agnostic asset model, computes context-aware risk scores,
//! evaluates declarative policies and emits a tamper-evident evidence bundle.

pub mod classification;
pub mod cli;
pub mod context;
pub mod destroy;
pub mod errors;
pub mod evidence;
pub mod graph;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod policy;
pub mod risk;
pub mod scanner;
pub mod tenancy;

pub use errors::{PosturaError, PosturaResult};
pub use pipeline::{run_pipeline, PipelineReport, RunPaths};
