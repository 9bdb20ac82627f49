//! Static scanners over infrastructure-as-code inputs.
//!
//! Intentionally lightweight pattern extraction, not full semantic parsing:
//! the scanners look for risk-relevant patterns and emit `Finding`s; all
//! interpretation happens downstream in scoring and gating.

pub mod serverless;
pub mod terraform;

pub use serverless::scan_serverless_yaml;
pub use terraform::TerraformScanner;
