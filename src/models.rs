use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single risk-relevant observation emitted by a scanner.
///
/// Findings are read-only downstream: the scoring and gating code only ever
/// consumes `severity` values and counts, never mutates or merges them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub source_file: String,
    pub subject_id: String,
    pub severity: String,
    pub message: String,
    pub evidence: BTreeMap<String, serde_json::Value>,
}

/// Data-sensitivity label assigned to a scanned text unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Public,
    Internal,
    PiiLow,
    PiiHigh,
    Regulated,
}

impl Classification {
    /// Multiplicative risk factor for this sensitivity level.
    pub fn multiplier(self) -> f64 {
        match self {
            Classification::Public => 0.6,
            Classification::Internal => 1.0,
            Classification::PiiLow => 1.3,
            Classification::PiiHigh => 1.7,
            Classification::Regulated => 1.9,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Classification::Public => "public",
            Classification::Internal => "internal",
            Classification::PiiLow => "pii_low",
            Classification::PiiHigh => "pii_high",
            Classification::Regulated => "regulated",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "public" => Some(Classification::Public),
            "internal" => Some(Classification::Internal),
            "pii_low" => Some(Classification::PiiLow),
            "pii_high" => Some(Classification::PiiHigh),
            "regulated" => Some(Classification::Regulated),
            _ => None,
        }
    }
}

/// Multiplier lookup for free-form labels. Unknown labels fall back to 1.0.
pub fn classification_multiplier(label: &str) -> f64 {
    Classification::from_label(label).map_or(1.0, Classification::multiplier)
}

/// Result of classifying one text unit, with the per-signal hit counts that
/// produced the label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub subject_id: String,
    pub classification: Classification,
    pub signals: BTreeMap<String, u32>,
}

/// Directed edge from an invocation source (HTTP, event bus) to a compute
/// target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerEdge {
    pub source: String,
    pub target: String,
    pub meta: BTreeMap<String, String>,
}

/// One asset record as supplied to the pipeline (snapshot input).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    pub asset_id: String,
    pub provider: String,
    pub native_type: String,
    #[serde(default)]
    pub text: String,
}

/// Invocation surface through which an asset's responsible compute is
/// reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exposure {
    Public,
    Event,
}

impl Exposure {
    pub fn label(self) -> &'static str {
        match self {
            Exposure::Public => "public",
            Exposure::Event => "event",
        }
    }
}

/// The per-asset record consumed by policy evaluation. Assembled fresh per
/// asset per run; only ever serialized, never persisted in mutable form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetContext {
    pub asset_id: String,
    pub provider: String,
    pub native_type: String,
    pub canonical_type: String,
    pub tenant: String,
    pub principal: String,
    pub principal_tenant: String,
    pub cross_tenant: bool,
    pub classification: Classification,
    pub exposure: Exposure,
    pub risk_0_100: u8,
}

/// Aggregated base risk from all scanner findings in one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScore {
    pub total: u32,
    pub breakdown: BTreeMap<String, u32>,
    pub normalized_0_100: u8,
}

/// What a matched policy rule does to the pipeline verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyAction {
    #[default]
    Pass,
    Warn,
    FailPipeline,
}

/// Declarative policy rule, externally supplied via YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRule {
    #[serde(default = "default_rule_name")]
    pub name: String,
    #[serde(default)]
    pub condition: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub action: PolicyAction,
    #[serde(default = "default_rule_severity")]
    pub severity: String,
    #[serde(default)]
    pub reason: String,
}

fn default_rule_name() -> String {
    "unnamed".to_string()
}

fn default_rule_severity() -> String {
    "INFO".to_string()
}

/// Outcome of evaluating one rule against one asset context. Immutable once
/// produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub name: String,
    pub action: PolicyAction,
    pub severity: String,
    pub matched: bool,
    pub reason: String,
}

/// Sentinel reason recorded on decisions whose rule did not match.
pub const NO_MATCH_REASON: &str = "no_match";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateStatus {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "WARN")]
    Warn,
    #[serde(rename = "FAIL")]
    Fail,
}

impl std::fmt::Display for GateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateStatus::Pass => write!(f, "PASS"),
            GateStatus::Warn => write!(f, "WARN"),
            GateStatus::Fail => write!(f, "FAIL"),
        }
    }
}

/// Per-asset verdict reduced from that asset's policy decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateResult {
    pub status: GateStatus,
    pub matched: Vec<PolicyDecision>,
    pub total_rules: usize,
    pub matched_rules: usize,
}
