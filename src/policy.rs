//! Declarative policy evaluation and gating.
//!
//! A condition is a conjunction over a closed set of recognized keys.
//! Matching is a pure fold with early exit on the first failing key; an empty
//! condition is vacuously true, which is the intended escape hatch for
//! always-on informational rules.

use crate::models::{
    AssetContext, GateResult, GateStatus, PolicyAction, PolicyDecision, PolicyRule,
    NO_MATCH_REASON,
};
use serde_json::Value;

/// Condition keys the matcher recognizes. Anything else is ignored with a
/// warning so older engines keep evaluating policy files written for newer
/// ones.
pub const CONDITION_KEYS: [&str; 6] = [
    "classification",
    "exposure",
    "cross_tenant",
    "provider",
    "canonical_type",
    "min_risk",
];

/// Evaluate one rule's condition against an asset context.
pub fn match_condition(condition: &std::collections::BTreeMap<String, Value>, ctx: &AssetContext) -> bool {
    condition.iter().all(|(key, expected)| match key.as_str() {
        "min_risk" => match expected.as_f64() {
            // Meeting the threshold matches; a non-numeric threshold is
            // malformed and never matches.
            Some(min) => f64::from(ctx.risk_0_100) >= min,
            None => false,
        },
        "classification" => expected.as_str() == Some(ctx.classification.label()),
        "exposure" => expected.as_str() == Some(ctx.exposure.label()),
        "cross_tenant" => expected.as_bool() == Some(ctx.cross_tenant),
        "provider" => expected.as_str() == Some(ctx.provider.as_str()),
        "canonical_type" => expected.as_str() == Some(ctx.canonical_type.as_str()),
        other => {
            log::warn!("ignoring unrecognized policy condition key '{other}'");
            true
        }
    })
}

/// Evaluate every rule against one context, preserving rule declaration
/// order. The order of the returned decisions is observable in the serialized
/// evidence and must stay stable.
pub fn evaluate_policies(rules: &[PolicyRule], ctx: &AssetContext) -> Vec<PolicyDecision> {
    rules
        .iter()
        .map(|rule| {
            let matched = match_condition(&rule.condition, ctx);
            PolicyDecision {
                name: rule.name.clone(),
                action: rule.action,
                severity: rule.severity.clone(),
                matched,
                reason: if matched {
                    rule.reason.clone()
                } else {
                    NO_MATCH_REASON.to_string()
                },
            }
        })
        .collect()
}

/// Reduce one asset's decisions to its gate verdict: any matched
/// fail_pipeline fails, else any matched warn warns, else pass.
pub fn gate(decisions: &[PolicyDecision]) -> GateResult {
    let matched: Vec<PolicyDecision> = decisions.iter().filter(|d| d.matched).cloned().collect();

    let status = if matched.iter().any(|d| d.action == PolicyAction::FailPipeline) {
        GateStatus::Fail
    } else if matched.iter().any(|d| d.action == PolicyAction::Warn) {
        GateStatus::Warn
    } else {
        GateStatus::Pass
    };

    GateResult {
        status,
        matched_rules: matched.len(),
        matched,
        total_rules: decisions.len(),
    }
}

/// Reduce per-asset gate statuses to the pipeline-wide verdict. Set-based
/// any/else precedence, so the result is independent of asset order.
pub fn overall_gate<I>(statuses: I) -> GateStatus
where
    I: IntoIterator<Item = GateStatus>,
{
    let mut saw_warn = false;
    for status in statuses {
        match status {
            GateStatus::Fail => return GateStatus::Fail,
            GateStatus::Warn => saw_warn = true,
            GateStatus::Pass => {}
        }
    }
    if saw_warn {
        GateStatus::Warn
    } else {
        GateStatus::Pass
    }
}
