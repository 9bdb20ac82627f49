//! Risk Scoring Module
//!
//! Reduces heterogeneous scanner findings to one bounded base risk score per
//! run, then adjusts it per asset from classification, tenancy and exposure
//! context. All scores are clamped to [0,100]; every lookup has a documented
//! default so this module never fails.

use crate::models::{Classification, Finding, RiskScore};
use std::collections::BTreeMap;

/// Weighted-finding sum treated as the realistic maximum for normalization.
pub const NORMALIZATION_DIVISOR: u32 = 60;

/// Flat penalty applied when the reaching principal belongs to a different
/// tenant than the asset.
pub const CROSS_TENANT_PENALTY: u8 = 12;

/// Nudge applied to canonical types with an elevated invocation surface.
pub const SURFACE_NUDGE: u8 = 5;

/// Map a finding's severity label to its numeric weight.
///
/// Upstream scanners are trusted but not strictly typed, so malformed
/// severities are tolerated and weighted 1 rather than rejected.
pub fn severity_weight(severity: &str) -> u32 {
    match severity {
        "LOW" => 1,
        "MEDIUM" => 3,
        "HIGH" => 6,
        "CRITICAL" => 10,
        _ => 1,
    }
}

fn weighted_sum(findings: &[Finding]) -> u32 {
    findings.iter().map(|f| severity_weight(&f.severity)).sum()
}

/// Aggregate weighted findings per scanner category and normalize the total
/// to a 0-100 scale. Normalization truncates toward the floor and clamps at
/// 100 so the result is deterministic for identical input.
pub fn score_findings(terraform: &[Finding], serverless: &[Finding]) -> RiskScore {
    let mut breakdown = BTreeMap::new();
    breakdown.insert("terraform".to_string(), weighted_sum(terraform));
    breakdown.insert("serverless".to_string(), weighted_sum(serverless));

    let total: u32 = breakdown.values().sum();
    let normalized = ((total * 100) / NORMALIZATION_DIVISOR).min(100) as u8;

    RiskScore {
        total,
        breakdown,
        normalized_0_100: normalized,
    }
}

/// Context-aware risk adjustment for one asset.
///
/// Order matters because each step clamps: classification multiplier first,
/// then the cross-tenant penalty, then the surface nudge. `provider` is
/// accepted for interface stability but does not affect the score yet.
pub fn adjust_risk(
    base_0_100: u8,
    classification: Classification,
    cross_tenant: bool,
    provider: &str,
    canonical_type: &str,
) -> u8 {
    let _ = provider;

    let scaled = (f64::from(base_0_100) * classification.multiplier()).round();
    let mut r = if scaled >= 100.0 { 100u8 } else { scaled.max(0.0) as u8 };

    if cross_tenant {
        r = r.saturating_add(CROSS_TENANT_PENALTY).min(100);
    }

    if matches!(canonical_type, "event_bus" | "api_gateway") {
        r = r.saturating_add(SURFACE_NUDGE).min(100);
    }

    r
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(severity: &str) -> Finding {
        Finding {
            source_file: "demo.tf".to_string(),
            subject_id: "aws_s3_bucket.demo".to_string(),
            severity: severity.to_string(),
            message: "test finding".to_string(),
            evidence: BTreeMap::new(),
        }
    }

    #[test]
    fn test_severity_weights() {
        assert_eq!(severity_weight("LOW"), 1);
        assert_eq!(severity_weight("MEDIUM"), 3);
        assert_eq!(severity_weight("HIGH"), 6);
        assert_eq!(severity_weight("CRITICAL"), 10);
    }

    #[test]
    fn test_severity_weight_unknown_defaults_to_one() {
        assert_eq!(severity_weight("SEVERE"), 1);
        assert_eq!(severity_weight("low"), 1);
        assert_eq!(severity_weight(""), 1);
    }

    #[test]
    fn test_breakdown_sum() {
        // HIGH + CRITICAL + LOW -> 6 + 10 + 1 = 17
        let tf = vec![finding("HIGH"), finding("CRITICAL"), finding("LOW")];
        let rs = score_findings(&tf, &[]);
        assert_eq!(rs.breakdown["terraform"], 17);
        assert_eq!(rs.breakdown["serverless"], 0);
        assert_eq!(rs.total, 17);
        assert_eq!(rs.normalized_0_100, 28); // 1700 / 60 truncated
    }

    #[test]
    fn test_normalization_bounds() {
        let empty = score_findings(&[], &[]);
        assert_eq!(empty.normalized_0_100, 0);

        let heavy: Vec<Finding> = (0..20).map(|_| finding("CRITICAL")).collect();
        let rs = score_findings(&heavy, &heavy);
        assert_eq!(rs.normalized_0_100, 100);
    }

    #[test]
    fn test_normalization_monotonic_in_severity() {
        let lo = score_findings(&[finding("LOW"), finding("MEDIUM")], &[]);
        let hi = score_findings(&[finding("HIGH"), finding("MEDIUM")], &[]);
        assert!(hi.normalized_0_100 >= lo.normalized_0_100);
    }

    #[test]
    fn test_adjust_worked_example() {
        // base 50, regulated (1.9) -> 95; cross-tenant +12 -> 100 clamped;
        // api_gateway +5 -> still 100.
        let r = adjust_risk(50, Classification::Regulated, true, "aws", "api_gateway");
        assert_eq!(r, 100);
    }

    #[test]
    fn test_adjust_stepwise_clamping() {
        let r = adjust_risk(40, Classification::Internal, true, "aws", "event_bus");
        assert_eq!(r, 40 + 12 + 5);

        let r = adjust_risk(40, Classification::Public, false, "gcp", "object_storage");
        assert_eq!(r, 24); // round(40 * 0.6)
    }

    #[test]
    fn test_adjust_always_bounded() {
        for base in [0u8, 1, 50, 99, 100] {
            for cross in [false, true] {
                for ct in ["event_bus", "api_gateway", "object_storage", "unknown"] {
                    let r = adjust_risk(base, Classification::Regulated, cross, "azure", ct);
                    assert!(r <= 100);
                }
            }
        }
    }

    #[test]
    fn test_adjust_ordering_property() {
        // Max-risk context always dominates min-risk context for fixed base.
        for base in [1u8, 10, 50, 90] {
            let hot = adjust_risk(base, Classification::PiiHigh, true, "aws", "event_bus");
            let cold = adjust_risk(base, Classification::Public, false, "aws", "other");
            assert!(hot >= cold);
        }
    }

    #[test]
    fn test_adjust_provider_ignored() {
        let a = adjust_risk(60, Classification::PiiLow, false, "aws", "relational_db");
        let b = adjust_risk(60, Classification::PiiLow, false, "ibm", "relational_db");
        assert_eq!(a, b);
    }
}
