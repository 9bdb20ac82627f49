//! Serverless manifest scanner.
//!
//! Parses a `serverless.yml` document and flags trigger-surface, secret
//! leakage, logging and VPC-attachment patterns per function. Function order
//! is sorted by name so the finding list is stable across runs.

use crate::errors::{PosturaError, PosturaResult};
use crate::models::Finding;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
struct ServerlessDoc {
    #[serde(default)]
    provider: ProviderBlock,
    #[serde(default)]
    functions: BTreeMap<String, FunctionBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderBlock {
    #[serde(default)]
    logs: Option<serde_yaml::Value>,
    #[serde(default)]
    vpc: Option<serde_yaml::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct FunctionBlock {
    #[serde(default)]
    events: Vec<serde_yaml::Value>,
    #[serde(default)]
    environment: BTreeMap<String, serde_yaml::Value>,
    #[serde(default)]
    vpc: Option<serde_yaml::Value>,
}

fn event_has_key(event: &serde_yaml::Value, keys: &[&str]) -> bool {
    match event.as_mapping() {
        Some(map) => map
            .keys()
            .filter_map(|k| k.as_str())
            .any(|k| keys.contains(&k)),
        None => false,
    }
}

fn finding(
    path: &Path,
    function: &str,
    severity: &str,
    message: &str,
    evidence: BTreeMap<String, serde_json::Value>,
) -> Finding {
    Finding {
        source_file: path.display().to_string(),
        subject_id: function.to_string(),
        severity: severity.to_string(),
        message: message.to_string(),
        evidence,
    }
}

/// Scan one serverless manifest for risk-relevant patterns.
pub fn scan_serverless_yaml(path: &Path) -> PosturaResult<Vec<Finding>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| PosturaError::io(e, Some(path.to_path_buf())))?;
    let doc: ServerlessDoc =
        serde_yaml::from_str(&text).map_err(|e| PosturaError::yaml(e, path))?;

    let provider_logs = doc.provider.logs.as_ref().filter(|v| !v.is_null());
    let provider_vpc = doc.provider.vpc.as_ref().filter(|v| !v.is_null());

    let mut findings = Vec::new();
    for (fn_name, fun) in &doc.functions {
        for event in &fun.events {
            if event_has_key(event, &["http", "httpApi"]) {
                let ev = serde_json::to_value(event).unwrap_or_default();
                findings.push(finding(
                    path,
                    fn_name,
                    "HIGH",
                    "HTTP-triggered function: treat as public invocation surface unless tightly authz-gated",
                    BTreeMap::from([("event".to_string(), ev)]),
                ));
            }
            if event_has_key(event, &["s3", "sqs", "eventBridge"]) {
                let ev = serde_json::to_value(event).unwrap_or_default();
                findings.push(finding(
                    path,
                    fn_name,
                    "MEDIUM",
                    "Event-triggered function: ensure least-privilege + event source allowlist",
                    BTreeMap::from([("event".to_string(), ev)]),
                ));
            }
        }

        let secret_like: Vec<String> = fun
            .environment
            .keys()
            .filter(|k| matches!(k.to_lowercase().as_str(), "api_key" | "token" | "secret"))
            .cloned()
            .collect();
        if !secret_like.is_empty() {
            let keys: Vec<String> = fun.environment.keys().cloned().collect();
            findings.push(finding(
                path,
                fn_name,
                "HIGH",
                "Potential secret-like keys in function environment (use secrets manager + runtime fetch)",
                BTreeMap::from([(
                    "environment_keys".to_string(),
                    serde_json::to_value(keys).unwrap_or_default(),
                )]),
            ));
        }

        if provider_logs.is_none() {
            findings.push(finding(
                path,
                fn_name,
                "LOW",
                "Provider logging not explicitly configured; ensure retention + redaction policy",
                BTreeMap::new(),
            ));
        }

        if fun.vpc.as_ref().filter(|v| !v.is_null()).is_none() && provider_vpc.is_none() {
            findings.push(finding(
                path,
                fn_name,
                "MEDIUM",
                "Function not VPC-attached: egress is less CIDR-bounded (model via identity + trigger graph)",
                BTreeMap::new(),
            ));
        }
    }

    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_manifest(yaml: &str) -> Vec<Finding> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("serverless.yml");
        std::fs::write(&path, yaml).unwrap();
        scan_serverless_yaml(&path).unwrap()
    }

    #[test]
    fn test_http_trigger_flagged_high() {
        let findings = scan_manifest(
            r#"
provider:
  logs:
    restApi: true
  vpc:
    securityGroupIds: [sg-1]
functions:
  api:
    events:
      - http:
          path: /pay
          method: post
"#,
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, "HIGH");
        assert!(findings[0].message.contains("HTTP-triggered"));
        assert_eq!(findings[0].subject_id, "api");
    }

    #[test]
    fn test_event_trigger_flagged_medium() {
        let findings = scan_manifest(
            r#"
provider:
  logs: {restApi: true}
  vpc: {securityGroupIds: [sg-1]}
functions:
  ingest:
    events:
      - sqs:
          arn: arn:aws:sqs:us-east-1:1:q
"#,
        );
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("Event-triggered"));
    }

    #[test]
    fn test_secret_like_environment_keys() {
        let findings = scan_manifest(
            r#"
provider:
  logs: {restApi: true}
  vpc: {securityGroupIds: [sg-1]}
functions:
  auth:
    environment:
      API_KEY: abc123
      REGION: us-east-1
"#,
        );
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("secret-like"));
        let keys = findings[0].evidence["environment_keys"].as_array().unwrap();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_missing_logging_and_vpc() {
        let findings = scan_manifest(
            r#"
functions:
  worker:
    events: []
"#,
        );
        let severities: Vec<&str> = findings.iter().map(|f| f.severity.as_str()).collect();
        assert_eq!(severities, ["LOW", "MEDIUM"]);
    }

    #[test]
    fn test_function_level_vpc_suppresses_finding() {
        let findings = scan_manifest(
            r#"
provider:
  logs: {restApi: true}
functions:
  worker:
    vpc:
      securityGroupIds: [sg-2]
"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_functions_scanned_in_name_order() {
        let findings = scan_manifest(
            r#"
provider:
  logs: {restApi: true}
  vpc: {securityGroupIds: [sg-1]}
functions:
  zeta:
    events:
      - http: {path: /z}
  alpha:
    events:
      - http: {path: /a}
"#,
        );
        assert_eq!(findings[0].subject_id, "alpha");
        assert_eq!(findings[1].subject_id, "zeta");
    }
}
