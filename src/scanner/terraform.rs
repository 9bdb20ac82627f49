//! Terraform pattern scanner.
//!
//! Walks a directory for `*.tf` files and extracts resource blocks with a
//! line-oriented state machine (no HCL parser). Each resource's attributes
//! are checked against a fixed set of risk patterns.

use crate::errors::{PosturaError, PosturaResult};
use crate::models::Finding;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

pub struct TerraformScanner {
    resource_re: Regex,
    attr_re: Regex,
}

impl TerraformScanner {
    pub fn new() -> Self {
        Self {
            resource_re: Regex::new(r#"(?i)resource\s+"([^"]+)"\s+"([^"]+)"\s*\{"#).unwrap(),
            attr_re: Regex::new(r"^\s*([A-Za-z0-9_]+)\s*=\s*(.+?)\s*$").unwrap(),
        }
    }

    /// Scan every `*.tf` file under `dir`, in sorted path order so the
    /// finding list is stable across runs.
    pub fn scan_dir(&self, dir: &Path) -> PosturaResult<Vec<Finding>> {
        let mut paths: Vec<_> = WalkDir::new(dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| {
                e.file_type().is_file()
                    && e.path().extension().and_then(|x| x.to_str()) == Some("tf")
            })
            .map(|e| e.into_path())
            .collect();
        paths.sort();

        let mut findings = Vec::new();
        for path in paths {
            log::debug!("scanning terraform file {}", path.display());
            findings.extend(self.scan_file(&path)?);
        }
        Ok(findings)
    }

    pub fn scan_file(&self, path: &Path) -> PosturaResult<Vec<Finding>> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PosturaError::io(e, Some(path.to_path_buf())))?;

        let mut findings = Vec::new();
        let mut current: Option<(String, String)> = None;
        let mut attrs: BTreeMap<String, String> = BTreeMap::new();

        for line in text.lines() {
            if let Some(m) = self.resource_re.captures(line) {
                if let Some((rtype, name)) = current.take() {
                    analyze_resource(path, &rtype, &name, &attrs, &mut findings);
                }
                current = Some((m[1].to_string(), m[2].to_string()));
                attrs.clear();
                continue;
            }

            if current.is_some() {
                if line.contains('}') {
                    let (rtype, name) = current.take().unwrap();
                    analyze_resource(path, &rtype, &name, &attrs, &mut findings);
                    attrs.clear();
                    continue;
                }
                if let Some(am) = self.attr_re.captures(line) {
                    attrs.insert(am[1].to_string(), am[2].trim().to_string());
                }
            }
        }

        if let Some((rtype, name)) = current {
            analyze_resource(path, &rtype, &name, &attrs, &mut findings);
        }

        Ok(findings)
    }
}

impl Default for TerraformScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn push_finding(
    out: &mut Vec<Finding>,
    path: &Path,
    rtype: &str,
    name: &str,
    severity: &str,
    message: &str,
    attrs: &BTreeMap<String, String>,
) {
    let evidence_attrs: serde_json::Value = serde_json::to_value(attrs).unwrap_or_default();
    out.push(Finding {
        source_file: path.display().to_string(),
        subject_id: format!("{rtype}.{name}"),
        severity: severity.to_string(),
        message: message.to_string(),
        evidence: BTreeMap::from([("attrs".to_string(), evidence_attrs)]),
    });
}

fn analyze_resource(
    path: &Path,
    rtype: &str,
    name: &str,
    attrs: &BTreeMap<String, String>,
    out: &mut Vec<Finding>,
) {
    let values_blob = attrs
        .values()
        .cloned()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if matches!(rtype, "aws_s3_bucket_public_access_block" | "aws_s3_bucket_acl")
        && values_blob.contains("public")
    {
        push_finding(
            out,
            path,
            rtype,
            name,
            "HIGH",
            "Potential public S3 exposure pattern detected",
            attrs,
        );
    }

    if rtype == "aws_lambda_permission" {
        let principal = attrs.get("principal").cloned().unwrap_or_default();
        if principal.replace('"', "").contains('*') {
            push_finding(
                out,
                path,
                rtype,
                name,
                "CRITICAL",
                "Lambda invoke permission appears wildcarded (principal='*')",
                attrs,
            );
        }
    }

    if rtype == "aws_lambda_function" {
        let has_vpc = attrs.keys().any(|k| k.to_lowercase().contains("vpc_config"));
        if !has_vpc {
            push_finding(
                out,
                path,
                rtype,
                name,
                "MEDIUM",
                "Lambda function appears not VPC-attached (ephemeral egress harder to bound)",
                attrs,
            );
        }
    }

    if matches!(rtype, "aws_iam_policy" | "aws_iam_role_policy")
        && values_blob.contains("action")
        && (values_blob.contains('*') || values_blob.contains("admin"))
    {
        push_finding(
            out,
            path,
            rtype,
            name,
            "HIGH",
            "IAM policy may be overly broad (wildcards/admin-like patterns)",
            attrs,
        );
    }

    if matches!(rtype, "aws_security_group" | "aws_security_group_rule")
        && values_blob.contains("0.0.0.0/0")
        && (values_blob.contains("egress") || values_blob.contains("from_port"))
    {
        push_finding(
            out,
            path,
            rtype,
            name,
            "HIGH",
            "Security group rule may allow broad internet egress/ingress",
            attrs,
        );
    }
}
