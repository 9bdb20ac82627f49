//! One-shot batch pipeline over a fixed snapshot.
//!
//! Scans IaC inputs, computes base risk, builds per-asset contexts, evaluates
//! policies and writes every artifact plus the evidence bundle. The scoring
//! and gating core is pure; all I/O lives here. Per-asset evaluation runs in
//! parallel but outputs are re-imposed into input order, so re-running on
//! unchanged input produces byte-identical artifacts.

use crate::context::{ContextBuilder, PrincipalResolver, SubstringResolver};
use crate::destroy::simulate_destroy;
use crate::errors::{PosturaError, PosturaResult};
use crate::evidence::{build_manifest, receipt, write_receipt};
use crate::graph::{build_graph, edges_from_findings, public_targets};
use crate::models::{
    AssetContext, AssetRecord, Finding, GateResult, GateStatus, PolicyDecision, PolicyRule,
    RiskScore,
};
use crate::policy::{evaluate_policies, gate, overall_gate};
use crate::risk::score_findings;
use crate::scanner::{scan_serverless_yaml, TerraformScanner};
use crate::tenancy::TenantModel;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Artifacts covered by the evidence manifest, in manifest include order.
const MANIFEST_INCLUDES: [&str; 6] = [
    "scans",
    "trigger_graph.json",
    "risk_score_base.json",
    "normalized_assets.json",
    "policy_results.json",
    "gate_status.json",
];

/// Input and output locations for one run.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub terraform_dir: PathBuf,
    pub serverless_manifest: PathBuf,
    pub tenants_file: PathBuf,
    pub policies_file: PathBuf,
    pub records_file: PathBuf,
    pub out_dir: PathBuf,
    pub evidence_dir: PathBuf,
}

impl RunPaths {
    /// Conventional layout under a repo root, with an optional output
    /// override for CI runs.
    pub fn new(root: &Path, out_override: Option<&Path>) -> Self {
        let out_dir = out_override
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.join("out"));
        Self {
            root: root.to_path_buf(),
            terraform_dir: root.join("demos").join("iac").join("terraform"),
            serverless_manifest: root
                .join("demos")
                .join("iac")
                .join("serverless")
                .join("serverless.yml"),
            tenants_file: root.join("demos").join("tenancy").join("tenants.yml"),
            policies_file: root.join("policies").join("policies.yml"),
            records_file: root.join("demos").join("data").join("records.jsonl"),
            evidence_dir: out_dir.join("evidence"),
            out_dir,
        }
    }
}

/// Per-asset policy outcome as serialized into `policy_results.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetGate {
    pub asset_id: String,
    pub gate: GateResult,
    pub decisions: Vec<PolicyDecision>,
}

/// Per-asset document in `normalized_assets.json`: the flat context record
/// plus the classification signal counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedAsset {
    #[serde(flatten)]
    pub context: AssetContext,
    pub classification_signals: BTreeMap<String, u32>,
}

/// Everything a presentation layer needs to render the run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub terraform_findings: Vec<Finding>,
    pub serverless_findings: Vec<Finding>,
    pub base_risk: RiskScore,
    pub assets: Vec<NormalizedAsset>,
    pub asset_gates: Vec<AssetGate>,
    pub overall: GateStatus,
    pub manifest_count: usize,
    pub out_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct PolicyFile {
    #[serde(default)]
    policies: Vec<PolicyRule>,
}

fn load_policies(path: &Path) -> PosturaResult<Vec<PolicyRule>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| PosturaError::io(e, Some(path.to_path_buf())))?;
    let file: PolicyFile = serde_yaml::from_str(&text).map_err(|e| PosturaError::yaml(e, path))?;
    Ok(file.policies)
}

fn load_records(path: &Path) -> PosturaResult<Vec<AssetRecord>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| PosturaError::io(e, Some(path.to_path_buf())))?;
    let mut records = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        records.push(serde_json::from_str(line)?);
    }
    Ok(records)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> PosturaResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| PosturaError::io(e, Some(parent.to_path_buf())))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).map_err(|e| PosturaError::io(e, Some(path.to_path_buf())))?;
    Ok(())
}

/// Run the full pipeline with the stub principal resolver.
pub fn run_pipeline(paths: &RunPaths) -> PosturaResult<PipelineReport> {
    run_pipeline_with(paths, &SubstringResolver)
}

/// Run the full pipeline with a caller-supplied principal resolver.
pub fn run_pipeline_with(
    paths: &RunPaths,
    resolver: &dyn PrincipalResolver,
) -> PosturaResult<PipelineReport> {
    std::fs::create_dir_all(&paths.evidence_dir)
        .map_err(|e| PosturaError::io(e, Some(paths.evidence_dir.clone())))?;

    let tenant_model = TenantModel::load(&paths.tenants_file)?;
    let policies = load_policies(&paths.policies_file)?;
    let records = load_records(&paths.records_file)?;

    // 1) Scan IaC inputs.
    let tf_findings = TerraformScanner::new().scan_dir(&paths.terraform_dir)?;
    let sls_findings = scan_serverless_yaml(&paths.serverless_manifest)?;
    log::info!(
        "scanned IaC: {} terraform findings, {} serverless findings",
        tf_findings.len(),
        sls_findings.len()
    );

    write_json(
        &paths.out_dir.join("scans").join("terraform_findings.json"),
        &tf_findings,
    )?;
    write_json(
        &paths.out_dir.join("scans").join("serverless_findings.json"),
        &sls_findings,
    )?;

    // 2) Trigger graph from serverless trigger findings.
    let edges = edges_from_findings(&sls_findings);
    write_json(&paths.out_dir.join("trigger_graph.json"), &build_graph(&edges))?;
    let public = public_targets(&edges);

    // 3) Base risk, shared by every asset in this run.
    let base_risk = score_findings(&tf_findings, &sls_findings);
    write_json(&paths.out_dir.join("risk_score_base.json"), &base_risk)?;
    log::info!("base risk {} / 100", base_risk.normalized_0_100);

    // 4) Per-asset context, adjusted risk and policy evaluation. The loop has
    // no cross-asset dependency, so it runs in parallel; results are indexed
    // and re-sorted into input order before serialization.
    let builder = ContextBuilder::new(
        resolver,
        &tenant_model,
        &public,
        base_risk.normalized_0_100,
    );

    let mut evaluated: Vec<(usize, NormalizedAsset, AssetGate)> = records
        .par_iter()
        .enumerate()
        .map(|(idx, record)| {
            let (ctx, classified) = builder.build(record);
            let decisions = evaluate_policies(&policies, &ctx);
            let asset_gate = AssetGate {
                asset_id: record.asset_id.clone(),
                gate: gate(&decisions),
                decisions,
            };
            let asset = NormalizedAsset {
                context: ctx,
                classification_signals: classified.signals,
            };
            (idx, asset, asset_gate)
        })
        .collect();
    evaluated.sort_by_key(|(idx, _, _)| *idx);

    let mut assets = Vec::with_capacity(evaluated.len());
    let mut asset_gates = Vec::with_capacity(evaluated.len());
    for (_, asset, asset_gate) in evaluated {
        assets.push(asset);
        asset_gates.push(asset_gate);
    }

    write_json(&paths.out_dir.join("normalized_assets.json"), &assets)?;
    write_json(&paths.out_dir.join("policy_results.json"), &asset_gates)?;

    // 5) Pipeline-wide gate, order-independent reduction.
    let overall = overall_gate(asset_gates.iter().map(|a| a.gate.status));
    write_json(
        &paths.out_dir.join("gate_status.json"),
        &serde_json::json!({ "status": overall }),
    )?;
    log::info!("pipeline gate: {overall}");

    // 6) Evidence manifest over the core artifacts.
    let manifest = build_manifest(&paths.out_dir, &MANIFEST_INCLUDES)?;
    write_json(
        &paths.evidence_dir.join("manifest.sha256.json"),
        &manifest,
    )?;

    // 7) Lifecycle receipts.
    let create_r = receipt(
        "CREATE",
        BTreeMap::from([(
            "iac_root".to_string(),
            serde_json::json!(paths.terraform_dir.display().to_string()),
        )]),
        BTreeMap::from([("scans".to_string(), serde_json::json!("out/scans"))]),
    );
    write_receipt(&paths.evidence_dir.join("receipt_create.json"), &create_r)?;

    let maintain_r = receipt(
        "MAINTAIN",
        BTreeMap::from([("drift_window".to_string(), serde_json::json!("demo"))]),
        BTreeMap::from([
            ("base_risk".to_string(), serde_json::to_value(&base_risk)?),
            ("gate".to_string(), serde_json::to_value(overall)?),
        ]),
    );
    write_receipt(&paths.evidence_dir.join("receipt_maintain.json"), &maintain_r)?;

    let audit_r = receipt(
        "AUDIT",
        BTreeMap::from([(
            "manifest".to_string(),
            serde_json::json!("manifest.sha256.json"),
        )]),
        BTreeMap::from([("count".to_string(), serde_json::json!(manifest.count))]),
    );
    write_receipt(&paths.evidence_dir.join("receipt_audit.json"), &audit_r)?;

    let closure = simulate_destroy();
    write_json(&paths.out_dir.join("destroy_closure.json"), &closure)?;
    let destroy_outputs = match serde_json::to_value(&closure)? {
        serde_json::Value::Object(map) => map.into_iter().collect(),
        _ => BTreeMap::new(),
    };
    let destroy_r = receipt(
        "DESTROY",
        BTreeMap::from([(
            "target".to_string(),
            serde_json::json!("demo-ephemeral-plane"),
        )]),
        destroy_outputs,
    );
    write_receipt(&paths.evidence_dir.join("receipt_destroy.json"), &destroy_r)?;

    Ok(PipelineReport {
        terraform_findings: tf_findings,
        serverless_findings: sls_findings,
        base_risk,
        assets,
        asset_gates,
        overall,
        manifest_count: manifest.count,
        out_dir: paths.out_dir.clone(),
    })
}
