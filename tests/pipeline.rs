//! End-to-end pipeline test over a fixture repo tree.

use postura::models::GateStatus;
use postura::pipeline::{run_pipeline, RunPaths};
use std::path::Path;

/// Artifacts that must be byte-identical across runs on identical input.
/// Receipts are excluded: they carry wall-clock timestamps by design.
const DETERMINISTIC_ARTIFACTS: [&str; 9] = [
    "scans/terraform_findings.json",
    "scans/serverless_findings.json",
    "trigger_graph.json",
    "risk_score_base.json",
    "normalized_assets.json",
    "policy_results.json",
    "gate_status.json",
    "destroy_closure.json",
    "evidence/manifest.sha256.json",
];

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn build_fixture_repo(root: &Path) {
    write(
        &root.join("demos/iac/terraform/main.tf"),
        r#"
resource "aws_lambda_permission" "open_invoke" {
  action    = "lambda:InvokeFunction"
  principal = "*"
}

resource "aws_lambda_function" "ingest" {
  handler = "index.handler"
  runtime = "nodejs18.x"
}
"#,
    );

    write(
        &root.join("demos/iac/serverless/serverless.yml"),
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

    write(
        &root.join("demos/tenancy/tenants.yml"),
        r#"
tenants: [retail, payments]
asset_tenant:
  s3-payments-cardholder: payments
principal_tenant:
  "lambda:api": retail
  "lambda:ingest": retail
"#,
    );

    write(
        &root.join("demos/data/records.jsonl"),
        concat!(
            "{\"asset_id\": \"s3-payments-cardholder\", \"provider\": \"aws\", \"native_type\": \"aws_s3_bucket\", \"text\": \"card 4111 1111 1111 1111\"}\n",
            "{\"asset_id\": \"s3-logs-archive\", \"provider\": \"aws\", \"native_type\": \"aws_s3_bucket\", \"text\": \"plain rotation logs\"}\n",
        ),
    );

    write(
        &root.join("policies/policies.yml"),
        r#"
policies:
  - name: fail-regulated-cross-tenant
    condition:
      classification: regulated
      cross_tenant: true
    action: fail_pipeline
    severity: CRITICAL
    reason: regulated data reachable across tenants
  - name: warn-public
    condition:
      exposure: public
    action: warn
    severity: MEDIUM
    reason: public invocation surface
  - name: min-risk-80
    condition:
      min_risk: 80
    action: fail_pipeline
    severity: HIGH
    reason: risk threshold reached
  - name: inventory
    condition: {}
    action: pass
    severity: INFO
    reason: always-on inventory rule
"#,
    );
}

#[test]
fn full_pipeline_run_and_gating() {
    let dir = tempfile::tempdir().unwrap();
    build_fixture_repo(dir.path());

    let paths = RunPaths::new(dir.path(), None);
    let report = run_pipeline(&paths).unwrap();

    // tf: CRITICAL wildcard invoke (10) + MEDIUM no-vpc lambda (3);
    // sls: HIGH http trigger (6). total 19 -> 1900/60 = 31.
    assert_eq!(report.terraform_findings.len(), 2);
    assert_eq!(report.serverless_findings.len(), 1);
    assert_eq!(report.base_risk.total, 19);
    assert_eq!(report.base_risk.breakdown["terraform"], 13);
    assert_eq!(report.base_risk.breakdown["serverless"], 6);
    assert_eq!(report.base_risk.normalized_0_100, 31);

    // Asset 1: regulated (card-like text), principal lambda:api (payments
    // marker), publicly reachable, cross-tenant (payments vs retail).
    // round(31*1.9)=59, +12 cross-tenant = 71.
    let a1 = &report.assets[0].context;
    assert_eq!(a1.asset_id, "s3-payments-cardholder");
    assert_eq!(a1.canonical_type, "object_storage");
    assert_eq!(a1.principal, "lambda:api");
    assert!(a1.cross_tenant);
    assert_eq!(a1.exposure.label(), "public");
    assert_eq!(a1.risk_0_100, 71);

    // Asset 2: public classification, lambda:ingest, event exposure, same
    // tenant. round(31*0.6)=19.
    let a2 = &report.assets[1].context;
    assert_eq!(a2.asset_id, "s3-logs-archive");
    assert!(!a2.cross_tenant);
    assert_eq!(a2.exposure.label(), "event");
    assert_eq!(a2.risk_0_100, 19);

    // Gates: asset 1 fails (cross-tenant regulated matched; min_risk 80 not
    // met at 71), asset 2 passes with only the always-on rule matched.
    let g1 = &report.asset_gates[0];
    assert_eq!(g1.gate.status, GateStatus::Fail);
    assert_eq!(g1.gate.total_rules, 4);
    assert_eq!(g1.gate.matched_rules, 3);
    assert_eq!(g1.decisions.len(), 4);

    let g2 = &report.asset_gates[1];
    assert_eq!(g2.gate.status, GateStatus::Pass);
    assert_eq!(g2.gate.matched_rules, 1);

    assert_eq!(report.overall, GateStatus::Fail);

    // Artifact files exist.
    for artifact in DETERMINISTIC_ARTIFACTS {
        assert!(
            paths.out_dir.join(artifact).is_file(),
            "missing artifact {artifact}"
        );
    }
    for receipt in [
        "receipt_create.json",
        "receipt_maintain.json",
        "receipt_audit.json",
        "receipt_destroy.json",
    ] {
        assert!(paths.evidence_dir.join(receipt).is_file());
    }

    // gate_status.json has the persisted shape {status}.
    let gate_doc: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(paths.out_dir.join("gate_status.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(gate_doc, serde_json::json!({ "status": "FAIL" }));
}

#[test]
fn reruns_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    build_fixture_repo(dir.path());

    let out_a = dir.path().join("out-a");
    let out_b = dir.path().join("out-b");
    run_pipeline(&RunPaths::new(dir.path(), Some(&out_a))).unwrap();
    run_pipeline(&RunPaths::new(dir.path(), Some(&out_b))).unwrap();

    for artifact in DETERMINISTIC_ARTIFACTS {
        let a = std::fs::read(out_a.join(artifact)).unwrap();
        let b = std::fs::read(out_b.join(artifact)).unwrap();
        assert_eq!(a, b, "artifact {artifact} differs between identical runs");
    }
}

#[test]
fn empty_policy_file_passes_everything() {
    let dir = tempfile::tempdir().unwrap();
    build_fixture_repo(dir.path());
    write(&dir.path().join("policies/policies.yml"), "policies: []\n");

    let report = run_pipeline(&RunPaths::new(dir.path(), None)).unwrap();
    assert_eq!(report.overall, GateStatus::Pass);
    for asset_gate in &report.asset_gates {
        assert_eq!(asset_gate.gate.total_rules, 0);
        assert_eq!(asset_gate.gate.status, GateStatus::Pass);
    }
}
