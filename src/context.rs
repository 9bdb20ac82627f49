//! Per-asset context assembly.
//!
//! Combines classification, type normalization, principal inference, trigger
//! reachability and tenancy into the `AssetContext` record that risk
//! adjustment and policy evaluation consume. No error path: missing optional
//! inputs degrade to defaults.

use crate::classification::TextClassifier;
use crate::graph::COMPUTE_PREFIX;
use crate::models::{AssetContext, AssetRecord, Exposure};
use crate::normalize::normalize_resource_type;
use crate::risk::adjust_risk;
use crate::tenancy::{cross_tenant, TenantModel};
use std::collections::BTreeSet;

/// Resolves which compute principal is responsible for an asset.
///
/// The shipped resolver is a stub: real asset-to-principal resolution needs
/// deployment metadata this pipeline does not ingest yet. Keeping it behind a
/// trait lets a real resolver replace it without touching scoring or gating.
pub trait PrincipalResolver: Sync {
    fn resolve(&self, asset_id: &str) -> String;
}

/// Stub resolver: substring markers on the asset identifier.
pub struct SubstringResolver;

impl PrincipalResolver for SubstringResolver {
    fn resolve(&self, asset_id: &str) -> String {
        if asset_id.contains("payments") || asset_id.contains("lambda-auth") {
            format!("{COMPUTE_PREFIX}api")
        } else {
            format!("{COMPUTE_PREFIX}ingest")
        }
    }
}

pub struct ContextBuilder<'a> {
    classifier: TextClassifier,
    resolver: &'a dyn PrincipalResolver,
    tenants: &'a TenantModel,
    public_targets: &'a BTreeSet<String>,
    /// Pipeline-wide base risk, shared across all assets in one run.
    base_risk: u8,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(
        resolver: &'a dyn PrincipalResolver,
        tenants: &'a TenantModel,
        public_targets: &'a BTreeSet<String>,
        base_risk: u8,
    ) -> Self {
        Self {
            classifier: TextClassifier::new(),
            resolver,
            tenants,
            public_targets,
            base_risk,
        }
    }

    /// Assemble the context record for one asset, including its adjusted
    /// risk. Returns the context and the classification signal counts for the
    /// serialized asset document.
    pub fn build(&self, record: &AssetRecord) -> (AssetContext, crate::models::ClassificationResult) {
        let classified = self.classifier.classify(&record.asset_id, &record.text);

        let canonical_type =
            normalize_resource_type(&record.provider, &record.native_type).to_string();

        let principal = self.resolver.resolve(&record.asset_id);
        let bare_principal = principal.strip_prefix(COMPUTE_PREFIX).unwrap_or(&principal);
        let exposure = if self.public_targets.contains(bare_principal) {
            Exposure::Public
        } else {
            Exposure::Event
        };

        let tenant = self.tenants.asset_tenant_of(&record.asset_id).to_string();
        let principal_tenant = self.tenants.principal_tenant_of(&principal).to_string();
        let is_cross = cross_tenant(&tenant, &principal_tenant);

        let risk = adjust_risk(
            self.base_risk,
            classified.classification,
            is_cross,
            &record.provider,
            &canonical_type,
        );

        let ctx = AssetContext {
            asset_id: record.asset_id.clone(),
            provider: record.provider.clone(),
            native_type: record.native_type.clone(),
            canonical_type,
            tenant,
            principal,
            principal_tenant,
            cross_tenant: is_cross,
            classification: classified.classification,
            exposure,
            risk_0_100: risk,
        };

        (ctx, classified)
    }
}
