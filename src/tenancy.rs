//! Multi-tenant ownership model.
//!
//! Loaded once per run from YAML and never mutated afterwards. Lookups only;
//! unmapped assets and principals fall back to the default tenant.

use crate::errors::{PosturaError, PosturaResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Tenant assigned when an asset or principal has no explicit mapping.
pub const DEFAULT_TENANT: &str = "retail";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantModel {
    #[serde(default)]
    pub tenants: Vec<String>,
    #[serde(default)]
    pub asset_tenant: BTreeMap<String, String>,
    #[serde(default)]
    pub principal_tenant: BTreeMap<String, String>,
}

impl TenantModel {
    /// Load the tenant model from a YAML file.
    pub fn load(path: &Path) -> PosturaResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PosturaError::io(e, Some(path.to_path_buf())))?;
        serde_yaml::from_str(&text).map_err(|e| PosturaError::yaml(e, path))
    }

    /// Owning tenant of an asset, defaulting when unmapped.
    pub fn asset_tenant_of(&self, asset_id: &str) -> &str {
        self.asset_tenant
            .get(asset_id)
            .map_or(DEFAULT_TENANT, String::as_str)
    }

    /// Tenant of a compute principal, defaulting when unmapped.
    pub fn principal_tenant_of(&self, principal: &str) -> &str {
        self.principal_tenant
            .get(principal)
            .map_or(DEFAULT_TENANT, String::as_str)
    }
}

/// An asset and the principal that can reach it are cross-tenant iff their
/// tenants differ. Sole gate for the cross-tenant risk penalty.
pub fn cross_tenant(asset_tenant: &str, principal_tenant: &str) -> bool {
    asset_tenant != principal_tenant
}
