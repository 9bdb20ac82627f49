//! Timestamped phase receipts (CREATE / MAINTAIN / AUDIT / DESTROY).

use crate::errors::{PosturaError, PosturaResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub kind: String,
    pub ts_epoch: i64,
    pub inputs: BTreeMap<String, serde_json::Value>,
    pub outputs: BTreeMap<String, serde_json::Value>,
}

/// Build a receipt for one lifecycle phase, stamped with the current time.
pub fn receipt(
    kind: &str,
    inputs: BTreeMap<String, serde_json::Value>,
    outputs: BTreeMap<String, serde_json::Value>,
) -> Receipt {
    Receipt {
        kind: kind.to_string(),
        ts_epoch: chrono::Utc::now().timestamp(),
        inputs,
        outputs,
    }
}

pub fn write_receipt(path: &Path, payload: &Receipt) -> PosturaResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| PosturaError::io(e, Some(parent.to_path_buf())))?;
    }
    let json = serde_json::to_string_pretty(payload)?;
    std::fs::write(path, json).map_err(|e| PosturaError::io(e, Some(path.to_path_buf())))?;
    Ok(())
}
