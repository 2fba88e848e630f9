//! # JSON Patch
//!
//! Minimal RFC 6902 operations sent as partial updates.

use crate::constants::DATA_PATCH_PATH;
use serde::{Deserialize, Serialize};

/// One JSON Patch operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonPatchOperation {
    #[serde(rename = "op")]
    pub operation: String,
    pub path: String,
}

impl JsonPatchOperation {
    #[must_use]
    pub fn remove(path: &str) -> Self {
        Self {
            operation: "remove".to_string(),
            path: path.to_string(),
        }
    }
}

/// Patch that drops the whole data payload and nothing else
#[must_use]
pub fn clear_data_patch() -> Vec<JsonPatchOperation> {
    vec![JsonPatchOperation::remove(DATA_PATCH_PATH)]
}
