//! Code-group and code lookup models.

use serde::{Deserialize, Serialize};

/// A named group of lookup codes (e.g. member status, menu kind).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeGroup {
    pub code_group: String,
    pub name: String,
    pub created_by: String,
    pub created: String,
    pub updated_by: String,
    pub updated: String,
}

/// A single lookup code within a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Code {
    pub code_group: String,
    pub code: String,
    pub name: String,
    pub display_order: i64,
    pub is_using: bool,
    pub created_by: String,
    pub created: String,
    pub updated_by: String,
    pub updated: String,
}

/// Request body for creating a new code group.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCodeGroupRequest {
    pub code_group: String,
    pub name: String,
    /// Account ID of the creator
    pub created_by: String,
}

/// Request body for renaming a code group.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCodeGroupRequest {
    pub name: String,
    /// Account ID of the editor
    pub updated_by: String,
}

/// Request body for creating a new code.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCodeRequest {
    pub code_group: String,
    pub code: String,
    pub name: String,
    pub display_order: i64,
    #[serde(default = "default_is_using")]
    pub is_using: bool,
    /// Account ID of the creator
    pub created_by: String,
}

fn default_is_using() -> bool {
    true
}

/// Request body for updating an existing code.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCodeRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_order: Option<i64>,
    #[serde(default)]
    pub is_using: Option<bool>,
    /// Account ID of the editor
    pub updated_by: String,
}
