//! Authority-to-menu mapping models.

use serde::{Deserialize, Serialize};

use super::MenuItem;

/// Persistent mapping from an authority level to the menus it may access.
///
/// `menu_id_list` is the delimited wire/persistence encoding handled by
/// [`crate::menu::MenuIdSet`]; handlers never inspect it directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuAuthority {
    pub authority: i64,
    pub menu_id_list: String,
    pub updated_by: String,
    pub updated: String,
}

/// A menu entry annotated with whether a given authority may access it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityMenuView {
    #[serde(flatten)]
    pub item: MenuItem,
    pub checked: bool,
}

/// Request body for replacing an authority's accessible menus wholesale.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMenuAuthorityRequest {
    pub menu_ids: Vec<i64>,
    /// Account ID of the editor
    pub updated_by: String,
}
