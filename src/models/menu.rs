//! Menu model matching the front-end Menu interface.

use serde::{Deserialize, Serialize};

/// Kind of navigation entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MenuType {
    /// Grouping node, carries no URL of its own.
    #[serde(rename = "G")]
    Group,
    /// Page node, navigates to a route inside the application.
    #[serde(rename = "P")]
    Page,
}

impl MenuType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuType::Group => "G",
            MenuType::Page => "P",
        }
    }
}

impl std::str::FromStr for MenuType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "G" => Ok(MenuType::Group),
            "P" => Ok(MenuType::Page),
            other => Err(format!("unknown menu type {:?}", other)),
        }
    }
}

/// A navigation menu entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub menu_type: MenuType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    pub is_using: bool,
    pub display_order: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    pub created_by: String,
    pub created: String,
    pub updated_by: String,
    pub updated: String,
}

/// A menu entry placed in the navigation tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
    #[serde(flatten)]
    pub item: MenuItem,
    /// Depth in the tree; roots are level 0.
    pub level: u32,
    pub children: Vec<MenuNode>,
}

/// Request body for creating a new menu entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenuRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub menu_type: MenuType,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default = "default_is_using")]
    pub is_using: bool,
    pub display_order: i64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
    /// Account ID of the creator
    pub created_by: String,
}

fn default_is_using() -> bool {
    true
}

/// Request body for updating an existing menu entry.
///
/// Nullable columns use a double `Option`: an absent field keeps the stored
/// value, an explicit JSON `null` clears it (e.g. moving a child back to root).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMenuRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub menu_type: Option<MenuType>,
    #[serde(default, deserialize_with = "clearable")]
    pub parent_id: Option<Option<i64>>,
    #[serde(default)]
    pub is_using: Option<bool>,
    #[serde(default)]
    pub display_order: Option<i64>,
    #[serde(default, deserialize_with = "clearable")]
    pub url: Option<Option<String>>,
    #[serde(default, deserialize_with = "clearable")]
    pub icon: Option<Option<String>>,
    #[serde(default, deserialize_with = "clearable")]
    pub remark: Option<Option<String>>,
    /// Account ID of the editor
    pub updated_by: String,
}

/// Deserialize a present field into the outer `Some`, so `null` (inner
/// `None`) stays distinguishable from an omitted field (outer `None` via
/// `#[serde(default)]`).
fn clearable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_type_parses_known_codes() {
        assert_eq!("G".parse::<MenuType>(), Ok(MenuType::Group));
        assert_eq!("P".parse::<MenuType>(), Ok(MenuType::Page));
        assert!("X".parse::<MenuType>().is_err());
        assert_eq!(MenuType::Group.as_str(), "G");
    }

    #[test]
    fn update_request_distinguishes_absent_from_null() {
        let req: UpdateMenuRequest = serde_json::from_str(r#"{"updatedBy":"t"}"#).unwrap();
        assert_eq!(req.parent_id, None);

        let req: UpdateMenuRequest =
            serde_json::from_str(r#"{"parentId":null,"updatedBy":"t"}"#).unwrap();
        assert_eq!(req.parent_id, Some(None));

        let req: UpdateMenuRequest =
            serde_json::from_str(r#"{"parentId":7,"updatedBy":"t"}"#).unwrap();
        assert_eq!(req.parent_id, Some(Some(7)));
    }
}
