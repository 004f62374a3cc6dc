//! Database repository for CRUD operations.
//!
//! Uses prepared statements; referential checks on the write path keep the
//! read path total.

use std::collections::HashSet;

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    Code, CodeGroup, CreateCodeGroupRequest, CreateCodeRequest, CreateMenuRequest, MenuAuthority,
    MenuItem, MenuType, UpdateCodeGroupRequest, UpdateCodeRequest, UpdateMenuRequest,
};

const MENU_COLUMNS: &str = "id, name, type, parent_id, is_using, display_order, url, icon, remark, created_by, created, updated_by, updated";

const CODE_COLUMNS: &str =
    "code_group, code, name, display_order, is_using, created_by, created, updated_by, updated";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== MENU OPERATIONS ====================

    /// List all menus ordered by display order.
    pub async fn list_menus(&self) -> Result<Vec<MenuItem>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM menu ORDER BY display_order, id",
            MENU_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(menu_from_row).collect()
    }

    /// Get a menu by ID.
    pub async fn get_menu(&self, id: i64) -> Result<Option<MenuItem>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM menu WHERE id = ?", MENU_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(menu_from_row).transpose()
    }

    /// Create a new menu. The parent, when given, must already exist.
    pub async fn create_menu(&self, request: &CreateMenuRequest) -> Result<MenuItem, AppError> {
        if let Some(parent_id) = request.parent_id {
            self.get_menu(parent_id).await?.ok_or_else(|| {
                AppError::Validation(format!("Parent menu {} not found", parent_id))
            })?;
        }

        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO menu (name, type, parent_id, is_using, display_order, url, icon, remark, created_by, created, updated_by, updated) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&request.name)
        .bind(request.menu_type.as_str())
        .bind(request.parent_id)
        .bind(request.is_using as i32)
        .bind(request.display_order)
        .bind(&request.url)
        .bind(&request.icon)
        .bind(&request.remark)
        .bind(&request.created_by)
        .bind(&now)
        .bind(&request.created_by)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(MenuItem {
            id: result.last_insert_rowid(),
            name: request.name.clone(),
            menu_type: request.menu_type,
            parent_id: request.parent_id,
            is_using: request.is_using,
            display_order: request.display_order,
            url: request.url.clone(),
            icon: request.icon.clone(),
            remark: request.remark.clone(),
            created_by: request.created_by.clone(),
            created: now.clone(),
            updated_by: request.created_by.clone(),
            updated: now,
        })
    }

    /// Update a menu. Re-parenting checks the new parent exists, is not the
    /// menu itself, and is not one of the menu's own descendants.
    pub async fn update_menu(
        &self,
        id: i64,
        request: &UpdateMenuRequest,
    ) -> Result<MenuItem, AppError> {
        let existing = self
            .get_menu(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Menu {} not found", id)))?;

        if let Some(Some(new_parent)) = request.parent_id {
            if new_parent == id {
                return Err(AppError::Validation(
                    "A menu cannot be its own parent".to_string(),
                ));
            }
            let parent = self.get_menu(new_parent).await?.ok_or_else(|| {
                AppError::Validation(format!("Parent menu {} not found", new_parent))
            })?;

            // Walk the new parent's ancestor chain; reaching `id` means the
            // menu would become its own ancestor.
            let mut seen = HashSet::new();
            let mut cursor = parent.parent_id;
            while let Some(ancestor_id) = cursor {
                if ancestor_id == id {
                    return Err(AppError::Validation(format!(
                        "Menu {} is a descendant of menu {}, re-parenting would create a cycle",
                        new_parent, id
                    )));
                }
                // stop if the stored chain already loops
                if !seen.insert(ancestor_id) {
                    break;
                }
                cursor = self.get_menu(ancestor_id).await?.and_then(|m| m.parent_id);
            }
        }

        let now = Utc::now().to_rfc3339();

        let name = request.name.as_ref().unwrap_or(&existing.name);
        let menu_type = request.menu_type.unwrap_or(existing.menu_type);
        // Absent field keeps the stored value, explicit null clears it
        let parent_id = match request.parent_id {
            Some(new_parent) => new_parent,
            None => existing.parent_id,
        };
        let is_using = request.is_using.unwrap_or(existing.is_using);
        let display_order = request.display_order.unwrap_or(existing.display_order);
        let url = match &request.url {
            Some(new_url) => new_url.clone(),
            None => existing.url.clone(),
        };
        let icon = match &request.icon {
            Some(new_icon) => new_icon.clone(),
            None => existing.icon.clone(),
        };
        let remark = match &request.remark {
            Some(new_remark) => new_remark.clone(),
            None => existing.remark.clone(),
        };

        sqlx::query(
            "UPDATE menu SET name = ?, type = ?, parent_id = ?, is_using = ?, display_order = ?, url = ?, icon = ?, remark = ?, updated_by = ?, updated = ? WHERE id = ?"
        )
        .bind(name)
        .bind(menu_type.as_str())
        .bind(parent_id)
        .bind(is_using as i32)
        .bind(display_order)
        .bind(&url)
        .bind(&icon)
        .bind(&remark)
        .bind(&request.updated_by)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(MenuItem {
            id,
            name: name.clone(),
            menu_type,
            parent_id,
            is_using,
            display_order,
            url,
            icon,
            remark,
            created_by: existing.created_by,
            created: existing.created,
            updated_by: request.updated_by.clone(),
            updated: now,
        })
    }

    /// Delete a menu. Menus with children must be emptied first.
    pub async fn delete_menu(&self, id: i64) -> Result<(), AppError> {
        let child_count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM menu WHERE parent_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?
            .get("n");

        if child_count > 0 {
            return Err(AppError::Conflict(format!(
                "Menu {} still has {} child menus",
                id, child_count
            )));
        }

        let result = sqlx::query("DELETE FROM menu WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Menu {} not found", id)));
        }

        Ok(())
    }

    // ==================== MENU AUTHORITY OPERATIONS ====================

    /// Get the encoded menu id list for an authority level, if a row exists.
    pub async fn get_menu_id_list(&self, authority: i64) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT menu_id_list FROM menu_authority WHERE authority = ?")
            .bind(authority)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("menu_id_list")))
    }

    /// Replace an authority's accessible menus wholesale.
    pub async fn save_menu_authority(
        &self,
        authority: i64,
        menu_id_list: &str,
        updated_by: &str,
    ) -> Result<MenuAuthority, AppError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO menu_authority (authority, menu_id_list, updated_by, updated) VALUES (?, ?, ?, ?)
             ON CONFLICT(authority) DO UPDATE SET menu_id_list = excluded.menu_id_list, updated_by = excluded.updated_by, updated = excluded.updated"
        )
        .bind(authority)
        .bind(menu_id_list)
        .bind(updated_by)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(MenuAuthority {
            authority,
            menu_id_list: menu_id_list.to_string(),
            updated_by: updated_by.to_string(),
            updated: now,
        })
    }

    /// Delete an authority's menu mapping.
    pub async fn delete_menu_authority(&self, authority: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM menu_authority WHERE authority = ?")
            .bind(authority)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Menu authority {} not found",
                authority
            )));
        }

        Ok(())
    }

    // ==================== CODE GROUP OPERATIONS ====================

    /// List all code groups.
    pub async fn list_code_groups(&self) -> Result<Vec<CodeGroup>, AppError> {
        let rows = sqlx::query(
            "SELECT code_group, name, created_by, created, updated_by, updated FROM code_group ORDER BY code_group"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(code_group_from_row).collect())
    }

    /// Get a code group by its key.
    pub async fn get_code_group(&self, code_group: &str) -> Result<Option<CodeGroup>, AppError> {
        let row = sqlx::query(
            "SELECT code_group, name, created_by, created, updated_by, updated FROM code_group WHERE code_group = ?"
        )
        .bind(code_group)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(code_group_from_row))
    }

    /// Create a new code group.
    pub async fn create_code_group(
        &self,
        request: &CreateCodeGroupRequest,
    ) -> Result<CodeGroup, AppError> {
        if self.get_code_group(&request.code_group).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Code group {} already exists",
                request.code_group
            )));
        }

        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO code_group (code_group, name, created_by, created, updated_by, updated) VALUES (?, ?, ?, ?, ?, ?)"
        )
        .bind(&request.code_group)
        .bind(&request.name)
        .bind(&request.created_by)
        .bind(&now)
        .bind(&request.created_by)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(CodeGroup {
            code_group: request.code_group.clone(),
            name: request.name.clone(),
            created_by: request.created_by.clone(),
            created: now.clone(),
            updated_by: request.created_by.clone(),
            updated: now,
        })
    }

    /// Rename a code group.
    pub async fn update_code_group(
        &self,
        code_group: &str,
        request: &UpdateCodeGroupRequest,
    ) -> Result<CodeGroup, AppError> {
        let existing = self.get_code_group(code_group).await?.ok_or_else(|| {
            AppError::NotFound(format!("Code group {} not found", code_group))
        })?;

        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "UPDATE code_group SET name = ?, updated_by = ?, updated = ? WHERE code_group = ?",
        )
        .bind(&request.name)
        .bind(&request.updated_by)
        .bind(&now)
        .bind(code_group)
        .execute(&self.pool)
        .await?;

        Ok(CodeGroup {
            code_group: code_group.to_string(),
            name: request.name.clone(),
            created_by: existing.created_by,
            created: existing.created,
            updated_by: request.updated_by.clone(),
            updated: now,
        })
    }

    /// Delete a code group and, via the schema cascade, its codes.
    pub async fn delete_code_group(&self, code_group: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM code_group WHERE code_group = ?")
            .bind(code_group)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Code group {} not found",
                code_group
            )));
        }

        Ok(())
    }

    // ==================== CODE OPERATIONS ====================

    /// List all codes of a group ordered by display order.
    pub async fn list_codes(&self, code_group: &str) -> Result<Vec<Code>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM code WHERE code_group = ? ORDER BY display_order, code",
            CODE_COLUMNS
        ))
        .bind(code_group)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(code_from_row).collect())
    }

    /// Get a single code.
    pub async fn get_code(&self, code_group: &str, code: &str) -> Result<Option<Code>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM code WHERE code_group = ? AND code = ?",
            CODE_COLUMNS
        ))
        .bind(code_group)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(code_from_row))
    }

    /// Create a new code. The group must already exist.
    pub async fn create_code(&self, request: &CreateCodeRequest) -> Result<Code, AppError> {
        self.get_code_group(&request.code_group).await?.ok_or_else(|| {
            AppError::Validation(format!("Code group {} not found", request.code_group))
        })?;

        if self
            .get_code(&request.code_group, &request.code)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Code {}/{} already exists",
                request.code_group, request.code
            )));
        }

        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO code (code_group, code, name, display_order, is_using, created_by, created, updated_by, updated) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&request.code_group)
        .bind(&request.code)
        .bind(&request.name)
        .bind(request.display_order)
        .bind(request.is_using as i32)
        .bind(&request.created_by)
        .bind(&now)
        .bind(&request.created_by)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Code {
            code_group: request.code_group.clone(),
            code: request.code.clone(),
            name: request.name.clone(),
            display_order: request.display_order,
            is_using: request.is_using,
            created_by: request.created_by.clone(),
            created: now.clone(),
            updated_by: request.created_by.clone(),
            updated: now,
        })
    }

    /// Update an existing code.
    pub async fn update_code(
        &self,
        code_group: &str,
        code: &str,
        request: &UpdateCodeRequest,
    ) -> Result<Code, AppError> {
        let existing = self.get_code(code_group, code).await?.ok_or_else(|| {
            AppError::NotFound(format!("Code {}/{} not found", code_group, code))
        })?;

        let now = Utc::now().to_rfc3339();

        let name = request.name.as_ref().unwrap_or(&existing.name);
        let display_order = request.display_order.unwrap_or(existing.display_order);
        let is_using = request.is_using.unwrap_or(existing.is_using);

        sqlx::query(
            "UPDATE code SET name = ?, display_order = ?, is_using = ?, updated_by = ?, updated = ? WHERE code_group = ? AND code = ?"
        )
        .bind(name)
        .bind(display_order)
        .bind(is_using as i32)
        .bind(&request.updated_by)
        .bind(&now)
        .bind(code_group)
        .bind(code)
        .execute(&self.pool)
        .await?;

        Ok(Code {
            code_group: code_group.to_string(),
            code: code.to_string(),
            name: name.clone(),
            display_order,
            is_using,
            created_by: existing.created_by,
            created: existing.created,
            updated_by: request.updated_by.clone(),
            updated: now,
        })
    }

    /// Delete a code.
    pub async fn delete_code(&self, code_group: &str, code: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM code WHERE code_group = ? AND code = ?")
            .bind(code_group)
            .bind(code)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Code {}/{} not found",
                code_group, code
            )));
        }

        Ok(())
    }
}

// Helper functions for row conversion

fn menu_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<MenuItem, AppError> {
    let id: i64 = row.get("id");
    let raw_type: String = row.get("type");
    let menu_type = raw_type
        .parse::<MenuType>()
        .map_err(|e| AppError::Internal(format!("Menu {}: {}", id, e)))?;
    let is_using: i32 = row.get("is_using");
    Ok(MenuItem {
        id,
        name: row.get("name"),
        menu_type,
        parent_id: row.get("parent_id"),
        is_using: is_using != 0,
        display_order: row.get("display_order"),
        url: row.get("url"),
        icon: row.get("icon"),
        remark: row.get("remark"),
        created_by: row.get("created_by"),
        created: row.get("created"),
        updated_by: row.get("updated_by"),
        updated: row.get("updated"),
    })
}

fn code_group_from_row(row: &sqlx::sqlite::SqliteRow) -> CodeGroup {
    CodeGroup {
        code_group: row.get("code_group"),
        name: row.get("name"),
        created_by: row.get("created_by"),
        created: row.get("created"),
        updated_by: row.get("updated_by"),
        updated: row.get("updated"),
    }
}

fn code_from_row(row: &sqlx::sqlite::SqliteRow) -> Code {
    let is_using: i32 = row.get("is_using");
    Code {
        code_group: row.get("code_group"),
        code: row.get("code"),
        name: row.get("name"),
        display_order: row.get("display_order"),
        is_using: is_using != 0,
        created_by: row.get("created_by"),
        created: row.get("created"),
        updated_by: row.get("updated_by"),
        updated: row.get("updated"),
    }
}
