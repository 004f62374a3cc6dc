//! Menu API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::menu::build_menu_tree;
use crate::models::{CreateMenuRequest, MenuItem, MenuNode, UpdateMenuRequest};
use crate::AppState;

/// GET /api/menus - Navigation tree of menus in use.
pub async fn get_menu_tree(State(state): State<AppState>) -> ApiResult<Vec<MenuNode>> {
    let menus = state.repo.list_menus().await?;
    let in_use: Vec<MenuItem> = menus.into_iter().filter(|m| m.is_using).collect();
    success(build_menu_tree(in_use))
}

/// GET /api/admin/menus - Flat list of all menus, including unused ones.
pub async fn list_menus(State(state): State<AppState>) -> ApiResult<Vec<MenuItem>> {
    success(state.repo.list_menus().await?)
}

/// GET /api/admin/menus/:id - Get a single menu.
pub async fn get_menu(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<MenuItem> {
    let menu = state
        .repo
        .get_menu(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Menu {} not found", id)))?;
    success(menu)
}

/// POST /api/admin/menus - Create a new menu.
pub async fn create_menu(
    State(state): State<AppState>,
    Json(request): Json<CreateMenuRequest>,
) -> ApiResult<MenuItem> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Menu name is required".to_string()));
    }
    if request.created_by.trim().is_empty() {
        return Err(AppError::Validation(
            "Created by (account ID) is required".to_string(),
        ));
    }

    success(state.repo.create_menu(&request).await?)
}

/// PUT /api/admin/menus/:id - Update a menu.
pub async fn update_menu(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateMenuRequest>,
) -> ApiResult<MenuItem> {
    if let Some(name) = &request.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("Menu name must not be blank".to_string()));
        }
    }
    if request.updated_by.trim().is_empty() {
        return Err(AppError::Validation(
            "Updated by (account ID) is required".to_string(),
        ));
    }

    success(state.repo.update_menu(id, &request).await?)
}

/// DELETE /api/admin/menus/:id - Delete a menu.
pub async fn delete_menu(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.repo.delete_menu(id).await?;
    success(())
}
