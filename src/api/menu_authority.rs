//! Authority-to-menu mapping endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::menu::{resolve_authority_menus, MenuIdSet};
use crate::models::{AuthorityMenuView, MenuAuthority, SaveMenuAuthorityRequest};
use crate::AppState;

/// GET /api/admin/menus/authority/:authority - Every menu annotated with
/// whether the authority level may access it.
///
/// An authority without a stored mapping gets the empty membership, so only
/// the always-visible root comes back checked.
pub async fn get_authority_menus(
    State(state): State<AppState>,
    Path(authority): Path<i64>,
) -> ApiResult<Vec<AuthorityMenuView>> {
    let menus = state.repo.list_menus().await?;
    let membership = state
        .repo
        .get_menu_id_list(authority)
        .await?
        .map(|encoded| MenuIdSet::decode(&encoded))
        .unwrap_or_default();

    success(resolve_authority_menus(&menus, &membership))
}

/// PUT /api/admin/menus/authority/:authority - Replace the authority's
/// accessible menus wholesale.
pub async fn save_authority_menus(
    State(state): State<AppState>,
    Path(authority): Path<i64>,
    Json(request): Json<SaveMenuAuthorityRequest>,
) -> ApiResult<MenuAuthority> {
    if request.updated_by.trim().is_empty() {
        return Err(AppError::Validation(
            "Updated by (account ID) is required".to_string(),
        ));
    }

    let encoded = MenuIdSet::from_ids(request.menu_ids.iter().copied()).encode();
    let saved = state
        .repo
        .save_menu_authority(authority, &encoded, &request.updated_by)
        .await?;

    tracing::info!(
        authority,
        menus = request.menu_ids.len(),
        "menu authority saved"
    );
    success(saved)
}

/// DELETE /api/admin/menus/authority/:authority - Drop the authority's
/// mapping entirely; resolution falls back to the empty membership.
pub async fn delete_authority_menus(
    State(state): State<AppState>,
    Path(authority): Path<i64>,
) -> ApiResult<()> {
    state.repo.delete_menu_authority(authority).await?;
    success(())
}
