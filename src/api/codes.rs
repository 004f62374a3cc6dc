//! Code-group and code lookup endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    Code, CodeGroup, CreateCodeGroupRequest, CreateCodeRequest, UpdateCodeGroupRequest,
    UpdateCodeRequest,
};
use crate::AppState;

/// GET /api/codes/:code_group - Lookup list for select boxes; codes in use
/// only, ordered by display order.
pub async fn lookup_codes(
    State(state): State<AppState>,
    Path(code_group): Path<String>,
) -> ApiResult<Vec<Code>> {
    let codes = state.repo.list_codes(&code_group).await?;
    success(codes.into_iter().filter(|c| c.is_using).collect())
}

/// GET /api/admin/code-groups - List all code groups.
pub async fn list_code_groups(State(state): State<AppState>) -> ApiResult<Vec<CodeGroup>> {
    success(state.repo.list_code_groups().await?)
}

/// POST /api/admin/code-groups - Create a new code group.
pub async fn create_code_group(
    State(state): State<AppState>,
    Json(request): Json<CreateCodeGroupRequest>,
) -> ApiResult<CodeGroup> {
    if request.code_group.trim().is_empty() {
        return Err(AppError::Validation("Code group key is required".to_string()));
    }
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Code group name is required".to_string()));
    }
    if request.created_by.trim().is_empty() {
        return Err(AppError::Validation(
            "Created by (account ID) is required".to_string(),
        ));
    }

    success(state.repo.create_code_group(&request).await?)
}

/// PUT /api/admin/code-groups/:code_group - Rename a code group.
pub async fn update_code_group(
    State(state): State<AppState>,
    Path(code_group): Path<String>,
    Json(request): Json<UpdateCodeGroupRequest>,
) -> ApiResult<CodeGroup> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Code group name is required".to_string()));
    }
    if request.updated_by.trim().is_empty() {
        return Err(AppError::Validation(
            "Updated by (account ID) is required".to_string(),
        ));
    }

    success(state.repo.update_code_group(&code_group, &request).await?)
}

/// DELETE /api/admin/code-groups/:code_group - Delete a code group and its codes.
pub async fn delete_code_group(
    State(state): State<AppState>,
    Path(code_group): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_code_group(&code_group).await?;
    success(())
}

/// GET /api/admin/codes/:code_group - All codes of a group, including unused ones.
pub async fn list_codes(
    State(state): State<AppState>,
    Path(code_group): Path<String>,
) -> ApiResult<Vec<Code>> {
    success(state.repo.list_codes(&code_group).await?)
}

/// POST /api/admin/codes - Create a new code.
pub async fn create_code(
    State(state): State<AppState>,
    Json(request): Json<CreateCodeRequest>,
) -> ApiResult<Code> {
    if request.code.trim().is_empty() {
        return Err(AppError::Validation("Code is required".to_string()));
    }
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Code name is required".to_string()));
    }
    if request.created_by.trim().is_empty() {
        return Err(AppError::Validation(
            "Created by (account ID) is required".to_string(),
        ));
    }

    success(state.repo.create_code(&request).await?)
}

/// PUT /api/admin/codes/:code_group/:code - Update a code.
pub async fn update_code(
    State(state): State<AppState>,
    Path((code_group, code)): Path<(String, String)>,
    Json(request): Json<UpdateCodeRequest>,
) -> ApiResult<Code> {
    if request.updated_by.trim().is_empty() {
        return Err(AppError::Validation(
            "Updated by (account ID) is required".to_string(),
        ));
    }

    success(state.repo.update_code(&code_group, &code, &request).await?)
}

/// DELETE /api/admin/codes/:code_group/:code - Delete a code.
pub async fn delete_code(
    State(state): State<AppState>,
    Path((code_group, code)): Path<(String, String)>,
) -> ApiResult<()> {
    state.repo.delete_code(&code_group, &code).await?;
    success(())
}
