use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
    core::state::AppState,
    models::membership::Role,
    models::user::Model as User,
    repos::memberships::MembershipsRepo,
    services::access::{require_org_role, validate_role_change},
    utils::response::ApiError,
};

#[derive(Debug, Serialize)]
pub struct MemberInfo {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub joined_at: String,
}

#[derive(Debug, Serialize)]
pub struct MemberListResponse {
    success: bool,
    members: Vec<MemberInfo>,
}

pub async fn list_members(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(org_id): Path<String>,
) -> Result<Json<MemberListResponse>, ApiError> {
    require_org_role(&state.database, &org_id, &user.id, Role::Member).await?;

    let memberships_repo = MembershipsRepo::new(state.database.clone());
    let members = memberships_repo.list_for_org(&org_id).await.map_err(|e| {
        error!("Failed to list members: {}", e);
        ApiError::InternalServerError("Failed to list members".to_string())
    })?;

    let members = members
        .into_iter()
        .map(|(membership, member)| MemberInfo {
            user_id: member.id,
            name: member.name,
            email: member.email,
            avatar_url: member.avatar_url,
            role: membership.role,
            joined_at: membership.created_at.to_string(),
        })
        .collect();

    Ok(Json(MemberListResponse {
        success: true,
        members,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ChangeMemberRoleRequest {
    user_id: String,
    role: Role,
}

#[derive(Debug, Serialize)]
pub struct ChangeMemberRoleResponse {
    success: bool,
    message: String,
}

/// The server-side role-change check; whatever the client showed, this
/// one is authoritative.
pub async fn change_member_role(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(org_id): Path<String>,
    Json(payload): Json<ChangeMemberRoleRequest>,
) -> Result<Json<ChangeMemberRoleResponse>, ApiError> {
    let (_org, actor_role) =
        require_org_role(&state.database, &org_id, &user.id, Role::Member).await?;

    if payload.role == Role::Owner {
        return Err(ApiError::PreconditionFailed(
            "Ownership cannot be granted through a role change".to_string(),
        ));
    }

    let memberships_repo = MembershipsRepo::new(state.database.clone());
    let target = memberships_repo
        .get(&org_id, &payload.user_id)
        .await
        .map_err(|e| {
            error!("Failed to load member: {}", e);
            ApiError::InternalServerError("Failed to change role".to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

    validate_role_change(actor_role, &user.id, &target)?;

    let target_user_id = target.user_id.clone();
    let updated = memberships_repo
        .update_role(target, payload.role)
        .await
        .map_err(|e| {
            error!("Failed to change role: {}", e);
            ApiError::InternalServerError("Failed to change role".to_string())
        })?;

    info!(
        "{} set role of {} to {} in org {}",
        user.email,
        target_user_id,
        updated.role.as_str(),
        org_id
    );

    Ok(Json(ChangeMemberRoleResponse {
        success: true,
        message: format!("Role changed to {}", updated.role.as_str()),
    }))
}
