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
    repos::{
        memberships::MembershipsRepo, organizations::OrganizationsRepo,
    },
    services::access::require_org_role,
    utils::response::ApiError,
};

const MAX_ORG_NAME_LEN: usize = 100;

pub fn validate_org_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::PreconditionFailed(
            "Organization name cannot be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_ORG_NAME_LEN {
        return Err(ApiError::PreconditionFailed(
            "Organization name is too long".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct OrganizationInfo {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub credits: i32,
    pub subscription_active: bool,
    pub is_primary: bool,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct OrganizationListResponse {
    success: bool,
    organizations: Vec<OrganizationInfo>,
}

pub async fn list_organizations(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<OrganizationListResponse>, ApiError> {
    let memberships_repo = MembershipsRepo::new(state.database.clone());
    let orgs_repo = OrganizationsRepo::new(state.database.clone());

    let memberships = memberships_repo.list_for_user(&user.id).await.map_err(|e| {
        error!("Failed to list memberships: {}", e);
        ApiError::InternalServerError("Failed to list organizations".to_string())
    })?;

    let mut organizations: Vec<OrganizationInfo> = Vec::new();
    for membership in memberships {
        let org = orgs_repo
            .get_active(&membership.organization_id)
            .await
            .map_err(|e| {
                error!("Failed to load organization: {}", e);
                ApiError::InternalServerError("Failed to list organizations".to_string())
            })?;

        if let Some(org) = org {
            organizations.push(OrganizationInfo {
                id: org.id,
                name: org.name,
                slug: org.slug,
                credits: org.credits,
                subscription_active: org.subscription_active,
                is_primary: org.is_primary,
                role: membership.role,
            });
        }
    }

    Ok(Json(OrganizationListResponse {
        success: true,
        organizations,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateOrganizationRequest {
    name: String,
}

#[derive(Debug, Serialize)]
pub struct CreateOrganizationResponse {
    success: bool,
    organization: OrganizationInfo,
}

pub async fn create_organization(
    State(state): State<Arc<AppState>>,
    user: User,
    Json(payload): Json<CreateOrganizationRequest>,
) -> Result<Json<CreateOrganizationResponse>, ApiError> {
    validate_org_name(&payload.name)?;

    let memberships_repo = MembershipsRepo::new(state.database.clone());
    let existing = memberships_repo.count_for_user(&user.id).await.map_err(|e| {
        error!("Failed to count memberships: {}", e);
        ApiError::InternalServerError("Failed to create organization".to_string())
    })?;

    let orgs_repo = OrganizationsRepo::new(state.database.clone());
    let org = orgs_repo
        .create(
            payload.name,
            user.id.clone(),
            existing == 0,
            state.config.free_credit_floor,
        )
        .await
        .map_err(|e| {
            error!("Failed to create organization: {}", e);
            ApiError::InternalServerError("Failed to create organization".to_string())
        })?;

    info!("{} created organization '{}'", user.email, org.name);

    Ok(Json(CreateOrganizationResponse {
        success: true,
        organization: OrganizationInfo {
            id: org.id,
            name: org.name,
            slug: org.slug,
            credits: org.credits,
            subscription_active: org.subscription_active,
            is_primary: org.is_primary,
            role: Role::Owner,
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct RenameOrganizationRequest {
    name: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    success: bool,
    message: String,
}

pub async fn rename_organization(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(org_id): Path<String>,
    Json(payload): Json<RenameOrganizationRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate_org_name(&payload.name)?;

    let (org, _role) = require_org_role(&state.database, &org_id, &user.id, Role::Admin).await?;

    let orgs_repo = OrganizationsRepo::new(state.database.clone());
    let old_name = org.name.clone();
    let org = orgs_repo.rename(org, payload.name).await.map_err(|e| {
        error!("Failed to rename organization: {}", e);
        ApiError::InternalServerError("Failed to rename organization".to_string())
    })?;

    info!("{} renamed '{}' to '{}'", user.email, old_name, org.name);

    Ok(Json(MessageResponse {
        success: true,
        message: format!("Renamed organization to '{}'", org.name),
    }))
}

#[derive(Debug, Deserialize)]
pub struct DeleteOrganizationRequest {
    /// Must match the organization name exactly.
    confirm: String,
    /// Where the remaining credits should go, if any remain.
    transfer_org_id: Option<String>,
}

pub async fn delete_organization(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(org_id): Path<String>,
    Json(payload): Json<DeleteOrganizationRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (org, _role) = require_org_role(&state.database, &org_id, &user.id, Role::Owner).await?;

    if payload.confirm != org.name {
        return Err(ApiError::PreconditionFailed(
            "Confirmation text does not match the organization name".to_string(),
        ));
    }

    let orgs_repo = OrganizationsRepo::new(state.database.clone());

    if org.credits > 0 {
        if let Some(target_id) = payload.transfer_org_id {
            if target_id == org.id {
                return Err(ApiError::BadRequest(
                    "Cannot transfer credits to the organization being deleted".to_string(),
                ));
            }

            let target = orgs_repo
                .get_active(&target_id)
                .await
                .map_err(|e| {
                    error!("Failed to load transfer organization: {}", e);
                    ApiError::InternalServerError("Failed to delete organization".to_string())
                })?
                .ok_or_else(|| {
                    ApiError::NotFound("Transfer organization not found".to_string())
                })?;

            let memberships_repo = MembershipsRepo::new(state.database.clone());
            let target_role = memberships_repo
                .get_role(&target.id, &user.id)
                .await
                .map_err(|e| {
                    error!("Failed to resolve membership: {}", e);
                    ApiError::InternalServerError("Failed to delete organization".to_string())
                })?;

            if target_role != Some(Role::Owner) {
                return Err(ApiError::Unauthorized(
                    "Requires OWNER role in the transfer organization".to_string(),
                ));
            }

            let transferred = orgs_repo
                .soft_delete_with_transfer(&org, &target.id)
                .await
                .map_err(|e| {
                    error!("Failed to transfer credits: {}", e);
                    ApiError::InternalServerError("Failed to delete organization".to_string())
                })?;

            if !transferred {
                return Err(ApiError::Conflict(
                    "The credit balance changed while deleting; try again".to_string(),
                ));
            }

            info!(
                "{} deleted '{}' and transferred {} credits to '{}'",
                user.email, org.name, org.credits, target.name
            );

            return Ok(Json(MessageResponse {
                success: true,
                message: format!(
                    "Deleted '{}' and transferred {} credits to '{}'",
                    org.name, org.credits, target.name
                ),
            }));
        }

        let targets = orgs_repo
            .eligible_transfer_targets(&user.id, &org.id)
            .await
            .map_err(|e| {
                error!("Failed to look up transfer targets: {}", e);
                ApiError::InternalServerError("Failed to delete organization".to_string())
            })?;

        if !targets.is_empty() {
            return Err(ApiError::PreconditionFailed(
                "Transfer the remaining credits to another organization before deleting"
                    .to_string(),
            ));
        }
        // no eligible target anywhere: the balance is forfeited
    }

    let deleted = orgs_repo.soft_delete(&org.id).await.map_err(|e| {
        error!("Failed to delete organization: {}", e);
        ApiError::InternalServerError("Failed to delete organization".to_string())
    })?;

    if !deleted {
        return Err(ApiError::Conflict(
            "Organization was already deleted".to_string(),
        ));
    }

    info!("{} deleted organization '{}'", user.email, org.name);

    Ok(Json(MessageResponse {
        success: true,
        message: format!("Deleted organization '{}'", org.name),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_names_are_rejected() {
        assert!(validate_org_name("").is_err());
        assert!(validate_org_name("   ").is_err());
    }

    #[test]
    fn names_over_the_limit_are_rejected() {
        let name = "x".repeat(MAX_ORG_NAME_LEN + 1);
        assert!(validate_org_name(&name).is_err());
    }

    #[test]
    fn reasonable_names_pass() {
        assert!(validate_org_name("Acme, Inc.").is_ok());
        assert!(validate_org_name(&"x".repeat(MAX_ORG_NAME_LEN)).is_ok());
    }
}
