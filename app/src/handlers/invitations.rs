use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
    core::state::AppState,
    models::invitation::{AcceptRejection, InvitationStatus, Model as Invitation},
    models::membership::Role,
    models::user::Model as User,
    repos::invitations::{AcceptOutcome, InvitationsRepo},
    services::{access::require_org_role, mailer},
    utils::response::ApiError,
};

#[derive(Debug, Serialize)]
pub struct InvitationInfo {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub status: InvitationStatus,
    pub expires_at: String,
    pub created_at: String,
}

impl From<Invitation> for InvitationInfo {
    fn from(invitation: Invitation) -> Self {
        Self {
            id: invitation.id,
            email: invitation.email,
            role: invitation.role,
            status: invitation.status,
            expires_at: invitation.expires_at.to_string(),
            created_at: invitation.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InvitationListResponse {
    success: bool,
    invitations: Vec<InvitationInfo>,
}

pub async fn list_invitations(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(org_id): Path<String>,
) -> Result<Json<InvitationListResponse>, ApiError> {
    require_org_role(&state.database, &org_id, &user.id, Role::Admin).await?;

    let invitations_repo = InvitationsRepo::new(state.database.clone());
    let invitations = invitations_repo.list_for_org(&org_id).await.map_err(|e| {
        error!("Failed to list invitations: {}", e);
        ApiError::InternalServerError("Failed to list invitations".to_string())
    })?;

    Ok(Json(InvitationListResponse {
        success: true,
        invitations: invitations.into_iter().map(InvitationInfo::from).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateInvitationRequest {
    email: String,
    role: Role,
}

#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    success: bool,
    message: String,
    invitation: Option<InvitationInfo>,
}

pub async fn create_invitation(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(org_id): Path<String>,
    Json(payload): Json<CreateInvitationRequest>,
) -> Result<Json<InvitationResponse>, ApiError> {
    let (org, _role) = require_org_role(&state.database, &org_id, &user.id, Role::Admin).await?;

    let email = payload.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(ApiError::BadRequest("Invalid email address".to_string()));
    }

    if payload.role == Role::Owner {
        return Err(ApiError::PreconditionFailed(
            "Cannot invite as OWNER".to_string(),
        ));
    }

    let invitations_repo = InvitationsRepo::new(state.database.clone());
    let duplicate = invitations_repo
        .find_active_by_email(&org_id, &email)
        .await
        .map_err(|e| {
            error!("Failed to check for existing invitation: {}", e);
            ApiError::InternalServerError("Failed to create invitation".to_string())
        })?;

    if duplicate.is_some() {
        return Err(ApiError::Conflict(format!(
            "'{}' already has an active invitation",
            email
        )));
    }

    let expires_at = chrono::Utc::now().naive_utc()
        + chrono::Duration::days(state.config.invite_expiry_days);

    let invitation = invitations_repo
        .create(org_id, email.clone(), payload.role, user.id.clone(), expires_at)
        .await
        .map_err(|e| {
            error!("Failed to create invitation: {}", e);
            ApiError::InternalServerError("Failed to create invitation".to_string())
        })?;

    info!("{} invited {} to '{}'", user.email, email, org.name);

    mailer::dispatch_invite_email(
        state.config.clone(),
        email.clone(),
        org.name.clone(),
        invitation.token.clone(),
    );

    Ok(Json(InvitationResponse {
        success: true,
        message: format!("Invitation sent to '{}'", email),
        invitation: Some(invitation.into()),
    }))
}

/// Loads an invitation scoped to the organization in the path; an id
/// that belongs to another organization is indistinguishable from a
/// missing one.
async fn load_org_invitation(
    repo: &InvitationsRepo,
    org_id: &str,
    invite_id: &str,
) -> Result<Invitation, ApiError> {
    let invitation = repo
        .get_by_id(invite_id)
        .await
        .map_err(|e| {
            error!("Failed to load invitation: {}", e);
            ApiError::InternalServerError("Failed to load invitation".to_string())
        })?
        .filter(|inv| inv.organization_id == org_id)
        .ok_or_else(|| ApiError::NotFound("Invitation not found".to_string()))?;

    Ok(invitation)
}

pub async fn resend_invitation(
    State(state): State<Arc<AppState>>,
    user: User,
    Path((org_id, invite_id)): Path<(String, String)>,
) -> Result<Json<InvitationResponse>, ApiError> {
    let (org, _role) = require_org_role(&state.database, &org_id, &user.id, Role::Admin).await?;

    let invitations_repo = InvitationsRepo::new(state.database.clone());
    let invitation = load_org_invitation(&invitations_repo, &org_id, &invite_id).await?;

    if !matches!(
        invitation.status,
        InvitationStatus::Pending | InvitationStatus::Revoked
    ) {
        return Err(ApiError::PreconditionFailed(
            "Only pending or revoked invitations can be resent".to_string(),
        ));
    }

    let email = invitation.email.clone();
    let expires_at = chrono::Utc::now().naive_utc()
        + chrono::Duration::days(state.config.invite_expiry_days);

    let invitation = invitations_repo
        .reissue(invitation, expires_at)
        .await
        .map_err(|e| {
            error!("Failed to reissue invitation: {}", e);
            ApiError::InternalServerError("Failed to resend invitation".to_string())
        })?;

    info!("{} resent invitation to {}", user.email, email);

    mailer::dispatch_invite_email(
        state.config.clone(),
        email.clone(),
        org.name.clone(),
        invitation.token.clone(),
    );

    Ok(Json(InvitationResponse {
        success: true,
        message: format!("Invitation resent to '{}'", email),
        invitation: Some(invitation.into()),
    }))
}

pub async fn revoke_invitation(
    State(state): State<Arc<AppState>>,
    user: User,
    Path((org_id, invite_id)): Path<(String, String)>,
) -> Result<Json<InvitationResponse>, ApiError> {
    require_org_role(&state.database, &org_id, &user.id, Role::Admin).await?;

    let invitations_repo = InvitationsRepo::new(state.database.clone());
    let invitation = load_org_invitation(&invitations_repo, &org_id, &invite_id).await?;

    // Revoking after an accept only blocks reuse of the invitation; the
    // membership it created stays.
    if !matches!(
        invitation.status,
        InvitationStatus::Pending | InvitationStatus::Accepted
    ) {
        return Err(ApiError::PreconditionFailed(
            "Invitation is already revoked".to_string(),
        ));
    }

    let invitation = invitations_repo.revoke(invitation).await.map_err(|e| {
        error!("Failed to revoke invitation: {}", e);
        ApiError::InternalServerError("Failed to revoke invitation".to_string())
    })?;

    info!("{} revoked invitation {}", user.email, invitation.id);

    Ok(Json(InvitationResponse {
        success: true,
        message: format!("Invitation for '{}' revoked", invitation.email),
        invitation: Some(invitation.into()),
    }))
}

pub async fn delete_invitation(
    State(state): State<Arc<AppState>>,
    user: User,
    Path((org_id, invite_id)): Path<(String, String)>,
) -> Result<Json<InvitationResponse>, ApiError> {
    require_org_role(&state.database, &org_id, &user.id, Role::Admin).await?;

    let invitations_repo = InvitationsRepo::new(state.database.clone());
    let invitation = invitations_repo.get_by_id(&invite_id).await.map_err(|e| {
        error!("Failed to load invitation: {}", e);
        ApiError::InternalServerError("Failed to delete invitation".to_string())
    })?;

    let invitation = match invitation.filter(|inv| inv.organization_id == org_id) {
        Some(inv) => inv,
        // already gone: deleting again is fine
        None => {
            return Ok(Json(InvitationResponse {
                success: true,
                message: "Invitation already removed".to_string(),
                invitation: None,
            }))
        }
    };

    if invitation.status != InvitationStatus::Revoked {
        return Err(ApiError::PreconditionFailed(
            "Only revoked invitations can be deleted".to_string(),
        ));
    }

    invitations_repo.delete(&invitation.id).await.map_err(|e| {
        error!("Failed to delete invitation: {}", e);
        ApiError::InternalServerError("Failed to delete invitation".to_string())
    })?;

    info!("{} deleted invitation {}", user.email, invitation.id);

    Ok(Json(InvitationResponse {
        success: true,
        message: format!("Invitation for '{}' deleted", invitation.email),
        invitation: None,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AcceptInvitationRequest {
    token: String,
}

#[derive(Debug, Serialize)]
pub struct AcceptInvitationResponse {
    success: bool,
    organization_id: String,
    role: Role,
}

pub async fn accept_invitation(
    State(state): State<Arc<AppState>>,
    user: User,
    Json(payload): Json<AcceptInvitationRequest>,
) -> Result<Json<AcceptInvitationResponse>, ApiError> {
    let invitations_repo = InvitationsRepo::new(state.database.clone());

    let invitation = invitations_repo
        .get_by_token(&payload.token)
        .await
        .map_err(|e| {
            error!("Failed to look up invitation token: {}", e);
            ApiError::InternalServerError("Failed to accept invitation".to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Invitation not found".to_string()))?;

    invitation
        .acceptable_at(chrono::Utc::now().naive_utc())
        .map_err(|rejection| match rejection {
            AcceptRejection::NotPending => {
                ApiError::PreconditionFailed("Invitation is no longer pending".to_string())
            }
            AcceptRejection::Expired => {
                ApiError::PreconditionFailed("Invitation has expired".to_string())
            }
        })?;

    let outcome = invitations_repo
        .accept(&invitation, &user.id)
        .await
        .map_err(|e| {
            error!("Failed to accept invitation: {}", e);
            ApiError::InternalServerError("Failed to accept invitation".to_string())
        })?;

    match outcome {
        AcceptOutcome::Accepted {
            organization_id,
            role,
        } => {
            info!(
                "{} joined organization {} as {}",
                user.email,
                organization_id,
                role.as_str()
            );

            Ok(Json(AcceptInvitationResponse {
                success: true,
                organization_id,
                role,
            }))
        }
        AcceptOutcome::NoLongerPending => Err(ApiError::PreconditionFailed(
            "Invitation is no longer pending".to_string(),
        )),
    }
}
