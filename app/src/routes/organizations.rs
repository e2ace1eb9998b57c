use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{
    core::state::AppState,
    handlers::{
        billing::create_checkout,
        invitations::{
            create_invitation, delete_invitation, list_invitations, resend_invitation,
            revoke_invitation,
        },
        members::{change_member_role, list_members},
        organizations::{
            create_organization, delete_organization, list_organizations, rename_organization,
        },
        projects::{create_project, delete_project, list_projects, rename_project},
    },
};

pub fn organization_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_organizations).post(create_organization))
        .route("/:org_id", put(rename_organization).delete(delete_organization))
        // Members
        .route("/:org_id/members", get(list_members))
        .route("/:org_id/members/role", put(change_member_role))
        // Invitations
        .route(
            "/:org_id/invites",
            get(list_invitations).post(create_invitation),
        )
        .route("/:org_id/invites/:invite_id/resend", post(resend_invitation))
        .route("/:org_id/invites/:invite_id/revoke", post(revoke_invitation))
        .route("/:org_id/invites/:invite_id", delete(delete_invitation))
        // Projects
        .route(
            "/:org_id/projects",
            get(list_projects).post(create_project),
        )
        .route(
            "/:org_id/projects/:project_id",
            put(rename_project).delete(delete_project),
        )
        // Billing
        .route("/:org_id/billing/checkout", post(create_checkout))
}
