use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::{
    core::state::AppState,
    models::membership::Role,
    models::user::Model as User,
    repos::organizations::OrganizationsRepo,
    services::{access::require_org_role, billing, billing::BillingEvent},
    utils::response::ApiError,
};

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    success: bool,
    url: String,
}

pub async fn create_checkout(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(org_id): Path<String>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let (org, _role) = require_org_role(&state.database, &org_id, &user.id, Role::Admin).await?;

    let url = billing::create_checkout_session(&state.config, &org.id)
        .await
        .map_err(|e| {
            error!("Failed to create checkout session: {}", e);
            ApiError::InternalServerError("Failed to start checkout".to_string())
        })?;

    info!("{} started checkout for '{}'", user.email, org.name);

    Ok(Json(CheckoutResponse { success: true, url }))
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    success: bool,
}

/// Payment processor callback. Authenticated by the shared webhook
/// secret, not by a user session.
pub async fn billing_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<WebhookResponse>, ApiError> {
    let provided = headers
        .get("X-Webhook-Secret")
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();

    if provided != state.config.billing_webhook_secret {
        error!("Billing webhook rejected: bad signature header");
        return Err(ApiError::Unauthorized("Invalid webhook secret".to_string()));
    }

    let event: BillingEvent = match serde_json::from_value(payload) {
        Ok(event) => event,
        Err(e) => {
            // unknown event types are acknowledged so the provider stops retrying
            warn!("Ignoring unrecognized billing event: {}", e);
            return Ok(Json(WebhookResponse { success: true }));
        }
    };

    let orgs_repo = OrganizationsRepo::new(state.database.clone());

    match event {
        BillingEvent::CheckoutCompleted {
            organization_id,
            credits,
        } => {
            if credits <= 0 {
                warn!(
                    "Checkout for {} completed with non-positive credits {}",
                    organization_id, credits
                );
                return Ok(Json(WebhookResponse { success: true }));
            }

            let applied = orgs_repo
                .add_credits(&organization_id, credits)
                .await
                .map_err(|e| {
                    error!("Failed to apply credit top-up: {}", e);
                    ApiError::InternalServerError("Failed to process event".to_string())
                })?;

            if applied {
                info!("Added {} credits to org {}", credits, organization_id);
            } else {
                warn!(
                    "Checkout completed for unknown or deleted org {}",
                    organization_id
                );
            }
        }
        BillingEvent::SubscriptionUpdated {
            organization_id,
            active,
            customer_id,
        } => {
            let applied = orgs_repo
                .set_subscription_active(&organization_id, active, customer_id)
                .await
                .map_err(|e| {
                    error!("Failed to update subscription state: {}", e);
                    ApiError::InternalServerError("Failed to process event".to_string())
                })?;

            if applied {
                info!(
                    "Subscription for org {} now active={}",
                    organization_id, active
                );
            } else {
                warn!(
                    "Subscription update for unknown or deleted org {}",
                    organization_id
                );
            }
        }
    }

    Ok(Json(WebhookResponse { success: true }))
}
