use axum::{routing::post, Router};
use std::sync::Arc;

use crate::{core::state::AppState, handlers::billing::billing_webhook};

/// Webhook delivery is authenticated by the shared secret header, so it
/// lives outside the JWT-protected tree.
pub fn webhook_routes() -> Router<Arc<AppState>> {
    Router::new().route("/webhook", post(billing_webhook))
}
