use axum::{routing::put, Router};
use std::sync::Arc;

use crate::{
    core::state::AppState,
    handlers::settings::{update_profile, update_theme},
};

pub fn settings_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", put(update_profile))
        .route("/theme", put(update_theme))
}
