use std::sync::Arc;

use axum::{routing::get, Router};

use crate::{
    core::state::AppState,
    handlers::auth::{google_callback, google_login},
};

pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(google_login))
        .route("/callback", get(google_callback))
}
