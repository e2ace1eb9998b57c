pub mod auth;
pub mod billing;
pub mod organizations;
pub mod settings;

use std::sync::Arc;

use axum::{middleware, routing::post, Router};

use crate::{
    core::state::AppState,
    handlers::invitations::accept_invitation,
    middlewares::auth::require_auth,
    routes::{
        auth::auth_routes, billing::webhook_routes, organizations::organization_routes,
        settings::settings_routes,
    },
    utils::global_error_handler::global_error_handler,
};

pub fn create_routers(state: Arc<AppState>) -> Router<()> {
    let public_routes = Router::new()
        .nest("/auth", auth_routes())
        .nest("/billing", webhook_routes());

    let protected_routes = Router::new()
        .nest("/orgs", organization_routes())
        .nest("/settings", settings_routes())
        .nest("/auth", protected_auth_routes())
        .route("/invites/accept", post(accept_invitation))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .fallback(global_error_handler)
        .with_state(state)
}

fn protected_auth_routes() -> Router<Arc<AppState>> {
    use crate::handlers::auth::get_me;
    use axum::routing::get;

    Router::new().route("/me", get(get_me))
}
