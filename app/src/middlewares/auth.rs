use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::{
    core::state::AppState,
    models::user::Model as User,
    repos::users::UsersRepo,
    utils::{jwt::verify_jwt, response::ApiError},
};

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(tok) if tok.starts_with("Bearer ") => &tok[7..],
        _ => {
            error!("Auth Failed, Missing or invalid authorization header");
            return ApiError::Unauthenticated.into_response();
        }
    };

    let claims = match verify_jwt(token, &state.config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            error!("Auth Failed, Invalid token: {}", e);
            return ApiError::Unauthenticated.into_response();
        }
    };

    let users_repo = UsersRepo::new(state.database.clone());
    let user = match users_repo.get_by_email(&claims.sub).await {
        Ok(u) => u,
        Err(e) => {
            error!("User not found: {}", e);
            return ApiError::Unauthenticated.into_response();
        }
    };

    request.extensions_mut().insert(user);
    next.run(request).await
}

/// Lets handlers take the authenticated user directly as an argument.
/// Only routes behind `require_auth` carry the extension.
#[async_trait::async_trait]
impl<S> FromRequestParts<S> for User
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .ok_or(ApiError::Unauthenticated)
    }
}
