use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
    Json,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
    core::state::AppState,
    models::user::Model as User,
    repos::{organizations::OrganizationsRepo, users::UsersRepo},
    utils::{jwt::create_jwt, response::ApiError},
};

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    code: String,
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    email: String,
    name: String,
    picture: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    success: bool,
    token: String,
    user: User,
}

pub async fn google_login(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let auth_url = format!(
        "https://accounts.google.com/o/oauth2/v2/auth?client_id={}&redirect_uri={}&response_type=code&scope=openid%20email%20profile",
        state.config.google_client_id,
        urlencoding::encode(&state.config.google_redirect_uri)
    );

    Redirect::temporary(&auth_url)
}

pub async fn google_callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<Json<AuthResponse>, ApiError> {
    let http_client = Client::new();

    let token_response = http_client
        .post("https://oauth2.googleapis.com/token")
        .form(&[
            ("code", query.code.as_str()),
            ("client_id", state.config.google_client_id.as_str()),
            ("client_secret", state.config.google_client_secret.as_str()),
            ("redirect_uri", state.config.google_redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .map_err(|e| {
            error!("Failed to exchange code: {}", e);
            ApiError::InternalServerError("Failed to authenticate with Google".to_string())
        })?
        .json::<GoogleTokenResponse>()
        .await
        .map_err(|e| {
            error!("Failed to parse token response: {}", e);
            ApiError::InternalServerError("Failed to authenticate with Google".to_string())
        })?;

    let user_info = http_client
        .get("https://www.googleapis.com/oauth2/v2/userinfo")
        .bearer_auth(&token_response.access_token)
        .send()
        .await
        .map_err(|e| {
            error!("Failed to fetch user info: {}", e);
            ApiError::InternalServerError("Failed to authenticate with Google".to_string())
        })?
        .json::<GoogleUserInfo>()
        .await
        .map_err(|e| {
            error!("Failed to parse user info: {}", e);
            ApiError::InternalServerError("Failed to authenticate with Google".to_string())
        })?;

    let users_repo = UsersRepo::new(state.database.clone());
    let (user, created) = users_repo
        .upsert_from_auth(user_info.email, user_info.name, user_info.picture)
        .await
        .map_err(|e| {
            error!("Failed to upsert user: {}", e);
            ApiError::InternalServerError("Failed to sign in".to_string())
        })?;

    // First login gets a primary organization to land in.
    if created {
        let orgs_repo = OrganizationsRepo::new(state.database.clone());
        orgs_repo
            .create(
                format!("{}'s Organization", user.name),
                user.id.clone(),
                true,
                state.config.free_credit_floor,
            )
            .await
            .map_err(|e| {
                error!("Failed to create primary organization: {}", e);
                ApiError::InternalServerError("Failed to sign in".to_string())
            })?;

        info!("Created primary organization for {}", user.email);
    }

    let token = create_jwt(
        user.email.clone(),
        user.id.clone(),
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )
    .map_err(|e| {
        error!("Failed to issue session token: {}", e);
        ApiError::InternalServerError("Failed to sign in".to_string())
    })?;

    Ok(Json(AuthResponse {
        success: true,
        token,
        user,
    }))
}

pub async fn get_me(user: User) -> Json<User> {
    Json(user)
}
