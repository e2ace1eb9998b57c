use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{
    core::state::AppState,
    models::user::Model as User,
    repos::users::UsersRepo,
    utils::response::ApiError,
};

const THEMES: [&str; 3] = ["light", "dark", "system"];

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    name: String,
    avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    success: bool,
    user: User,
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: User,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::PreconditionFailed(
            "Name cannot be empty".to_string(),
        ));
    }
    if name.chars().count() > 100 {
        return Err(ApiError::PreconditionFailed("Name is too long".to_string()));
    }

    let users_repo = UsersRepo::new(state.database.clone());
    let user = users_repo
        .update_profile(&user.id, name, payload.avatar_url)
        .await
        .map_err(|e| {
            error!("Failed to update profile: {}", e);
            ApiError::InternalServerError("Failed to update profile".to_string())
        })?;

    Ok(Json(SettingsResponse {
        success: true,
        user,
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateThemeRequest {
    theme: String,
}

pub async fn update_theme(
    State(state): State<Arc<AppState>>,
    user: User,
    Json(payload): Json<UpdateThemeRequest>,
) -> Result<Json<SettingsResponse>, ApiError> {
    if !THEMES.contains(&payload.theme.as_str()) {
        return Err(ApiError::PreconditionFailed(format!(
            "Theme must be one of: {}",
            THEMES.join(", ")
        )));
    }

    let users_repo = UsersRepo::new(state.database.clone());
    let user = users_repo
        .update_theme(&user.id, payload.theme)
        .await
        .map_err(|e| {
            error!("Failed to update theme: {}", e);
            ApiError::InternalServerError("Failed to update theme".to_string())
        })?;

    Ok(Json(SettingsResponse {
        success: true,
        user,
    }))
}
