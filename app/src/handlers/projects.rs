use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
    core::state::AppState,
    models::membership::Role,
    models::project::Model as Project,
    models::user::Model as User,
    repos::projects::ProjectsRepo,
    services::access::require_org_role,
    utils::response::ApiError,
};

const MAX_PROJECT_NAME_LEN: usize = 100;

fn validate_project_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::PreconditionFailed(
            "Project name cannot be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_PROJECT_NAME_LEN {
        return Err(ApiError::PreconditionFailed(
            "Project name is too long".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    success: bool,
    projects: Vec<Project>,
}

pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(org_id): Path<String>,
) -> Result<Json<ProjectListResponse>, ApiError> {
    require_org_role(&state.database, &org_id, &user.id, Role::Member).await?;

    let projects_repo = ProjectsRepo::new(state.database.clone());
    let projects = projects_repo.list_for_org(&org_id).await.map_err(|e| {
        error!("Failed to list projects: {}", e);
        ApiError::InternalServerError("Failed to list projects".to_string())
    })?;

    Ok(Json(ProjectListResponse {
        success: true,
        projects,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ProjectNameRequest {
    name: String,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    success: bool,
    project: Option<Project>,
    message: String,
}

pub async fn create_project(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(org_id): Path<String>,
    Json(payload): Json<ProjectNameRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    validate_project_name(&payload.name)?;

    let (org, _role) = require_org_role(&state.database, &org_id, &user.id, Role::Member).await?;

    let projects_repo = ProjectsRepo::new(state.database.clone());
    let project = projects_repo
        .create(org.id, payload.name)
        .await
        .map_err(|e| {
            error!("Failed to create project: {}", e);
            ApiError::InternalServerError("Failed to create project".to_string())
        })?;

    info!("{} created project '{}' in '{}'", user.email, project.name, org.name);

    Ok(Json(ProjectResponse {
        success: true,
        message: format!("Created project '{}'", project.name),
        project: Some(project),
    }))
}

pub async fn rename_project(
    State(state): State<Arc<AppState>>,
    user: User,
    Path((org_id, project_id)): Path<(String, String)>,
    Json(payload): Json<ProjectNameRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    validate_project_name(&payload.name)?;

    require_org_role(&state.database, &org_id, &user.id, Role::Member).await?;

    let projects_repo = ProjectsRepo::new(state.database.clone());
    let project = projects_repo
        .get_in_org(&org_id, &project_id)
        .await
        .map_err(|e| {
            error!("Failed to load project: {}", e);
            ApiError::InternalServerError("Failed to rename project".to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let project = projects_repo
        .rename(project, payload.name)
        .await
        .map_err(|e| {
            error!("Failed to rename project: {}", e);
            ApiError::InternalServerError("Failed to rename project".to_string())
        })?;

    Ok(Json(ProjectResponse {
        success: true,
        message: format!("Renamed project to '{}'", project.name),
        project: Some(project),
    }))
}

pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    user: User,
    Path((org_id, project_id)): Path<(String, String)>,
) -> Result<Json<ProjectResponse>, ApiError> {
    require_org_role(&state.database, &org_id, &user.id, Role::Admin).await?;

    let projects_repo = ProjectsRepo::new(state.database.clone());
    let project = projects_repo
        .get_in_org(&org_id, &project_id)
        .await
        .map_err(|e| {
            error!("Failed to load project: {}", e);
            ApiError::InternalServerError("Failed to delete project".to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    projects_repo.delete(&project.id).await.map_err(|e| {
        error!("Failed to delete project: {}", e);
        ApiError::InternalServerError("Failed to delete project".to_string())
    })?;

    info!("{} deleted project '{}'", user.email, project.name);

    Ok(Json(ProjectResponse {
        success: true,
        message: format!("Deleted project '{}'", project.name),
        project: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_project_names_are_rejected() {
        assert!(validate_project_name("  ").is_err());
    }

    #[test]
    fn long_project_names_are_rejected() {
        assert!(validate_project_name(&"p".repeat(MAX_PROJECT_NAME_LEN + 1)).is_err());
    }
}
