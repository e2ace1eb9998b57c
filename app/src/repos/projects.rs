use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

use crate::{
    models::project::{self, ActiveModel, Entity as ProjectEntity, Model as Project},
    utils::crypto::generate_uuid,
};

pub struct ProjectsRepo {
    db: DatabaseConnection,
}

impl ProjectsRepo {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, org_id: String, name: String) -> Result<Project, DbErr> {
        let project_model = ActiveModel {
            id: Set(generate_uuid()),
            organization_id: Set(org_id),
            name: Set(name),
            created_at: Set(chrono::Utc::now().naive_utc()),
            updated_at: Set(None),
        };

        project_model.insert(&self.db).await
    }

    pub async fn get_in_org(&self, org_id: &str, project_id: &str) -> Result<Option<Project>, DbErr> {
        ProjectEntity::find_by_id(project_id)
            .filter(project::Column::OrganizationId.eq(org_id))
            .one(&self.db)
            .await
    }

    pub async fn list_for_org(&self, org_id: &str) -> Result<Vec<Project>, DbErr> {
        ProjectEntity::find()
            .filter(project::Column::OrganizationId.eq(org_id))
            .order_by_desc(project::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    pub async fn rename(&self, project: Project, name: String) -> Result<Project, DbErr> {
        let mut project_model: ActiveModel = project.into();
        project_model.name = Set(name);
        project_model.updated_at = Set(Some(chrono::Utc::now().naive_utc()));
        project_model.update(&self.db).await
    }

    pub async fn delete(&self, project_id: &str) -> Result<(), DbErr> {
        ProjectEntity::delete_by_id(project_id)
            .exec(&self.db)
            .await?;

        Ok(())
    }
}
