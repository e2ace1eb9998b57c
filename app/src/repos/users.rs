use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};

use crate::{
    models::user::{self, ActiveModel, Entity as UserEntity, Model as User},
    utils::crypto::generate_uuid,
};

pub struct UsersRepo {
    db: DatabaseConnection,
}

impl UsersRepo {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_by_id(&self, user_id: &str) -> Result<Option<User>, DbErr> {
        UserEntity::find_by_id(user_id).one(&self.db).await
    }

    pub async fn get_by_email(&self, email: &str) -> Result<User, DbErr> {
        UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))
    }

    /// Create-or-refresh from the identity the auth provider vouched for.
    /// Returns the user plus whether the row was newly created.
    pub async fn upsert_from_auth(
        &self,
        email: String,
        name: String,
        avatar_url: Option<String>,
    ) -> Result<(User, bool), DbErr> {
        let existing = UserEntity::find()
            .filter(user::Column::Email.eq(&email))
            .one(&self.db)
            .await?;

        match existing {
            Some(user) => {
                let mut user_model: ActiveModel = user.into();
                user_model.name = Set(name);
                user_model.avatar_url = Set(avatar_url);
                let user = user_model.update(&self.db).await?;
                Ok((user, false))
            }
            None => {
                let user_model = ActiveModel {
                    id: Set(generate_uuid()),
                    email: Set(email),
                    name: Set(name),
                    avatar_url: Set(avatar_url),
                    theme: Set("system".to_string()),
                    created_at: Set(chrono::Utc::now().naive_utc()),
                };
                let user = user_model.insert(&self.db).await?;
                Ok((user, true))
            }
        }
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        name: String,
        avatar_url: Option<String>,
    ) -> Result<User, DbErr> {
        let user = UserEntity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;

        let mut user_model: ActiveModel = user.into();
        user_model.name = Set(name);
        user_model.avatar_url = Set(avatar_url);
        user_model.update(&self.db).await
    }

    pub async fn update_theme(&self, user_id: &str, theme: String) -> Result<User, DbErr> {
        let user = UserEntity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;

        let mut user_model: ActiveModel = user.into();
        user_model.theme = Set(theme);
        user_model.update(&self.db).await
    }
}
