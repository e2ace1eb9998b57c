use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

use crate::{
    models::membership::{
        self, ActiveModel, Entity as MembershipEntity, Model as Membership, Role,
    },
    models::user::{Entity as UserEntity, Model as User},
    utils::crypto::generate_uuid,
};

pub struct MembershipsRepo {
    db: DatabaseConnection,
}

impl MembershipsRepo {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Point lookup on the (organization, user) composite key. `None`
    /// means "not a member" - the caller decides whether that is an
    /// authorization failure.
    pub async fn get_role(&self, org_id: &str, user_id: &str) -> Result<Option<Role>, DbErr> {
        let membership = self.get(org_id, user_id).await?;
        Ok(membership.map(|m| m.role))
    }

    pub async fn get(&self, org_id: &str, user_id: &str) -> Result<Option<Membership>, DbErr> {
        MembershipEntity::find()
            .filter(membership::Column::OrganizationId.eq(org_id))
            .filter(membership::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
    }

    pub async fn create(
        &self,
        org_id: String,
        user_id: String,
        role: Role,
    ) -> Result<Membership, DbErr> {
        let membership_model = ActiveModel {
            id: Set(generate_uuid()),
            organization_id: Set(org_id),
            user_id: Set(user_id),
            role: Set(role),
            created_at: Set(chrono::Utc::now().naive_utc()),
        };

        membership_model.insert(&self.db).await
    }

    pub async fn update_role(&self, membership: Membership, role: Role) -> Result<Membership, DbErr> {
        let mut membership_model: ActiveModel = membership.into();
        membership_model.role = Set(role);
        membership_model.update(&self.db).await
    }

    /// All members of an organization with their user rows.
    pub async fn list_for_org(&self, org_id: &str) -> Result<Vec<(Membership, User)>, DbErr> {
        let memberships = MembershipEntity::find()
            .filter(membership::Column::OrganizationId.eq(org_id))
            .order_by_asc(membership::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let mut results: Vec<(Membership, User)> = Vec::new();
        for m in memberships {
            if let Some(user) = UserEntity::find_by_id(&m.user_id).one(&self.db).await? {
                results.push((m, user));
            }
        }

        Ok(results)
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Membership>, DbErr> {
        MembershipEntity::find()
            .filter(membership::Column::UserId.eq(user_id))
            .order_by_asc(membership::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    pub async fn count_for_user(&self, user_id: &str) -> Result<u64, DbErr> {
        use sea_orm::PaginatorTrait;

        MembershipEntity::find()
            .filter(membership::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn membership_row(role: Role) -> Membership {
        Membership {
            id: "mem_1".to_string(),
            organization_id: "org_1".to_string(),
            user_id: "usr_1".to_string(),
            role,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[tokio::test]
    async fn get_role_resolves_the_composite_key() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![membership_row(Role::Admin)]])
            .into_connection();

        let repo = MembershipsRepo::new(db);
        let role = repo.get_role("org_1", "usr_1").await.unwrap();
        assert_eq!(role, Some(Role::Admin));
    }

    #[tokio::test]
    async fn get_role_distinguishes_absence_from_failure() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Membership>::new()])
            .into_connection();

        let repo = MembershipsRepo::new(db);
        let role = repo.get_role("org_1", "usr_2").await.unwrap();
        assert_eq!(role, None);
    }
}
