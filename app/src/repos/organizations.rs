use sea_orm::{
    sea_query::{Expr, ExprTrait},
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, TransactionTrait,
};

use crate::{
    models::membership::{self, Role},
    models::organization::{self, ActiveModel, Entity as OrganizationEntity, Model as Organization},
    utils::crypto::{generate_uuid, slugify},
};

pub struct OrganizationsRepo {
    db: DatabaseConnection,
}

impl OrganizationsRepo {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Soft-deleted organizations are invisible to every caller except
    /// the purge sweep.
    pub async fn get_active(&self, org_id: &str) -> Result<Option<Organization>, DbErr> {
        OrganizationEntity::find_by_id(org_id)
            .filter(organization::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
    }

    /// Creates the organization and its OWNER membership in one
    /// transaction.
    pub async fn create(
        &self,
        name: String,
        owner_user_id: String,
        is_primary: bool,
        initial_credits: i32,
    ) -> Result<Organization, DbErr> {
        let now = chrono::Utc::now().naive_utc();
        let txn = self.db.begin().await?;

        let org_model = ActiveModel {
            id: Set(generate_uuid()),
            name: Set(name.clone()),
            slug: Set(slugify(&name)),
            credits: Set(initial_credits),
            subscription_active: Set(false),
            billing_customer_id: Set(None),
            is_primary: Set(is_primary),
            last_free_refill_at: Set(Some(now)),
            deleted_at: Set(None),
            created_at: Set(now),
        };
        let org = org_model.insert(&txn).await?;

        let membership_model = membership::ActiveModel {
            id: Set(generate_uuid()),
            organization_id: Set(org.id.clone()),
            user_id: Set(owner_user_id),
            role: Set(Role::Owner),
            created_at: Set(now),
        };
        membership_model.insert(&txn).await?;

        txn.commit().await?;
        Ok(org)
    }

    pub async fn rename(&self, org: Organization, name: String) -> Result<Organization, DbErr> {
        let mut org_model: ActiveModel = org.into();
        org_model.name = Set(name);
        org_model.update(&self.db).await
    }

    /// Live organizations where the user holds the OWNER role, excluding
    /// one id. These are the candidates for a credit transfer on delete.
    pub async fn eligible_transfer_targets(
        &self,
        user_id: &str,
        exclude_org_id: &str,
    ) -> Result<Vec<Organization>, DbErr> {
        OrganizationEntity::find()
            .inner_join(membership::Entity)
            .filter(membership::Column::UserId.eq(user_id))
            .filter(membership::Column::Role.eq(Role::Owner))
            .filter(organization::Column::DeletedAt.is_null())
            .filter(organization::Column::Id.ne(exclude_org_id))
            .all(&self.db)
            .await
    }

    /// Soft delete with forced credit loss. Conditional on the row still
    /// being live; returns false if someone deleted it first.
    pub async fn soft_delete(&self, org_id: &str) -> Result<bool, DbErr> {
        let now = chrono::Utc::now().naive_utc();
        let result = OrganizationEntity::update_many()
            .col_expr(organization::Column::Credits, Expr::value(0))
            .col_expr(organization::Column::DeletedAt, Expr::value(now))
            .filter(organization::Column::Id.eq(org_id))
            .filter(organization::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Moves the source balance to the target and soft-deletes the source
    /// in one transaction. The source update is compare-and-set on the
    /// balance observed by the caller, so a concurrent top-up or sweep
    /// aborts the whole transfer instead of losing credits.
    pub async fn soft_delete_with_transfer(
        &self,
        source: &Organization,
        target_org_id: &str,
    ) -> Result<bool, DbErr> {
        let now = chrono::Utc::now().naive_utc();
        let txn = self.db.begin().await?;

        let credited = OrganizationEntity::update_many()
            .col_expr(
                organization::Column::Credits,
                Expr::col(organization::Column::Credits).add(source.credits),
            )
            .filter(organization::Column::Id.eq(target_org_id))
            .filter(organization::Column::DeletedAt.is_null())
            .exec(&txn)
            .await?;

        if credited.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(false);
        }

        let deleted = OrganizationEntity::update_many()
            .col_expr(organization::Column::Credits, Expr::value(0))
            .col_expr(organization::Column::DeletedAt, Expr::value(now))
            .filter(organization::Column::Id.eq(&source.id))
            .filter(organization::Column::DeletedAt.is_null())
            .filter(organization::Column::Credits.eq(source.credits))
            .exec(&txn)
            .await?;

        if deleted.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(false);
        }

        txn.commit().await?;
        Ok(true)
    }

    /// Atomic balance increment, used by the billing webhook.
    pub async fn add_credits(&self, org_id: &str, amount: i32) -> Result<bool, DbErr> {
        let result = OrganizationEntity::update_many()
            .col_expr(
                organization::Column::Credits,
                Expr::col(organization::Column::Credits).add(amount),
            )
            .filter(organization::Column::Id.eq(org_id))
            .filter(organization::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn set_subscription_active(
        &self,
        org_id: &str,
        active: bool,
        billing_customer_id: Option<String>,
    ) -> Result<bool, DbErr> {
        let mut update = OrganizationEntity::update_many()
            .col_expr(
                organization::Column::SubscriptionActive,
                Expr::value(active),
            )
            .filter(organization::Column::Id.eq(org_id))
            .filter(organization::Column::DeletedAt.is_null());

        if let Some(customer_id) = billing_customer_id {
            update = update.col_expr(
                organization::Column::BillingCustomerId,
                Expr::value(customer_id),
            );
        }

        let result = update.exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    /// Free-credit refill sweep: one bulk conditional UPDATE. The WHERE
    /// clause is re-evaluated per row by the store, so the sweep is safe
    /// against concurrent purchases and a second immediate run is a
    /// no-op.
    pub async fn refill_free_credits(
        &self,
        floor: i32,
        refilled_before: chrono::NaiveDateTime,
    ) -> Result<u64, DbErr> {
        let now = chrono::Utc::now().naive_utc();
        let result = OrganizationEntity::update_many()
            .col_expr(organization::Column::Credits, Expr::value(floor))
            .col_expr(organization::Column::LastFreeRefillAt, Expr::value(now))
            .filter(organization::Column::SubscriptionActive.eq(false))
            .filter(organization::Column::DeletedAt.is_null())
            .filter(organization::Column::Credits.lt(floor))
            .filter(
                Condition::any()
                    .add(organization::Column::LastFreeRefillAt.lte(refilled_before))
                    .add(
                        Condition::all()
                            .add(organization::Column::LastFreeRefillAt.is_null())
                            .add(organization::Column::CreatedAt.lte(refilled_before)),
                    ),
            )
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Hard-purge sweep: organizations soft-deleted before the cutoff are
    /// removed for good; memberships, invitations and projects go with
    /// them via FK cascade.
    pub async fn purge_soft_deleted(
        &self,
        deleted_before: chrono::NaiveDateTime,
    ) -> Result<u64, DbErr> {
        let result = OrganizationEntity::delete_many()
            .filter(organization::Column::DeletedAt.lte(deleted_before))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn refill_sweep_reports_affected_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .into_connection();

        let repo = OrganizationsRepo::new(db);
        let cutoff = chrono::Utc::now().naive_utc() - chrono::Duration::days(30);
        assert_eq!(repo.refill_free_credits(5, cutoff).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn purge_sweep_reports_affected_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let repo = OrganizationsRepo::new(db);
        let cutoff = chrono::Utc::now().naive_utc() - chrono::Duration::days(30);
        assert_eq!(repo.purge_soft_deleted(cutoff).await.unwrap(), 1);
    }
}
