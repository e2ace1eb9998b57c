use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};

use crate::{
    models::invitation::{
        self, ActiveModel, Entity as InvitationEntity, InvitationStatus, Model as Invitation,
    },
    models::membership::{self, Entity as MembershipEntity, Role},
    utils::crypto::{generate_invite_token, generate_uuid},
};

/// Result of a token redemption attempt that passed the pre-checks.
#[derive(Debug, PartialEq)]
pub enum AcceptOutcome {
    Accepted { organization_id: String, role: Role },
    /// Lost the race against a concurrent accept or revoke.
    NoLongerPending,
}

pub struct InvitationsRepo {
    db: DatabaseConnection,
}

impl InvitationsRepo {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        org_id: String,
        email: String,
        role: Role,
        invited_by: String,
        expires_at: chrono::NaiveDateTime,
    ) -> Result<Invitation, DbErr> {
        let invitation_model = ActiveModel {
            id: Set(generate_uuid()),
            organization_id: Set(org_id),
            email: Set(email),
            role: Set(role),
            token: Set(generate_invite_token()),
            status: Set(InvitationStatus::Pending),
            expires_at: Set(expires_at),
            invited_by: Set(invited_by),
            created_at: Set(chrono::Utc::now().naive_utc()),
        };

        invitation_model.insert(&self.db).await
    }

    pub async fn get_by_id(&self, invite_id: &str) -> Result<Option<Invitation>, DbErr> {
        InvitationEntity::find_by_id(invite_id).one(&self.db).await
    }

    pub async fn get_by_token(&self, token: &str) -> Result<Option<Invitation>, DbErr> {
        InvitationEntity::find()
            .filter(invitation::Column::Token.eq(token))
            .one(&self.db)
            .await
    }

    /// An email may hold at most one PENDING or ACCEPTED invitation per
    /// organization.
    pub async fn find_active_by_email(
        &self,
        org_id: &str,
        email: &str,
    ) -> Result<Option<Invitation>, DbErr> {
        InvitationEntity::find()
            .filter(invitation::Column::OrganizationId.eq(org_id))
            .filter(invitation::Column::Email.eq(email))
            .filter(
                invitation::Column::Status
                    .is_in([InvitationStatus::Pending, InvitationStatus::Accepted]),
            )
            .one(&self.db)
            .await
    }

    pub async fn list_for_org(&self, org_id: &str) -> Result<Vec<Invitation>, DbErr> {
        InvitationEntity::find()
            .filter(invitation::Column::OrganizationId.eq(org_id))
            .order_by_desc(invitation::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    pub async fn revoke(&self, invitation: Invitation) -> Result<Invitation, DbErr> {
        let mut invitation_model: ActiveModel = invitation.into();
        invitation_model.status = Set(InvitationStatus::Revoked);
        invitation_model.update(&self.db).await
    }

    /// Returns the invitation to PENDING under a fresh token and expiry.
    /// The old token stops resolving because the token column is
    /// replaced, not duplicated.
    pub async fn reissue(
        &self,
        invitation: Invitation,
        expires_at: chrono::NaiveDateTime,
    ) -> Result<Invitation, DbErr> {
        let mut invitation_model: ActiveModel = invitation.into();
        invitation_model.token = Set(generate_invite_token());
        invitation_model.status = Set(InvitationStatus::Pending);
        invitation_model.expires_at = Set(expires_at);
        invitation_model.update(&self.db).await
    }

    /// Idempotent: deleting an already-absent row is a no-op.
    pub async fn delete(&self, invite_id: &str) -> Result<(), DbErr> {
        InvitationEntity::delete_many()
            .filter(invitation::Column::Id.eq(invite_id))
            .exec(&self.db)
            .await?;

        Ok(())
    }

    /// Redeems a pre-validated invitation. One transaction: the status
    /// flip is compare-and-set on PENDING so a token accepts exactly
    /// once; the membership write preserves an existing role rather than
    /// overwrite it.
    pub async fn accept(
        &self,
        invitation: &Invitation,
        user_id: &str,
    ) -> Result<AcceptOutcome, DbErr> {
        let txn = self.db.begin().await?;

        let flipped = InvitationEntity::update_many()
            .col_expr(
                invitation::Column::Status,
                Expr::value(InvitationStatus::Accepted),
            )
            .filter(invitation::Column::Id.eq(&invitation.id))
            .filter(invitation::Column::Status.eq(InvitationStatus::Pending))
            .exec(&txn)
            .await?;

        if flipped.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(AcceptOutcome::NoLongerPending);
        }

        let existing = MembershipEntity::find()
            .filter(membership::Column::OrganizationId.eq(&invitation.organization_id))
            .filter(membership::Column::UserId.eq(user_id))
            .one(&txn)
            .await?;

        let role = match existing {
            Some(membership) => membership.role,
            None => {
                let membership_model = membership::ActiveModel {
                    id: Set(generate_uuid()),
                    organization_id: Set(invitation.organization_id.clone()),
                    user_id: Set(user_id.to_string()),
                    role: Set(invitation.role),
                    created_at: Set(chrono::Utc::now().naive_utc()),
                };
                membership_model.insert(&txn).await?;
                invitation.role
            }
        };

        txn.commit().await?;

        Ok(AcceptOutcome::Accepted {
            organization_id: invitation.organization_id.clone(),
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn pending_invite() -> Invitation {
        let now = chrono::Utc::now().naive_utc();
        Invitation {
            id: "inv_1".to_string(),
            organization_id: "org_1".to_string(),
            email: "user@example.com".to_string(),
            role: Role::Member,
            token: "ab".repeat(32),
            status: InvitationStatus::Pending,
            expires_at: now + chrono::Duration::days(7),
            invited_by: "usr_admin".to_string(),
            created_at: now,
        }
    }

    #[tokio::test]
    async fn accept_reports_lost_race_when_status_already_flipped() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = InvitationsRepo::new(db);
        let outcome = repo.accept(&pending_invite(), "usr_2").await.unwrap();
        assert_eq!(outcome, AcceptOutcome::NoLongerPending);
    }

    #[tokio::test]
    async fn accept_preserves_an_existing_role() {
        let existing = membership::Model {
            id: "mem_1".to_string(),
            organization_id: "org_1".to_string(),
            user_id: "usr_2".to_string(),
            role: Role::Admin,
            created_at: chrono::Utc::now().naive_utc(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![existing]])
            .into_connection();

        let repo = InvitationsRepo::new(db);
        let outcome = repo.accept(&pending_invite(), "usr_2").await.unwrap();

        // invited as MEMBER, but the ADMIN membership wins
        assert_eq!(
            outcome,
            AcceptOutcome::Accepted {
                organization_id: "org_1".to_string(),
                role: Role::Admin,
            }
        );
    }
}
