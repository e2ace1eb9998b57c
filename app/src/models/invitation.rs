use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::membership::Role;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "UPPERCASE")]
pub enum InvitationStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "ACCEPTED")]
    Accepted,
    #[sea_orm(string_value = "REVOKED")]
    Revoked,
}

#[derive(Debug, Clone, DeriveEntityModel, PartialEq, Serialize)]
#[sea_orm(table_name = "invitations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: String,
    pub organization_id: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub token: String,
    pub status: InvitationStatus,
    pub expires_at: DateTime,
    pub invited_by: String,
    pub created_at: DateTime,
}

impl Model {
    /// An invitation is only acceptable while PENDING and before expiry.
    /// Expiry is checked here, at acceptance time; expired rows are not
    /// swept eagerly.
    pub fn acceptable_at(&self, now: DateTime) -> Result<(), AcceptRejection> {
        if self.status != InvitationStatus::Pending {
            return Err(AcceptRejection::NotPending);
        }
        if self.expires_at <= now {
            return Err(AcceptRejection::Expired);
        }
        Ok(())
    }

    /// Counts toward the one-outstanding-invite-per-email rule.
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            InvitationStatus::Pending | InvitationStatus::Accepted
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptRejection {
    NotPending,
    Expired,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id",
        on_delete = "Cascade"
    )]
    Organization,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn invite(status: InvitationStatus, expires_in: Duration) -> Model {
        let now = Utc::now().naive_utc();
        Model {
            id: "inv_1".to_string(),
            organization_id: "org_1".to_string(),
            email: "user@example.com".to_string(),
            role: Role::Member,
            token: "ab".repeat(32),
            status,
            expires_at: now + expires_in,
            invited_by: "usr_1".to_string(),
            created_at: now,
        }
    }

    #[test]
    fn pending_before_expiry_is_acceptable() {
        let inv = invite(InvitationStatus::Pending, Duration::days(7));
        assert!(inv.acceptable_at(Utc::now().naive_utc()).is_ok());
    }

    #[test]
    fn pending_past_expiry_is_rejected() {
        let inv = invite(InvitationStatus::Pending, Duration::days(-1));
        assert_eq!(
            inv.acceptable_at(Utc::now().naive_utc()),
            Err(AcceptRejection::Expired)
        );
    }

    #[test]
    fn accepted_and_revoked_are_rejected_even_before_expiry() {
        for status in [InvitationStatus::Accepted, InvitationStatus::Revoked] {
            let inv = invite(status, Duration::days(7));
            assert_eq!(
                inv.acceptable_at(Utc::now().naive_utc()),
                Err(AcceptRejection::NotPending)
            );
        }
    }

    #[test]
    fn only_pending_and_accepted_count_as_active() {
        assert!(invite(InvitationStatus::Pending, Duration::days(7)).is_active());
        assert!(invite(InvitationStatus::Accepted, Duration::days(7)).is_active());
        assert!(!invite(InvitationStatus::Revoked, Duration::days(7)).is_active());
    }
}
