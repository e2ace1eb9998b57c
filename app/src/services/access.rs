use sea_orm::DatabaseConnection;
use tracing::error;

use crate::{
    models::membership::{Model as Membership, Role},
    models::organization::Model as Organization,
    repos::{memberships::MembershipsRepo, organizations::OrganizationsRepo},
    utils::response::ApiError,
};

/// Pure rank comparison. `None` means the caller is not a member at all;
/// the gateway treats both absence and insufficient rank as Unauthorized.
pub fn require_role(actual: Option<Role>, minimum: Role) -> Result<Role, ApiError> {
    match actual {
        Some(role) if role.rank() >= minimum.rank() => Ok(role),
        Some(_) => Err(ApiError::Unauthorized(format!(
            "Requires {} role",
            minimum.as_str()
        ))),
        None => Err(ApiError::Unauthorized(
            "Not a member of this organization".to_string(),
        )),
    }
}

/// The mutation gateway: resolves the target organization, the caller's
/// membership in it, and checks the operation's minimum role - all
/// before any write happens.
pub async fn require_org_role(
    db: &DatabaseConnection,
    org_id: &str,
    user_id: &str,
    minimum: Role,
) -> Result<(Organization, Role), ApiError> {
    let orgs_repo = OrganizationsRepo::new(db.clone());
    let org = orgs_repo
        .get_active(org_id)
        .await
        .map_err(|e| {
            error!("Failed to load organization {}: {}", org_id, e);
            ApiError::InternalServerError("Failed to load organization".to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Organization not found".to_string()))?;

    let memberships_repo = MembershipsRepo::new(db.clone());
    let role = memberships_repo.get_role(org_id, user_id).await.map_err(|e| {
        error!("Failed to resolve membership for {}: {}", user_id, e);
        ApiError::InternalServerError("Failed to resolve membership".to_string())
    })?;

    let role = require_role(role, minimum)?;
    Ok((org, role))
}

/// Guard clauses for changing another member's role, evaluated in order:
/// an OWNER's role is immutable, self-changes are rejected, and the
/// actor must hold at least ADMIN.
pub fn validate_role_change(
    actor_role: Role,
    actor_user_id: &str,
    target: &Membership,
) -> Result<(), ApiError> {
    if target.role == Role::Owner {
        return Err(ApiError::PreconditionFailed(
            "The OWNER role cannot be changed".to_string(),
        ));
    }
    if target.user_id == actor_user_id {
        return Err(ApiError::PreconditionFailed(
            "You cannot change your own role".to_string(),
        ));
    }
    require_role(Some(actor_role), Role::Admin)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn membership(user_id: &str, role: Role) -> Membership {
        Membership {
            id: format!("mem_{}", user_id),
            organization_id: "org_1".to_string(),
            user_id: user_id.to_string(),
            role,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn every_role_clears_the_member_bar() {
        for role in [Role::Owner, Role::Admin, Role::Member] {
            assert!(require_role(Some(role), Role::Member).is_ok());
        }
    }

    #[test]
    fn lower_ranks_fail_higher_bars() {
        assert!(require_role(Some(Role::Member), Role::Admin).is_err());
        assert!(require_role(Some(Role::Admin), Role::Owner).is_err());
    }

    #[test]
    fn owner_clears_the_owner_bar() {
        assert!(require_role(Some(Role::Owner), Role::Owner).is_ok());
    }

    #[test]
    fn non_members_are_rejected() {
        assert!(require_role(None, Role::Member).is_err());
    }

    #[test]
    fn owner_role_is_immutable_regardless_of_actor() {
        let target = membership("usr_owner", Role::Owner);
        for actor_role in [Role::Owner, Role::Admin, Role::Member] {
            assert!(validate_role_change(actor_role, "usr_actor", &target).is_err());
        }
    }

    #[test]
    fn self_role_change_is_rejected_even_for_owner() {
        let target = membership("usr_actor", Role::Member);
        assert!(validate_role_change(Role::Owner, "usr_actor", &target).is_err());
    }

    #[test]
    fn member_actor_lacks_rank_for_role_change() {
        let target = membership("usr_other", Role::Member);
        assert!(validate_role_change(Role::Member, "usr_actor", &target).is_err());
    }

    #[test]
    fn admin_may_change_a_member_role() {
        let target = membership("usr_other", Role::Member);
        assert!(validate_role_change(Role::Admin, "usr_actor", &target).is_ok());
    }

    #[test]
    fn owner_immutability_wins_over_self_check() {
        // target is both OWNER and the actor: the immutability guard fires first
        let target = membership("usr_actor", Role::Owner);
        let err = validate_role_change(Role::Owner, "usr_actor", &target).unwrap_err();
        match err {
            ApiError::PreconditionFailed(msg) => assert!(msg.contains("OWNER")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
