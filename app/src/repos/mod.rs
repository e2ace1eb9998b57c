pub mod invitations;
pub mod memberships;
pub mod organizations;
pub mod projects;
pub mod users;
