pub mod auth;
pub mod billing;
pub mod invitations;
pub mod members;
pub mod organizations;
pub mod projects;
pub mod settings;
