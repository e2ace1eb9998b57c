pub mod invitation;
pub mod membership;
pub mod organization;
pub mod project;
pub mod user;
