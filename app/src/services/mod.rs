pub mod access;
pub mod billing;
pub mod mailer;
