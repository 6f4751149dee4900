pub mod admin;
pub mod auth;
pub mod feedback;
pub mod messages;
pub mod quotes;
