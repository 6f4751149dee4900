pub mod admin_service;
pub mod auth_service;
pub mod feedback_service;
pub mod message_service;
pub mod quote_service;
