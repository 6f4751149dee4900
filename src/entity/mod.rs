pub mod audit_logs;
pub mod contacts;
pub mod enquiries;
pub mod feedbacks;
pub mod quotes;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use contacts::Entity as Contacts;
pub use enquiries::Entity as Enquiries;
pub use feedbacks::Entity as Feedbacks;
pub use quotes::Entity as Quotes;
pub use users::Entity as Users;
