pub mod api;
pub mod auth;
pub mod chat;
pub mod error;
pub mod flow;
pub mod layout;
pub mod question;
pub mod result;
pub mod store;
pub mod ticket;

// Re-export common error type
pub use error::AssessmentError;
