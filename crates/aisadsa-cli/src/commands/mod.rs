pub mod auth;
pub mod chat;
pub mod flow;
pub mod tab;
