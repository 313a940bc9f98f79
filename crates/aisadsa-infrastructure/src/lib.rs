pub mod atomic_json;
pub mod config;
pub mod file_credential_store;
pub mod file_session_store;
pub mod paths;
pub mod rest_client;

pub use crate::config::AppConfig;
pub use crate::file_credential_store::FileCredentialStore;
pub use crate::file_session_store::FileSessionStore;
pub use crate::paths::AisadsaPaths;
pub use crate::rest_client::RestClient;
