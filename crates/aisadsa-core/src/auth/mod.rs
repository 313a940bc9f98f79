//! Credentials and sign-in.
//!
//! Token issuance is the server's business; the client stores what it is given
//! and forwards the access token as a bearer credential.

mod model;
mod store;

pub use model::{AuthResponse, Credentials, LoginRequest, RegistrationRequest};
pub use store::{CredentialSource, CredentialStore, MemoryCredentialStore};
