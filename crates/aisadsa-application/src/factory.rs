//! Builds a file-backed `AssessmentApp` for one tab session.

use crate::assessment::{AssessmentApp, RemoteServices, TabStores};
use aisadsa_core::error::Result;
use aisadsa_core::store::{CHAT_NAMESPACE, FLOW_NAMESPACE};
use aisadsa_infrastructure::file_session_store::validate_tab_id;
use aisadsa_infrastructure::{
    AisadsaPaths, AppConfig, FileCredentialStore, FileSessionStore, RestClient,
};
use std::sync::Arc;
use tracing::debug;

/// Wires the REST client, the credential file and the tab's session files.
pub fn build_app(config: &AppConfig, paths: &AisadsaPaths, tab_id: &str) -> Result<AssessmentApp> {
    validate_tab_id(tab_id)?;
    let client = Arc::new(RestClient::new(
        &config.server.base_url,
        config.server.timeout(),
    )?);
    debug!(
        "Server at {} with a {}s timeout",
        client.base_url(),
        config.server.timeout_secs
    );
    let credentials = Arc::new(FileCredentialStore::open(paths.credentials_file()));

    let tab_dir = paths.tab_dir(tab_id);
    debug!("Tab '{}' stored at {}", tab_id, tab_dir.display());
    let stores = TabStores {
        flow: Arc::new(FileSessionStore::new(&tab_dir, FLOW_NAMESPACE)),
        chat: Arc::new(FileSessionStore::new(&tab_dir, CHAT_NAMESPACE)),
    };

    Ok(AssessmentApp::new(
        credentials,
        RemoteServices::from_client(client),
        stores,
        config.flow.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aisadsa_core::flow::ResumeOutcome;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fresh_tab_is_signed_out_and_not_started() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AisadsaPaths::new(temp_dir.path().join("cfg"), temp_dir.path().join("data"));

        let app = build_app(&AppConfig::default(), &paths, "t1").unwrap();

        assert!(!app.is_authenticated());
        assert!(app.enter().await.unwrap_err().is_validation());
        assert_eq!(app.flow().resume().await.unwrap(), ResumeOutcome::NotStarted);
        assert_eq!(app.flow().config().bootstrap_key, "nonRelationalUsage");
    }

    #[tokio::test]
    async fn test_corrupt_flow_file_resumes_as_not_started() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AisadsaPaths::new(temp_dir.path().join("cfg"), temp_dir.path().join("data"));
        let tab_dir = paths.tab_dir("t1");
        std::fs::create_dir_all(&tab_dir).unwrap();
        std::fs::write(tab_dir.join("flow.json"), "{\"currentQuestionKey\": \"q3\"").unwrap();

        let app = build_app(&AppConfig::default(), &paths, "t1").unwrap();

        assert_eq!(app.flow().resume().await.unwrap(), ResumeOutcome::NotStarted);
        assert!(!tab_dir.join("flow.json").exists());
    }

    #[test]
    fn test_bad_base_url_fails_fast() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AisadsaPaths::new(temp_dir.path(), temp_dir.path());
        let mut config = AppConfig::default();
        config.server.base_url = "::nope".to_string();

        assert!(build_app(&config, &paths, "t1").is_err());
    }

    #[test]
    fn test_tab_id_must_be_a_plain_name() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AisadsaPaths::new(temp_dir.path(), temp_dir.path());
        assert!(build_app(&AppConfig::default(), &paths, "../escape").is_err());
    }
}
