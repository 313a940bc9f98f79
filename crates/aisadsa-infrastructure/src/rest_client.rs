//! RestClient - `reqwest` implementation of every remote seam.
//!
//! All paths are joined to the configured base URL. Authenticated calls carry
//! `Authorization: Bearer <accessToken>`.

use aisadsa_core::api::{AuthApi, ChatApi, QuestionApi, ResultApi};
use aisadsa_core::auth::{AuthResponse, Credentials, LoginRequest, RegistrationRequest};
use aisadsa_core::error::{AssessmentError, Result};
use aisadsa_core::question::{AdvanceResponse, AnswerSubmission, QuestionDto};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// HTTP client for the AISADSA server.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl RestClient {
    /// Creates a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AssessmentError::config(format!("Invalid base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AssessmentError::config(format!(
                "Base URL '{}' cannot carry a path",
                base_url
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AssessmentError::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AssessmentError::config("Base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        segments: &[&str],
        credentials: Option<&Credentials>,
    ) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!("{} {}", method, url.path());
        let builder = self.client.request(method, url);
        Ok(match credentials {
            Some(credentials) => builder.header("Authorization", credentials.bearer()),
            None => builder,
        })
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder
            .send()
            .await
            .map_err(|err| self.map_transport_error(err))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let err = map_http_error(status, &body);
            warn!("Server rejected request: {}", err);
            return Err(err);
        }
        Ok(response)
    }

    async fn send_text(&self, builder: RequestBuilder) -> Result<String> {
        let response = self.send(builder).await?;
        response
            .text()
            .await
            .map_err(|err| self.map_transport_error(err))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let body = self.send_text(builder).await?;
        parse_json(&body)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> AssessmentError {
        if err.is_timeout() {
            AssessmentError::network(format!(
                "request timed out after {}s",
                self.timeout.as_secs()
            ))
        } else if err.is_decode() {
            AssessmentError::malformed(err.to_string())
        } else {
            AssessmentError::network(err.to_string())
        }
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Extracts a human-readable message from an error response.
///
/// Prefers a JSON `message` or `error` field, then the raw body, then a
/// status fallback.
fn map_http_error(status: StatusCode, body: &str) -> AssessmentError {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"].iter().find_map(|field| {
                value
                    .get(field)
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.trim().is_empty())
                    .map(str::to_string)
            })
        });

    let message = from_json.unwrap_or_else(|| {
        let raw = body.trim();
        if raw.is_empty() {
            format!(
                "Request failed with status {}",
                status.canonical_reason().unwrap_or("Unknown")
            )
        } else {
            raw.to_string()
        }
    });

    AssessmentError::rejected(status.as_u16(), message)
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|e| AssessmentError::malformed(format!("unexpected response body: {}", e)))
}

#[async_trait]
impl QuestionApi for RestClient {
    async fn fetch_question(&self, credentials: &Credentials, key: &str) -> Result<QuestionDto> {
        let builder = self.request(
            Method::GET,
            &["api", "v1", "questions", key],
            Some(credentials),
        )?;
        self.send_json(builder).await
    }

    async fn record_answer(
        &self,
        credentials: &Credentials,
        submission: &AnswerSubmission,
    ) -> Result<AdvanceResponse> {
        let builder = self
            .request(
                Method::POST,
                &["api", "v1", "user-data", "create"],
                Some(credentials),
            )?
            .json(submission);
        self.send_json(builder).await
    }

    async fn submit_final(&self, credentials: &Credentials) -> Result<String> {
        let builder = self.request(
            Method::POST,
            &["api", "v1", "user-data", "submit"],
            Some(credentials),
        )?;
        self.send_text(builder).await
    }
}

#[async_trait]
impl ChatApi for RestClient {
    async fn ask(&self, credentials: &Credentials, message: &str) -> Result<String> {
        let builder = self
            .request(Method::POST, &["api", "v1", "ai", "qa"], Some(credentials))?
            .json(&ChatRequest { message });
        self.send_text(builder).await
    }
}

#[async_trait]
impl AuthApi for RestClient {
    async fn login(&self, request: &LoginRequest) -> Result<Credentials> {
        let builder = self
            .request(Method::POST, &["api", "v1", "auth", "login"], None)?
            .json(request);
        let response: AuthResponse = self.send_json(builder).await?;
        Credentials::try_from(response)
    }

    async fn register(&self, request: &RegistrationRequest) -> Result<Credentials> {
        let builder = self
            .request(Method::POST, &["api", "v1", "auth", "register"], None)?
            .json(request);
        let response: AuthResponse = self.send_json(builder).await?;
        Credentials::try_from(response)
    }
}

#[async_trait]
impl ResultApi for RestClient {
    async fn generate_document(&self, credentials: &Credentials) -> Result<String> {
        let builder = self.request(
            Method::GET,
            &["api", "v1", "ai", "document-generation"],
            Some(credentials),
        )?;
        self.send_text(builder).await
    }

    async fn generate_diagram(&self, credentials: &Credentials) -> Result<String> {
        let builder = self.request(
            Method::GET,
            &["api", "v1", "ai", "diagram-generation"],
            Some(credentials),
        )?;
        self.send_text(builder).await
    }
}
