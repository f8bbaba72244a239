//! HTTP client for the Octopus Deploy REST API

use crate::deployment_processes::DeploymentProcesses;
use crate::error::{ClientError, Result};
use crate::lifecycles::Lifecycles;
use crate::project_triggers::ProjectTriggers;
use crate::projects::Projects;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_KEY_HEADER: &str = "X-Octopus-ApiKey";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address (e.g., "https://octopus.example.com")
    pub address: String,

    /// API key sent with every request
    pub api_key: String,

    /// Space that scopes every request; the server default space when `None`
    pub space_id: Option<String>,

    /// Request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(address: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            api_key: api_key.into(),
            space_id: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_space_id(mut self, space_id: impl Into<String>) -> Self {
        self.space_id = Some(space_id.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Octopus Deploy API client
///
/// Entity operations are grouped per service, mirroring the server's
/// resource collections:
///
/// ```ignore
/// let client = OctopusClient::new(ClientConfig::new(url, api_key))?;
/// let project = client.projects().get_by_id("Projects-1").await?;
/// let process = client.deployment_processes().get(&project, "main").await?;
/// ```
#[derive(Clone)]
pub struct OctopusClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl OctopusClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.address.trim().is_empty() {
            return Err(ClientError::InvalidConfig(
                "server address is required".to_string(),
            ));
        }
        if config.api_key.trim().is_empty() {
            return Err(ClientError::InvalidConfig("API key is required".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("octoform/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn address(&self) -> &str {
        &self.config.address
    }

    pub fn space_id(&self) -> Option<&str> {
        self.config.space_id.as_deref()
    }

    pub fn projects(&self) -> Projects<'_> {
        Projects::new(self)
    }

    pub fn deployment_processes(&self) -> DeploymentProcesses<'_> {
        DeploymentProcesses::new(self)
    }

    pub fn project_triggers(&self) -> ProjectTriggers<'_> {
        ProjectTriggers::new(self)
    }

    pub fn lifecycles(&self) -> Lifecycles<'_> {
        Lifecycles::new(self)
    }

    /// API path of a space-scoped collection member
    pub(crate) fn space_path(&self, path: &str) -> String {
        match &self.config.space_id {
            Some(space_id) => format!("/api/{}/{}", space_id, path),
            None => format!("/api/{}", path),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.address.trim_end_matches('/'), path)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .send(self.request(Method::POST, path).json(body))
            .await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.send(self.request(Method::PUT, path).json(body)).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        tracing::debug!("{} {}", method, url);
        self.http
            .request(method, url)
            .header(API_KEY_HEADER, &self.config.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });
        tracing::debug!("request failed with status {}: {}", status, message);

        Err(match status.as_u16() {
            400 => ClientError::Validation(message),
            401 | 403 => ClientError::Unauthorized(message),
            404 => ClientError::NotFound(message),
            409 => ClientError::Conflict(message),
            code => ClientError::Api {
                status: code,
                message,
            },
        })
    }
}

/// Error body returned by the server
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiErrorBody {
    error_message: String,
    #[serde(default)]
    errors: Vec<String>,
}

fn error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) if parsed.errors.is_empty() => Some(parsed.error_message),
        Ok(parsed) => Some(format!(
            "{} {}",
            parsed.error_message,
            parsed.errors.join("; ")
        )),
        Err(_) => Some(body.trim().to_string()),
    }
}

/// Percent-encode one URL path segment
pub(crate) fn encode_segment(segment: &str) -> String {
    let Ok(mut url) = reqwest::Url::parse("http://localhost/") else {
        return segment.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(segment);
    }
    url.path().trim_start_matches('/').to_string()
}
