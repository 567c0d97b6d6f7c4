//! HTTP client implementation

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::errors::UpgradeError;

/// Header carrying the session token
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// HTTP client options
#[derive(Debug, Clone)]
pub struct HttpClientOptions {
    /// Verify the controller's TLS certificate and hostname
    pub verify_tls: bool,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for HttpClientOptions {
    fn default() -> Self {
        Self {
            verify_tls: true,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Session established by a successful login
#[derive(Debug, Default)]
pub(crate) struct Session {
    pub(crate) token: Option<SecretString>,
    pub(crate) tenant_id: Option<String>,
}

/// HTTP client for controller communication
pub struct HttpClient {
    client: Client,
    base_url: String,
    pub(crate) session: RwLock<Session>,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(base_url: &str, options: &HttpClientOptions) -> Result<Self, UpgradeError> {
        let client = Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(!options.verify_tls)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: RwLock::new(Session::default()),
        })
    }

    /// Id of the connected tenant, if logged in
    pub async fn tenant_id(&self) -> Option<String> {
        self.session.read().await.tenant_id.clone()
    }

    /// Build `/{version}/api/tenants/{tenant_id}{suffix}` for the connected tenant
    pub(crate) async fn tenant_path(
        &self,
        version: &str,
        suffix: &str,
    ) -> Result<String, UpgradeError> {
        let session = self.session.read().await;
        let tenant_id = session
            .tenant_id
            .as_deref()
            .ok_or_else(|| UpgradeError::AuthError("not logged in".to_string()))?;
        Ok(format!("/{}/api/tenants/{}{}", version, tenant_id, suffix))
    }

    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let session = self.session.read().await;
        match &session.token {
            Some(token) => request.header(AUTH_TOKEN_HEADER, token.expose_secret()),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        url: &str,
        request: RequestBuilder,
    ) -> Result<T, UpgradeError> {
        let response = self.authorize(request).await.send().await?;
        let response = check_status(method, url, response).await?;
        let body = response.json().await?;
        Ok(body)
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, UpgradeError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let request = self.client.get(&url);
        self.send("GET", &url, request).await
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, UpgradeError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let request = self.client.post(&url).json(body);
        self.send("POST", &url, request).await
    }

    /// Make a PUT request
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, UpgradeError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("PUT {}", url);

        let request = self.client.put(&url).json(body);
        self.send("PUT", &url, request).await
    }
}

async fn check_status(method: &str, url: &str, response: Response) -> Result<Response, UpgradeError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error!("HTTP {} {} failed: {} - {}", method, url, status, body);
    Err(UpgradeError::ApiError {
        status: status.as_u16(),
        body,
    })
}
