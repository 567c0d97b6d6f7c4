//! Session API client

use async_trait::async_trait;
use openapi_client::models::{LoginRequest, LoginResponse, Profile, Tenant};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use crate::controller::{Credentials, SessionApi, TenantInfo};
use crate::errors::UpgradeError;
use crate::http::client::HttpClient;

impl HttpClient {
    async fn fetch_profile(&self) -> Result<Profile, UpgradeError> {
        self.get("/v2.0/api/profile").await
    }

    async fn fetch_tenant_name(&self, tenant_id: &str) -> String {
        let path = format!("/v2.0/api/tenants/{}", tenant_id);
        match self.get::<Tenant>(&path).await {
            Ok(Tenant { name: Some(name), .. }) => name,
            Ok(_) => tenant_id.to_string(),
            Err(e) => {
                warn!("Could not retrieve tenant name: {}", e);
                tenant_id.to_string()
            }
        }
    }

    async fn password_login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SecretString, UpgradeError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.expose_secret().to_string(),
        };
        let response: LoginResponse = self
            .post("/v2.0/api/login", &request)
            .await
            .map_err(|e| UpgradeError::AuthError(format!("login failure for {}: {}", email, e)))?;

        response
            .x_auth_token
            .map(SecretString::from)
            .ok_or_else(|| UpgradeError::AuthError(format!("login failure for {}: no token issued", email)))
    }
}

#[async_trait]
impl SessionApi for HttpClient {
    async fn login(&self, credentials: &Credentials) -> Result<TenantInfo, UpgradeError> {
        let token = match credentials {
            Credentials::Token(token) => token.clone(),
            Credentials::Password { email, password } => self.password_login(email, password).await?,
        };
        self.session.write().await.token = Some(token);

        let profile = self.fetch_profile().await.map_err(|e| {
            UpgradeError::AuthError(format!("login failure, please check credentials: {}", e))
        })?;
        let tenant_id = profile.tenant_id.ok_or_else(|| {
            UpgradeError::AuthError("login failure, please check credentials".to_string())
        })?;
        self.session.write().await.tenant_id = Some(tenant_id.clone());

        let name = self.fetch_tenant_name(&tenant_id).await;
        info!(
            "Logged in as {} to tenant {} ({})",
            profile.email.as_deref().unwrap_or("<token>"),
            name,
            tenant_id
        );
        Ok(TenantInfo { id: tenant_id, name })
    }

    async fn logout(&self) -> Result<(), UpgradeError> {
        let result = self.get::<serde_json::Value>("/v2.0/api/logout").await;
        let mut session = self.session.write().await;
        session.token = None;
        session.tenant_id = None;
        result.map(|_| ())
    }
}
