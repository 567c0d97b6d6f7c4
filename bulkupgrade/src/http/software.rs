//! Element software state and operations client

use async_trait::async_trait;
use openapi_client::models::{OperationRequest, SoftwareState};

use crate::controller::DeviceControlApi;
use crate::errors::UpgradeError;
use crate::http::client::HttpClient;

#[async_trait]
impl DeviceControlApi for HttpClient {
    async fn get_software_state(&self, element_id: &str) -> Result<SoftwareState, UpgradeError> {
        let suffix = format!("/elements/{}/software/state", element_id);
        let path = self.tenant_path("v2.0", &suffix).await?;
        self.get(&path).await
    }

    async fn put_software_state(
        &self,
        element_id: &str,
        state: &SoftwareState,
    ) -> Result<(), UpgradeError> {
        let suffix = format!("/elements/{}/software/state", element_id);
        let path = self.tenant_path("v2.0", &suffix).await?;
        let _: serde_json::Value = self.put(&path, state).await?;
        Ok(())
    }

    async fn abort_upgrade(&self, element_id: &str) -> Result<(), UpgradeError> {
        let suffix = format!("/elements/{}/operations", element_id);
        let path = self.tenant_path("v2.0", &suffix).await?;
        let _: serde_json::Value = self.post(&path, &OperationRequest::abort_upgrade()).await?;
        Ok(())
    }
}
