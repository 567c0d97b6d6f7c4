//! Inventory API client

use async_trait::async_trait;
use openapi_client::models::{Element, ElementImage, Interface, ListResponse, Site};

use crate::controller::InventoryApi;
use crate::errors::UpgradeError;
use crate::http::client::HttpClient;

#[async_trait]
impl InventoryApi for HttpClient {
    async fn list_sites(&self) -> Result<Vec<Site>, UpgradeError> {
        let path = self.tenant_path("v4.7", "/sites").await?;
        let response: ListResponse<Site> = self.get(&path).await?;
        Ok(response.items)
    }

    async fn list_elements(&self) -> Result<Vec<Element>, UpgradeError> {
        let path = self.tenant_path("v3.0", "/elements").await?;
        let response: ListResponse<Element> = self.get(&path).await?;
        Ok(response.items)
    }

    async fn list_interfaces(
        &self,
        site_id: &str,
        element_id: &str,
    ) -> Result<Vec<Interface>, UpgradeError> {
        let suffix = format!("/sites/{}/elements/{}/interfaces", site_id, element_id);
        let path = self.tenant_path("v4.15", &suffix).await?;
        let response: ListResponse<Interface> = self.get(&path).await?;
        Ok(response.items)
    }

    async fn list_element_images(&self) -> Result<Vec<ElementImage>, UpgradeError> {
        let path = self.tenant_path("v2.0", "/element_images").await?;
        let response: ListResponse<ElementImage> = self.get(&path).await?;
        Ok(response.items)
    }
}
