//! Controller collaborator interfaces
//!
//! The catalog, planner and abort executor only talk to the controller
//! through these traits. `HttpClient` implements them over HTTP; tests use
//! an in-memory fake.

use async_trait::async_trait;
use openapi_client::models::{Element, ElementImage, Interface, Site, SoftwareState};
use secrecy::SecretString;

use crate::errors::UpgradeError;

/// Read access to the controller inventory
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// List all sites
    async fn list_sites(&self) -> Result<Vec<Site>, UpgradeError>;

    /// List all elements with their serial numbers and site bindings
    async fn list_elements(&self) -> Result<Vec<Element>, UpgradeError>;

    /// List the interfaces of one element in one site
    async fn list_interfaces(
        &self,
        site_id: &str,
        element_id: &str,
    ) -> Result<Vec<Interface>, UpgradeError>;

    /// List all element images
    async fn list_element_images(&self) -> Result<Vec<ElementImage>, UpgradeError>;
}

/// Software state reads and mutations on a single element
#[async_trait]
pub trait DeviceControlApi: Send + Sync {
    /// Get the current software state of an element
    async fn get_software_state(&self, element_id: &str) -> Result<SoftwareState, UpgradeError>;

    /// Replace the software state of an element
    async fn put_software_state(
        &self,
        element_id: &str,
        state: &SoftwareState,
    ) -> Result<(), UpgradeError>;

    /// Abort a scheduled or running upgrade on an element
    async fn abort_upgrade(&self, element_id: &str) -> Result<(), UpgradeError>;
}

/// Login credentials
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Static API token
    Token(SecretString),
    /// Operator email and password
    Password { email: String, password: SecretString },
}

/// Tenant the session is connected to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantInfo {
    pub id: String,
    pub name: String,
}

/// Session lifecycle
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Log in and return the connected tenant
    async fn login(&self, credentials: &Credentials) -> Result<TenantInfo, UpgradeError>;

    /// End the session
    async fn logout(&self) -> Result<(), UpgradeError>;
}
