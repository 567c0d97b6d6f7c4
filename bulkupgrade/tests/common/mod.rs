//! Recording in-memory controller shared by the integration tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use openapi_client::models::{Element, ElementImage, Interface, Site, SiteBinding, SoftwareState};
use serde_json::json;

use bulkupgrade::catalog::Catalog;
use bulkupgrade::controller::{Credentials, DeviceControlApi, InventoryApi, SessionApi, TenantInfo};
use bulkupgrade::errors::UpgradeError;

/// A controller call, in the order it was issued
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Login,
    Logout,
    ListSites,
    ListElements,
    ListInterfaces { site_id: String, element_id: String },
    ListImages,
    GetState(String),
    PutState(String, SoftwareState),
    Abort(String),
}

/// Calls that should fail
#[derive(Debug, Default)]
pub struct Failures {
    pub login: bool,
    /// Number of initial logins to reject
    pub rejected_logins: usize,
    pub sites: bool,
    pub elements: bool,
    pub interfaces: HashSet<String>,
    pub images: bool,
    pub state_fetch: HashSet<String>,
    pub state_update: HashSet<String>,
    pub abort: HashSet<String>,
}

#[derive(Default)]
pub struct FakeController {
    pub sites: Vec<Site>,
    pub elements: Vec<Element>,
    pub interfaces: HashMap<(String, String), Vec<Interface>>,
    pub images: Vec<ElementImage>,
    pub states: Mutex<HashMap<String, SoftwareState>>,
    pub failures: Failures,
    calls: Mutex<Vec<Call>>,
    login_emails: Mutex<Vec<Option<String>>>,
}

fn api_error() -> UpgradeError {
    UpgradeError::ApiError {
        status: 500,
        body: "internal error".to_string(),
    }
}

fn element(id: &str, name: &str, serial: &str, site: SiteBinding) -> Element {
    Element {
        id: id.to_string(),
        name: Some(name.to_string()),
        hw_id: serial.to_string(),
        site_id: site,
    }
}

fn interface(id: &str, name: &str) -> Interface {
    Interface {
        id: id.to_string(),
        name: name.to_string(),
    }
}

fn image(id: &str, version: &str, state: &str) -> ElementImage {
    ElementImage {
        id: id.to_string(),
        version: version.to_string(),
        state: Some(state.to_string()),
    }
}

/// Fetched state with server-managed fields the tool must not touch
pub fn state_on(device_id: &str, image_id: &str) -> SoftwareState {
    let mut state = SoftwareState {
        image_id: Some(image_id.to_string()),
        ..Default::default()
    };
    state.extra.insert("id".to_string(), json!(format!("st-{device_id}")));
    state.extra.insert("_etag".to_string(), json!(3));
    state
}

impl FakeController {
    /// Inventory used across the tests:
    ///
    /// - `SN123` is `D1` in site `S1` on 5.2.0, interfaces ge0-0 (`I1`), ge0-1 (`I2`)
    /// - `SN999` is `D2`, not assigned to a site, on 5.2.0
    /// - `SN777` is `D3` in site `S1` on 5.2.1, interface ge0-0 (`I31`)
    /// - images 5.2.1 and 5.2.0 are released, 4.7.1 is retired
    pub fn standard() -> Self {
        let bound = || SiteBinding::Bound("S1".to_string());
        let mut interfaces = HashMap::new();
        interfaces.insert(
            ("S1".to_string(), "D1".to_string()),
            vec![interface("I1", "ge0-0"), interface("I2", "ge0-1")],
        );
        interfaces.insert(
            ("S1".to_string(), "D3".to_string()),
            vec![interface("I31", "ge0-0")],
        );

        let mut states = HashMap::new();
        states.insert("D1".to_string(), state_on("D1", "IMG-520"));
        states.insert("D2".to_string(), state_on("D2", "IMG-520"));
        states.insert("D3".to_string(), state_on("D3", "IMG-521"));

        Self {
            sites: vec![Site {
                id: "S1".to_string(),
                name: "Branch-1".to_string(),
            }],
            elements: vec![
                element("D1", "branch-ion", "SN123", bound()),
                element("D2", "spare-ion", "SN999", SiteBinding::Unassigned),
                element("D3", "hub-ion", "SN777", bound()),
            ],
            interfaces,
            images: vec![
                image("IMG-521", "5.2.1", "release"),
                image("IMG-520", "5.2.0", "release"),
                image("IMG-471", "4.7.1", "deprecated"),
            ],
            states: Mutex::new(states),
            failures: Failures::default(),
            login_emails: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Build a catalog from this inventory and forget the inventory calls
    pub async fn catalog(&self) -> Catalog {
        let catalog = Catalog::build(self).await.unwrap();
        self.clear_calls();
        catalog
    }

    pub fn set_state(&self, device_id: &str, state: SoftwareState) {
        self.states.lock().unwrap().insert(device_id.to_string(), state);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn puts(&self) -> Vec<(String, SoftwareState)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::PutState(id, state) => Some((id, state)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    /// Email of every login attempt, `None` for token logins
    pub fn login_emails(&self) -> Vec<Option<String>> {
        self.login_emails.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl InventoryApi for FakeController {
    async fn list_sites(&self) -> Result<Vec<Site>, UpgradeError> {
        self.record(Call::ListSites);
        if self.failures.sites {
            return Err(api_error());
        }
        Ok(self.sites.clone())
    }

    async fn list_elements(&self) -> Result<Vec<Element>, UpgradeError> {
        self.record(Call::ListElements);
        if self.failures.elements {
            return Err(api_error());
        }
        Ok(self.elements.clone())
    }

    async fn list_interfaces(
        &self,
        site_id: &str,
        element_id: &str,
    ) -> Result<Vec<Interface>, UpgradeError> {
        self.record(Call::ListInterfaces {
            site_id: site_id.to_string(),
            element_id: element_id.to_string(),
        });
        if self.failures.interfaces.contains(element_id) {
            return Err(api_error());
        }
        Ok(self
            .interfaces
            .get(&(site_id.to_string(), element_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_element_images(&self) -> Result<Vec<ElementImage>, UpgradeError> {
        self.record(Call::ListImages);
        if self.failures.images {
            return Err(api_error());
        }
        Ok(self.images.clone())
    }
}

#[async_trait]
impl DeviceControlApi for FakeController {
    async fn get_software_state(&self, element_id: &str) -> Result<SoftwareState, UpgradeError> {
        self.record(Call::GetState(element_id.to_string()));
        if self.failures.state_fetch.contains(element_id) {
            return Err(api_error());
        }
        self.states
            .lock()
            .unwrap()
            .get(element_id)
            .cloned()
            .ok_or(UpgradeError::ApiError {
                status: 404,
                body: "not found".to_string(),
            })
    }

    async fn put_software_state(
        &self,
        element_id: &str,
        state: &SoftwareState,
    ) -> Result<(), UpgradeError> {
        self.record(Call::PutState(element_id.to_string(), state.clone()));
        if self.failures.state_update.contains(element_id) {
            return Err(api_error());
        }
        self.set_state(element_id, state.clone());
        Ok(())
    }

    async fn abort_upgrade(&self, element_id: &str) -> Result<(), UpgradeError> {
        self.record(Call::Abort(element_id.to_string()));
        if self.failures.abort.contains(element_id) {
            return Err(api_error());
        }
        Ok(())
    }
}

#[async_trait]
impl SessionApi for FakeController {
    async fn login(&self, credentials: &Credentials) -> Result<TenantInfo, UpgradeError> {
        self.record(Call::Login);
        let email = match credentials {
            Credentials::Token(_) => None,
            Credentials::Password { email, .. } => Some(email.clone()),
        };
        let attempt = {
            let mut emails = self.login_emails.lock().unwrap();
            emails.push(email);
            emails.len()
        };
        if self.failures.login || attempt <= self.failures.rejected_logins {
            return Err(UpgradeError::AuthError("login failure".to_string()));
        }
        Ok(TenantInfo {
            id: "T1".to_string(),
            name: "Acme".to_string(),
        })
    }

    async fn logout(&self) -> Result<(), UpgradeError> {
        self.record(Call::Logout);
        Ok(())
    }
}
