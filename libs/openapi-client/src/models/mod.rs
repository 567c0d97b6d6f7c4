//! API models

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Site id the controller assigns to elements that are not bound to a site
pub const UNASSIGNED_SITE_ID: &str = "1";

/// List envelope returned by every collection resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
}

/// Site binding of an element
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum SiteBinding {
    /// Element is claimed but not yet bound to a site
    #[default]
    Unassigned,
    /// Element is bound to the site with this id
    Bound(String),
}

impl SiteBinding {
    /// Build a binding from a raw site id, mapping the sentinel to `Unassigned`
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        if id == UNASSIGNED_SITE_ID {
            SiteBinding::Unassigned
        } else {
            SiteBinding::Bound(id)
        }
    }
}

impl<'de> Deserialize<'de> for SiteBinding {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // The controller reports the sentinel both as "1" and as 1
        match Option::<RawId>::deserialize(deserializer)? {
            Some(raw) => Ok(SiteBinding::from_id(raw.into_string())),
            None => Ok(SiteBinding::Unassigned),
        }
    }
}

impl Serialize for SiteBinding {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            SiteBinding::Unassigned => serializer.serialize_str(UNASSIGNED_SITE_ID),
            SiteBinding::Bound(id) => serializer.serialize_str(id),
        }
    }
}

/// Element (a managed appliance)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub hw_id: String,
    #[serde(default)]
    pub site_id: SiteBinding,
}

/// Interface of an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
}

/// Lifecycle state value of a released element image
pub const IMAGE_STATE_RELEASE: &str = "release";

/// Installable element image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementImage {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub state: Option<String>,
}

impl ElementImage {
    /// Whether the image is in the released lifecycle state
    pub fn is_released(&self) -> bool {
        self.state.as_deref() == Some(IMAGE_STATE_RELEASE)
    }
}

/// Software state of an element.
///
/// Fields the controller returns but this tool does not touch are kept in
/// `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoftwareState {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub image_id: Option<String>,
    #[serde(default)]
    pub scheduled_download: Option<String>,
    #[serde(default)]
    pub scheduled_upgrade: Option<String>,
    #[serde(default)]
    pub interface_ids: Option<Vec<String>>,
    #[serde(default)]
    pub download_interval: Option<u64>,
    #[serde(default)]
    pub upgrade_interval: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Element operation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRequest {
    pub action: String,
    pub parameters: Option<Value>,
}

impl OperationRequest {
    pub fn abort_upgrade() -> Self {
        Self {
            action: "abort_upgrade".to_string(),
            parameters: None,
        }
    }
}

/// Login request
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub x_auth_token: Option<String>,
}

/// Profile of the logged in operator
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Tenant
#[derive(Debug, Clone, Deserialize)]
pub struct Tenant {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Identifier that may be encoded as a JSON string or number
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Str(String),
    Int(i64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Str(s) => s,
            RawId::Int(n) => n.to_string(),
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(RawId::into_string)
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(RawId::into_string))
}
