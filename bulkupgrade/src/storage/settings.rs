//! Settings file management

use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;

use crate::errors::UpgradeError;
use crate::filesys::file::File;
use crate::logs::LogLevel;

/// Default settings file, looked up in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "bulkupgrade_settings.json";

/// Tool settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Controller base URL
    #[serde(default = "default_controller")]
    pub controller: String,

    /// Operator email for credential login
    #[serde(default)]
    pub email: Option<String>,

    /// Operator password for credential login
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Static API token
    #[serde(default)]
    pub auth_token: Option<SecretString>,

    /// Verify the controller's TLS certificate
    #[serde(default = "default_true")]
    pub verify_tls: bool,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Log level when `--debug` is not given
    #[serde(default)]
    pub log_level: Option<LogLevel>,
}

fn default_true() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    30
}

pub fn default_controller() -> String {
    "https://api.elcapitan.cloudgenix.com".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            controller: default_controller(),
            email: None,
            password: None,
            auth_token: None,
            verify_tls: true,
            request_timeout_secs: default_request_timeout(),
            log_level: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing file yields the defaults.
    pub async fn load(path: &Path) -> Result<Settings, UpgradeError> {
        let file = File::new(path);
        if !file.exists().await {
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        file.read_json().await
    }
}
