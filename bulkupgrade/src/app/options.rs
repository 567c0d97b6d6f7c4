//! Command line and run configuration options

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use secrecy::SecretString;
use url::Url;

use crate::app::login::Login;
use crate::errors::UpgradeError;
use crate::http::client::HttpClientOptions;
use crate::logs::{LogLevel, LogOptions};
use crate::manifest::ManifestMode;
use crate::storage::settings::{Settings, DEFAULT_SETTINGS_FILE};

/// Tool name shown in the start banner
pub const TOOL_NAME: &str = "Prisma SD-WAN: Bulk Device Upgrade";

/// Environment variables checked for an API token, highest priority first
pub const TOKEN_ENV_VARS: [&str; 2] = ["X_AUTH_TOKEN", "AUTH_TOKEN"];

/// Command line arguments
#[derive(Parser, Debug, Clone)]
#[command(version, about = TOOL_NAME, long_about = None)]
pub struct Cli {
    /// Controller URI, ex. https://api.elcapitan.cloudgenix.com
    #[arg(long, short = 'C')]
    pub controller: Option<String>,

    /// Disable SSL certificate and hostname verification
    #[arg(long, short = 'I')]
    pub insecure: bool,

    /// Use this email as user name
    #[arg(long, short = 'E')]
    pub email: Option<String>,

    /// Use this password
    #[arg(long = "pass", alias = "password")]
    pub pass: Option<String>,

    /// CSV manifest with the columns serial_number, software_version,
    /// download_time, upgrade_time, interfaces, download_interval,
    /// upgrade_interval (abort mode needs only serial_number)
    #[arg(long, short = 'F')]
    pub filename: PathBuf,

    /// Abort scheduled upgrades instead of scheduling them
    #[arg(long, short = 'A')]
    pub abort: bool,

    /// Verbose debug info, levels 0-2
    #[arg(long, short = 'D', default_value_t = 0)]
    pub debug: u8,

    /// JSON settings file with controller and login defaults
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    pub settings: PathBuf,

    /// Emit diagnostic logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    pub fn mode(&self) -> ManifestMode {
        if self.abort {
            ManifestMode::Abort
        } else {
            ManifestMode::Upgrade
        }
    }

    /// Logging options: `--debug` wins, then the settings file, then warn
    pub fn log_options(&self, settings: &Settings) -> LogOptions {
        let log_level = if self.debug > 0 {
            LogLevel::from_debug_level(self.debug)
        } else {
            settings.log_level.clone().unwrap_or_default()
        };
        LogOptions {
            log_level,
            json_format: self.log_json,
        }
    }
}

/// Fully resolved options of one run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Manifest to process
    pub manifest_path: PathBuf,

    /// Schedule or abort
    pub mode: ManifestMode,

    /// Controller base URL
    pub controller: Url,

    /// HTTP client configuration
    pub http: HttpClientOptions,

    /// How to log in
    pub login: Login,
}

impl RunOptions {
    /// Merge command line, environment and settings file.
    ///
    /// A token from the settings file (or else the environment) is used only
    /// when neither `--email` nor `--pass` was given. Otherwise email and
    /// password are taken from the command line first, then the settings
    /// file. Whatever is still missing is prompted for at login.
    pub fn resolve(
        cli: &Cli,
        settings: &Settings,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<RunOptions, UpgradeError> {
        let controller = cli.controller.as_deref().unwrap_or(&settings.controller);
        let controller = Url::parse(controller).map_err(|e| {
            UpgradeError::ConfigError(format!("invalid controller URL {}: {}", controller, e))
        })?;

        let token = settings.auth_token.clone().or_else(|| {
            TOKEN_ENV_VARS
                .iter()
                .find_map(|name| env(name).filter(|value| !value.is_empty()))
                .map(SecretString::from)
        });

        let login = match token {
            Some(token) if cli.email.is_none() && cli.pass.is_none() => Login::Token(token),
            _ => Login::Password {
                email: cli.email.clone().or_else(|| settings.email.clone()),
                password: cli
                    .pass
                    .clone()
                    .map(SecretString::from)
                    .or_else(|| settings.password.clone()),
            },
        };

        Ok(RunOptions {
            manifest_path: cli.filename.clone(),
            mode: cli.mode(),
            controller,
            http: HttpClientOptions {
                verify_tls: settings.verify_tls && !cli.insecure,
                timeout: Duration::from_secs(settings.request_timeout_secs),
            },
            login,
        })
    }
}
