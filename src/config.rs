//! Application configuration loaded from environment variables.
//!
//! The API token **must** be provided via `FXCM_TOKEN` (or stored in the
//! keychain, see [`crate::credentials`]). Optional variables:
//! - `FXCM_ENVIRONMENT`: `demo` (default) or `prod`
//! - `FXCM_URL`: overrides the environment's base URL
//! - `FXCM_CA_BUNDLE`: PEM file with additional trusted CA certificates

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::FxcmError;

const PROD_URL: &str = "https://api.fxcm.com/";
const DEMO_URL: &str = "https://api-demo.fxcm.com/";

/// The FXCM trading environment a client talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    Prod,
    #[default]
    Demo,
}

impl Environment {
    /// Base URL shared by the REST API and the Socket.IO endpoint.
    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Prod => PROD_URL,
            Environment::Demo => DEMO_URL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Prod => "prod",
            Environment::Demo => "demo",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = FxcmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "prod" => Ok(Environment::Prod),
            "demo" => Ok(Environment::Demo),
            other => Err(FxcmError::Config(format!(
                "unknown FXCM_ENVIRONMENT '{other}', expected 'demo' or 'prod'"
            ))),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub fxcm: FxcmConfig,
}

/// FXCM-specific configuration values.
#[derive(Debug)]
pub struct FxcmConfig {
    pub environment: Environment,
    pub token: String,
    pub base_url_override: Option<String>,
    pub ca_bundle: Option<PathBuf>,
}

impl FxcmConfig {
    /// The effective base URL: the override if set, else the environment's.
    pub fn base_url(&self) -> &str {
        self.base_url_override
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
    }
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`FxcmError::Config`] if `FXCM_TOKEN` is missing or
/// `FXCM_ENVIRONMENT` names an unknown environment.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let token = non_empty_var("FXCM_TOKEN")
        .ok_or_else(|| FxcmError::Config("FXCM_TOKEN is not set".to_string()))?;

    let environment = match non_empty_var("FXCM_ENVIRONMENT") {
        Some(value) => value.parse()?,
        None => Environment::default(),
    };

    Ok(AppConfig {
        fxcm: FxcmConfig {
            environment,
            token,
            base_url_override: non_empty_var("FXCM_URL"),
            ca_bundle: non_empty_var("FXCM_CA_BUNDLE").map(PathBuf::from),
        },
    })
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
