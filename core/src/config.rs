//! Static client configuration: MGF account credentials and endpoint.

use std::fmt;

use ::config::{Config, ConfigError, Environment, Source};
use serde::Deserialize;

pub const DEFAULT_HOSTNAME: &str = "services.mobilegiving.org";
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_PATH: &str = "/Service.asmx";

/// Credentials and endpoint for one MGF account. Read-only once built.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub username: String,
    pub password: String,
    #[serde(default = "default_hostname")]
    pub hostname: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_path")]
    pub path: String,
}

fn default_hostname() -> String {
    DEFAULT_HOSTNAME.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_path() -> String {
    DEFAULT_PATH.to_string()
}

impl ClientConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            hostname: default_hostname(),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.to_string(),
        }
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Service path; a trailing slash is dropped.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into().trim_end_matches('/').to_string();
        self
    }

    /// Load from `MGF_USERNAME`, `MGF_PASSWORD`, `MGF_HOSTNAME`, `MGF_PORT`
    /// and `MGF_PATH`. Only the credentials are required.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(Environment::with_prefix("MGF"))
    }

    fn from_source<S>(source: S) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let cfg = Config::builder().add_source(source).build()?;
        let loaded: ClientConfig = cfg.try_deserialize()?;
        let path = loaded.path.clone();
        Ok(loaded.with_path(path))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("path", &self.path)
            .finish()
    }
}
