use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::Error;

/// Connection settings and default scope, read from the JSON config file.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: String,
    pub url: String,
    pub org: String,
    pub vdc: String,
    pub vapp: String,
    pub user: String,
    pub password: String,
    /// Accept self-signed certificates on the vCD endpoint.
    pub insecure: bool,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let data = fs::read(path).map_err(|source| Error::ConfigNotFound {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = serde_json::from_slice(&data).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Loaded configuration from {}: {:?}", path.display(), config);
        Ok(config)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api", &self.api)
            .field("url", &self.url)
            .field("org", &self.org)
            .field("vdc", &self.vdc)
            .field("vapp", &self.vapp)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("insecure", &self.insecure)
            .finish()
    }
}
