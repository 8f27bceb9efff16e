//! Account credentials and stored player location.

use serde::{Deserialize, Serialize};

/// Stored credentials used by the session collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Google refresh token from a previous device-code authorization.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// PTC account name.
    #[serde(default)]
    pub ptc_username: Option<String>,
    /// PTC account password.
    #[serde(default)]
    pub ptc_password: Option<String>,
}

impl AccountConfig {
    /// Returns the refresh token if one is stored and non-blank.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Last known player position. Stored verbatim; not interpreted by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Latitude in degrees.
    #[serde(default)]
    pub latitude: f64,
    /// Longitude in degrees.
    #[serde(default)]
    pub longitude: f64,
    /// Altitude in meters.
    #[serde(default)]
    pub altitude: f64,
}
