//! Evolution filter configuration.

use serde::{Deserialize, Serialize};

use crate::types::species::Species;

/// Species filter applied by `evolve all`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolveConfig {
    /// Species names the filter refers to.
    #[serde(default)]
    pub list: Vec<String>,
    /// When `true` the list is a blacklist, otherwise a whitelist.
    /// An empty whitelist permits every species.
    #[serde(default)]
    pub list_is_blacklist: bool,
}

impl EvolveConfig {
    /// Returns whether `species` passes the configured filter.
    pub fn permits(&self, species: Species) -> bool {
        if self.list.is_empty() {
            return true;
        }
        let listed = self
            .list
            .iter()
            .filter_map(|name| name.parse::<Species>().ok())
            .any(|s| s == species);
        if self.list_is_blacklist { !listed } else { listed }
    }
}
