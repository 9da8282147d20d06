//! Request and response bodies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /adapt`.
///
/// Fields are optional so a missing one is reported as a 400 with a clear
/// message instead of a generic JSON rejection.
#[derive(Debug, Default, Deserialize)]
pub struct AdaptRequest {
    pub html_content: Option<String>,
    #[serde(alias = "perfil")]
    pub profile: Option<String>,
    #[serde(default)]
    pub config: Option<Map<String, Value>>,
    /// Legacy low-vision need, sent next to the profile rather than in config.
    #[serde(alias = "necessidade")]
    pub need: Option<Value>,
}

impl AdaptRequest {
    /// `config` with the legacy top-level `need` folded in.
    pub fn effective_config(&self) -> Map<String, Value> {
        let mut config = self.config.clone().unwrap_or_default();
        if let Some(need) = &self.need {
            if !need.is_null() {
                config
                    .entry("need".to_string())
                    .or_insert_with(|| need.clone());
            }
        }
        config
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdaptResponse {
    pub html_corrected: String,
}

/// Response shape of the legacy `/adaptar` route.
#[derive(Debug, Serialize, Deserialize)]
pub struct LegacyAdaptResponse {
    pub html_corrigido: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub profiles: Vec<String>,
}
