use crate::config::ConfigStore;
use crate::core::error::RequestError;
use tracing::debug;

/// Config key consulted when the service is first constructed.
pub const API_CONFIG_KEY: &str = "api_config";

const DEFAULT_BASE_URL: &str = "https://api.example.com";

/// Construction parameters for [`ApiService`], captured once at first use.
/// Later changes to the store do not reach an already-built service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub base_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// The lazily constructed dependent service. The request path is a stub that
/// synthesizes a success payload; a real implementation would put transport,
/// retries and error mapping behind the same signature.
#[derive(Debug, Clone)]
pub struct ApiService {
    config: ServiceConfig,
}

impl ApiService {
    /// Build the service from the store: `api_config` when it holds a string,
    /// the compiled-in default otherwise.
    pub(crate) fn from_store(store: &ConfigStore) -> Self {
        let config = match store.str_value(API_CONFIG_KEY) {
            Some(base_url) => ServiceConfig { base_url },
            None => ServiceConfig::default(),
        };
        debug!(base_url = %config.base_url, "api service constructed");
        Self { config }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub async fn request(&self, endpoint: &str) -> Result<String, RequestError> {
        if endpoint.is_empty() {
            return Err(RequestError::EmptyEndpoint);
        }
        debug!(endpoint, base_url = %self.config.base_url, "dispatching request");
        Ok(format!(
            "{}/{}: ok",
            self.config.base_url,
            endpoint.trim_start_matches('/')
        ))
    }
}
