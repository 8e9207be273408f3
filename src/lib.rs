pub mod core;
mod config;

use std::sync::OnceLock;

pub use crate::config::{ConfigStore, ConfigValue};
pub use crate::core::bus::SubscriptionToken;
pub use crate::core::event::Event;
pub use crate::core::service::{ServiceConfig, API_CONFIG_KEY};
pub use crate::core::RequestError;

use crate::core::bus::EventBus;
use crate::core::service::ApiService;

/// is Filled on first access **once**; thereafter shared everywhere.
static APP_CORE: OnceLock<AppCore> = OnceLock::new();

/// Convenience accessor used throughout the codebase.
pub fn app_core() -> &'static AppCore {
    APP_CORE.get_or_init(AppCore::new)
}

/// The process-wide application core: configuration, event bus and the
/// lazily constructed API service behind one surface.
///
/// Only [`app_core`] constructs this; first access from any number of threads
/// yields the same instance.
pub struct AppCore {
    config: ConfigStore,
    bus: EventBus,
    service: OnceLock<ApiService>,
}

impl AppCore {
    fn new() -> Self {
        Self {
            config: ConfigStore::new(),
            bus: EventBus::new(),
            service: OnceLock::new(),
        }
    }

    /// Insert or overwrite a configuration entry.
    pub fn set_config(&self, key: impl Into<String>, value: ConfigValue) {
        self.config.set(key, value);
    }

    /// Current configuration value, or `None` if unset.
    pub fn config_value(&self, key: &str) -> Option<ConfigValue> {
        self.config.get(key)
    }

    /// Register an event handler. See [`crate::core::bus::EventBus::subscribe`].
    pub fn subscribe(&self, handler: impl Fn(&Event) + Send + Sync + 'static) -> SubscriptionToken {
        self.bus.subscribe(handler)
    }

    /// Remove a registration; idempotent.
    pub fn unsubscribe(&self, token: SubscriptionToken) {
        self.bus.unsubscribe(token);
    }

    /// Fan `event` out to the current subscribers without waiting on any of
    /// them. Must be called from within a Tokio runtime.
    pub fn publish(&self, event: Event) {
        self.bus.publish(event);
    }

    /// Forward a request to the API service, constructing it on first use,
    /// and deliver the outcome to `completion` exactly once, asynchronously.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn perform_request(
        &self,
        endpoint: &str,
        completion: impl FnOnce(Result<String, RequestError>) + Send + 'static,
    ) {
        let service = self.api_service().clone();
        let endpoint = endpoint.to_string();
        tokio::spawn(async move {
            completion(service.request(&endpoint).await);
        });
    }

    // First caller wins; everyone else blocks until construction finishes and
    // then shares the instance. The config snapshot taken here is final, a
    // later `set_config` does not rebuild the service.
    fn api_service(&self) -> &ApiService {
        self.service
            .get_or_init(|| ApiService::from_store(&self.config))
    }
}
