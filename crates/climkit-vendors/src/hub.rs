//! Container for the running integrations of one hub
//!
//! The hub owns every integration it set up; integrations own their
//! coordinator, adapters, and polling task. Removing an integration (or
//! dropping the hub) tears the corresponding tasks down. This replaces any
//! notion of a process-global device registry.

use dashmap::DashMap;
use tracing::warn;

use climkit_config::HubConfig;

use crate::error::SetupError;
use crate::{setup_integration, Integration};

/// All running integrations, keyed by their configured name
#[derive(Default)]
pub struct Hub {
    integrations: DashMap<String, Integration>,
}

impl Hub {
    pub fn new() -> Self {
        Self {
            integrations: DashMap::new(),
        }
    }

    /// Set up every configured integration
    ///
    /// One integration failing does not stop the others; failures come back
    /// alongside the hub so the caller can schedule retries for the
    /// retryable ones.
    pub async fn from_config(config: &HubConfig) -> (Self, Vec<(String, SetupError)>) {
        let hub = Self::new();
        let mut failures = Vec::new();

        for integration_config in &config.integrations {
            match setup_integration(config, integration_config).await {
                Ok(integration) => {
                    hub.integrations
                        .insert(integration_config.name.clone(), integration);
                }
                Err(err) => {
                    warn!(
                        integration = %integration_config.name,
                        vendor = %integration_config.vendor,
                        error = %err,
                        "integration setup failed"
                    );
                    failures.push((integration_config.name.clone(), err));
                }
            }
        }

        (hub, failures)
    }

    /// Look up a running integration by name
    pub fn get(&self, name: &str) -> Option<dashmap::mapref::one::Ref<'_, String, Integration>> {
        self.integrations.get(name)
    }

    /// Remove (and thereby tear down) one integration
    pub fn remove(&self, name: &str) -> Option<Integration> {
        self.integrations.remove(name).map(|(_, integration)| integration)
    }

    pub fn names(&self) -> Vec<String> {
        self.integrations.iter().map(|r| r.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.integrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.integrations.is_empty()
    }
}
