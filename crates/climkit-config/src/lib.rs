//! YAML hub configuration for climkit
//!
//! This crate is the single place configuration is read and parsed. It
//! produces typed, validated objects that callers pass into integration
//! setup; nothing else in climkit touches files or environment variables.
//!
//! ```yaml
//! poll_interval: 30
//! integrations:
//!   - vendor: breeze
//!     name: upstairs
//!     poll_interval: 15
//!     options:
//!       api_key: "..."
//! ```

mod error;
mod loader;
mod model;

pub use error::{ConfigError, ConfigResult};
pub use loader::{from_str, load_file};
pub use model::{HubConfig, IntegrationConfig, DEFAULT_POLL_INTERVAL_SECS};
