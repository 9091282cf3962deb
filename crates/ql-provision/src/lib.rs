//! Bootstrap provisioning for QuizLink devices.
//!
//! Assembles WiFi credentials, the broker endpoint, an optional identity
//! label, and the CA trust chain into one immutable configuration before any
//! connection attempt:
//! - `ConfigProvider` loads once and hands out shared read-only references
//! - `ProvisionSource` implementations for static values, env, and TOML files
//! - `TrustAnchor` keeps the PEM chain byte-for-byte and detects placeholders
//! - `transport` turns a configuration into `rumqttc` options for the TLS stack
//! - `MockSource` for testing without real provisioning material

pub mod config;
pub mod credentials;
pub mod endpoint;
pub mod error;
pub mod mock;
pub mod provider;
pub mod source;
pub mod transport;
pub mod trust;

// Re-exports for convenience.
pub use config::{ClientConfiguration, ConfigurationSummary, DeviceIdentity, Role, RoleProfile};
pub use credentials::{BrokerAuth, NetworkCredentials};
pub use endpoint::{BrokerEndpoint, DEFAULT_BROKER_PORT};
pub use error::{Field, ProvisionError, ProvisionResult};
pub use mock::MockSource;
pub use provider::{ConfigProvider, LoadOptions, ProviderState, TrustPolicy};
pub use source::{
    EnvSource, FileSource, LayeredSource, ProvisionSource, RawProvisioning, StaticSource,
};
pub use trust::{TrustAnchor, TrustStatus};
