//! Broker endpoint: where the device's MQTT-over-TLS session goes.

use crate::error::{Field, ProvisionError, ProvisionResult};

/// MQTT-over-TLS port used when none is provisioned.
pub const DEFAULT_BROKER_PORT: u16 = 8883;

/// Keep-alive interval used when none is provisioned.
pub const DEFAULT_KEEP_ALIVE_SECS: u16 = 30;

/// Client identifier for plain client devices without an explicit one.
pub const DEFAULT_CLIENT_ID: &str = "quizlink-client";

const MIN_KEEP_ALIVE_SECS: u16 = 5;
const MAX_KEEP_ALIVE_SECS: u16 = 3600;

/// Maximum MQTT client identifier length accepted by the broker.
pub const MAX_CLIENT_ID_LEN: usize = 64;

/// Broker address plus the session parameters tied to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerEndpoint {
    host: String,
    port: u16,
    client_id: String,
    keep_alive_secs: u16,
}

impl BrokerEndpoint {
    /// Endpoint with the default port and keep-alive.
    pub fn new(host: impl Into<String>, client_id: impl Into<String>) -> ProvisionResult<Self> {
        Self::with_options(host, None, client_id, None)
    }

    pub fn with_options(
        host: impl Into<String>,
        port: Option<u16>,
        client_id: impl Into<String>,
        keep_alive_secs: Option<u16>,
    ) -> ProvisionResult<Self> {
        let host = host.into();
        if host.is_empty() {
            return Err(ProvisionError::missing(Field::BrokerHost));
        }
        if host.chars().any(char::is_whitespace) {
            return Err(ProvisionError::invalid(
                Field::BrokerHost,
                "host contains whitespace",
            ));
        }

        let port = port.unwrap_or(DEFAULT_BROKER_PORT);
        if port == 0 {
            return Err(ProvisionError::invalid(
                Field::BrokerPort,
                "port must be in 1..=65535",
            ));
        }

        let client_id = client_id.into();
        if client_id.is_empty() {
            return Err(ProvisionError::missing(Field::ClientId));
        }
        if client_id.len() > MAX_CLIENT_ID_LEN {
            return Err(ProvisionError::invalid(
                Field::ClientId,
                format!("{} bytes (max {MAX_CLIENT_ID_LEN})", client_id.len()),
            ));
        }

        let keep_alive_secs = keep_alive_secs.unwrap_or(DEFAULT_KEEP_ALIVE_SECS);
        if !(MIN_KEEP_ALIVE_SECS..=MAX_KEEP_ALIVE_SECS).contains(&keep_alive_secs) {
            return Err(ProvisionError::invalid(
                Field::KeepAlive,
                format!("{keep_alive_secs}s outside {MIN_KEEP_ALIVE_SECS}..={MAX_KEEP_ALIVE_SECS}"),
            ));
        }

        Ok(Self {
            host,
            port,
            client_id,
            keep_alive_secs,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn keep_alive_secs(&self) -> u16 {
        self.keep_alive_secs
    }
}
