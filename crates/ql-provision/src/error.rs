//! Provisioning error types.

use std::fmt;

use thiserror::Error;

/// A provisioned configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    WifiSsid,
    WifiPassword,
    BrokerHost,
    BrokerPort,
    DeviceLabel,
    ClientId,
    BrokerUsername,
    BrokerPassword,
    KeepAlive,
    TrustAnchor,
}

impl Field {
    /// Key used in provisioning files.
    pub fn key(&self) -> &'static str {
        match self {
            Self::WifiSsid => "wifi_ssid",
            Self::WifiPassword => "wifi_password",
            Self::BrokerHost => "broker_host",
            Self::BrokerPort => "broker_port",
            Self::DeviceLabel => "device_label",
            Self::ClientId => "client_id",
            Self::BrokerUsername => "broker_username",
            Self::BrokerPassword => "broker_password",
            Self::KeepAlive => "keep_alive_secs",
            Self::TrustAnchor => "ca_cert",
        }
    }

    /// Environment variable that overrides this field (e.g. `QL_WIFI_SSID`).
    pub fn env_var(&self) -> String {
        let key = match self {
            Self::KeepAlive => "keep_alive",
            Self::TrustAnchor => "ca_cert_pem",
            other => other.key(),
        };
        format!("QL_{}", key.to_ascii_uppercase())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Errors raised while materializing a client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    #[error("missing provisioning field: {field}")]
    MissingField { field: Field },

    #[error("invalid provisioning field {field}: {reason}")]
    InvalidField { field: Field, reason: String },

    #[error("malformed trust anchor: {0}")]
    MalformedTrustAnchor(String),

    #[error("provisioning source '{source_name}' failed: {message}")]
    Source {
        source_name: String,
        message: String,
    },

    #[error("provisioning already failed: {reason}")]
    AlreadyFailed { reason: String },
}

impl ProvisionError {
    pub fn missing(field: Field) -> Self {
        Self::MissingField { field }
    }

    pub fn invalid(field: Field, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// True when the failure dooms the TLS handshake rather than WiFi association.
    pub fn is_trust_failure(&self) -> bool {
        matches!(self, Self::MalformedTrustAnchor(_))
    }
}

/// Convenience alias for provisioning results.
pub type ProvisionResult<T> = Result<T, ProvisionError>;
