//! The immutable client configuration handed to network and TLS consumers.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::credentials::{BrokerAuth, NetworkCredentials};
use crate::endpoint::BrokerEndpoint;
use crate::error::{Field, ProvisionError, ProvisionResult};
use crate::trust::TrustAnchor;

/// Deployment role of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Joins a quiz session and carries a human-readable identity label.
    Registration,
    /// Plain client without an identity label.
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "registration" => Ok(Self::Registration),
            "client" => Ok(Self::Client),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Human-readable label a registration device announces itself with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    label: String,
}

impl DeviceIdentity {
    pub fn new(label: impl Into<String>) -> ProvisionResult<Self> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(ProvisionError::missing(Field::DeviceLabel));
        }
        Ok(Self { label })
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Role-specific part of a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleProfile {
    Registration(DeviceIdentity),
    Client,
}

impl RoleProfile {
    pub fn role(&self) -> Role {
        match self {
            Self::Registration(_) => Role::Registration,
            Self::Client => Role::Client,
        }
    }
}

/// Everything a device needs before its first connection attempt.
///
/// There are no setters: new credentials mean a new configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfiguration {
    network: NetworkCredentials,
    broker: BrokerEndpoint,
    auth: Option<BrokerAuth>,
    trust_anchor: TrustAnchor,
    profile: RoleProfile,
}

impl ClientConfiguration {
    pub(crate) fn new(
        network: NetworkCredentials,
        broker: BrokerEndpoint,
        auth: Option<BrokerAuth>,
        trust_anchor: TrustAnchor,
        profile: RoleProfile,
    ) -> Self {
        Self {
            network,
            broker,
            auth,
            trust_anchor,
            profile,
        }
    }

    pub fn network(&self) -> &NetworkCredentials {
        &self.network
    }

    pub fn broker(&self) -> &BrokerEndpoint {
        &self.broker
    }

    pub fn auth(&self) -> Option<&BrokerAuth> {
        self.auth.as_ref()
    }

    pub fn trust_anchor(&self) -> &TrustAnchor {
        &self.trust_anchor
    }

    pub fn role(&self) -> Role {
        self.profile.role()
    }

    /// Identity label holder; always `None` for [`Role::Client`].
    pub fn identity(&self) -> Option<&DeviceIdentity> {
        match &self.profile {
            RoleProfile::Registration(identity) => Some(identity),
            RoleProfile::Client => None,
        }
    }

    /// Secret-free view for logs and operator tooling.
    pub fn summary(&self) -> ConfigurationSummary {
        ConfigurationSummary {
            role: self.role(),
            wifi_ssid: self.network.ssid().to_string(),
            broker_host: self.broker.host().to_string(),
            broker_port: self.broker.port(),
            client_id: self.broker.client_id().to_string(),
            keep_alive_secs: self.broker.keep_alive_secs(),
            device_label: self.identity().map(|id| id.label().to_string()),
            broker_username: self.auth.as_ref().map(|a| a.username().to_string()),
            trust_verified: self.trust_anchor.is_verified(),
            certificate_count: self.trust_anchor.block_count(),
            certificate_subjects: self.trust_anchor.subjects().to_vec(),
        }
    }
}

/// Redacted configuration report. Never carries passwords or PEM bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationSummary {
    pub role: Role,
    pub wifi_ssid: String,
    pub broker_host: String,
    pub broker_port: u16,
    pub client_id: String,
    pub keep_alive_secs: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker_username: Option<String>,
    pub trust_verified: bool,
    pub certificate_count: usize,
    pub certificate_subjects: Vec<String>,
}
