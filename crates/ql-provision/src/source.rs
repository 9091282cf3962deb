//! Provisioning sources: where raw field values come from.
//!
//! A source only gathers values. Validation and trust inspection happen in
//! [`crate::provider::ConfigProvider`], which fetches from its source at most
//! once.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Field, ProvisionError, ProvisionResult};

/// Unvalidated field values. `None` is the "unset" state.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RawProvisioning {
    pub wifi_ssid: Option<String>,
    pub wifi_password: Option<String>,
    pub broker_host: Option<String>,
    pub broker_port: Option<u16>,
    pub device_label: Option<String>,
    pub client_id: Option<String>,
    pub broker_username: Option<String>,
    pub broker_password: Option<String>,
    pub keep_alive_secs: Option<u16>,
    /// CA chain bytes exactly as read.
    pub ca_cert: Option<Vec<u8>>,
}

impl RawProvisioning {
    /// Field-wise merge where every value set in `overrides` wins.
    pub fn overlay(self, overrides: RawProvisioning) -> RawProvisioning {
        RawProvisioning {
            wifi_ssid: pick(overrides.wifi_ssid, self.wifi_ssid),
            wifi_password: pick(overrides.wifi_password, self.wifi_password),
            broker_host: pick(overrides.broker_host, self.broker_host),
            broker_port: overrides.broker_port.or(self.broker_port),
            device_label: pick(overrides.device_label, self.device_label),
            client_id: pick(overrides.client_id, self.client_id),
            broker_username: pick(overrides.broker_username, self.broker_username),
            broker_password: pick(overrides.broker_password, self.broker_password),
            keep_alive_secs: overrides.keep_alive_secs.or(self.keep_alive_secs),
            ca_cert: pick_bytes(overrides.ca_cert, self.ca_cert),
        }
    }
}

fn pick(preferred: Option<String>, fallback: Option<String>) -> Option<String> {
    preferred.filter(|v| !v.is_empty()).or(fallback)
}

fn pick_bytes(preferred: Option<Vec<u8>>, fallback: Option<Vec<u8>>) -> Option<Vec<u8>> {
    preferred.filter(|v| !v.is_empty()).or(fallback)
}

impl fmt::Debug for RawProvisioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("RawProvisioning")
            .field("wifi_ssid", &self.wifi_ssid)
            .field("wifi_password", &redact(&self.wifi_password))
            .field("broker_host", &self.broker_host)
            .field("broker_port", &self.broker_port)
            .field("device_label", &self.device_label)
            .field("client_id", &self.client_id)
            .field("broker_username", &self.broker_username)
            .field("broker_password", &redact(&self.broker_password))
            .field("keep_alive_secs", &self.keep_alive_secs)
            .field("ca_cert_len", &self.ca_cert.as_ref().map(Vec::len))
            .finish()
    }
}

/// Abstraction over where provisioning material lives.
///
/// Enables compiled-in values, environment variables, files, and mocks
/// behind the same provider.
pub trait ProvisionSource: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Gather raw values. May perform I/O.
    fn fetch(&self) -> ProvisionResult<RawProvisioning>;
}

impl<S: ProvisionSource + ?Sized> ProvisionSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self) -> ProvisionResult<RawProvisioning> {
        (**self).fetch()
    }
}

// ── StaticSource ──────────────────────────────────────────────

/// Values fixed at build time or assembled in code.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    raw: RawProvisioning,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wifi(mut self, ssid: impl Into<String>, password: impl Into<String>) -> Self {
        self.raw.wifi_ssid = Some(ssid.into());
        self.raw.wifi_password = Some(password.into());
        self
    }

    pub fn broker_host(mut self, host: impl Into<String>) -> Self {
        self.raw.broker_host = Some(host.into());
        self
    }

    pub fn broker_port(mut self, port: u16) -> Self {
        self.raw.broker_port = Some(port);
        self
    }

    pub fn device_label(mut self, label: impl Into<String>) -> Self {
        self.raw.device_label = Some(label.into());
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.raw.client_id = Some(client_id.into());
        self
    }

    pub fn broker_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.raw.broker_username = Some(username.into());
        self.raw.broker_password = Some(password.into());
        self
    }

    pub fn keep_alive_secs(mut self, secs: u16) -> Self {
        self.raw.keep_alive_secs = Some(secs);
        self
    }

    pub fn ca_cert(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.raw.ca_cert = Some(pem.into());
        self
    }
}

impl ProvisionSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch(&self) -> ProvisionResult<RawProvisioning> {
        Ok(self.raw.clone())
    }
}

// ── EnvSource ─────────────────────────────────────────────────

/// Environment variable carrying a path to the CA chain.
pub const CA_CERT_PATH_VAR: &str = "QL_CA_CERT_PATH";

/// Reads `QL_*` environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    /// `None` reads the process environment at fetch time.
    vars: Option<HashMap<String, String>>,
}

impl EnvSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read from an explicit variable set instead of the process environment.
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn var(&self, name: &str) -> Option<String> {
        let value = match &self.vars {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        value.filter(|v| !v.is_empty())
    }

    fn field(&self, field: Field) -> Option<String> {
        self.var(&field.env_var())
    }

    fn number(&self, field: Field) -> ProvisionResult<Option<u16>> {
        self.field(field)
            .map(|v| {
                v.trim().parse::<u16>().map_err(|e| {
                    ProvisionError::invalid(field, format!("{}={v:?}: {e}", field.env_var()))
                })
            })
            .transpose()
    }
}

impl ProvisionSource for EnvSource {
    fn name(&self) -> &str {
        "env"
    }

    fn fetch(&self) -> ProvisionResult<RawProvisioning> {
        let inline = self.field(Field::TrustAnchor);
        let path = self.var(CA_CERT_PATH_VAR);
        let ca_cert = match (inline, path) {
            (Some(_), Some(_)) => {
                return Err(ProvisionError::invalid(
                    Field::TrustAnchor,
                    format!(
                        "both {} and {CA_CERT_PATH_VAR} are set",
                        Field::TrustAnchor.env_var()
                    ),
                ));
            }
            (Some(pem), None) => Some(pem.into_bytes()),
            (None, Some(path)) => Some(read_ca_file(self.name(), Path::new(&path))?),
            (None, None) => None,
        };

        Ok(RawProvisioning {
            wifi_ssid: self.field(Field::WifiSsid),
            wifi_password: self.field(Field::WifiPassword),
            broker_host: self.field(Field::BrokerHost),
            broker_port: self.number(Field::BrokerPort)?,
            device_label: self.field(Field::DeviceLabel),
            client_id: self.field(Field::ClientId),
            broker_username: self.field(Field::BrokerUsername),
            broker_password: self.field(Field::BrokerPassword),
            keep_alive_secs: self.number(Field::KeepAlive)?,
            ca_cert,
        })
    }
}

// ── FileSource ────────────────────────────────────────────────

/// On-disk provisioning file layout (TOML).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProvisioningFile {
    wifi_ssid: Option<String>,
    wifi_password: Option<String>,
    broker_host: Option<String>,
    broker_port: Option<u16>,
    device_label: Option<String>,
    client_id: Option<String>,
    broker_username: Option<String>,
    broker_password: Option<String>,
    keep_alive_secs: Option<u16>,
    /// Inline PEM chain.
    ca_cert_pem: Option<String>,
    /// PEM chain file, relative to the provisioning file's directory.
    ca_cert_path: Option<PathBuf>,
}

/// Reads a TOML provisioning file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("file:{}", path.display());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn source_error(&self, message: impl Into<String>) -> ProvisionError {
        ProvisionError::Source {
            source_name: self.name.clone(),
            message: message.into(),
        }
    }
}

impl ProvisionSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> ProvisionResult<RawProvisioning> {
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| self.source_error(format!("read {}: {e}", self.path.display())))?;
        let file: ProvisioningFile = toml::from_str(&contents)
            .map_err(|e| self.source_error(format!("parse {}: {e}", self.path.display())))?;

        let ca_cert = match (file.ca_cert_pem, file.ca_cert_path) {
            (Some(_), Some(_)) => {
                return Err(ProvisionError::invalid(
                    Field::TrustAnchor,
                    "both ca_cert_pem and ca_cert_path are set",
                ));
            }
            (Some(pem), None) => Some(pem.into_bytes()),
            (None, Some(ca_path)) => {
                let resolved = if ca_path.is_relative() {
                    self.path
                        .parent()
                        .map(|dir| dir.join(&ca_path))
                        .unwrap_or(ca_path)
                } else {
                    ca_path
                };
                Some(read_ca_file(&self.name, &resolved)?)
            }
            (None, None) => None,
        };

        Ok(RawProvisioning {
            wifi_ssid: file.wifi_ssid,
            wifi_password: file.wifi_password,
            broker_host: file.broker_host,
            broker_port: file.broker_port,
            device_label: file.device_label,
            client_id: file.client_id,
            broker_username: file.broker_username,
            broker_password: file.broker_password,
            keep_alive_secs: file.keep_alive_secs,
            ca_cert,
        })
    }
}

fn read_ca_file(source_name: &str, path: &Path) -> ProvisionResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| ProvisionError::Source {
        source_name: source_name.to_string(),
        message: format!("failed to read CA cert '{}': {e}", path.display()),
    })
}

// ── LayeredSource ─────────────────────────────────────────────

/// A base source with another source's set values laid over it.
pub struct LayeredSource<B, O> {
    base: B,
    overrides: O,
    name: String,
}

impl<B: ProvisionSource, O: ProvisionSource> LayeredSource<B, O> {
    pub fn new(base: B, overrides: O) -> Self {
        let name = format!("{}+{}", base.name(), overrides.name());
        Self {
            base,
            overrides,
            name,
        }
    }
}

impl<B: ProvisionSource, O: ProvisionSource> ProvisionSource for LayeredSource<B, O> {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> ProvisionResult<RawProvisioning> {
        let base = self.base.fetch()?;
        let overrides = self.overrides.fetch()?;
        Ok(base.overlay(overrides))
    }
}
