//! Configuration provider: load once, read many.
//!
//! `ConfigProvider` owns a [`ProvisionSource`] and materializes a single
//! [`ClientConfiguration`] from it. The first `load()` fetches and validates;
//! every later call returns the cached outcome. Concurrent first callers
//! block until the in-flight materialization finishes, so the source is
//! fetched at most once per provider.
//!
//! ```text
//! Unloaded ──load()──▶ Loading ──▶ Loaded      (terminal)
//!                              └─▶ Failed(err)  (terminal)
//! ```
//!
//! Re-provisioning means building a new provider.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use crate::config::{ClientConfiguration, DeviceIdentity, Role, RoleProfile};
use crate::credentials::{BrokerAuth, NetworkCredentials};
use crate::endpoint::{BrokerEndpoint, DEFAULT_CLIENT_ID};
use crate::error::{Field, ProvisionError, ProvisionResult};
use crate::source::{ProvisionSource, RawProvisioning};
use crate::trust::{TrustAnchor, TrustStatus};

/// What to do with a CA chain whose blocks carry markers but do not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrustPolicy {
    /// Fail the load with `MalformedTrustAnchor`.
    #[default]
    Strict,
    /// Keep the anchor as unverified and leave validation to the TLS stack.
    Deferred,
}

/// Knobs for a provider's single load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadOptions {
    pub trust_policy: TrustPolicy,
}

/// Observable lifecycle of a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderState {
    Unloaded,
    Loading,
    Loaded,
    Failed(ProvisionError),
}

/// Produces the process's client configuration exactly once.
pub struct ConfigProvider<S> {
    role: Role,
    source: S,
    options: LoadOptions,
    loading: AtomicBool,
    outcome: OnceLock<ProvisionResult<Arc<ClientConfiguration>>>,
}

impl<S: ProvisionSource> ConfigProvider<S> {
    pub fn new(role: Role, source: S) -> Self {
        Self::with_options(role, source, LoadOptions::default())
    }

    pub fn with_options(role: Role, source: S, options: LoadOptions) -> Self {
        Self {
            role,
            source,
            options,
            loading: AtomicBool::new(false),
            outcome: OnceLock::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Materialize the configuration, or return the already-materialized one.
    ///
    /// The call that performed a failed materialization gets the classified
    /// error; every other call after that gets `AlreadyFailed`.
    pub fn load(&self) -> ProvisionResult<Arc<ClientConfiguration>> {
        let mut materialized_here = false;
        let outcome = self.outcome.get_or_init(|| {
            materialized_here = true;
            self.loading.store(true, Ordering::SeqCst);
            self.materialize().map(Arc::new)
        });

        match outcome {
            Ok(config) => Ok(Arc::clone(config)),
            Err(err) if materialized_here => Err(err.clone()),
            Err(err) => Err(ProvisionError::AlreadyFailed {
                reason: err.to_string(),
            }),
        }
    }

    pub fn state(&self) -> ProviderState {
        match self.outcome.get() {
            Some(Ok(_)) => ProviderState::Loaded,
            Some(Err(err)) => ProviderState::Failed(err.clone()),
            None if self.loading.load(Ordering::SeqCst) => ProviderState::Loading,
            None => ProviderState::Unloaded,
        }
    }

    fn materialize(&self) -> ProvisionResult<ClientConfiguration> {
        let span = tracing::info_span!("provision", role = %self.role, source = self.source.name());
        let _guard = span.enter();

        tracing::debug!("fetching provisioning material");
        let result = self.source.fetch().and_then(|raw| self.assemble(raw));

        match &result {
            Ok(config) => tracing::info!(
                ssid = config.network().ssid(),
                host = config.broker().host(),
                port = config.broker().port(),
                client_id = config.broker().client_id(),
                certificates = config.trust_anchor().block_count(),
                trust_verified = config.trust_anchor().is_verified(),
                "provisioning loaded"
            ),
            Err(err) => tracing::error!(error = %err, "provisioning failed"),
        }
        result
    }

    fn assemble(&self, raw: RawProvisioning) -> ProvisionResult<ClientConfiguration> {
        let ssid = required(raw.wifi_ssid, Field::WifiSsid)?;
        let password = required(raw.wifi_password, Field::WifiPassword)?;
        let network = NetworkCredentials::new(ssid, password)?;

        let host = required(raw.broker_host, Field::BrokerHost)?;

        let profile = match self.role {
            Role::Registration => {
                let label = required(raw.device_label, Field::DeviceLabel)?;
                RoleProfile::Registration(DeviceIdentity::new(label)?)
            }
            Role::Client => {
                if set(raw.device_label).is_some() {
                    tracing::warn!("device label provisioned for client role; ignoring it");
                }
                RoleProfile::Client
            }
        };

        let client_id = set(raw.client_id).unwrap_or_else(|| match &profile {
            RoleProfile::Registration(identity) => identity.label().to_string(),
            RoleProfile::Client => DEFAULT_CLIENT_ID.to_string(),
        });
        let broker =
            BrokerEndpoint::with_options(host, raw.broker_port, client_id, raw.keep_alive_secs)?;

        let auth = BrokerAuth::from_parts(set(raw.broker_username), set(raw.broker_password))?;

        let trust_anchor = self.trust_anchor(raw.ca_cert.unwrap_or_default())?;

        Ok(ClientConfiguration::new(
            network,
            broker,
            auth,
            trust_anchor,
            profile,
        ))
    }

    fn trust_anchor(&self, pem: Vec<u8>) -> ProvisionResult<TrustAnchor> {
        let anchor = TrustAnchor::inspect(pem)?;
        if let TrustStatus::Unverified { blocks, defect } = anchor.status() {
            match self.options.trust_policy {
                TrustPolicy::Strict => {
                    return Err(ProvisionError::MalformedTrustAnchor(defect.clone()));
                }
                TrustPolicy::Deferred => tracing::warn!(
                    blocks,
                    defect = %defect,
                    "CA chain does not parse; validation deferred to TLS stack"
                ),
            }
        }
        Ok(anchor)
    }
}

/// Empty strings count as unset.
fn set(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: Field) -> ProvisionResult<String> {
    set(value).ok_or(ProvisionError::MissingField { field })
}
