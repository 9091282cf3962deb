//! Hand-off to the MQTT client: build `rumqttc` options from a configuration.
//!
//! No connection is made here. The broker client owns the event loop.

use std::time::Duration;

use rumqttc::{MqttOptions, TlsConfiguration, Transport};

use crate::config::ClientConfiguration;
use crate::error::ProvisionResult;

/// Build a TLS transport that trusts exactly the provisioned CA chain.
///
/// Uses `TlsConfiguration::Simple` with the anchor's bytes untouched. The
/// broker authenticates devices by username/password, so no client cert.
pub fn tls_transport(config: &ClientConfiguration) -> ProvisionResult<Transport> {
    let anchor = config.trust_anchor();
    anchor.require_verified()?;

    Ok(Transport::tls_with_config(TlsConfiguration::Simple {
        ca: anchor.as_bytes().to_vec(),
        alpn: None,
        client_auth: None,
    }))
}

/// MQTT options for the configured broker, ready for `AsyncClient::new`.
///
/// Refuses an unverified trust anchor so a template certificate never
/// reaches the TLS stack.
pub fn mqtt_options(config: &ClientConfiguration) -> ProvisionResult<MqttOptions> {
    let broker = config.broker();
    let mut options = MqttOptions::new(broker.client_id(), broker.host(), broker.port());
    options.set_keep_alive(Duration::from_secs(broker.keep_alive_secs().into()));

    if let Some(auth) = config.auth() {
        options.set_credentials(auth.username(), auth.password());
    }

    options.set_transport(tls_transport(config)?);
    Ok(options)
}
