//! E2E tests for the load-once provisioning contract.

mod helpers;

use std::sync::Arc;

use helpers::{ROOT_CA, lab_source};
use ql_provision::{
    ConfigProvider, DEFAULT_BROKER_PORT, Field, ProviderState, ProvisionError, Role, StaticSource,
};

/// Lab bring-up: the documented client scenario loads verbatim.
#[test]
fn e2e_lab_client_scenario() {
    let provider = ConfigProvider::new(Role::Client, lab_source());
    let config = provider.load().unwrap();

    assert_eq!(config.network().ssid(), "Lab-Net");
    assert_eq!(config.network().password(), "s3cr3t!");
    assert_eq!(config.broker().host(), "broker.example.org");
    assert_eq!(config.broker().port(), 8883);
    assert_eq!(config.trust_anchor().as_bytes(), ROOT_CA);
    assert_eq!(config.role(), Role::Client);
    assert!(config.identity().is_none());
}

/// Values come out exactly as they went in, including odd characters.
#[test]
fn e2e_values_are_not_transformed() {
    let cases = [
        ("Lab-Net", "s3cr3t!", "broker.example.org"),
        (" Café WiFi ", "p@ss word\t", "10.0.0.5"),
        ("x", "y", "mqtt.local"),
    ];
    for (ssid, password, host) in cases {
        let source = lab_source().wifi(ssid, password).broker_host(host);
        let config = ConfigProvider::new(Role::Client, source).load().unwrap();
        assert_eq!(config.network().ssid(), ssid);
        assert_eq!(config.network().password(), password);
        assert_eq!(config.broker().host(), host);
    }
}

#[test]
fn e2e_repeated_loads_share_one_value() {
    let provider = ConfigProvider::new(Role::Client, lab_source());
    let first = provider.load().unwrap();
    let second = provider.load().unwrap();
    assert_eq!(*first, *second);
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn e2e_port_defaults_and_overrides() {
    let provider = ConfigProvider::new(Role::Client, lab_source());
    let default = provider.load().unwrap();
    assert_eq!(default.broker().port(), DEFAULT_BROKER_PORT);

    let custom = ConfigProvider::new(Role::Client, lab_source().broker_port(1884))
        .load()
        .unwrap();
    assert_eq!(custom.broker().port(), 1884);
}

#[test]
fn e2e_registration_and_client_roles() {
    let source = lab_source().device_label("Team Red");

    let registration = ConfigProvider::new(Role::Registration, source.clone())
        .load()
        .unwrap();
    assert_eq!(registration.identity().unwrap().label(), "Team Red");

    let client = ConfigProvider::new(Role::Client, source).load().unwrap();
    assert!(client.identity().is_none());
}

/// An unset SSID stops the device before any network work.
#[test]
fn e2e_unset_ssid_produces_no_configuration() {
    let provider = ConfigProvider::new(Role::Client, lab_source().wifi("", "s3cr3t!"));
    let err = provider.load().unwrap_err();
    assert_eq!(
        err,
        ProvisionError::MissingField {
            field: Field::WifiSsid
        }
    );
    assert!(matches!(provider.state(), ProviderState::Failed(_)));
    assert!(matches!(
        provider.load(),
        Err(ProvisionError::AlreadyFailed { .. })
    ));
}

#[test]
fn e2e_empty_ca_blob_is_trust_failure() {
    let provider = ConfigProvider::new(Role::Client, lab_source().ca_cert(Vec::new()));
    let err = provider.load().unwrap_err();
    assert!(matches!(err, ProvisionError::MalformedTrustAnchor(_)));
}

/// Two providers in one process hold independent configurations.
#[test]
fn e2e_multiple_configurations_coexist() {
    let provider = ConfigProvider::new(Role::Client, lab_source());
    let lab = provider.load().unwrap();
    let field = ConfigProvider::new(
        Role::Registration,
        StaticSource::new()
            .wifi("Gym-AP", "bleachers")
            .broker_host("quiz.school.example")
            .device_label("Team Blue")
            .ca_cert(ROOT_CA),
    )
    .load()
    .unwrap();

    assert_ne!(*lab, *field);
    assert_eq!(lab.network().ssid(), "Lab-Net");
    assert_eq!(field.network().ssid(), "Gym-AP");
}
