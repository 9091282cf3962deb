//! Shared fixtures for provisioning E2E tests.

#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;

use ql_provision::StaticSource;

pub const ROOT_CA: &[u8] = include_bytes!("../../../ql-provision/testdata/root_ca.pem");
pub const INTERMEDIATE_CA: &[u8] =
    include_bytes!("../../../ql-provision/testdata/intermediate_ca.pem");

/// The template certificate shipped in unprovisioned firmware images.
pub const TEMPLATE_CA: &str =
    "= \"-----BEGIN CERTIFICATE-----\nxx\nxx\nxx\n-----END CERTIFICATE-----";

/// The lab network from the bring-up checklist.
pub fn lab_source() -> StaticSource {
    StaticSource::new()
        .wifi("Lab-Net", "s3cr3t!")
        .broker_host("broker.example.org")
        .ca_cert(ROOT_CA)
}

/// A temporary provisioning directory holding `device.toml` and `ca.pem`.
pub struct ProvisioningDir {
    dir: TempDir,
}

impl ProvisioningDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Write the CA chain next to the provisioning file.
    pub fn with_ca(self, pem: &[u8]) -> Self {
        std::fs::write(self.dir.path().join("ca.pem"), pem).expect("write ca.pem");
        self
    }

    /// Write `device.toml` and return its path.
    pub fn write_config(&self, toml: &str) -> PathBuf {
        let path = self.dir.path().join("device.toml");
        std::fs::write(&path, toml).expect("write device.toml");
        path
    }
}
