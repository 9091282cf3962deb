//! CA trust anchor: PEM certificate chain handed to the TLS stack.
//!
//! The raw blob is kept byte-for-byte. Inspection only reads it: each
//! `BEGIN CERTIFICATE` block is decoded and parsed as X.509 so that a
//! template such as
//!
//! ```text
//! -----BEGIN CERTIFICATE-----
//! xx
//! -----END CERTIFICATE-----
//! ```
//!
//! is told apart from a usable anchor before any handshake is attempted.

use std::fmt;

use x509_parser::pem::parse_x509_pem;

use crate::error::{ProvisionError, ProvisionResult};

pub const BEGIN_CERTIFICATE: &str = "-----BEGIN CERTIFICATE-----";
pub const END_CERTIFICATE: &str = "-----END CERTIFICATE-----";

/// Upper bound on the whole chain (a handful of certificates fits easily).
pub const MAX_TRUST_ANCHOR_LEN: usize = 64 * 1024;

/// Outcome of inspecting the PEM blocks of an anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustStatus {
    /// Every block decoded to a well-formed X.509 certificate.
    Verified {
        /// Subject DNs in chain order.
        subjects: Vec<String>,
    },
    /// Certificate markers are present but at least one block does not parse.
    Unverified { blocks: usize, defect: String },
}

/// One or more PEM CA certificates in trust-chain order.
#[derive(Clone, PartialEq, Eq)]
pub struct TrustAnchor {
    pem: Vec<u8>,
    status: TrustStatus,
}

impl TrustAnchor {
    /// Accept any blob that is structurally PEM, recording whether its
    /// blocks actually parse.
    ///
    /// Empty input, oversized input, non-text input, or input without a
    /// single `BEGIN CERTIFICATE` marker is rejected outright.
    pub fn inspect(pem: impl Into<Vec<u8>>) -> ProvisionResult<Self> {
        let pem = pem.into();
        if pem.iter().all(u8::is_ascii_whitespace) {
            return Err(ProvisionError::MalformedTrustAnchor(
                "CA certificate blob is empty".into(),
            ));
        }
        if pem.len() > MAX_TRUST_ANCHOR_LEN {
            return Err(ProvisionError::MalformedTrustAnchor(format!(
                "CA certificate blob is {} bytes (max {MAX_TRUST_ANCHOR_LEN})",
                pem.len()
            )));
        }
        let text = std::str::from_utf8(&pem).map_err(|e| {
            ProvisionError::MalformedTrustAnchor(format!("CA certificate blob is not text: {e}"))
        })?;

        let blocks = certificate_blocks(text);
        if blocks.is_empty() {
            return Err(ProvisionError::MalformedTrustAnchor(format!(
                "no '{BEGIN_CERTIFICATE}' marker found"
            )));
        }

        let status = match verify_blocks(&blocks) {
            Ok(subjects) => TrustStatus::Verified { subjects },
            Err(defect) => TrustStatus::Unverified {
                blocks: blocks.len(),
                defect,
            },
        };

        Ok(Self { pem, status })
    }

    /// Like [`TrustAnchor::inspect`], but a block that does not parse is an error.
    pub fn from_pem(pem: impl Into<Vec<u8>>) -> ProvisionResult<Self> {
        let anchor = Self::inspect(pem)?;
        anchor.require_verified()?;
        Ok(anchor)
    }

    /// Fail unless every block parsed.
    pub fn require_verified(&self) -> ProvisionResult<()> {
        match &self.status {
            TrustStatus::Verified { .. } => Ok(()),
            TrustStatus::Unverified { defect, .. } => {
                Err(ProvisionError::MalformedTrustAnchor(defect.clone()))
            }
        }
    }

    /// The blob exactly as provisioned.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pem
    }

    pub fn status(&self) -> &TrustStatus {
        &self.status
    }

    pub fn is_verified(&self) -> bool {
        matches!(self.status, TrustStatus::Verified { .. })
    }

    /// Number of certificate blocks, parsed or not.
    pub fn block_count(&self) -> usize {
        match &self.status {
            TrustStatus::Verified { subjects } => subjects.len(),
            TrustStatus::Unverified { blocks, .. } => *blocks,
        }
    }

    /// Subject DNs of the parsed certificates (empty when unverified).
    pub fn subjects(&self) -> &[String] {
        match &self.status {
            TrustStatus::Verified { subjects } => subjects,
            TrustStatus::Unverified { .. } => &[],
        }
    }
}

impl fmt::Debug for TrustAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustAnchor")
            .field("len", &self.pem.len())
            .field("status", &self.status)
            .finish()
    }
}

/// Slice out every `BEGIN CERTIFICATE` block. An unterminated block runs to
/// the end of the input.
fn certificate_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(BEGIN_CERTIFICATE) {
        let block = &rest[start..];
        let body_start = BEGIN_CERTIFICATE.len();
        match block[body_start..].find(END_CERTIFICATE) {
            Some(end) => {
                let block_end = body_start + end + END_CERTIFICATE.len();
                blocks.push(&block[..block_end]);
                rest = &block[block_end..];
            }
            None => {
                blocks.push(block);
                break;
            }
        }
    }
    blocks
}

fn verify_blocks(blocks: &[&str]) -> Result<Vec<String>, String> {
    let mut subjects = Vec::with_capacity(blocks.len());
    for (index, block) in blocks.iter().enumerate() {
        if !block.ends_with(END_CERTIFICATE) {
            return Err(format!("certificate block {index} has no END marker"));
        }
        let (_, pem) = parse_x509_pem(block.as_bytes())
            .map_err(|e| format!("certificate block {index} is not valid PEM: {e:?}"))?;
        if pem.label != "CERTIFICATE" {
            return Err(format!(
                "certificate block {index} has label '{}'",
                pem.label
            ));
        }
        let cert = pem
            .parse_x509()
            .map_err(|e| format!("certificate block {index} is not X.509: {e:?}"))?;
        subjects.push(cert.subject().to_string());
    }
    Ok(subjects)
}
