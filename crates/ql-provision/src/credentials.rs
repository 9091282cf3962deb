//! WiFi and broker credentials.

use std::fmt;

use crate::error::{Field, ProvisionError, ProvisionResult};

/// Maximum SSID length per IEEE 802.11.
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA2 passphrase length.
pub const MAX_PASSWORD_LEN: usize = 64;

/// WiFi association secret pair.
#[derive(Clone, PartialEq, Eq)]
pub struct NetworkCredentials {
    ssid: String,
    password: String,
}

impl NetworkCredentials {
    /// Build credentials, rejecting unset or oversized values.
    pub fn new(ssid: impl Into<String>, password: impl Into<String>) -> ProvisionResult<Self> {
        let ssid = ssid.into();
        let password = password.into();

        if ssid.is_empty() {
            return Err(ProvisionError::missing(Field::WifiSsid));
        }
        if ssid.len() > MAX_SSID_LEN {
            return Err(ProvisionError::invalid(
                Field::WifiSsid,
                format!("{} bytes (max {MAX_SSID_LEN})", ssid.len()),
            ));
        }
        if password.is_empty() {
            return Err(ProvisionError::missing(Field::WifiPassword));
        }
        if password.len() > MAX_PASSWORD_LEN {
            return Err(ProvisionError::invalid(
                Field::WifiPassword,
                format!("{} bytes (max {MAX_PASSWORD_LEN})", password.len()),
            ));
        }

        Ok(Self { ssid, password })
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for NetworkCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Username/password pair presented to the broker on CONNECT.
#[derive(Clone, PartialEq, Eq)]
pub struct BrokerAuth {
    username: String,
    password: String,
}

impl BrokerAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> ProvisionResult<Self> {
        let username = username.into();
        let password = password.into();
        if username.is_empty() {
            return Err(ProvisionError::missing(Field::BrokerUsername));
        }
        if password.is_empty() {
            return Err(ProvisionError::missing(Field::BrokerPassword));
        }
        Ok(Self { username, password })
    }

    /// Pair up optional halves. Both unset means no broker auth; a lone half
    /// reports the other one as missing.
    pub fn from_parts(
        username: Option<String>,
        password: Option<String>,
    ) -> ProvisionResult<Option<Self>> {
        match (username, password) {
            (None, None) => Ok(None),
            (Some(username), Some(password)) => Self::new(username, password).map(Some),
            (Some(_), None) => Err(ProvisionError::missing(Field::BrokerPassword)),
            (None, Some(_)) => Err(ProvisionError::missing(Field::BrokerUsername)),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for BrokerAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_keep_values_verbatim() {
        let creds = NetworkCredentials::new("Lab-Net", "s3cr3t!").unwrap();
        assert_eq!(creds.ssid(), "Lab-Net");
        assert_eq!(creds.password(), "s3cr3t!");
    }

    #[test]
    fn empty_ssid_is_missing() {
        let err = NetworkCredentials::new("", "s3cr3t!").unwrap_err();
        assert_eq!(err, ProvisionError::missing(Field::WifiSsid));
    }

    #[test]
    fn empty_password_is_missing() {
        let err = NetworkCredentials::new("Lab-Net", "").unwrap_err();
        assert_eq!(err, ProvisionError::missing(Field::WifiPassword));
    }

    #[test]
    fn ssid_length_limit() {
        assert!(NetworkCredentials::new("a".repeat(32), "pw").is_ok());
        let err = NetworkCredentials::new("a".repeat(33), "pw").unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::InvalidField {
                field: Field::WifiSsid,
                ..
            }
        ));
    }

    #[test]
    fn password_length_limit() {
        assert!(NetworkCredentials::new("net", "p".repeat(64)).is_ok());
        let err = NetworkCredentials::new("net", "p".repeat(65)).unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::InvalidField {
                field: Field::WifiPassword,
                ..
            }
        ));
    }

    #[test]
    fn debug_redacts_secrets() {
        let creds = NetworkCredentials::new("Lab-Net", "s3cr3t!").unwrap();
        let auth = BrokerAuth::new("aa:bb:cc:dd:ee:ff", "m5_hunter2").unwrap();
        let rendered = format!("{creds:?} {auth:?}");
        assert!(!rendered.contains("s3cr3t!"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("Lab-Net"));
    }

    #[test]
    fn broker_auth_requires_both_halves() {
        assert_eq!(BrokerAuth::from_parts(None, None).unwrap(), None);
        assert_eq!(
            BrokerAuth::from_parts(Some("dev".into()), None).unwrap_err(),
            ProvisionError::missing(Field::BrokerPassword)
        );
        assert_eq!(
            BrokerAuth::from_parts(None, Some("pw".into())).unwrap_err(),
            ProvisionError::missing(Field::BrokerUsername)
        );
        let auth = BrokerAuth::from_parts(Some("dev".into()), Some("pw".into()))
            .unwrap()
            .unwrap();
        assert_eq!(auth.username(), "dev");
    }
}
