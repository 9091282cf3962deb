//! Provisioning check: load a device's provisioning the way the firmware
//! would at startup, and report it without secrets.

use std::path::PathBuf;

use anyhow::{Context, bail};

use ql_provision::{
    ConfigProvider, ConfigurationSummary, EnvSource, FileSource, LayeredSource, LoadOptions, Role,
    TrustPolicy, transport,
};

/// Default provisioning file on a device image.
pub const DEFAULT_PROVISIONING_PATH: &str = "/etc/quizlink/device.toml";

/// Command-line arguments: `[PATH] [registration|client] [--defer-trust]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckArgs {
    pub path: PathBuf,
    pub role: Role,
    pub trust_policy: TrustPolicy,
}

impl CheckArgs {
    /// Parse arguments (without the program name).
    pub fn parse(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let mut path = None;
        let mut role = None;
        let mut trust_policy = TrustPolicy::Strict;

        for arg in args {
            if arg == "--defer-trust" {
                trust_policy = TrustPolicy::Deferred;
            } else if arg.starts_with("--") {
                bail!("unknown flag: {arg}");
            } else if path.is_none() {
                path = Some(PathBuf::from(arg));
            } else if role.is_none() {
                role = Some(arg.parse::<Role>().map_err(anyhow::Error::msg)?);
            } else {
                bail!("unexpected argument: {arg}");
            }
        }

        Ok(Self {
            path: path.unwrap_or_else(|| PathBuf::from(DEFAULT_PROVISIONING_PATH)),
            role: role.unwrap_or(Role::Client),
            trust_policy,
        })
    }
}

/// Provider reading the file, with `QL_*` environment values laid on top.
pub fn build_provider(
    args: &CheckArgs,
    env: EnvSource,
) -> ConfigProvider<LayeredSource<FileSource, EnvSource>> {
    let source = LayeredSource::new(FileSource::new(&args.path), env);
    let options = LoadOptions {
        trust_policy: args.trust_policy,
    };
    ConfigProvider::with_options(args.role, source, options)
}

/// Load the configuration and confirm the MQTT/TLS stack would accept it.
///
/// An unverified anchor under `--defer-trust` is reported, not rejected.
pub fn check(
    provider: &ConfigProvider<LayeredSource<FileSource, EnvSource>>,
) -> anyhow::Result<ConfigurationSummary> {
    let config = provider.load().context("provisioning rejected")?;

    if config.trust_anchor().is_verified() {
        transport::mqtt_options(&config).context("MQTT options rejected")?;
    } else {
        tracing::warn!("trust anchor unverified; TLS hand-off skipped");
    }

    Ok(config.summary())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT_CA: &[u8] = include_bytes!("../../ql-provision/testdata/root_ca.pem");

    fn args(list: &[&str]) -> anyhow::Result<CheckArgs> {
        CheckArgs::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_without_arguments() {
        let parsed = args(&[]).unwrap();
        assert_eq!(parsed.path, PathBuf::from(DEFAULT_PROVISIONING_PATH));
        assert_eq!(parsed.role, Role::Client);
        assert_eq!(parsed.trust_policy, TrustPolicy::Strict);
    }

    #[test]
    fn path_role_and_flag() {
        let parsed = args(&["dev.toml", "registration", "--defer-trust"]).unwrap();
        assert_eq!(parsed.path, PathBuf::from("dev.toml"));
        assert_eq!(parsed.role, Role::Registration);
        assert_eq!(parsed.trust_policy, TrustPolicy::Deferred);
    }

    #[test]
    fn rejects_unknown_role_and_flags() {
        assert!(args(&["dev.toml", "player"]).is_err());
        assert!(args(&["--verbose"]).is_err());
        assert!(args(&["a", "client", "extra"]).is_err());
    }

    #[test]
    fn check_reports_loaded_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ca.pem"), ROOT_CA).unwrap();
        let path = dir.path().join("device.toml");
        std::fs::write(
            &path,
            r#"
wifi_ssid = "Lab-Net"
wifi_password = "s3cr3t!"
broker_host = "broker.example.org"
device_label = "Team Red"
ca_cert_path = "ca.pem"
"#,
        )
        .unwrap();

        let parsed = CheckArgs {
            path,
            role: Role::Registration,
            trust_policy: TrustPolicy::Strict,
        };
        let env = EnvSource::from_vars([("QL_BROKER_PORT", "18883")]);
        let summary = check(&build_provider(&parsed, env)).unwrap();

        assert_eq!(summary.role, Role::Registration);
        assert_eq!(summary.broker_port, 18883);
        assert_eq!(summary.device_label.as_deref(), Some("Team Red"));
        assert!(summary.trust_verified);
    }

    #[test]
    fn check_fails_fast_on_missing_ssid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.toml");
        std::fs::write(&path, "broker_host = \"broker.example.org\"\n").unwrap();

        let parsed = CheckArgs {
            path,
            role: Role::Client,
            trust_policy: TrustPolicy::Strict,
        };
        let env = EnvSource::from_vars(Vec::<(String, String)>::new());
        let err = check(&build_provider(&parsed, env)).unwrap_err();
        assert!(format!("{err:#}").contains("wifi_ssid"), "{err:#}");
    }
}
