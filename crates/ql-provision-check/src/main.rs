//! `ql-provision-check`: validate device provisioning before deployment.
//!
//! Exits non-zero on any provisioning error, before anything touches the
//! network.

use tracing_subscriber::EnvFilter;

use ql_provision::EnvSource;
use ql_provision_check::{CheckArgs, build_provider, check};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "ql-provision-check starting"
    );

    let args = CheckArgs::parse(std::env::args().skip(1))?;
    tracing::info!(
        path = %args.path.display(),
        role = %args.role,
        "checking provisioning"
    );

    let provider = build_provider(&args, EnvSource::new());
    let summary = check(&provider)?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
