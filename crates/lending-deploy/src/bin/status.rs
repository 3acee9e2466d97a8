//! Prints how a saved deployment is wired: the comptroller behind the
//! proxy, the listed markets, and each market's interest rate model and
//! reserve factor.

use std::sync::Arc;

use dotenvy::dotenv;
use eyre::Result;
use lending_addresses::Addresses;
use lending_deploy::{
    chain::Chain,
    config::DeployConfig,
    constants::ADDRESSES_FILE,
    inspect::{protocol_targets, DiagnosticReader},
    network::NetworkResolver,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let resolver = NetworkResolver::from_env();
    let profile = resolver.resolve(&resolver.selected_network())?;
    let config = DeployConfig::from_env()?;
    let addresses = Addresses::load(
        config
            .deployments_dir
            .join(&profile.name)
            .join(ADDRESSES_FILE),
    )?;
    let chain = Chain::connect(&profile).await?;
    let provider = Arc::new(chain.provider());

    for target in protocol_targets(&addresses) {
        println!("{} ({:?})", target.label, target.address);
        let reader = DiagnosticReader::new(provider.clone(), target.kind, target.address);
        for reading in reader.read_all(&target.probes).await? {
            println!("  {}", reading);
        }
    }

    Ok(())
}
