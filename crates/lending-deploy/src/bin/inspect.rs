//! Reads the state of a miner smart-owner contract. The contract is
//! `LENDING_INSPECT_ADDRESS` and the address checked for control is
//! `LENDING_INSPECT_CONTROLLER`.

use std::sync::Arc;

use dotenvy::dotenv;
use eyre::Result;
use lending_abi::ContractKind;
use lending_deploy::{
    chain::Chain,
    config::InspectConfig,
    inspect::{miner_probes, DiagnosticReader},
    network::NetworkResolver,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let resolver = NetworkResolver::from_env();
    let profile = resolver.resolve(&resolver.selected_network())?;
    let config = InspectConfig::from_env()?;
    let chain = Chain::connect(&profile).await?;

    let reader = DiagnosticReader::new(
        Arc::new(chain.provider()),
        ContractKind::MinerSmartOwner,
        config.address,
    );
    for reading in reader.read_all(&miner_probes(config.controller)).await? {
        println!("{}", reading);
    }

    Ok(())
}
