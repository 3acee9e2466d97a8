//! Deploys the lending protocol to the network named by `LENDING_NETWORK`:
//!
//! - Unitroller, with the Comptroller installed behind it
//! - JumpRateModelV2
//! - one market (CEther, or CErc20Delegate + CErc20Delegator)
//!
//! The comptroller's risk parameters and the market's interest rate model
//! and reserve factor are set afterwards, and the market is listed.
//! Everything deployed is written to `<deployments dir>/<network>/`, also
//! when a step fails.

use std::time::Duration;

use dotenvy::dotenv;
use ethers::signers::Signer;
use eyre::Result;
use lending_deploy::{
    artifacts::ArtifactStore,
    chain::{Chain, EthersTransactor},
    config::DeployConfig,
    deployment::Deployment,
    ledger::Ledger,
    network::NetworkResolver,
    protocol::{protocol_plan, save_records},
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    // Resolve everything that can fail before touching the network.
    let resolver = NetworkResolver::from_env();
    let profile = resolver.resolve(&resolver.selected_network())?;
    let config = DeployConfig::from_env()?;
    config.validate()?;
    let plan = protocol_plan(&config);
    plan.validate()?;
    let artifacts = ArtifactStore::new(&config.artifacts_dir);
    artifacts.check(&plan)?;
    info!(
        network = %profile.name,
        deployer = ?profile.deployer().address(),
        steps = plan.steps().len(),
        "deploying"
    );

    // Connect to the chain and get a client for the deployer.
    let chain = Chain::connect(&profile).await?;
    let client = chain.client(profile.deployer().clone()).await?;
    let transactor = EthersTransactor::new(
        client,
        profile.deployer().address(),
        config.confirmations,
        Duration::from_secs(config.tx_timeout_secs),
    );

    let mut ledger = Ledger::new(&profile.name, chain.chain_id());
    let result = Deployment::new(&transactor, &artifacts, &plan)
        .execute(&mut ledger)
        .await;

    // Reported before the records are written.
    if let Err(err) = &result {
        error!("deployment failed: {}", err);
    }
    if config.save_deployments {
        let dir = config.deployments_dir.join(&profile.name);
        if let Err(err) = save_records(&dir, &ledger, &config) {
            error!(dir = %dir.display(), "couldn't save deployment records: {}", err);
            result?;
            return Err(err);
        }
    }
    println!("{}", ledger.summary());

    Ok(result?)
}
