#[cfg(test)]
pub(crate) mod fake;
mod transactor;

use std::sync::Arc;

use ethers::{
    core::utils::Anvil,
    middleware::{NonceManagerMiddleware, SignerMiddleware},
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    utils::AnvilInstance,
};
use tracing::info;
pub use transactor::{EthersTransactor, Transactor, TxOutcome};

use crate::{
    errors::ConfigurationError,
    network::{Endpoint, NetworkProfile},
};

/// The signing stack used for every transaction: a local wallet with
/// nonces tracked client side.
pub type ChainClient = NonceManagerMiddleware<SignerMiddleware<Provider<Http>, LocalWallet>>;

/// A connection to the node of a resolved network. If the network is
/// `anvil`, the node is spawned here and lives as long as the `Chain`.
pub struct Chain {
    network: String,
    provider: Provider<Http>,
    chain_id: u64,
    _maybe_anvil: Option<AnvilInstance>,
}

impl Chain {
    /// Connects to the profile's node and checks that it serves the
    /// expected chain.
    pub async fn connect(profile: &NetworkProfile) -> Result<Self, ConfigurationError> {
        let connection_error = |reason: String| ConfigurationError::Connection {
            network: profile.name.clone(),
            reason,
        };

        let (url, maybe_anvil) = match &profile.endpoint {
            Endpoint::Http(url) => (url.clone(), None),
            Endpoint::SpawnAnvil => {
                let anvil = Anvil::new().spawn();
                (anvil.endpoint(), Some(anvil))
            }
        };
        let provider = Provider::<Http>::try_from(url.as_str())
            .map_err(|e| ConfigurationError::InvalidUrl {
                network: profile.name.clone(),
                reason: e.to_string(),
            })?
            .interval(profile.poll_interval);

        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| connection_error(e.to_string()))?
            .as_u64();
        if let Some(expected) = profile.chain_id {
            if expected != chain_id {
                return Err(ConfigurationError::ChainIdMismatch {
                    network: profile.name.clone(),
                    expected,
                    actual: chain_id,
                });
            }
        }
        info!(network = %profile.name, chain_id, "connected");

        Ok(Self {
            network: profile.name.clone(),
            provider,
            chain_id,
            _maybe_anvil: maybe_anvil,
        })
    }

    /// A provider that can access the chain.
    pub fn provider(&self) -> Provider<Http> {
        self.provider.clone()
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// A signing client for `signer` with the chain id set on the wallet.
    pub async fn client(&self, signer: LocalWallet) -> Result<Arc<ChainClient>, ConfigurationError> {
        let signer = signer.with_chain_id(self.chain_id);
        let address = signer.address();
        let inner = SignerMiddleware::new_with_provider_chain(self.provider(), signer)
            .await
            .map_err(|e| ConfigurationError::Connection {
                network: self.network.clone(),
                reason: e.to_string(),
            })?;
        Ok(Arc::new(NonceManagerMiddleware::new(inner, address)))
    }
}
