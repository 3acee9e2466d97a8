use std::{collections::HashMap, fmt, time::Duration};

use ethers::{
    providers::{Http, Provider},
    signers::{coins_bip39::English, LocalWallet, MnemonicBuilder, Signer},
    types::Address,
};

use crate::{
    constants::{
        ACCOUNT_COUNT_VAR, CALIBRATION_CHAIN_ID, CALIBRATION_URL, DEFAULT_ACCOUNT_COUNT,
        DEFAULT_DEPLOYER_INDEX, DEFAULT_NETWORK, DEPLOYER_INDEX_VAR, DEV_MNEMONIC,
        FILECOIN_CHAIN_ID, FILECOIN_URL, LOCALHOST_URL, LOCAL_POLL_INTERVAL, NETWORK_VAR,
        REMOTE_POLL_INTERVAL,
    },
    errors::ConfigurationError,
};

/// The chain id anvil uses unless told otherwise.
const ANVIL_CHAIN_ID: u64 = 31_337;

/// Where a network's node lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// A JSON-RPC node reachable over HTTP
    Http(String),
    /// A throwaway anvil node spawned for the lifetime of the run
    SpawnAnvil,
}

/// Everything needed to talk to one named network. Built once at startup and
/// never mutated.
#[derive(Clone)]
pub struct NetworkProfile {
    pub name: String,
    pub endpoint: Endpoint,
    pub chain_id: Option<u64>,
    pub local: bool,
    pub poll_interval: Duration,
    accounts: Vec<LocalWallet>,
    deployer_index: usize,
}

impl NetworkProfile {
    /// The account used to send every deployment transaction.
    pub fn deployer(&self) -> &LocalWallet {
        // The resolver checks the index against the account list.
        &self.accounts[self.deployer_index]
    }
}

// Key material stays out of logs.
impl fmt::Debug for NetworkProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let addresses = self
            .accounts
            .iter()
            .map(|account| account.address())
            .collect::<Vec<Address>>();
        f.debug_struct("NetworkProfile")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("chain_id", &self.chain_id)
            .field("local", &self.local)
            .field("poll_interval", &self.poll_interval)
            .field("accounts", &addresses)
            .field("deployer_index", &self.deployer_index)
            .finish()
    }
}

/// Maps network names to profiles using a snapshot of the environment.
/// Resolution never touches the network.
#[derive(Clone, Default)]
pub struct NetworkResolver {
    vars: HashMap<String, String>,
}

// The snapshot holds mnemonics and private keys, so only names are shown.
impl fmt::Debug for NetworkResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.vars.keys().collect::<Vec<_>>();
        names.sort();
        f.debug_struct("NetworkResolver")
            .field("vars", &names)
            .finish()
    }
}

impl NetworkResolver {
    /// Snapshots the process environment.
    pub fn from_env() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn with_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// The network named by `LENDING_NETWORK`, or the default network.
    pub fn selected_network(&self) -> String {
        self.var(NETWORK_VAR)
            .unwrap_or(DEFAULT_NETWORK)
            .to_string()
    }

    pub fn resolve(&self, name: &str) -> Result<NetworkProfile, ConfigurationError> {
        let (endpoint, chain_id, local) = match name {
            "localhost" => (
                Endpoint::Http(
                    self.network_var("ETH_NODE_URI", name)
                        .unwrap_or(LOCALHOST_URL)
                        .to_string(),
                ),
                None,
                true,
            ),
            "anvil" => (Endpoint::SpawnAnvil, Some(ANVIL_CHAIN_ID), true),
            "fevmdev" => (
                Endpoint::Http(self.required_url(name)?.to_string()),
                None,
                false,
            ),
            "calibration" => (
                Endpoint::Http(
                    self.network_var("ETH_NODE_URI", name)
                        .unwrap_or(CALIBRATION_URL)
                        .to_string(),
                ),
                Some(CALIBRATION_CHAIN_ID),
                false,
            ),
            "filecoin" => (
                Endpoint::Http(
                    self.network_var("ETH_NODE_URI", name)
                        .unwrap_or(FILECOIN_URL)
                        .to_string(),
                ),
                Some(FILECOIN_CHAIN_ID),
                false,
            ),
            _ => return Err(ConfigurationError::UnknownNetwork(name.to_string())),
        };

        if let Endpoint::Http(url) = &endpoint {
            Provider::<Http>::try_from(url.as_str()).map_err(|e| {
                ConfigurationError::InvalidUrl {
                    network: name.to_string(),
                    reason: e.to_string(),
                }
            })?;
        }

        // The spawned node always runs with the development accounts.
        let accounts = match endpoint {
            Endpoint::SpawnAnvil => self.mnemonic_accounts(name, DEV_MNEMONIC)?,
            Endpoint::Http(_) => self.accounts(name, local)?,
        };

        let deployer_index = match self.var(DEPLOYER_INDEX_VAR) {
            Some(index) => index.parse::<usize>().map_err(|e| {
                ConfigurationError::Environment(format!("{}: {}", DEPLOYER_INDEX_VAR, e))
            })?,
            None => DEFAULT_DEPLOYER_INDEX,
        };
        if deployer_index >= accounts.len() {
            return Err(ConfigurationError::DeployerIndexOutOfRange {
                network: name.to_string(),
                index: deployer_index,
                accounts: accounts.len(),
            });
        }

        Ok(NetworkProfile {
            name: name.to_string(),
            endpoint,
            chain_id,
            local,
            poll_interval: if local {
                LOCAL_POLL_INTERVAL
            } else {
                REMOTE_POLL_INTERVAL
            },
            accounts,
            deployer_index,
        })
    }

    fn var(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Looks up `<PREFIX>_<NETWORK>` first and then `<PREFIX>`.
    fn network_var(&self, prefix: &str, network: &str) -> Option<&str> {
        self.var(&format!("{}_{}", prefix, network.to_uppercase()))
            .or_else(|| self.var(prefix))
    }

    fn required_url(&self, network: &str) -> Result<&str, ConfigurationError> {
        self.network_var("ETH_NODE_URI", network)
            .ok_or_else(|| ConfigurationError::MissingUrl {
                network: network.to_string(),
                variable: format!("ETH_NODE_URI_{}", network.to_uppercase()),
            })
    }

    fn accounts(&self, network: &str, local: bool) -> Result<Vec<LocalWallet>, ConfigurationError> {
        if let Some(mnemonic) = self.network_var("MNEMONIC", network) {
            return self.mnemonic_accounts(network, mnemonic);
        }
        if let Some(keys) = self.var(&format!("PRIVATE_KEYS_{}", network.to_uppercase())) {
            return keys
                .split(',')
                .map(|key| parse_private_key(network, key))
                .collect();
        }
        if let Some(key) = self.var("PRIVATE_KEY") {
            return Ok(vec![parse_private_key(network, key)?]);
        }
        if local {
            return self.mnemonic_accounts(network, DEV_MNEMONIC);
        }
        Err(ConfigurationError::MissingCredentials {
            network: network.to_string(),
        })
    }

    fn mnemonic_accounts(
        &self,
        network: &str,
        mnemonic: &str,
    ) -> Result<Vec<LocalWallet>, ConfigurationError> {
        let count = match self.var(ACCOUNT_COUNT_VAR) {
            Some(count) => count.parse::<usize>().map_err(|e| {
                ConfigurationError::Environment(format!("{}: {}", ACCOUNT_COUNT_VAR, e))
            })?,
            None => DEFAULT_ACCOUNT_COUNT,
        };
        let invalid = |reason: String| ConfigurationError::InvalidCredentials {
            network: network.to_string(),
            reason,
        };
        let mut accounts = Vec::with_capacity(count);
        let mut builder = MnemonicBuilder::<English>::default().phrase(mnemonic);
        for i in 0..count {
            builder = builder
                .index(i as u32)
                .map_err(|e| invalid(e.to_string()))?;
            accounts.push(builder.build().map_err(|e| invalid(e.to_string()))?);
        }
        Ok(accounts)
    }
}

fn parse_private_key(network: &str, key: &str) -> Result<LocalWallet, ConfigurationError> {
    // Never echo the key itself.
    key.trim()
        .parse::<LocalWallet>()
        .map_err(|_| ConfigurationError::InvalidCredentials {
            network: network.to_string(),
            reason: "malformed private key".to_string(),
        })
}
