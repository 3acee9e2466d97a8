use std::{
    fmt::Write as _,
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use ethers::{
    types::{Address, H256, U256},
    utils::to_checksum,
};
use eyre::Result;
use serde::{Deserialize, Serialize};

use crate::constants::LEDGER_FILE_PREFIX;

/// A contract created by a deploy step. Never changed after it's recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedContract {
    /// The logical name other steps refer to it by
    pub name: String,
    /// The compiled contract it was created from
    pub contract: String,
    pub address: Address,
    pub deployer: Address,
    /// Constructor arguments as rendered for the console
    pub args: Vec<String>,
    pub gas_limit: U256,
    pub transaction_hash: H256,
}

/// An administrative transaction sent by a call step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationRecord {
    pub label: String,
    pub target: String,
    pub address: Address,
    pub method: String,
    pub args: Vec<String>,
    pub transaction_hash: H256,
}

/// Everything a deployment run has done so far, in order. Steps resolve
/// references against it, so a contract is only visible to the steps after
/// the one that deployed it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    pub network: String,
    pub chain_id: u64,
    pub contracts: Vec<DeployedContract>,
    pub configuration: Vec<ConfigurationRecord>,
}

impl Ledger {
    pub fn new(network: &str, chain_id: u64) -> Self {
        Self {
            network: network.to_string(),
            chain_id,
            ..Default::default()
        }
    }

    /// The address deployed under `name`, if it has been deployed.
    pub fn address_of(&self, name: &str) -> Option<Address> {
        self.contract(name).map(|contract| contract.address)
    }

    pub fn contract(&self, name: &str) -> Option<&DeployedContract> {
        self.contracts.iter().find(|contract| contract.name == name)
    }

    pub fn record_contract(&mut self, contract: DeployedContract) {
        self.contracts.push(contract);
    }

    pub fn record_configuration(&mut self, record: ConfigurationRecord) {
        self.configuration.push(record);
    }

    /// Writes the ledger to a new file in `dir` and returns its path. The
    /// file is named after the current time and never replaces an existing
    /// one, so the records of earlier runs survive a rerun.
    pub fn save_run<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        let mut attempt = 0;
        loop {
            let name = match attempt {
                0 => format!("{}-{}.json", LEDGER_FILE_PREFIX, timestamp),
                n => format!("{}-{}-{}.json", LEDGER_FILE_PREFIX, timestamp, n),
            };
            let path = dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(f) => {
                    serde_json::to_writer_pretty(f, self)?;
                    return Ok(path);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// A human-readable table of the deployed contracts.
    pub fn summary(&self) -> String {
        let width = self
            .contracts
            .iter()
            .map(|contract| contract.name.len())
            .max()
            .unwrap_or(0);
        let mut summary = format!(
            "{} contracts deployed on {} (chain id {})\n",
            self.contracts.len(),
            self.network,
            self.chain_id
        );
        for contract in &self.contracts {
            // Writing to a String can't fail.
            let _ = writeln!(
                summary,
                "  {:width$}  {}",
                contract.name,
                to_checksum(&contract.address, None),
                width = width
            );
        }
        summary
    }
}
