use std::{collections::BTreeMap, fs::File, path::Path};

use ethers::types::Address;
use eyre::Result;
use serde::{Deserialize, Serialize};

/// The addresses of a deployed lending protocol instance. All comptroller
/// calls go through `unitroller`; `comptroller` is the implementation
/// behind it.
#[derive(Default, Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Addresses {
    pub unitroller: Address,
    pub comptroller: Address,
    pub interest_rate_model: Address,
    /// Market symbol to market address.
    pub markets: BTreeMap<String, Address>,
}

impl Addresses {
    /// Reads addresses from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = File::open(path)?;
        Ok(serde_json::from_reader(f)?)
    }

    /// Writes addresses to a JSON file, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let f = File::create(path)?;
        serde_json::to_writer_pretty(f, self)?;
        Ok(())
    }
}
