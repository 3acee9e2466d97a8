use std::path::Path;

use ethers::abi::Abi;
use eyre::{eyre, Result};

/// Every schema the library embeds. A missing or malformed file fails the
/// build instead of surfacing as a decode error at deploy time.
const SCHEMAS: &[&str] = &[
    "CErc20Delegate",
    "CErc20Delegator",
    "CEther",
    "Comptroller",
    "JumpRateModelV2",
    "MinerSmartOwner",
    "Unitroller",
];

fn main() -> Result<()> {
    // Re-run this script whenever the build script itself or a schema changes.
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=abi/");

    let root = Path::new(std::env!("CARGO_MANIFEST_DIR")).join("abi");
    for name in SCHEMAS {
        let path = root.join(format!("{name}.json"));
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| eyre!("couldn't read schema {}: {}", path.display(), e))?;
        let abi: Abi = serde_json::from_str(&raw)
            .map_err(|e| eyre!("schema {} is not a valid ABI: {}", name, e))?;
        if abi.functions.is_empty() {
            return Err(eyre!("schema {} declares no functions", name));
        }
    }

    Ok(())
}
