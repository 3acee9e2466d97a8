use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use ethers::types::Bytes;
use lending_abi::ContractKind;
use serde_json::Value;
use tracing::debug;

use crate::{errors::DeploymentError, plan::DeploymentPlan};

#[derive(Clone, Debug)]
enum Source {
    Directory(PathBuf),
    Memory(HashMap<ContractKind, Bytes>),
}

/// Compiled contract bytecode, read from Hardhat or Foundry build output.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    source: Source,
}

impl ArtifactStore {
    /// Reads artifacts from `dir`. Both `<dir>/<Name>.json` and the nested
    /// `<dir>/<source>.sol/<Name>.json` layouts are found.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            source: Source::Directory(dir.as_ref().to_path_buf()),
        }
    }

    pub fn in_memory(bytecode: HashMap<ContractKind, Bytes>) -> Self {
        Self {
            source: Source::Memory(bytecode),
        }
    }

    /// The creation bytecode of `contract`.
    pub fn bytecode(&self, contract: ContractKind) -> Result<Bytes, DeploymentError> {
        let missing = |reason: String| DeploymentError::MissingArtifact { contract, reason };
        match &self.source {
            Source::Memory(bytecode) => bytecode
                .get(&contract)
                .cloned()
                .ok_or_else(|| missing("not loaded".to_string())),
            Source::Directory(dir) => {
                let path = find_artifact(dir, contract.name())
                    .ok_or_else(|| missing(format!("no artifact under {}", dir.display())))?;
                debug!(%contract, path = %path.display(), "loading artifact");
                let contents = fs::read_to_string(&path).map_err(|e| missing(e.to_string()))?;
                let artifact =
                    serde_json::from_str::<Value>(&contents).map_err(|e| missing(e.to_string()))?;
                parse_bytecode(&artifact).map_err(missing)
            }
        }
    }

    /// Loads the bytecode of every contract the plan deploys, so a missing
    /// artifact is reported before the first transaction.
    pub fn check(&self, plan: &DeploymentPlan) -> Result<(), DeploymentError> {
        for step in plan.deploy_steps() {
            self.bytecode(step.contract)?;
        }
        Ok(())
    }
}

fn find_artifact(dir: &Path, name: &str) -> Option<PathBuf> {
    let file = format!("{}.json", name);
    [
        dir.join(&file),
        dir.join(format!("{}.sol", name)).join(&file),
    ]
    .into_iter()
    .find(|path| path.is_file())
    .or_else(|| search(dir, &file))
}

/// Depth-first search for a file named `file`.
fn search(dir: &Path, file: &str) -> Option<PathBuf> {
    let mut entries = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .collect::<Vec<_>>();
    entries.sort();
    for path in entries {
        if path.is_dir() {
            if let Some(found) = search(&path, file) {
                return Some(found);
            }
        } else if path.file_name().and_then(|name| name.to_str()) == Some(file) {
            return Some(path);
        }
    }
    None
}

/// Extracts creation bytecode from a Hardhat (`"bytecode": "0x…"`) or
/// Foundry (`"bytecode": { "object": "0x…" }`) artifact.
fn parse_bytecode(artifact: &Value) -> Result<Bytes, String> {
    let hex = match &artifact["bytecode"] {
        Value::String(hex) => hex.as_str(),
        Value::Object(object) => object
            .get("object")
            .and_then(Value::as_str)
            .ok_or_else(|| "bytecode object has no `object` field".to_string())?,
        _ => return Err("artifact has no bytecode".to_string()),
    };
    if hex.contains("__") {
        return Err("bytecode has unlinked library references".to_string());
    }
    let bytecode = hex.parse::<Bytes>().map_err(|e| e.to_string())?;
    if bytecode.is_empty() {
        return Err("bytecode is empty; is the contract abstract?".to_string());
    }
    Ok(bytecode)
}
