//! The interface schemas of the lending protocol contracts.
//!
//! Every entry point (deployment, configuration, diagnostics) encodes and
//! decodes through the JSON ABI files in `abi/`, so there is exactly one
//! description of each contract's callable surface in the repository.

mod error;
mod render;

use std::fmt::{self, Display};

use ethers::{
    abi::{self, Abi, Function, Token},
    types::Bytes,
};

pub use error::SchemaError;
pub use render::{render_token, render_tokens};

/// The contracts this tooling knows how to deploy or talk to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContractKind {
    /// The comptroller proxy
    Unitroller,
    /// The comptroller implementation
    Comptroller,
    /// The jump-rate interest-rate model
    JumpRateModelV2,
    /// The ERC-20 market implementation
    CErc20Delegate,
    /// The ERC-20 market proxy
    CErc20Delegator,
    /// The native-token (FIL) market
    CEther,
    /// The miner smart-owner contract read by the diagnostics
    MinerSmartOwner,
}

impl ContractKind {
    pub const ALL: [ContractKind; 7] = [
        ContractKind::Unitroller,
        ContractKind::Comptroller,
        ContractKind::JumpRateModelV2,
        ContractKind::CErc20Delegate,
        ContractKind::CErc20Delegator,
        ContractKind::CEther,
        ContractKind::MinerSmartOwner,
    ];

    /// The contract name, which is also the name of its compiled artifact.
    pub fn name(&self) -> &'static str {
        match self {
            ContractKind::Unitroller => "Unitroller",
            ContractKind::Comptroller => "Comptroller",
            ContractKind::JumpRateModelV2 => "JumpRateModelV2",
            ContractKind::CErc20Delegate => "CErc20Delegate",
            ContractKind::CErc20Delegator => "CErc20Delegator",
            ContractKind::CEther => "CEther",
            ContractKind::MinerSmartOwner => "MinerSmartOwner",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    fn schema(&self) -> &'static str {
        match self {
            ContractKind::Unitroller => include_str!("../abi/Unitroller.json"),
            ContractKind::Comptroller => include_str!("../abi/Comptroller.json"),
            ContractKind::JumpRateModelV2 => include_str!("../abi/JumpRateModelV2.json"),
            ContractKind::CErc20Delegate => include_str!("../abi/CErc20Delegate.json"),
            ContractKind::CErc20Delegator => include_str!("../abi/CErc20Delegator.json"),
            ContractKind::CEther => include_str!("../abi/CEther.json"),
            ContractKind::MinerSmartOwner => include_str!("../abi/MinerSmartOwner.json"),
        }
    }

    /// Parses the contract's ABI.
    pub fn abi(&self) -> Result<Abi, SchemaError> {
        serde_json::from_str(self.schema()).map_err(|e| SchemaError::Malformed {
            kind: *self,
            reason: e.to_string(),
        })
    }

    /// Looks up a function by name.
    pub fn function(&self, method: &str) -> Result<Function, SchemaError> {
        self.abi()?
            .function(method)
            .cloned()
            .map_err(|_| SchemaError::UnknownMethod {
                kind: *self,
                method: method.to_string(),
            })
    }

    /// Builds the init code for a creation transaction: the bytecode
    /// followed by the ABI-encoded constructor arguments.
    pub fn encode_constructor(&self, bytecode: &[u8], args: &[Token]) -> Result<Bytes, SchemaError> {
        let abi = self.abi()?;
        match abi.constructor() {
            Some(constructor) => constructor
                .encode_input(bytecode.to_vec(), args)
                .map(Bytes::from)
                .map_err(|e| SchemaError::Encode {
                    kind: *self,
                    method: "constructor".to_string(),
                    reason: e.to_string(),
                }),
            None if args.is_empty() => Ok(Bytes::from(bytecode.to_vec())),
            None => Err(SchemaError::NoConstructor { kind: *self }),
        }
    }

    /// Builds the calldata for a call to `method`.
    pub fn encode_call(&self, method: &str, args: &[Token]) -> Result<Bytes, SchemaError> {
        self.function(method)?
            .encode_input(args)
            .map(Bytes::from)
            .map_err(|e| SchemaError::Encode {
                kind: *self,
                method: method.to_string(),
                reason: e.to_string(),
            })
    }
}

impl Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decodes the return data of `function`, rejecting data that isn't the
/// canonical encoding of what was decoded. The plain decoder accepts
/// trailing data and reads past mismatched offsets, which turns an
/// interface mismatch into silently wrong values.
pub fn decode_output_strict(function: &Function, data: &[u8]) -> Result<Vec<Token>, SchemaError> {
    let tokens = function
        .decode_output(data)
        .map_err(|e| SchemaError::Decode {
            method: function.name.clone(),
            reason: e.to_string(),
        })?;
    let reencoded = abi::encode(&tokens);
    if reencoded != data {
        return Err(SchemaError::NonCanonical {
            method: function.name.clone(),
            expected_len: reencoded.len(),
            actual_len: data.len(),
        });
    }
    Ok(tokens)
}
