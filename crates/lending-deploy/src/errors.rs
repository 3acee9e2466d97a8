//! Definitions of the errors that abort a deployment or diagnostic run

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use ethers::types::{H256, U256};
use lending_abi::{ContractKind, SchemaError};

/// Bad or missing network configuration. Always raised before any
/// transaction is sent.
#[derive(Debug)]
pub enum ConfigurationError {
    /// The network name isn't one of the known networks
    UnknownNetwork(String),
    /// No RPC URL is configured for the network
    MissingUrl { network: String, variable: String },
    /// The RPC URL doesn't parse
    InvalidUrl { network: String, reason: String },
    /// No mnemonic or private key is configured for a non-local network
    MissingCredentials { network: String },
    /// A mnemonic or private key doesn't parse
    InvalidCredentials { network: String, reason: String },
    /// The deployer index is past the end of the derived accounts
    DeployerIndexOutOfRange {
        network: String,
        index: usize,
        accounts: usize,
    },
    /// The node reports a chain id other than the network's
    ChainIdMismatch {
        network: String,
        expected: u64,
        actual: u64,
    },
    /// The node couldn't be reached
    Connection { network: String, reason: String },
    /// A setting is required by the selected options but isn't set
    MissingSetting(String),
    /// An environment variable couldn't be deserialized
    Environment(String),
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::UnknownNetwork(name) => write!(f, "unknown network `{}`", name),
            ConfigurationError::MissingUrl { network, variable } => {
                write!(f, "no RPC URL for `{}`: set {}", network, variable)
            }
            ConfigurationError::InvalidUrl { network, reason } => {
                write!(f, "invalid RPC URL for `{}`: {}", network, reason)
            }
            ConfigurationError::MissingCredentials { network } => {
                write!(f, "no mnemonic or private key configured for `{}`", network)
            }
            ConfigurationError::InvalidCredentials { network, reason } => {
                write!(f, "invalid credentials for `{}`: {}", network, reason)
            }
            ConfigurationError::DeployerIndexOutOfRange {
                network,
                index,
                accounts,
            } => write!(
                f,
                "deployer index {} is out of range: `{}` has {} accounts",
                index, network, accounts
            ),
            ConfigurationError::ChainIdMismatch {
                network,
                expected,
                actual,
            } => write!(
                f,
                "`{}` expects chain id {} but the node reports {}",
                network, expected, actual
            ),
            ConfigurationError::Connection { network, reason } => {
                write!(f, "couldn't connect to `{}`: {}", network, reason)
            }
            ConfigurationError::MissingSetting(variable) => {
                write!(f, "missing required setting {}", variable)
            }
            ConfigurationError::Environment(reason) => {
                write!(f, "error reading environment: {}", reason)
            }
        }
    }
}

impl Error for ConfigurationError {}

/// Failures of a single submitted transaction.
#[derive(Debug)]
pub enum TransactionError {
    /// Gas estimation failed, which on these contracts means the call reverts
    Estimation(String),
    /// The estimate is above the step's gas ceiling
    GasCeilingExceeded { estimate: U256, ceiling: U256 },
    /// The node rejected the transaction or a request failed
    Rpc(String),
    /// The transaction was mined with a failure status
    Reverted {
        transaction_hash: Option<H256>,
        reason: String,
    },
    /// The transaction disappeared from the mempool
    Dropped { transaction_hash: H256 },
    /// No confirmation arrived within the timeout
    Timeout {
        transaction_hash: H256,
        seconds: u64,
    },
    /// A creation transaction's receipt has no contract address
    MissingContractAddress { transaction_hash: H256 },
}

impl Display for TransactionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TransactionError::Estimation(reason) => write!(f, "gas estimation failed: {}", reason),
            TransactionError::GasCeilingExceeded { estimate, ceiling } => write!(
                f,
                "estimated gas {} exceeds the ceiling of {}",
                estimate, ceiling
            ),
            TransactionError::Rpc(reason) => write!(f, "rpc error: {}", reason),
            TransactionError::Reverted {
                transaction_hash: Some(hash),
                reason,
            } => write!(f, "transaction {:?} reverted: {}", hash, reason),
            TransactionError::Reverted {
                transaction_hash: None,
                reason,
            } => write!(f, "call reverted: {}", reason),
            TransactionError::Dropped { transaction_hash } => {
                write!(f, "transaction {:?} was dropped", transaction_hash)
            }
            TransactionError::Timeout {
                transaction_hash,
                seconds,
            } => write!(
                f,
                "transaction {:?} wasn't confirmed within {}s",
                transaction_hash, seconds
            ),
            TransactionError::MissingContractAddress { transaction_hash } => write!(
                f,
                "receipt of {:?} has no contract address",
                transaction_hash
            ),
        }
    }
}

impl Error for TransactionError {}

/// Failures of the deployment sequence. Each one halts the remaining steps;
/// anything deployed before it stays live.
#[derive(Debug)]
pub enum DeploymentError {
    /// Two deploy steps share a logical name
    DuplicateName(String),
    /// A step references a contract that no earlier step deploys
    UnresolvedReference { step: String, name: String },
    /// The compiled bytecode of a contract couldn't be loaded
    MissingArtifact {
        contract: ContractKind,
        reason: String,
    },
    /// The step's arguments don't fit the contract's interface
    Schema { step: String, source: SchemaError },
    /// The step's transaction failed
    Transaction {
        step: String,
        source: TransactionError,
    },
    /// The contract reported a non-zero error code for an admin call
    Rejected { step: String, code: U256 },
    /// A read-back didn't return the expected value
    AssertionFailed {
        step: String,
        expected: String,
        actual: String,
    },
}

impl Display for DeploymentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentError::DuplicateName(name) => {
                write!(f, "`{}` is deployed by more than one step", name)
            }
            DeploymentError::UnresolvedReference { step, name } => write!(
                f,
                "step `{}` references `{}` before it is deployed",
                step, name
            ),
            DeploymentError::MissingArtifact { contract, reason } => {
                write!(f, "no bytecode for {}: {}", contract, reason)
            }
            DeploymentError::Schema { step, source } => write!(f, "step `{}`: {}", step, source),
            DeploymentError::Transaction { step, source } => {
                write!(f, "step `{}`: {}", step, source)
            }
            DeploymentError::Rejected { step, code } => {
                write!(f, "step `{}` was rejected with error code {}", step, code)
            }
            DeploymentError::AssertionFailed {
                step,
                expected,
                actual,
            } => write!(
                f,
                "check `{}` failed: expected {}, found {}",
                step, expected, actual
            ),
        }
    }
}

impl Error for DeploymentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DeploymentError::Schema { source, .. } => Some(source),
            DeploymentError::Transaction { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Failures of a read-only diagnostic call.
#[derive(Debug)]
pub enum DecodeError {
    /// The probe doesn't fit the interface description
    Schema(SchemaError),
    /// The `eth_call` itself failed
    Call { method: String, reason: String },
    /// The result doesn't decode per the interface description
    Decode { method: String, source: SchemaError },
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Schema(source) => write!(f, "{}", source),
            DecodeError::Call { method, reason } => {
                write!(f, "call to `{}` failed: {}", method, reason)
            }
            DecodeError::Decode { source, .. } => write!(f, "{}", source),
        }
    }
}

impl From<SchemaError> for DecodeError {
    fn from(source: SchemaError) -> Self {
        DecodeError::Schema(source)
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DecodeError::Schema(source) | DecodeError::Decode { source, .. } => Some(source),
            DecodeError::Call { .. } => None,
        }
    }
}
