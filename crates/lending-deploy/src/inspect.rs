//! Read-only diagnostics: `eth_call`s against deployed contracts, decoded
//! with the shared interface schemas.

use std::{
    fmt::{self, Display},
    sync::Arc,
};

use ethers::{
    abi::Token,
    providers::Middleware,
    types::{transaction::eip2718::TypedTransaction, Address, TransactionRequest},
};
use lending_abi::{decode_output_strict, render_tokens, ContractKind};
use lending_addresses::Addresses;
use tracing::debug;

use crate::errors::DecodeError;

/// A view method to call, with its arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct Probe {
    pub method: String,
    pub args: Vec<Token>,
}

impl Probe {
    pub fn new(method: &str) -> Self {
        Self {
            method: method.to_string(),
            args: vec![],
        }
    }

    pub fn with_args(method: &str, args: Vec<Token>) -> Self {
        Self {
            method: method.to_string(),
            args,
        }
    }
}

/// The decoded return values of a probe.
#[derive(Clone, Debug, PartialEq)]
pub struct Reading {
    pub method: String,
    pub values: Vec<Token>,
}

impl Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.method, render_tokens(&self.values))
    }
}

/// Reads view methods of one contract.
pub struct DiagnosticReader<M> {
    client: Arc<M>,
    kind: ContractKind,
    address: Address,
}

impl<M: Middleware> DiagnosticReader<M> {
    pub fn new(client: Arc<M>, kind: ContractKind, address: Address) -> Self {
        Self {
            client,
            kind,
            address,
        }
    }

    pub async fn read(&self, probe: &Probe) -> Result<Reading, DecodeError> {
        let function = self.kind.function(&probe.method)?;
        let calldata = self.kind.encode_call(&probe.method, &probe.args)?;
        let tx: TypedTransaction = TransactionRequest::new()
            .to(self.address)
            .data(calldata)
            .into();
        debug!(contract = %self.kind, address = ?self.address, method = %probe.method, "eth_call");
        let data = self
            .client
            .call(&tx, None)
            .await
            .map_err(|e| DecodeError::Call {
                method: probe.method.clone(),
                reason: e.to_string(),
            })?;
        let values = decode_output_strict(&function, &data).map_err(|source| {
            DecodeError::Decode {
                method: probe.method.clone(),
                source,
            }
        })?;
        Ok(Reading {
            method: probe.method.clone(),
            values,
        })
    }

    /// Runs the probes in order. The first failure aborts the sequence.
    pub async fn read_all(&self, probes: &[Probe]) -> Result<Vec<Reading>, DecodeError> {
        let mut readings = Vec::with_capacity(probes.len());
        for probe in probes {
            readings.push(self.read(probe).await?);
        }
        Ok(readings)
    }
}

/// The probes of the miner smart-owner diagnostic. `controller` is the
/// address checked with `isControllingAddress`.
pub fn miner_probes(controller: Address) -> Vec<Probe> {
    vec![
        Probe::new("getSectorSize"),
        Probe::new("getAvailableBalance"),
        Probe::new("getBeneficiary"),
        Probe::new("getPeerId"),
        Probe::new("getMultiaddresses"),
        Probe::with_args("isControllingAddress", vec![Token::Address(controller)]),
        Probe::new("getMinerOwner"),
    ]
}

/// One contract to read for the protocol status report.
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    pub label: String,
    pub kind: ContractKind,
    pub address: Address,
    pub probes: Vec<Probe>,
}

/// The reads that show how a deployment is wired: the proxy's
/// implementation, the listed markets, and each market's rate model and
/// reserve factor.
pub fn protocol_targets(addresses: &Addresses) -> Vec<Target> {
    let mut targets = vec![
        Target {
            label: "Unitroller".to_string(),
            kind: ContractKind::Unitroller,
            address: addresses.unitroller,
            probes: vec![Probe::new("comptrollerImplementation")],
        },
        Target {
            label: "Unitroller (as Comptroller)".to_string(),
            kind: ContractKind::Comptroller,
            address: addresses.unitroller,
            probes: vec![Probe::new("getAllMarkets")],
        },
    ];
    // Both market kinds expose the same getters.
    targets.extend(addresses.markets.iter().map(|(symbol, address)| Target {
        label: symbol.clone(),
        kind: ContractKind::CEther,
        address: *address,
        probes: vec![
            Probe::new("interestRateModel"),
            Probe::new("reserveFactorMantissa"),
        ],
    }));
    targets
}
