//! An ordered deployment plan: contract creations interleaved with the
//! administrative calls and read-back checks that wire them together.

use std::collections::HashSet;

use ethers::{
    abi::Token,
    types::{Address, U256},
};
use lending_abi::ContractKind;

use crate::{errors::DeploymentError, ledger::Ledger};

/// A step argument.
#[derive(Clone, Debug, PartialEq)]
pub enum Arg {
    /// A literal value, passed verbatim
    Value(Token),
    /// The address of a contract deployed by an earlier step
    AddressOf(String),
    /// The deployer's own address
    Deployer,
}

impl Arg {
    pub fn uint(value: U256) -> Self {
        Arg::Value(Token::Uint(value))
    }

    pub fn address(address: Address) -> Self {
        Arg::Value(Token::Address(address))
    }

    pub fn string(value: &str) -> Self {
        Arg::Value(Token::String(value.to_string()))
    }

    pub fn bytes(value: Vec<u8>) -> Self {
        Arg::Value(Token::Bytes(value))
    }

    pub fn address_of(name: &str) -> Self {
        Arg::AddressOf(name.to_string())
    }

    /// The contract name this argument refers to, if any.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Arg::AddressOf(name) => Some(name),
            _ => None,
        }
    }

    /// Resolves the argument against the contracts deployed so far.
    pub fn resolve(
        &self,
        ledger: &Ledger,
        deployer: Address,
        step: &str,
    ) -> Result<Token, DeploymentError> {
        match self {
            Arg::Value(token) => Ok(token.clone()),
            Arg::Deployer => Ok(Token::Address(deployer)),
            Arg::AddressOf(name) => ledger
                .address_of(name)
                .map(Token::Address)
                .ok_or_else(|| DeploymentError::UnresolvedReference {
                    step: step.to_string(),
                    name: name.clone(),
                }),
        }
    }
}

/// Resolves a list of arguments, failing on the first unresolved reference.
pub fn resolve_args(
    args: &[Arg],
    ledger: &Ledger,
    deployer: Address,
    step: &str,
) -> Result<Vec<Token>, DeploymentError> {
    args.iter()
        .map(|arg| arg.resolve(ledger, deployer, step))
        .collect()
}

/// Creates a contract and records its address under `name`.
#[derive(Clone, Debug, PartialEq)]
pub struct DeployStep {
    pub name: String,
    pub contract: ContractKind,
    pub args: Vec<Arg>,
    pub gas_limit: Option<U256>,
}

/// Sends an administrative transaction to a deployed contract.
#[derive(Clone, Debug, PartialEq)]
pub struct CallStep {
    pub label: String,
    /// The logical name of the contract called
    pub target: String,
    /// The interface the call is encoded against. Calls through a proxy use
    /// the implementation's interface.
    pub interface: ContractKind,
    pub method: String,
    pub args: Vec<Arg>,
    pub gas_limit: Option<U256>,
}

/// Reads a value from a deployed contract and compares it to `expected`.
#[derive(Clone, Debug, PartialEq)]
pub struct AssertStep {
    pub label: String,
    pub target: String,
    pub interface: ContractKind,
    pub method: String,
    pub args: Vec<Arg>,
    pub expected: Arg,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Deploy(DeployStep),
    Call(CallStep),
    Assert(AssertStep),
}

impl Step {
    /// The step's name in logs and errors.
    pub fn label(&self) -> &str {
        match self {
            Step::Deploy(step) => &step.name,
            Step::Call(step) => &step.label,
            Step::Assert(step) => &step.label,
        }
    }

    /// Every contract name the step needs to have been deployed already.
    fn references(&self) -> Vec<&str> {
        let (target, args, expected) = match self {
            Step::Deploy(step) => (None, &step.args, None),
            Step::Call(step) => (Some(step.target.as_str()), &step.args, None),
            Step::Assert(step) => (Some(step.target.as_str()), &step.args, Some(&step.expected)),
        };
        target
            .into_iter()
            .chain(args.iter().filter_map(Arg::reference))
            .chain(expected.and_then(Arg::reference))
            .collect()
    }
}

/// An ordered list of steps. Every step gets the plan's gas ceiling.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeploymentPlan {
    steps: Vec<Step>,
    gas_limit: Option<U256>,
}

impl DeploymentPlan {
    pub fn new(gas_limit: Option<U256>) -> Self {
        Self {
            steps: vec![],
            gas_limit,
        }
    }

    pub fn deploy(mut self, name: &str, contract: ContractKind, args: Vec<Arg>) -> Self {
        self.steps.push(Step::Deploy(DeployStep {
            name: name.to_string(),
            contract,
            args,
            gas_limit: self.gas_limit,
        }));
        self
    }

    pub fn call(
        mut self,
        target: &str,
        interface: ContractKind,
        method: &str,
        args: Vec<Arg>,
    ) -> Self {
        self.steps.push(Step::Call(CallStep {
            label: format!("{}.{}", target, method),
            target: target.to_string(),
            interface,
            method: method.to_string(),
            args,
            gas_limit: self.gas_limit,
        }));
        self
    }

    pub fn assert(
        mut self,
        target: &str,
        interface: ContractKind,
        method: &str,
        args: Vec<Arg>,
        expected: Arg,
    ) -> Self {
        self.steps.push(Step::Assert(AssertStep {
            label: format!("{}.{}", target, method),
            target: target.to_string(),
            interface,
            method: method.to_string(),
            args,
            expected,
        }));
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The deploy steps, in order.
    pub fn deploy_steps(&self) -> impl Iterator<Item = &DeployStep> {
        self.steps.iter().filter_map(|step| match step {
            Step::Deploy(step) => Some(step),
            _ => None,
        })
    }

    /// Checks that logical names are unique and that every reference points
    /// at a contract deployed by an earlier step.
    pub fn validate(&self) -> Result<(), DeploymentError> {
        let mut deployed = HashSet::new();
        for step in &self.steps {
            for name in step.references() {
                if !deployed.contains(name) {
                    return Err(DeploymentError::UnresolvedReference {
                        step: step.label().to_string(),
                        name: name.to_string(),
                    });
                }
            }
            if let Step::Deploy(deploy) = step {
                if !deployed.insert(deploy.name.as_str()) {
                    return Err(DeploymentError::DuplicateName(deploy.name.clone()));
                }
            }
        }
        Ok(())
    }
}
