use lending_abi::{render_token, render_tokens};
use tracing::info;

use crate::{
    artifacts::ArtifactStore,
    chain::Transactor,
    errors::{DeploymentError, TransactionError},
    ledger::{DeployedContract, Ledger},
    plan::{resolve_args, DeployStep},
};

/// Executes contract creation steps, one at a time, from the deployer.
pub struct StepRunner<'a, T: ?Sized> {
    transactor: &'a T,
    artifacts: &'a ArtifactStore,
}

impl<'a, T: Transactor + ?Sized> StepRunner<'a, T> {
    pub fn new(transactor: &'a T, artifacts: &'a ArtifactStore) -> Self {
        Self {
            transactor,
            artifacts,
        }
    }

    /// Deploys the step's contract and records it in the ledger. Nothing is
    /// sent if an argument can't be resolved or encoded.
    pub async fn run(
        &self,
        step: &DeployStep,
        ledger: &mut Ledger,
    ) -> Result<DeployedContract, DeploymentError> {
        let deployer = self.transactor.sender();
        let args = resolve_args(&step.args, ledger, deployer, &step.name)?;
        let bytecode = self.artifacts.bytecode(step.contract)?;
        let init_code = step
            .contract
            .encode_constructor(&bytecode, &args)
            .map_err(|source| DeploymentError::Schema {
                step: step.name.clone(),
                source,
            })?;

        info!(
            name = %step.name,
            contract = %step.contract,
            args = %render_tokens(&args),
            "deploying"
        );
        let outcome = self
            .transactor
            .create(init_code, step.gas_limit)
            .await
            .map_err(|source| DeploymentError::Transaction {
                step: step.name.clone(),
                source,
            })?;
        let address = outcome.contract_address.ok_or_else(|| DeploymentError::Transaction {
            step: step.name.clone(),
            source: TransactionError::MissingContractAddress {
                transaction_hash: outcome.transaction_hash,
            },
        })?;

        let record = DeployedContract {
            name: step.name.clone(),
            contract: step.contract.name().to_string(),
            address,
            deployer,
            args: args.iter().map(render_token).collect(),
            gas_limit: outcome.gas_limit,
            transaction_hash: outcome.transaction_hash,
        };
        info!(
            name = %record.name,
            address = ?record.address,
            transaction_hash = ?record.transaction_hash,
            gas_used = ?outcome.gas_used,
            "deployed"
        );
        ledger.record_contract(record.clone());
        Ok(record)
    }
}
