use ethers::{
    abi::{Function, ParamType, Token},
    types::{Address, Bytes},
};
use lending_abi::{decode_output_strict, render_token, render_tokens, ContractKind};
use tracing::{debug, info};

use crate::{
    chain::Transactor,
    errors::DeploymentError,
    ledger::{ConfigurationRecord, Ledger},
    plan::{resolve_args, Arg, AssertStep, CallStep},
};

/// Sends administrative transactions to deployed contracts and checks the
/// values they leave behind.
pub struct Configurator<'a, T: ?Sized> {
    transactor: &'a T,
}

impl<'a, T: Transactor + ?Sized> Configurator<'a, T> {
    pub fn new(transactor: &'a T) -> Self {
        Self { transactor }
    }

    /// Sends the step's transaction. Admin functions that report failure
    /// with a `uint` error code instead of reverting are simulated first,
    /// and a non-zero code stops the step before anything is sent.
    pub async fn call(
        &self,
        step: &CallStep,
        ledger: &mut Ledger,
    ) -> Result<ConfigurationRecord, DeploymentError> {
        let (address, function, args, calldata) = self.prepare(
            &step.label,
            &step.target,
            step.interface,
            &step.method,
            &step.args,
            ledger,
        )?;

        if returns_error_code(&function) {
            let outputs = self.read(&step.label, address, &function, calldata.clone()).await?;
            if let Some(Token::Uint(code)) = outputs.first() {
                if !code.is_zero() {
                    return Err(DeploymentError::Rejected {
                        step: step.label.clone(),
                        code: *code,
                    });
                }
            }
            debug!(step = %step.label, "simulation returned no error");
        }

        info!(step = %step.label, args = %render_tokens(&args), "sending");
        let outcome = self
            .transactor
            .send(address, calldata, step.gas_limit)
            .await
            .map_err(|source| DeploymentError::Transaction {
                step: step.label.clone(),
                source,
            })?;

        let record = ConfigurationRecord {
            label: step.label.clone(),
            target: step.target.clone(),
            address,
            method: step.method.clone(),
            args: args.iter().map(render_token).collect(),
            transaction_hash: outcome.transaction_hash,
        };
        info!(
            step = %record.label,
            transaction_hash = ?record.transaction_hash,
            gas_used = ?outcome.gas_used,
            "confirmed"
        );
        ledger.record_configuration(record.clone());
        Ok(record)
    }

    /// Reads a value and fails if it isn't the expected one.
    pub async fn assert(&self, step: &AssertStep, ledger: &Ledger) -> Result<(), DeploymentError> {
        let (address, function, _, calldata) = self.prepare(
            &step.label,
            &step.target,
            step.interface,
            &step.method,
            &step.args,
            ledger,
        )?;
        let expected = step
            .expected
            .resolve(ledger, self.transactor.sender(), &step.label)?;

        let outputs = self.read(&step.label, address, &function, calldata).await?;
        if outputs.first() != Some(&expected) {
            return Err(DeploymentError::AssertionFailed {
                step: step.label.clone(),
                expected: render_token(&expected),
                actual: render_tokens(&outputs),
            });
        }
        info!(step = %step.label, value = %render_token(&expected), "verified");
        Ok(())
    }

    fn prepare(
        &self,
        label: &str,
        target: &str,
        interface: ContractKind,
        method: &str,
        args: &[Arg],
        ledger: &Ledger,
    ) -> Result<(Address, Function, Vec<Token>, Bytes), DeploymentError> {
        let address = ledger
            .address_of(target)
            .ok_or_else(|| DeploymentError::UnresolvedReference {
                step: label.to_string(),
                name: target.to_string(),
            })?;
        let args = resolve_args(args, ledger, self.transactor.sender(), label)?;
        let schema_error = |source| DeploymentError::Schema {
            step: label.to_string(),
            source,
        };
        let function = interface.function(method).map_err(schema_error)?;
        let calldata = interface.encode_call(method, &args).map_err(schema_error)?;
        Ok((address, function, args, calldata))
    }

    async fn read(
        &self,
        label: &str,
        address: Address,
        function: &Function,
        calldata: Bytes,
    ) -> Result<Vec<Token>, DeploymentError> {
        let data = self
            .transactor
            .call(address, calldata)
            .await
            .map_err(|source| DeploymentError::Transaction {
                step: label.to_string(),
                source,
            })?;
        decode_output_strict(function, &data).map_err(|source| DeploymentError::Schema {
            step: label.to_string(),
            source,
        })
    }
}

/// Whether `function` returns a single `uint256`, the error-code convention
/// of the protocol's admin functions.
fn returns_error_code(function: &Function) -> bool {
    function.name.starts_with('_')
        && function.outputs.len() == 1
        && function.outputs[0].kind == ParamType::Uint(256)
}
