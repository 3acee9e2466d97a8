use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use ethers::{
    providers::{Middleware, PendingTransaction},
    types::{
        transaction::eip2718::TypedTransaction, Address, Bytes, Eip1559TransactionRequest,
        TransactionReceipt, H256, U256,
    },
};
use tokio::time::timeout;
use tracing::debug;

use crate::errors::TransactionError;

/// The result of a confirmed transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOutcome {
    pub transaction_hash: H256,
    /// Set for contract creations
    pub contract_address: Option<Address>,
    /// The gas limit the transaction was sent with
    pub gas_limit: U256,
    pub gas_used: Option<U256>,
}

/// Sends transactions and calls from a single account. Every transaction
/// is estimated first and refused if the estimate is above the ceiling,
/// then awaited until confirmed.
#[async_trait]
pub trait Transactor: Send + Sync {
    /// The account transactions are sent from.
    fn sender(&self) -> Address;

    /// Sends a contract creation transaction with the given init code.
    async fn create(
        &self,
        init_code: Bytes,
        gas_ceiling: Option<U256>,
    ) -> Result<TxOutcome, TransactionError>;

    /// Sends a transaction calling `to` with `calldata`.
    async fn send(
        &self,
        to: Address,
        calldata: Bytes,
        gas_ceiling: Option<U256>,
    ) -> Result<TxOutcome, TransactionError>;

    /// Runs `calldata` against `to` with `eth_call` from the sender and
    /// returns the raw result.
    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, TransactionError>;
}

/// A `Transactor` backed by an ethers middleware stack.
#[derive(Debug)]
pub struct EthersTransactor<M> {
    client: Arc<M>,
    sender: Address,
    confirmations: usize,
    timeout: Duration,
}

impl<M: Middleware + 'static> EthersTransactor<M> {
    pub fn new(client: Arc<M>, sender: Address, confirmations: usize, timeout: Duration) -> Self {
        Self {
            client,
            sender,
            confirmations,
            timeout,
        }
    }

    fn request(&self, to: Option<Address>, data: Bytes) -> TypedTransaction {
        let mut tx: TypedTransaction = Eip1559TransactionRequest::new()
            .from(self.sender)
            .data(data)
            .into();
        if let Some(to) = to {
            tx.set_to(to);
        }
        tx
    }

    async fn submit(
        &self,
        to: Option<Address>,
        data: Bytes,
        gas_ceiling: Option<U256>,
    ) -> Result<TxOutcome, TransactionError> {
        let mut tx = self.request(to, data);

        // A failed estimate means the transaction would revert, so nothing
        // is sent.
        let estimate = self
            .client
            .estimate_gas(&tx, None)
            .await
            .map_err(|e| TransactionError::Estimation(e.to_string()))?;
        let gas_limit = match gas_ceiling {
            Some(ceiling) if estimate > ceiling => {
                return Err(TransactionError::GasCeilingExceeded { estimate, ceiling })
            }
            Some(ceiling) => ceiling,
            None => estimate,
        };
        tx.set_gas(gas_limit);
        debug!(?to, %estimate, %gas_limit, "sending transaction");

        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .map_err(|e| TransactionError::Rpc(e.to_string()))?;
        let transaction_hash = *pending;
        let receipt = self.confirm(pending).await?;

        Ok(TxOutcome {
            transaction_hash,
            contract_address: receipt.contract_address,
            gas_limit,
            gas_used: receipt.gas_used,
        })
    }

    /// Waits for the configured number of confirmations and checks that the
    /// transaction succeeded.
    async fn confirm(
        &self,
        pending: PendingTransaction<'_, M::Provider>,
    ) -> Result<TransactionReceipt, TransactionError> {
        let transaction_hash = *pending;
        debug!(?transaction_hash, "waiting for confirmation");
        let receipt = timeout(self.timeout, pending.confirmations(self.confirmations))
            .await
            .map_err(|_| TransactionError::Timeout {
                transaction_hash,
                seconds: self.timeout.as_secs(),
            })?
            .map_err(|e| TransactionError::Rpc(e.to_string()))?
            .ok_or(TransactionError::Dropped { transaction_hash })?;
        if receipt.status != Some(1u64.into()) {
            return Err(TransactionError::Reverted {
                transaction_hash: Some(transaction_hash),
                reason: "receipt status is 0".to_string(),
            });
        }
        Ok(receipt)
    }
}

#[async_trait]
impl<M: Middleware + 'static> Transactor for EthersTransactor<M> {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn create(
        &self,
        init_code: Bytes,
        gas_ceiling: Option<U256>,
    ) -> Result<TxOutcome, TransactionError> {
        let outcome = self.submit(None, init_code, gas_ceiling).await?;
        if outcome.contract_address.is_none() {
            return Err(TransactionError::MissingContractAddress {
                transaction_hash: outcome.transaction_hash,
            });
        }
        Ok(outcome)
    }

    async fn send(
        &self,
        to: Address,
        calldata: Bytes,
        gas_ceiling: Option<U256>,
    ) -> Result<TxOutcome, TransactionError> {
        self.submit(Some(to), calldata, gas_ceiling).await
    }

    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, TransactionError> {
        let tx = self.request(Some(to), calldata);
        self.client
            .call(&tx, None)
            .await
            .map_err(|e| TransactionError::Reverted {
                transaction_hash: None,
                reason: e.to_string(),
            })
    }
}
