//! An in-memory chain that mimics the admin surface of the lending
//! contracts closely enough to exercise deployment plans: the proxy
//! handoff, error-code returns, marker checks in constructors, and reverts.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use ethers::{
    abi::{self, Function, Token},
    types::{Address, Bytes, H256, U256},
    utils::get_contract_address,
};
use fixed_point_macros::uint256;
use lending_abi::ContractKind;

use super::{Transactor, TxOutcome};
use crate::{artifacts::ArtifactStore, errors::TransactionError};

const PREFIX: &str = "FAKE:";

const NO_ERROR: u64 = 0;
const UNAUTHORIZED: u64 = 1;
const BAD_INPUT: u64 = 2;
const INVALID_COLLATERAL_FACTOR: u64 = 6;
const MARKET_NOT_LISTED: u64 = 9;
const MARKET_ALREADY_LISTED: u64 = 10;
const PRICE_ERROR: u64 = 13;

/// The bytecode the fake chain accepts for `kind`.
pub(crate) fn fake_bytecode(kind: ContractKind) -> Bytes {
    Bytes::from(format!("{}{}:", PREFIX, kind.name()).into_bytes())
}

/// An artifact store with fake bytecode for every contract.
pub(crate) fn fake_artifacts() -> ArtifactStore {
    ArtifactStore::in_memory(
        ContractKind::ALL
            .into_iter()
            .map(|kind| (kind, fake_bytecode(kind)))
            .collect(),
    )
}

/// A mined transaction.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct FakeTx {
    pub to: Option<Address>,
    pub contract: ContractKind,
    /// `constructor` for creations
    pub method: String,
    pub args: Vec<Token>,
    pub gas_limit: U256,
}

#[derive(Clone, Debug, Default)]
struct ComptrollerStorage {
    admin: Address,
    oracle: Address,
    close_factor: U256,
    liquidation_incentive: U256,
    markets: Vec<Address>,
    collateral_factors: HashMap<Address, U256>,
}

#[derive(Clone, Debug)]
enum FakeContract {
    Unitroller {
        admin: Address,
        pending_implementation: Address,
        implementation: Address,
        storage: ComptrollerStorage,
    },
    Comptroller {
        storage: ComptrollerStorage,
    },
    RateModel {
        params: Vec<Token>,
    },
    Delegate,
    Market {
        kind: ContractKind,
        admin: Address,
        comptroller: Address,
        rate_model: Address,
        reserve_factor: U256,
        name: String,
        symbol: String,
        decimals: u8,
        exchange_rate: U256,
    },
}

impl FakeContract {
    fn kind(&self) -> ContractKind {
        match self {
            FakeContract::Unitroller { .. } => ContractKind::Unitroller,
            FakeContract::Comptroller { .. } => ContractKind::Comptroller,
            FakeContract::RateModel { .. } => ContractKind::JumpRateModelV2,
            FakeContract::Delegate => ContractKind::CErc20Delegate,
            FakeContract::Market { kind, .. } => *kind,
        }
    }

    /// The interfaces the contract answers to, in lookup order. The proxy
    /// forwards anything it doesn't know to its implementation.
    fn interfaces(&self) -> Vec<ContractKind> {
        match self {
            FakeContract::Unitroller { .. } => {
                vec![ContractKind::Unitroller, ContractKind::Comptroller]
            }
            other => vec![other.kind()],
        }
    }
}

#[derive(Clone, Debug, Default)]
struct State {
    contracts: HashMap<Address, FakeContract>,
    nonce: u64,
}

impl State {
    fn is_comptroller(&self, address: Address) -> bool {
        match self.contracts.get(&address) {
            Some(FakeContract::Comptroller { .. }) => true,
            // An empty proxy delegates to the zero address and returns nothing.
            Some(FakeContract::Unitroller { implementation, .. }) => !implementation.is_zero(),
            _ => false,
        }
    }

    fn is_rate_model(&self, address: Address) -> bool {
        matches!(self.contracts.get(&address), Some(FakeContract::RateModel { .. }))
    }

    fn is_market(&self, address: Address) -> bool {
        matches!(self.contracts.get(&address), Some(FakeContract::Market { .. }))
    }
}

struct Inner {
    state: State,
    transactions: Vec<FakeTx>,
    reverts: HashSet<String>,
    gas_estimate: U256,
    requests: usize,
}

pub(crate) struct FakeChain {
    sender: Address,
    inner: Mutex<Inner>,
}

impl FakeChain {
    pub fn new(sender: Address) -> Self {
        Self {
            sender,
            inner: Mutex::new(Inner {
                state: State::default(),
                transactions: vec![],
                reverts: HashSet::new(),
                gas_estimate: U256::from(1_000_000),
                requests: 0,
            }),
        }
    }

    /// Makes every transaction calling `method`, or creating the contract
    /// named `method`, get mined with a failure status.
    pub fn revert_on(&self, method: &str) {
        self.lock().reverts.insert(method.to_string());
    }

    pub fn set_gas_estimate(&self, estimate: U256) {
        self.lock().gas_estimate = estimate;
    }

    pub fn transactions(&self) -> Vec<FakeTx> {
        self.lock().transactions.clone()
    }

    /// The number of requests the chain has served.
    pub fn requests(&self) -> usize {
        self.lock().requests
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A panicking test poisons the lock; the state is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn mine(
        &self,
        inner: &mut Inner,
        gas_ceiling: Option<U256>,
        tx: FakeTx,
    ) -> Result<TxOutcome, TransactionError> {
        let estimate = inner.gas_estimate;
        let gas_limit = match gas_ceiling {
            Some(ceiling) if estimate > ceiling => {
                return Err(TransactionError::GasCeilingExceeded { estimate, ceiling })
            }
            Some(ceiling) => ceiling,
            None => estimate,
        };
        inner.state.nonce += 1;
        let transaction_hash = H256::from_low_u64_be(inner.state.nonce);
        let revert_key = match tx.to {
            Some(_) => tx.method.clone(),
            None => tx.contract.name().to_string(),
        };
        if inner.reverts.contains(&revert_key) {
            return Err(TransactionError::Reverted {
                transaction_hash: Some(transaction_hash),
                reason: "receipt status is 0".to_string(),
            });
        }
        inner.transactions.push(FakeTx { gas_limit, ..tx });
        Ok(TxOutcome {
            transaction_hash,
            contract_address: None,
            gas_limit,
            gas_used: Some(estimate),
        })
    }
}

#[async_trait]
impl Transactor for FakeChain {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn create(
        &self,
        init_code: Bytes,
        gas_ceiling: Option<U256>,
    ) -> Result<TxOutcome, TransactionError> {
        let mut inner = self.lock();
        inner.requests += 1;

        let (kind, args) = parse_init_code(&init_code).map_err(TransactionError::Estimation)?;
        let contract = construct(&inner.state, self.sender, kind, &args)
            .map_err(TransactionError::Estimation)?;
        let address = get_contract_address(self.sender, inner.state.nonce);

        let mut outcome = self.mine(
            &mut inner,
            gas_ceiling,
            FakeTx {
                to: None,
                contract: kind,
                method: "constructor".to_string(),
                args,
                gas_limit: U256::zero(),
            },
        )?;
        inner.state.contracts.insert(address, contract);
        outcome.contract_address = Some(address);
        Ok(outcome)
    }

    async fn send(
        &self,
        to: Address,
        calldata: Bytes,
        gas_ceiling: Option<U256>,
    ) -> Result<TxOutcome, TransactionError> {
        let mut inner = self.lock();
        inner.requests += 1;

        let mut state = inner.state.clone();
        let call = execute(&mut state, self.sender, to, &calldata).map_err(TransactionError::Estimation)?;
        let outcome = self.mine(
            &mut inner,
            gas_ceiling,
            FakeTx {
                to: Some(to),
                contract: call.contract,
                method: call.method,
                args: call.args,
                gas_limit: U256::zero(),
            },
        )?;
        // `mine` bumped the nonce on the live state.
        state.nonce = inner.state.nonce;
        inner.state = state;
        Ok(outcome)
    }

    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, TransactionError> {
        let mut inner = self.lock();
        inner.requests += 1;

        let mut state = inner.state.clone();
        let call = execute(&mut state, self.sender, to, &calldata).map_err(|reason| {
            TransactionError::Reverted {
                transaction_hash: None,
                reason,
            }
        })?;
        Ok(Bytes::from(abi::encode(&call.outputs)))
    }
}

struct Executed {
    contract: ContractKind,
    method: String,
    args: Vec<Token>,
    outputs: Vec<Token>,
}

fn parse_init_code(init_code: &[u8]) -> Result<(ContractKind, Vec<Token>), String> {
    let malformed = || "init code isn't fake bytecode".to_string();
    let rest = init_code
        .strip_prefix(PREFIX.as_bytes())
        .ok_or_else(malformed)?;
    let end = rest.iter().position(|b| *b == b':').ok_or_else(malformed)?;
    let name = std::str::from_utf8(&rest[..end]).map_err(|_| malformed())?;
    let kind = ContractKind::from_name(name).ok_or_else(malformed)?;
    let encoded = &rest[end + 1..];

    let abi = kind.abi().map_err(|e| e.to_string())?;
    let args = match abi.constructor() {
        Some(constructor) => {
            let types = constructor
                .inputs
                .iter()
                .map(|input| input.kind.clone())
                .collect::<Vec<_>>();
            abi::decode(&types, encoded).map_err(|e| e.to_string())?
        }
        None if encoded.is_empty() => vec![],
        None => return Err(format!("{} takes no constructor arguments", kind)),
    };
    Ok((kind, args))
}

fn construct(
    state: &State,
    sender: Address,
    kind: ContractKind,
    args: &[Token],
) -> Result<FakeContract, String> {
    let contract = match kind {
        ContractKind::Unitroller => FakeContract::Unitroller {
            admin: sender,
            pending_implementation: Address::zero(),
            implementation: Address::zero(),
            storage: ComptrollerStorage {
                admin: sender,
                ..Default::default()
            },
        },
        ContractKind::Comptroller => FakeContract::Comptroller {
            storage: ComptrollerStorage {
                admin: sender,
                ..Default::default()
            },
        },
        ContractKind::JumpRateModelV2 => FakeContract::RateModel {
            params: args.to_vec(),
        },
        ContractKind::CErc20Delegate => FakeContract::Delegate,
        ContractKind::CEther => market(state, kind, &args[0..7])?,
        ContractKind::CErc20Delegator => {
            if !matches!(
                state.contracts.get(&address_arg(args, 8)?),
                Some(FakeContract::Delegate)
            ) {
                return Err("implementation isn't a delegate".to_string());
            }
            market(state, kind, &args[1..8])?
        }
        ContractKind::MinerSmartOwner => {
            return Err("fake chain can't deploy MinerSmartOwner".to_string())
        }
    };
    Ok(contract)
}

/// Builds a market from `(comptroller, model, rate, name, symbol, decimals,
/// admin)`, running the checks of the market initializer.
fn market(state: &State, kind: ContractKind, args: &[Token]) -> Result<FakeContract, String> {
    let comptroller = address_arg(args, 0)?;
    let rate_model = address_arg(args, 1)?;
    let exchange_rate = uint_arg(args, 2)?;
    if exchange_rate.is_zero() {
        return Err("initial exchange rate must be greater than zero.".to_string());
    }
    if !state.is_comptroller(comptroller) {
        return Err("comptroller check failed".to_string());
    }
    if !state.is_rate_model(rate_model) {
        return Err("marker method returned false".to_string());
    }
    Ok(FakeContract::Market {
        kind,
        admin: address_arg(args, 6)?,
        comptroller,
        rate_model,
        reserve_factor: U256::zero(),
        name: string_arg(args, 3)?,
        symbol: string_arg(args, 4)?,
        decimals: uint_arg(args, 5)?.low_u32() as u8,
        exchange_rate,
    })
}

fn execute(
    state: &mut State,
    sender: Address,
    to: Address,
    calldata: &[u8],
) -> Result<Executed, String> {
    let contract = state
        .contracts
        .get(&to)
        .cloned()
        .ok_or_else(|| format!("no contract at {:?}", to))?;
    let (kind, function) = lookup(&contract, calldata)?;
    let args = function
        .decode_input(&calldata[4..])
        .map_err(|e| e.to_string())?;
    let method = function.name.as_str();

    let mut updated = contract.clone();
    let outputs = match &mut updated {
        FakeContract::Unitroller {
            admin,
            pending_implementation,
            implementation,
            storage,
        } => match method {
            "_setPendingImplementation" => {
                if sender != *admin {
                    code(UNAUTHORIZED)
                } else {
                    *pending_implementation = address_arg(&args, 0)?;
                    code(NO_ERROR)
                }
            }
            "_acceptImplementation" => {
                if sender != *pending_implementation || pending_implementation.is_zero() {
                    code(UNAUTHORIZED)
                } else {
                    *implementation = *pending_implementation;
                    *pending_implementation = Address::zero();
                    code(NO_ERROR)
                }
            }
            "admin" => vec![Token::Address(*admin)],
            "comptrollerImplementation" => vec![Token::Address(*implementation)],
            "pendingComptrollerImplementation" => vec![Token::Address(*pending_implementation)],
            _ if kind == ContractKind::Comptroller => {
                if implementation.is_zero() {
                    return Err("proxy has no implementation".to_string());
                }
                comptroller(state, storage, sender, method, &args)?
            }
            _ => return Err(format!("fake chain doesn't implement {}", method)),
        },
        FakeContract::Comptroller { storage } => match method {
            "_become" => {
                become_implementation(state, sender, to, address_arg(&args, 0)?)?;
                vec![]
            }
            _ => comptroller(state, storage, sender, method, &args)?,
        },
        FakeContract::RateModel { params } => rate_model(params, method)?,
        FakeContract::Market {
            admin,
            comptroller,
            rate_model,
            reserve_factor,
            name,
            symbol,
            decimals,
            exchange_rate,
            ..
        } => match method {
            "_setInterestRateModel" => {
                let model = address_arg(&args, 0)?;
                if sender != *admin {
                    code(UNAUTHORIZED)
                } else if !state.is_rate_model(model) {
                    return Err("marker method returned false".to_string());
                } else {
                    *rate_model = model;
                    code(NO_ERROR)
                }
            }
            "_setReserveFactor" => {
                let factor = uint_arg(&args, 0)?;
                if sender != *admin {
                    code(UNAUTHORIZED)
                } else if factor > uint256!(1e18) {
                    code(BAD_INPUT)
                } else {
                    *reserve_factor = factor;
                    code(NO_ERROR)
                }
            }
            "reserveFactorMantissa" => vec![Token::Uint(*reserve_factor)],
            "interestRateModel" => vec![Token::Address(*rate_model)],
            "comptroller" => vec![Token::Address(*comptroller)],
            "admin" => vec![Token::Address(*admin)],
            "name" => vec![Token::String(name.clone())],
            "symbol" => vec![Token::String(symbol.clone())],
            "decimals" => vec![Token::Uint(U256::from(*decimals))],
            "exchangeRateStored" => vec![Token::Uint(*exchange_rate)],
            "isCToken" => vec![Token::Bool(true)],
            _ => return Err(format!("fake chain doesn't implement {}", method)),
        },
        FakeContract::Delegate => return Err(format!("fake chain doesn't implement {}", method)),
    };

    // `_become` writes to the proxy, so the comptroller itself is unchanged.
    if method != "_become" {
        state.contracts.insert(to, updated);
    }

    Ok(Executed {
        contract: kind,
        method: method.to_string(),
        args,
        outputs,
    })
}

fn lookup(contract: &FakeContract, calldata: &[u8]) -> Result<(ContractKind, Function), String> {
    if calldata.len() < 4 {
        return Err("calldata has no selector".to_string());
    }
    for kind in contract.interfaces() {
        let abi = kind.abi().map_err(|e| e.to_string())?;
        if let Some(function) = abi
            .functions()
            .find(|function| function.short_signature()[..] == calldata[..4])
        {
            return Ok((kind, function.clone()));
        }
    }
    Err("unknown selector".to_string())
}

/// Hands the proxy over to the comptroller at `implementation`.
fn become_implementation(
    state: &mut State,
    sender: Address,
    implementation: Address,
    unitroller: Address,
) -> Result<(), String> {
    match state.contracts.get_mut(&unitroller) {
        Some(FakeContract::Unitroller {
            admin,
            pending_implementation,
            implementation: current,
            ..
        }) => {
            if sender != *admin {
                return Err("only unitroller admin can change brains".to_string());
            }
            if *pending_implementation != implementation || pending_implementation.is_zero() {
                return Err("change not authorized".to_string());
            }
            *current = implementation;
            *pending_implementation = Address::zero();
            Ok(())
        }
        _ => Err("target isn't a unitroller".to_string()),
    }
}

fn comptroller(
    state: &State,
    storage: &mut ComptrollerStorage,
    sender: Address,
    method: &str,
    args: &[Token],
) -> Result<Vec<Token>, String> {
    let is_admin = sender == storage.admin;
    let outputs = match method {
        "_setPriceOracle" if !is_admin => code(UNAUTHORIZED),
        "_setPriceOracle" => {
            storage.oracle = address_arg(args, 0)?;
            code(NO_ERROR)
        }
        "_setCloseFactor" if !is_admin => code(UNAUTHORIZED),
        "_setCloseFactor" => {
            storage.close_factor = uint_arg(args, 0)?;
            code(NO_ERROR)
        }
        "_setLiquidationIncentive" if !is_admin => code(UNAUTHORIZED),
        "_setLiquidationIncentive" => {
            storage.liquidation_incentive = uint_arg(args, 0)?;
            code(NO_ERROR)
        }
        "_supportMarket" if !is_admin => code(UNAUTHORIZED),
        "_supportMarket" => {
            let market = address_arg(args, 0)?;
            if storage.markets.contains(&market) {
                code(MARKET_ALREADY_LISTED)
            } else if !state.is_market(market) {
                return Err("not a cToken".to_string());
            } else {
                storage.markets.push(market);
                code(NO_ERROR)
            }
        }
        "_setCollateralFactor" if !is_admin => code(UNAUTHORIZED),
        "_setCollateralFactor" => {
            let market = address_arg(args, 0)?;
            let factor = uint_arg(args, 1)?;
            if !storage.markets.contains(&market) {
                code(MARKET_NOT_LISTED)
            } else if factor > uint256!(0.9e18) {
                code(INVALID_COLLATERAL_FACTOR)
            } else if storage.oracle.is_zero() {
                code(PRICE_ERROR)
            } else {
                storage.collateral_factors.insert(market, factor);
                code(NO_ERROR)
            }
        }
        "getAllMarkets" => vec![Token::Array(
            storage.markets.iter().copied().map(Token::Address).collect(),
        )],
        "oracle" => vec![Token::Address(storage.oracle)],
        "closeFactorMantissa" => vec![Token::Uint(storage.close_factor)],
        "liquidationIncentiveMantissa" => vec![Token::Uint(storage.liquidation_incentive)],
        "markets" => {
            let market = address_arg(args, 0)?;
            vec![
                Token::Bool(storage.markets.contains(&market)),
                Token::Uint(
                    storage
                        .collateral_factors
                        .get(&market)
                        .copied()
                        .unwrap_or_default(),
                ),
                Token::Bool(false),
            ]
        }
        "isComptroller" => vec![Token::Bool(true)],
        _ => return Err(format!("fake chain doesn't implement {}", method)),
    };
    Ok(outputs)
}

fn rate_model(params: &[Token], method: &str) -> Result<Vec<Token>, String> {
    let blocks_per_year = uint_arg(params, 0)?;
    let per_block = |value: U256| {
        value
            .checked_div(blocks_per_year)
            .ok_or_else(|| "division by zero".to_string())
    };
    let outputs = match method {
        "blocksPerYear" => vec![Token::Uint(blocks_per_year)],
        "baseRatePerBlock" => vec![Token::Uint(per_block(uint_arg(params, 1)?)?)],
        "multiplierPerBlock" => {
            let kink = uint_arg(params, 4)?;
            let scaled = uint_arg(params, 2)? * uint256!(1e18);
            let divisor = blocks_per_year * kink;
            vec![Token::Uint(
                scaled
                    .checked_div(divisor)
                    .ok_or_else(|| "division by zero".to_string())?,
            )]
        }
        "jumpMultiplierPerBlock" => vec![Token::Uint(per_block(uint_arg(params, 3)?)?)],
        "kink" => vec![Token::Uint(uint_arg(params, 4)?)],
        "owner" => vec![Token::Address(address_arg(params, 5)?)],
        "isInterestRateModel" => vec![Token::Bool(true)],
        _ => return Err(format!("fake chain doesn't implement {}", method)),
    };
    Ok(outputs)
}

fn code(code: u64) -> Vec<Token> {
    vec![Token::Uint(U256::from(code))]
}

fn address_arg(args: &[Token], index: usize) -> Result<Address, String> {
    args.get(index)
        .cloned()
        .and_then(Token::into_address)
        .ok_or_else(|| format!("argument {} isn't an address", index))
}

fn uint_arg(args: &[Token], index: usize) -> Result<U256, String> {
    args.get(index)
        .cloned()
        .and_then(Token::into_uint)
        .ok_or_else(|| format!("argument {} isn't a uint", index))
}

fn string_arg(args: &[Token], index: usize) -> Result<String, String> {
    args.get(index)
        .cloned()
        .and_then(Token::into_string)
        .ok_or_else(|| format!("argument {} isn't a string", index))
}

#[cfg(test)]
mod tests {
    use eyre::Result;

    use super::*;

    fn init_code(kind: ContractKind, args: &[Token]) -> Result<Bytes> {
        Ok(kind.encode_constructor(&fake_bytecode(kind), args)?)
    }

    #[tokio::test]
    async fn test_proxy_handoff() -> Result<()> {
        let deployer = Address::repeat_byte(0xde);
        let chain = FakeChain::new(deployer);

        let unitroller = chain
            .create(init_code(ContractKind::Unitroller, &[])?, None)
            .await?
            .contract_address
            .unwrap();
        let comptroller = chain
            .create(init_code(ContractKind::Comptroller, &[])?, None)
            .await?
            .contract_address
            .unwrap();

        // The proxy refuses comptroller calls until it has an implementation.
        let is_comptroller = ContractKind::Comptroller.encode_call("isComptroller", &[])?;
        assert!(chain.call(unitroller, is_comptroller.clone()).await.is_err());

        chain
            .send(
                unitroller,
                ContractKind::Unitroller
                    .encode_call("_setPendingImplementation", &[Token::Address(comptroller)])?,
                None,
            )
            .await?;
        let become_call =
            ContractKind::Comptroller.encode_call("_become", &[Token::Address(unitroller)])?;
        chain.send(comptroller, become_call.clone(), None).await?;

        let implementation = chain
            .call(
                unitroller,
                ContractKind::Unitroller.encode_call("comptrollerImplementation", &[])?,
            )
            .await?;
        assert_eq!(
            abi::decode(&[abi::ParamType::Address], &implementation)?,
            vec![Token::Address(comptroller)]
        );
        chain.call(unitroller, is_comptroller).await?;

        // Accepting clears the pending implementation, so a replay reverts.
        let err = chain.send(comptroller, become_call, None).await.unwrap_err();
        assert!(matches!(err, TransactionError::Estimation(reason) if reason == "change not authorized"));

        Ok(())
    }

    #[tokio::test]
    async fn test_error_codes() -> Result<()> {
        let chain = FakeChain::new(Address::repeat_byte(0xde));
        let comptroller = chain
            .create(init_code(ContractKind::Comptroller, &[])?, None)
            .await?
            .contract_address
            .unwrap();

        let result = chain
            .call(
                comptroller,
                ContractKind::Comptroller.encode_call(
                    "_setCollateralFactor",
                    &[Token::Address(Address::repeat_byte(1)), Token::Uint(U256::one())],
                )?,
            )
            .await?;
        assert_eq!(U256::from_big_endian(&result), U256::from(MARKET_NOT_LISTED));
        Ok(())
    }

    #[tokio::test]
    async fn test_gas_and_injected_reverts() -> Result<()> {
        let chain = FakeChain::new(Address::repeat_byte(0xde));
        chain.set_gas_estimate(U256::from(6_000_000));
        let err = chain
            .create(init_code(ContractKind::Unitroller, &[])?, Some(U256::from(5_000_000)))
            .await
            .unwrap_err();
        assert!(matches!(err, TransactionError::GasCeilingExceeded { .. }));

        chain.set_gas_estimate(U256::from(1_000_000));
        chain.revert_on("Unitroller");
        let err = chain
            .create(init_code(ContractKind::Unitroller, &[])?, Some(U256::from(5_000_000)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransactionError::Reverted {
                transaction_hash: Some(_),
                ..
            }
        ));
        assert!(chain.transactions().is_empty());
        assert_eq!(chain.requests(), 2);

        Ok(())
    }
}
