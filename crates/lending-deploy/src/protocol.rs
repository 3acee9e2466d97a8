//! The standard deployment of the lending protocol: the comptroller behind
//! its proxy, a jump-rate interest-rate model, and one listed market.

use std::{collections::BTreeMap, path::Path};

use eyre::Result;
use lending_abi::ContractKind;
use lending_addresses::Addresses;
use tracing::{info, warn};

use crate::{
    config::{DeployConfig, MarketKind},
    constants::ADDRESSES_FILE,
    ledger::Ledger,
    plan::{Arg, DeploymentPlan},
};

pub const UNITROLLER: &str = "Unitroller";
pub const COMPTROLLER: &str = "Comptroller";
pub const INTEREST_RATE_MODEL: &str = "JumpRateModelV2";
pub const MARKET_IMPLEMENTATION: &str = "CErc20Delegate";

/// The interface of the market contract for `kind`.
fn market_interface(kind: MarketKind) -> ContractKind {
    match kind {
        MarketKind::Native => ContractKind::CEther,
        MarketKind::Erc20 => ContractKind::CErc20Delegator,
    }
}

/// Builds the deployment plan for `config`. The market is registered under
/// its symbol.
///
/// The proxy handoff comes before the market deployment because the
/// market's initializer checks the comptroller through the proxy.
pub fn protocol_plan(config: &DeployConfig) -> DeploymentPlan {
    let market = config.market_symbol.as_str();
    let market_interface = market_interface(config.market_kind);

    // comptroller and proxy
    let mut plan = DeploymentPlan::new(config.gas_limit)
        .deploy(UNITROLLER, ContractKind::Unitroller, vec![])
        .deploy(COMPTROLLER, ContractKind::Comptroller, vec![])
        .call(
            UNITROLLER,
            ContractKind::Unitroller,
            "_setPendingImplementation",
            vec![Arg::address_of(COMPTROLLER)],
        )
        .call(
            COMPTROLLER,
            ContractKind::Comptroller,
            "_become",
            vec![Arg::address_of(UNITROLLER)],
        )
        .assert(
            UNITROLLER,
            ContractKind::Unitroller,
            "comptrollerImplementation",
            vec![],
            Arg::address_of(COMPTROLLER),
        );

    // risk parameters, set through the proxy
    if let Some(oracle) = config.price_oracle {
        plan = plan.call(
            UNITROLLER,
            ContractKind::Comptroller,
            "_setPriceOracle",
            vec![Arg::address(oracle)],
        );
    }
    plan = plan
        .call(
            UNITROLLER,
            ContractKind::Comptroller,
            "_setCloseFactor",
            vec![Arg::uint(config.close_factor)],
        )
        .call(
            UNITROLLER,
            ContractKind::Comptroller,
            "_setLiquidationIncentive",
            vec![Arg::uint(config.liquidation_incentive)],
        );

    // interest rate model
    plan = plan.deploy(
        INTEREST_RATE_MODEL,
        ContractKind::JumpRateModelV2,
        vec![
            Arg::uint(config.blocks_per_year),
            Arg::uint(config.base_rate_per_year),
            Arg::uint(config.multiplier_per_year),
            Arg::uint(config.jump_multiplier_per_year),
            Arg::uint(config.kink),
            Arg::Deployer,
        ],
    );

    // market
    let market_args = vec![
        Arg::address_of(UNITROLLER),
        Arg::address_of(INTEREST_RATE_MODEL),
        Arg::uint(config.initial_exchange_rate),
        Arg::string(&config.market_name),
        Arg::string(&config.market_symbol),
        Arg::uint(config.market_decimals.into()),
        Arg::Deployer,
    ];
    plan = match (config.market_kind, config.underlying) {
        (MarketKind::Erc20, Some(underlying)) => {
            let mut args = vec![Arg::address(underlying)];
            args.extend(market_args);
            args.push(Arg::address_of(MARKET_IMPLEMENTATION));
            args.push(Arg::bytes(vec![]));
            plan.deploy(MARKET_IMPLEMENTATION, ContractKind::CErc20Delegate, vec![])
                .deploy(market, ContractKind::CErc20Delegator, args)
        }
        // `DeployConfig::validate` rejects an ERC-20 market without an
        // underlying token, so this is the native market.
        _ => plan.deploy(market, ContractKind::CEther, market_args),
    };
    plan = plan
        .call(
            market,
            market_interface,
            "_setInterestRateModel",
            vec![Arg::address_of(INTEREST_RATE_MODEL)],
        )
        .call(
            market,
            market_interface,
            "_setReserveFactor",
            vec![Arg::uint(config.reserve_factor)],
        )
        .assert(
            market,
            market_interface,
            "reserveFactorMantissa",
            vec![],
            Arg::uint(config.reserve_factor),
        )
        .call(
            UNITROLLER,
            ContractKind::Comptroller,
            "_supportMarket",
            vec![Arg::address_of(market)],
        );

    if config.price_oracle.is_some() && !config.collateral_factor.is_zero() {
        plan = plan.call(
            UNITROLLER,
            ContractKind::Comptroller,
            "_setCollateralFactor",
            vec![Arg::address_of(market), Arg::uint(config.collateral_factor)],
        );
    }

    plan
}

/// Summarizes a deployment made from `protocol_plan(config)`. Returns `None`
/// if the deployment didn't get far enough to have a market.
pub fn protocol_addresses(ledger: &Ledger, config: &DeployConfig) -> Option<Addresses> {
    let market = ledger.address_of(&config.market_symbol)?;
    Some(Addresses {
        unitroller: ledger.address_of(UNITROLLER)?,
        comptroller: ledger.address_of(COMPTROLLER)?,
        interest_rate_model: ledger.address_of(INTEREST_RATE_MODEL)?,
        markets: BTreeMap::from([(config.market_symbol.clone(), market)]),
    })
}

/// Writes a run's records to `dir`: a new ledger file and, once a market
/// exists, the address summary.
pub fn save_records(dir: &Path, ledger: &Ledger, config: &DeployConfig) -> Result<()> {
    let path = ledger.save_run(dir)?;
    info!(path = %path.display(), "saved ledger");
    match protocol_addresses(ledger, config) {
        Some(addresses) => addresses.save(dir.join(ADDRESSES_FILE))?,
        None => warn!("deployment is incomplete; not writing {}", ADDRESSES_FILE),
    }
    Ok(())
}
