use std::path::PathBuf;

use ethers::types::{Address, U256};
use fixed_point_macros::uint256;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_DEPLOYMENTS_DIR, DEFAULT_GAS_LIMIT,
        DEFAULT_INSPECT_ADDRESS, DEFAULT_INSPECT_CONTROLLER, FEVM_BLOCKS_PER_YEAR,
    },
    errors::ConfigurationError,
};

fn deserialize_u256<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    let dec_string: String = Deserialize::deserialize(deserializer)?;
    let u256 = U256::from_dec_str(&dec_string).map_err(serde::de::Error::custom)?;
    Ok(u256)
}

/// `auto` lifts the ceiling and lets the node's estimate stand.
fn deserialize_gas_limit<'de, D>(deserializer: D) -> Result<Option<U256>, D::Error>
where
    D: Deserializer<'de>,
{
    let dec_string: String = Deserialize::deserialize(deserializer)?;
    if dec_string.eq_ignore_ascii_case("auto") {
        return Ok(None);
    }
    let u256 = U256::from_dec_str(&dec_string).map_err(serde::de::Error::custom)?;
    Ok(Some(u256))
}

fn deserialize_address<'de, D>(deserializer: D) -> Result<Address, D::Error>
where
    D: Deserializer<'de>,
{
    let string: String = Deserialize::deserialize(deserializer)?;
    string
        .trim()
        .parse::<Address>()
        .map_err(serde::de::Error::custom)
}

fn deserialize_maybe_address<'de, D>(deserializer: D) -> Result<Option<Address>, D::Error>
where
    D: Deserializer<'de>,
{
    let string: String = Deserialize::deserialize(deserializer)?;
    if string.trim().is_empty() {
        return Ok(None);
    }
    let address = string
        .trim()
        .parse::<Address>()
        .map_err(serde::de::Error::custom)?;
    Ok(Some(address))
}

/// The flavor of market listed by the deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketKind {
    /// A market for the chain's native token (FIL)
    Native,
    /// A delegated market for an ERC-20 token
    Erc20,
}

/// The parameters of a protocol deployment. Every field can be overridden
/// with a `LENDING_`-prefixed environment variable, e.g.
/// `LENDING_RESERVE_FACTOR=250000000000000000`. Values are passed to the
/// contracts verbatim.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct DeployConfig {
    // run configuration
    pub artifacts_dir: PathBuf,
    pub save_deployments: bool,
    pub deployments_dir: PathBuf,
    #[serde(deserialize_with = "deserialize_gas_limit")]
    pub gas_limit: Option<U256>,
    pub confirmations: usize,
    pub tx_timeout_secs: u64,
    // interest rate model configuration
    #[serde(deserialize_with = "deserialize_u256")]
    pub blocks_per_year: U256,
    #[serde(deserialize_with = "deserialize_u256")]
    pub base_rate_per_year: U256,
    #[serde(deserialize_with = "deserialize_u256")]
    pub multiplier_per_year: U256,
    #[serde(deserialize_with = "deserialize_u256")]
    pub jump_multiplier_per_year: U256,
    #[serde(deserialize_with = "deserialize_u256")]
    pub kink: U256,
    // comptroller configuration
    #[serde(deserialize_with = "deserialize_maybe_address")]
    pub price_oracle: Option<Address>,
    #[serde(deserialize_with = "deserialize_u256")]
    pub close_factor: U256,
    #[serde(deserialize_with = "deserialize_u256")]
    pub liquidation_incentive: U256,
    #[serde(deserialize_with = "deserialize_u256")]
    pub collateral_factor: U256,
    // market configuration
    pub market_kind: MarketKind,
    #[serde(deserialize_with = "deserialize_maybe_address")]
    pub underlying: Option<Address>,
    pub market_name: String,
    pub market_symbol: String,
    pub market_decimals: u8,
    #[serde(deserialize_with = "deserialize_u256")]
    pub initial_exchange_rate: U256,
    #[serde(deserialize_with = "deserialize_u256")]
    pub reserve_factor: U256,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            // run configuration
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            save_deployments: true,
            deployments_dir: PathBuf::from(DEFAULT_DEPLOYMENTS_DIR),
            gas_limit: Some(U256::from(DEFAULT_GAS_LIMIT)),
            confirmations: 1,
            tx_timeout_secs: 300,
            // interest rate model configuration
            blocks_per_year: U256::from(FEVM_BLOCKS_PER_YEAR),
            base_rate_per_year: uint256!(0.03e18),
            multiplier_per_year: uint256!(0.3e18),
            jump_multiplier_per_year: uint256!(5e18),
            kink: uint256!(0.95e18),
            // comptroller configuration
            price_oracle: None,
            close_factor: uint256!(0.5e18),
            liquidation_incentive: uint256!(1.08e18),
            collateral_factor: U256::zero(),
            // market configuration
            market_kind: MarketKind::Native,
            underlying: None,
            market_name: "Compound Filecoin".to_string(),
            market_symbol: "cFIL".to_string(),
            market_decimals: 8,
            initial_exchange_rate: uint256!(2e26),
            reserve_factor: uint256!(0.2e18),
        }
    }
}

impl DeployConfig {
    /// Reads the configuration from `LENDING_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        envy::prefixed("LENDING_")
            .from_env::<Self>()
            .map_err(|e| ConfigurationError::Environment(e.to_string()))
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed("LENDING_")
            .from_iter::<_, Self>(vars)
            .map_err(|e| ConfigurationError::Environment(e.to_string()))
    }

    /// Checks the settings that depend on each other.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.market_kind == MarketKind::Erc20 && self.underlying.is_none() {
            return Err(ConfigurationError::MissingSetting(
                "LENDING_UNDERLYING".to_string(),
            ));
        }
        if !self.collateral_factor.is_zero() && self.price_oracle.is_none() {
            return Err(ConfigurationError::MissingSetting(
                "LENDING_PRICE_ORACLE".to_string(),
            ));
        }
        Ok(())
    }
}

/// The target of the diagnostic reader, overridable with
/// `LENDING_INSPECT_ADDRESS` and `LENDING_INSPECT_CONTROLLER`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct InspectConfig {
    #[serde(deserialize_with = "deserialize_address")]
    pub address: Address,
    #[serde(deserialize_with = "deserialize_address")]
    pub controller: Address,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_INSPECT_ADDRESS,
            controller: DEFAULT_INSPECT_CONTROLLER,
        }
    }
}

impl InspectConfig {
    pub fn from_env() -> Result<Self, ConfigurationError> {
        envy::prefixed("LENDING_INSPECT_")
            .from_env::<Self>()
            .map_err(|e| ConfigurationError::Environment(e.to_string()))
    }
}
