use std::time::Duration;

use ethers::types::{Address, H160};

/// The network used when `LENDING_NETWORK` is unset.
pub const DEFAULT_NETWORK: &str = "fevmdev";

/// The environment variable selecting the network.
pub const NETWORK_VAR: &str = "LENDING_NETWORK";

/// The environment variable overriding how many accounts a mnemonic derives.
pub const ACCOUNT_COUNT_VAR: &str = "LENDING_ACCOUNT_COUNT";

/// The number of accounts derived from a mnemonic by default.
pub const DEFAULT_ACCOUNT_COUNT: usize = 10;

/// The well-known development mnemonic. Only ever used for local networks.
pub const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// The RPC URL of a node running on the local machine.
pub const LOCALHOST_URL: &str = "http://127.0.0.1:8545";

/// The public Glif endpoint for the Filecoin calibration testnet.
pub const CALIBRATION_URL: &str = "https://api.calibration.node.glif.io/rpc/v1";

/// The chain id of the Filecoin calibration testnet.
pub const CALIBRATION_CHAIN_ID: u64 = 314_159;

/// The public Glif endpoint for Filecoin mainnet.
pub const FILECOIN_URL: &str = "https://api.node.glif.io/rpc/v1";

/// The chain id of Filecoin mainnet.
pub const FILECOIN_CHAIN_ID: u64 = 314;

/// Polling interval for nodes on the local machine.
pub const LOCAL_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Polling interval for remote FEVM nodes. Filecoin epochs are 30 seconds.
pub const REMOTE_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// The environment variable overriding which account deploys.
pub const DEPLOYER_INDEX_VAR: &str = "LENDING_DEPLOYER_INDEX";

/// The index of the deployer among the network's accounts.
pub const DEFAULT_DEPLOYER_INDEX: usize = 1;

/// The gas ceiling applied to every step unless overridden.
pub const DEFAULT_GAS_LIMIT: u64 = 5_000_000;

/// Blocks per year on FEVM (30 second epochs).
pub const FEVM_BLOCKS_PER_YEAR: u64 = 1_051_200;

/// The directory compiled contract artifacts are read from.
pub const DEFAULT_ARTIFACTS_DIR: &str = "./artifacts";

/// The directory deployment records are written to, one subdirectory per
/// network.
pub const DEFAULT_DEPLOYMENTS_DIR: &str = "./deployments";

/// Each run writes its ledger to `<prefix>-<unix seconds>.json`.
pub const LEDGER_FILE_PREFIX: &str = "ledger";

/// The file name of the address summary.
pub const ADDRESSES_FILE: &str = "addresses.json";

/// The miner smart-owner contract inspected by default,
/// `0x0331718Ef5150841a4AfA6d7870E5d77CD2c743A`.
pub const DEFAULT_INSPECT_ADDRESS: Address = H160([
    0x03, 0x31, 0x71, 0x8e, 0xf5, 0x15, 0x08, 0x41, 0xa4, 0xaf, 0xa6, 0xd7, 0x87, 0x0e, 0x5d, 0x77,
    0xcd, 0x2c, 0x74, 0x3a,
]);

/// The address checked by `isControllingAddress` by default,
/// `0x399f514132cb1DBF8169bE9ead39c33555A1F00c`.
pub const DEFAULT_INSPECT_CONTROLLER: Address = H160([
    0x39, 0x9f, 0x51, 0x41, 0x32, 0xcb, 0x1d, 0xbf, 0x81, 0x69, 0xbe, 0x9e, 0xad, 0x39, 0xc3, 0x35,
    0x55, 0xa1, 0xf0, 0x0c,
]);
