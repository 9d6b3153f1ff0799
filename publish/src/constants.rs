//! Constants used in the publish scripts

use std::time::Duration;

use alloy_primitives::{address, Address};

/// The address of the deterministic deployment proxy present on most EVM chains.
///
/// Calldata sent to it is `salt ‖ init_code`, and it creates the contract with `CREATE2`.
/// See https://github.com/Arachnid/deterministic-deployment-proxy
pub const DETERMINISTIC_DEPLOYER_ADDRESS: Address =
    address!("4e59b44847b379578588920cA78FbF26c0B4956C");

/// The prefix byte of the `CREATE2` address preimage, as specified in EIP-1014
pub const CREATE2_PREFIX: u8 = 0xff;

/// The number of bytes in a `CREATE2` salt
pub const NUM_BYTES_SALT: usize = 32;

/// The number of bytes in a Solidity `bytes32` value
pub const NUM_BYTES_BYTES32: usize = 32;

/// The number of bytes in an Ethereum address
pub const NUM_BYTES_ADDRESS: usize = 20;

/// The gas limit used for the proxy factory's `deployAndCall`
pub const PROXY_GAS_LIMIT: u64 = 500_000;

/// The gas limit used when deploying the proxy factory
pub const FACTORY_GAS_LIMIT: u64 = 1_000_000;

/// The gas limit used when deploying the decimal quoter
pub const DECIMAL_QUOTER_GAS_LIMIT: u64 = 1_000_000;

/// The interval between two receipt polls
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// The default EIP-1559 fee cap, in wei
pub const DEFAULT_GAS_FEE_CAP: u128 = 2_000_000_000;

/// The default EIP-1559 priority fee cap, in wei
pub const DEFAULT_GAS_TIP_CAP: u128 = 1_000_000_000;

/// The default session timeout, in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 600;

/// The default directory holding the `<Artifact>.bin` creation bytecode files
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The extension of a creation bytecode file
pub const BYTECODE_EXTENSION: &str = "bin";

/// The canonical name of the proxy factory.
///
/// This is both its artifact name and the base of its deterministic salt.
pub const FACTORY_NAME: &str = "ERC1967Factory";

/// The separator placed between the factory name and the salt suffix
pub const SALT_SUFFIX_SEPARATOR: &str = ":";

/// The artifact name of the decimal quoter
pub const DECIMAL_QUOTER_NAME: &str = "DecimalQuoter";

/// The logical name of the proxy factory
pub const FACTORY_CONTRACT_KEY: &str = "erc1967factory";

/// The logical name of the decimal quoter
pub const DECIMAL_QUOTER_CONTRACT_KEY: &str = "decimalquoter";

/// The default log filter directive
pub const DEFAULT_LOG_LEVEL: &str = "warn";
