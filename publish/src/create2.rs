//! Deterministic contract address derivation.
//!
//! Everything here is pure: the same inputs always give the same address, which is what lets
//! a re-run skip deploying a factory that already exists.

use alloy_primitives::{keccak256, Address, Keccak256, B256};

use crate::constants::{CREATE2_PREFIX, NUM_BYTES_ADDRESS, SALT_SUFFIX_SEPARATOR};

/// Computes the address a `CREATE2` deployment of `init_code` through `factory` lands at.
///
/// `keccak256(0xff ‖ factory ‖ salt ‖ keccak256(init_code))[12..]`, as in EIP-1014
pub fn predict_create2_address(factory: Address, salt: B256, init_code: &[u8]) -> Address {
    let init_code_hash = keccak256(init_code);

    let mut hasher = Keccak256::new();
    hasher.update([CREATE2_PREFIX]);
    hasher.update(factory);
    hasher.update(salt);
    hasher.update(init_code_hash);
    let digest = hasher.finalize();

    Address::from_slice(&digest[digest.len() - NUM_BYTES_ADDRESS..])
}

/// Computes the address of a plain contract creation from `sender` at `nonce`
pub fn predict_create_address(sender: Address, nonce: u64) -> Address {
    sender.create(nonce)
}

/// Derives the salt for `name` deployed by `deployer`: `keccak256(deployer ‖ name)`
pub fn derive_salt(deployer: Address, name: &str) -> B256 {
    let mut hasher = Keccak256::new();
    hasher.update(deployer);
    hasher.update(name.as_bytes());
    hasher.finalize()
}

/// The name a factory salt is derived from: the canonical name, plus `:suffix` if one is given
pub fn factory_salt_name(canonical: &str, suffix: &str) -> String {
    let suffix = suffix.trim();
    if suffix.is_empty() {
        canonical.to_string()
    } else {
        format!("{canonical}{SALT_SUFFIX_SEPARATOR}{suffix}")
    }
}
