//! Utilities for the publish scripts

use std::{fs, path::Path, str::FromStr};

use alloy_primitives::{Address, Bytes, B256};
use tracing_subscriber::EnvFilter;

use crate::{
    constants::{BYTECODE_EXTENSION, NUM_BYTES_BYTES32},
    errors::ScriptError,
};

/// Sets up the global `tracing` subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over `default_directive` when set.
pub fn init_logging(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Splits a comma separated list, trimming entries and dropping empty ones
pub fn split_csv(input: &str) -> Vec<&str> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parses a comma separated list of hex addresses
pub fn parse_address_list(input: &str) -> Result<Vec<Address>, ScriptError> {
    split_csv(input)
        .into_iter()
        .enumerate()
        .map(|(i, part)| {
            Address::from_str(part)
                .map_err(|e| ScriptError::Input(format!("address[{i}] {part:?}: {e}")))
        })
        .collect()
}

/// Parses a comma separated list of decimal `u32` values
pub fn parse_u32_list(input: &str) -> Result<Vec<u32>, ScriptError> {
    split_csv(input)
        .into_iter()
        .enumerate()
        .map(|(i, part)| {
            part.parse::<u32>()
                .map_err(|e| ScriptError::Input(format!("allocation[{i}] {part:?}: {e}")))
        })
        .collect()
}

/// Right pads the UTF-8 bytes of `value` to a `bytes32`
pub fn to_bytes32(value: &str) -> Result<B256, ScriptError> {
    let bytes = value.as_bytes();
    if bytes.len() > NUM_BYTES_BYTES32 {
        return Err(ScriptError::Input(format!(
            "{value:?} is {} bytes, a bytes32 holds at most {NUM_BYTES_BYTES32}",
            bytes.len()
        )));
    }

    let mut padded = B256::ZERO;
    padded[..bytes.len()].copy_from_slice(bytes);
    Ok(padded)
}

/// Right pads every entry of a comma separated list to a `bytes32`
pub fn parse_bytes32_list(input: &str) -> Result<Vec<B256>, ScriptError> {
    split_csv(input).into_iter().map(to_bytes32).collect()
}

/// Reads the creation bytecode of `artifact` from `<dir>/<artifact>.bin`.
///
/// The file holds hex, with or without a `0x` prefix.
pub fn read_bytecode(dir: &Path, artifact: &str) -> Result<Bytes, ScriptError> {
    let path = dir.join(artifact).with_extension(BYTECODE_EXTENSION);
    let contents = fs::read_to_string(&path)
        .map_err(|e| ScriptError::ArtifactParsing(format!("read {}: {e}", path.display())))?;

    let trimmed = contents.trim();
    let hex_str = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytecode = hex::decode(hex_str)
        .map_err(|e| ScriptError::ArtifactParsing(format!("decode {}: {e}", path.display())))?;

    if bytecode.is_empty() {
        return Err(ScriptError::ArtifactParsing(format!(
            "{} holds no bytecode",
            path.display()
        )));
    }

    Ok(bytecode.into())
}
