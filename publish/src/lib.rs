//! Scripts for deploying contracts to an EVM chain behind ERC1967 proxies.
//!
//! A run deploys one logical contract: the proxy factory is resolved (or deployed
//! deterministically), the implementation is created, and the factory creates and initializes
//! a proxy pointing at it in a single transaction.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod chain;
pub mod cli;
mod commands;
pub mod confirmer;
pub mod constants;
pub mod create2;
pub mod descriptors;
pub mod errors;
pub mod orchestrator;
mod solidity;
pub mod submitter;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_helpers;
