//! The proxy deployment orchestrator.
//!
//! A proxied deployment runs the states of [`DeployState`] in order: resolve the proxy factory,
//! deploy and confirm the implementation, encode the initializer, then have the factory create
//! the proxy and call the initializer in the same transaction. The proxy address is read back
//! from the factory's `Deployed` event.

use alloy_primitives::{Address, Bytes, TxHash};
use alloy_sol_types::{SolCall, SolEvent};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::{
    chain::{ChainRpc, Receipt},
    confirmer::ReceiptConfirmer,
    constants::{
        DETERMINISTIC_DEPLOYER_ADDRESS, FACTORY_CONTRACT_KEY, FACTORY_GAS_LIMIT, FACTORY_NAME,
        PROXY_GAS_LIMIT,
    },
    create2::{derive_salt, factory_salt_name, predict_create2_address},
    descriptors::ContractDescriptor,
    errors::ScriptError,
    solidity::IERC1967Factory,
    submitter::{within_deadline, FeePolicy, SigningIdentity, TransactionSubmitter},
    types::{DeployState, DeployedPair, InitParams},
};

/// Where the proxy factory comes from
#[derive(Clone, Debug)]
pub enum FactorySource {
    /// A factory already deployed at the given address
    Explicit(Address),
    /// The factory deployed through the deterministic deployment proxy, deploying it if absent
    Deterministic {
        /// The factory's creation bytecode
        init_code: Bytes,
        /// An optional suffix mixed into the salt, blank for none
        salt_suffix: String,
    },
}

/// Drives deployments for a single signing identity under a session deadline
pub struct Orchestrator<'a, C> {
    /// The chain deployed to
    chain: &'a C,
    /// The transaction submitter
    submitter: TransactionSubmitter<'a, C>,
    /// The receipt confirmer
    confirmer: ReceiptConfirmer<'a, C>,
    /// The session deadline
    deadline: Instant,
}

impl<'a, C: ChainRpc> Orchestrator<'a, C> {
    /// Create an orchestrator whose every network call must complete before `deadline`
    pub fn new(
        chain: &'a C,
        identity: SigningIdentity,
        fees: FeePolicy,
        deadline: Instant,
    ) -> Self {
        Self {
            chain,
            submitter: TransactionSubmitter::new(chain, identity, fees, deadline),
            confirmer: ReceiptConfirmer::new(chain),
            deadline,
        }
    }

    /// The deploying account
    pub fn deployer(&self) -> Address {
        self.submitter.address()
    }

    /// Resolve the proxy factory address.
    ///
    /// An explicit factory must hold code. A deterministic factory is reused if its predicted
    /// address holds code, and deployed through the deterministic deployment proxy otherwise.
    pub async fn resolve_factory(&self, source: &FactorySource) -> Result<Address, ScriptError> {
        log_step(FACTORY_CONTRACT_KEY, DeployState::ResolvingFactory);

        let (init_code, salt_suffix) = match source {
            FactorySource::Explicit(factory) => {
                if !self.has_code(*factory).await? {
                    return Err(ScriptError::CodeCheck(format!(
                        "factory address {factory:#x} has no code"
                    )));
                }

                info!(factory = %factory, "using explicit factory");
                return Ok(*factory);
            }
            FactorySource::Deterministic {
                init_code,
                salt_suffix,
            } => (init_code, salt_suffix),
        };

        let salt_name = factory_salt_name(FACTORY_NAME, salt_suffix);
        let salt = derive_salt(self.deployer(), &salt_name);
        let predicted = predict_create2_address(DETERMINISTIC_DEPLOYER_ADDRESS, salt, init_code);

        if self.has_code(predicted).await? {
            info!(
                factory = %predicted,
                salt_name = %salt_name,
                "factory already deployed, reusing"
            );
            return Ok(predicted);
        }

        if !self.has_code(DETERMINISTIC_DEPLOYER_ADDRESS).await? {
            return Err(ScriptError::CodeCheck(format!(
                "deterministic deployment proxy {DETERMINISTIC_DEPLOYER_ADDRESS:#x} has no code"
            )));
        }

        let result = self
            .submitter
            .deploy_deterministic(salt, init_code, FACTORY_GAS_LIMIT)
            .await?;
        let receipt = self.await_receipt(result.tx_hash).await?;
        if !receipt.success {
            return Err(ScriptError::DeploymentReverted {
                contract: FACTORY_CONTRACT_KEY.to_string(),
                step: DeployState::ResolvingFactory,
                tx_hash: receipt.tx_hash,
            });
        }

        info!(factory = %result.contract_address, tx_hash = %result.tx_hash, "deployed factory");
        Ok(result.contract_address)
    }

    /// Deploy `bytecode` as a plain contract and confirm it, returning its address
    pub async fn deploy_plain(
        &self,
        contract: &str,
        bytecode: Bytes,
        gas_limit: u64,
    ) -> Result<Address, ScriptError> {
        log_step(contract, DeployState::DeployingImplementation);
        let result = self.submitter.deploy_contract(bytecode, gas_limit).await?;

        log_step(contract, DeployState::AwaitingImplementationReceipt);
        let receipt = self.await_receipt(result.tx_hash).await?;
        if !receipt.success {
            return Err(ScriptError::DeploymentReverted {
                contract: contract.to_string(),
                step: DeployState::AwaitingImplementationReceipt,
                tx_hash: receipt.tx_hash,
            });
        }

        if let Some(created) = receipt.contract_address {
            if created != result.contract_address {
                warn!(
                    contract,
                    predicted = %result.contract_address,
                    created = %created,
                    "receipt reports a different contract address"
                );
            }
        }

        info!(contract, address = %result.contract_address, "contract deployed");
        Ok(result.contract_address)
    }

    /// Deploy the implementation of `descriptor`, then a proxy pointing at it created and
    /// initialized by `factory`.
    ///
    /// Any failure after the implementation is confirmed is a [`ScriptError::ProxyStep`]
    /// holding the implementation address, which remains usable.
    pub async fn deploy_proxied(
        &self,
        descriptor: &ContractDescriptor,
        bytecode: Bytes,
        params: &InitParams,
        factory: Address,
        admin: Address,
    ) -> Result<DeployedPair, ScriptError> {
        let contract = descriptor.key;
        let implementation = self
            .deploy_plain(contract, bytecode, descriptor.gas_limit)
            .await?;

        let proxy = self
            .deploy_proxy(descriptor, params, factory, implementation, admin)
            .await
            .map_err(|cause| ScriptError::ProxyStep {
                contract: contract.to_string(),
                implementation,
                cause: Box::new(cause),
            })?;

        log_step(contract, DeployState::Done);
        Ok(DeployedPair {
            implementation,
            proxy,
            factory,
        })
    }

    /// The proxy half of a proxied deployment
    async fn deploy_proxy(
        &self,
        descriptor: &ContractDescriptor,
        params: &InitParams,
        factory: Address,
        implementation: Address,
        admin: Address,
    ) -> Result<Address, ScriptError> {
        let contract = descriptor.key;

        log_step(contract, DeployState::EncodingInit);
        let init_data = (descriptor.encode_init)(params)?;

        log_step(contract, DeployState::DeployingProxy);
        let calldata = IERC1967Factory::deployAndCallCall {
            implementation,
            admin,
            data: init_data.into(),
        }
        .abi_encode();
        let tx_hash = self
            .submitter
            .invoke(factory, calldata.into(), PROXY_GAS_LIMIT)
            .await?;

        log_step(contract, DeployState::AwaitingProxyReceipt);
        let receipt = self.await_receipt(tx_hash).await?;
        if !receipt.success {
            return Err(ScriptError::DeploymentReverted {
                contract: contract.to_string(),
                step: DeployState::AwaitingProxyReceipt,
                tx_hash: receipt.tx_hash,
            });
        }

        log_step(contract, DeployState::ExtractingProxyAddress);
        let proxy = proxy_address_from_receipt(&receipt, factory).ok_or_else(|| {
            ScriptError::MissingEvent {
                contract: contract.to_string(),
                tx_hash: receipt.tx_hash,
            }
        })?;

        info!(contract, proxy = %proxy, implementation = %implementation, "proxy deployed");
        Ok(proxy)
    }

    /// Wait for a receipt under the session deadline
    async fn await_receipt(&self, tx_hash: TxHash) -> Result<Receipt, ScriptError> {
        self.confirmer.wait_for_receipt(tx_hash, self.deadline).await
    }

    /// Whether `address` holds contract code
    async fn has_code(&self, address: Address) -> Result<bool, ScriptError> {
        let code = within_deadline(self.deadline, "fetch code", self.chain.code_at(address)).await?;
        Ok(!code.is_empty())
    }
}

/// Finds the proxy address in the `Deployed` event emitted by `factory`
pub fn proxy_address_from_receipt(receipt: &Receipt, factory: Address) -> Option<Address> {
    receipt
        .logs
        .iter()
        .filter(|log| log.address == factory)
        .find_map(|log| IERC1967Factory::Deployed::decode_log(log, true).ok())
        .map(|event| event.data.proxy)
}

/// Logs entry into a deployment state
fn log_step(contract: &str, step: DeployState) {
    info!(contract, step = %step, "entering step");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy_primitives::{address, Log, B256};

    use super::*;
    use crate::{
        descriptors::{lookup, Target},
        test_helpers::{MockChain, TEST_CHAIN_ID, TEST_PRIVATE_KEY},
    };

    const ADMIN: Address = address!("00000000000000000000000000000000000000ad");

    fn identity() -> SigningIdentity {
        SigningIdentity::from_private_key(TEST_PRIVATE_KEY, TEST_CHAIN_ID).unwrap()
    }

    fn orchestrator(chain: &MockChain) -> Orchestrator<'_, MockChain> {
        Orchestrator::new(
            chain,
            identity(),
            FeePolicy::default(),
            Instant::now() + Duration::from_secs(600),
        )
    }

    fn deterministic() -> FactorySource {
        FactorySource::Deterministic {
            init_code: Bytes::from_static(b"factory code"),
            salt_suffix: String::new(),
        }
    }

    fn relative_quoter() -> &'static ContractDescriptor {
        match lookup("relativequoter").unwrap() {
            Target::Proxied(descriptor) => descriptor,
            other => panic!("unexpected target {other:?}"),
        }
    }

    fn owner_params() -> InitParams {
        InitParams {
            owner: identity().address(),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_factory_is_idempotent() -> eyre::Result<()> {
        let chain = MockChain::new(identity().address());
        let orchestrator = orchestrator(&chain);

        let first = orchestrator.resolve_factory(&deterministic()).await?;
        assert_eq!(chain.sent_transactions().len(), 1);
        assert!(!chain.code(first).is_empty());

        let second = orchestrator.resolve_factory(&deterministic()).await?;
        assert_eq!(first, second);
        assert_eq!(chain.sent_transactions().len(), 1);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_salt_suffix_changes_factory() -> eyre::Result<()> {
        let chain = MockChain::new(identity().address());
        let orchestrator = orchestrator(&chain);

        let plain = orchestrator.resolve_factory(&deterministic()).await?;
        let suffixed = orchestrator
            .resolve_factory(&FactorySource::Deterministic {
                init_code: Bytes::from_static(b"factory code"),
                salt_suffix: "v2".to_string(),
            })
            .await?;

        assert_ne!(plain, suffixed);
        assert_eq!(chain.sent_transactions().len(), 2);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_factory_without_code() {
        let chain = MockChain::new(identity().address());
        let factory = address!("00000000000000000000000000000000000000fa");

        let err = orchestrator(&chain)
            .resolve_factory(&FactorySource::Explicit(factory))
            .await
            .unwrap_err();

        assert!(matches!(err, ScriptError::CodeCheck(_)));
        assert!(chain.sent_transactions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_deterministic_deployer() {
        let chain = MockChain::new(identity().address());
        chain.remove_code(DETERMINISTIC_DEPLOYER_ADDRESS);

        let err = orchestrator(&chain)
            .resolve_factory(&deterministic())
            .await
            .unwrap_err();

        assert!(matches!(err, ScriptError::CodeCheck(_)));
        assert!(chain.sent_transactions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deploy_proxied() -> eyre::Result<()> {
        let chain = MockChain::new(identity().address());
        let orchestrator = orchestrator(&chain);
        let factory = orchestrator.resolve_factory(&deterministic()).await?;

        let pair = orchestrator
            .deploy_proxied(
                relative_quoter(),
                Bytes::from_static(b"quoter code"),
                &owner_params(),
                factory,
                ADMIN,
            )
            .await?;

        assert_eq!(pair.factory, factory);
        assert_eq!(pair.implementation, identity().address().create(1));
        assert_ne!(pair.proxy, pair.implementation);
        assert!(!chain.code(pair.proxy).is_empty());

        // Factory, implementation, proxy
        let sent = chain.sent_transactions();
        assert_eq!(sent.iter().map(|tx| tx.nonce).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(sent[2].to, Some(factory));

        let call = IERC1967Factory::deployAndCallCall::abi_decode(&sent[2].input, true)?;
        assert_eq!(call.implementation, pair.implementation);
        assert_eq!(call.admin, ADMIN);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_implementation_revert() {
        let chain = MockChain::new(identity().address());
        let orchestrator = orchestrator(&chain);
        let factory = orchestrator.resolve_factory(&deterministic()).await.unwrap();
        chain.revert_creations();

        let err = orchestrator
            .deploy_proxied(
                relative_quoter(),
                Bytes::from_static(b"quoter code"),
                &owner_params(),
                factory,
                ADMIN,
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ScriptError::DeploymentReverted {
                step: DeployState::AwaitingImplementationReceipt,
                ..
            }
        ));
        assert_eq!(chain.sent_transactions().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_proxy_revert_keeps_implementation() {
        let chain = MockChain::new(identity().address());
        let orchestrator = orchestrator(&chain);
        let factory = orchestrator.resolve_factory(&deterministic()).await.unwrap();
        chain.revert_proxy_deployments();

        let err = orchestrator
            .deploy_proxied(
                relative_quoter(),
                Bytes::from_static(b"quoter code"),
                &owner_params(),
                factory,
                ADMIN,
            )
            .await
            .unwrap_err();

        let ScriptError::ProxyStep { implementation, .. } = &err else {
            panic!("expected proxy step error, got {err}");
        };
        assert_eq!(*implementation, identity().address().create(1));
        assert!(!chain.code(*implementation).is_empty());
        assert!(matches!(
            err.root_cause(),
            ScriptError::DeploymentReverted {
                step: DeployState::AwaitingProxyReceipt,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_deployed_event() {
        let chain = MockChain::new(identity().address());
        let orchestrator = orchestrator(&chain);
        let factory = orchestrator.resolve_factory(&deterministic()).await.unwrap();
        chain.drop_deployed_events();

        let err = orchestrator
            .deploy_proxied(
                relative_quoter(),
                Bytes::from_static(b"quoter code"),
                &owner_params(),
                factory,
                ADMIN,
            )
            .await
            .unwrap_err();

        assert!(matches!(err.root_cause(), ScriptError::MissingEvent { .. }));
        assert!(matches!(err, ScriptError::ProxyStep { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_withheld_proxy_receipt_times_out() {
        let chain = MockChain::new(identity().address());
        let orchestrator = Orchestrator::new(
            &chain,
            identity(),
            FeePolicy::default(),
            Instant::now() + Duration::from_secs(30),
        );
        let factory = orchestrator.resolve_factory(&deterministic()).await.unwrap();
        let implementation = orchestrator
            .deploy_plain("relativequoter", Bytes::from_static(b"quoter code"), 1_000_000)
            .await
            .unwrap();
        chain.withhold_receipts();

        let err = orchestrator
            .deploy_proxy(relative_quoter(), &owner_params(), factory, implementation, ADMIN)
            .await
            .unwrap_err();

        assert!(matches!(err, ScriptError::Timeout(_)));
        assert_eq!(chain.sent_transactions().len(), 3);
    }

    #[test]
    fn test_deployed_event_from_other_address_is_ignored() {
        let factory = address!("00000000000000000000000000000000000000fa");
        let event = IERC1967Factory::Deployed {
            proxy: address!("00000000000000000000000000000000000000b1"),
            implementation: address!("00000000000000000000000000000000000000b2"),
            admin: ADMIN,
        };
        let mut receipt = Receipt {
            tx_hash: B256::ZERO,
            success: true,
            logs: vec![Log {
                address: address!("00000000000000000000000000000000000000ee"),
                data: event.encode_log_data(),
            }],
            contract_address: None,
        };
        assert_eq!(proxy_address_from_receipt(&receipt, factory), None);

        receipt.logs.push(Log {
            address: factory,
            data: event.encode_log_data(),
        });
        assert_eq!(proxy_address_from_receipt(&receipt, factory), Some(event.proxy));
    }
}
