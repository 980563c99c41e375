//! Implementation of the one-shot deployment pipeline.
//!
//! The pipeline is a strict sequence: fetch the L2 tip, compose genesis,
//! deploy the ledger, the treasury, and the challenge module behind its
//! proxy, then wire the cross-references. Every stage consumes an output of
//! the previous one, so each blocks on confirmation before the next runs and
//! any failure before wiring completes aborts the run with no rollback.

use alloy::{
    primitives::Address,
    providers::{DynProvider, Provider},
    sol_types::{SolCall, SolConstructor},
};
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

use crate::{
    cli::Cli,
    constants::{
        CANONICAL_STATE_CHAIN_KEY, CHALLENGE_IMPL_KEY, CHALLENGE_PROXY_KEY, TREASURY_KEY,
    },
    errors::ScriptError,
    genesis::{compose_genesis, fetch_latest_block},
    solidity::{CanonicalStateChain, Challenge, CoreProxy},
    types::{DeploymentRecord, DeploymentReport, SettlementContract, Stage},
    utils::{self, send_call},
    verify::{ensure_matching_args, VerificationClient},
};

/// Run the full deployment pipeline against the given signer-bound client
pub async fn run(cli: &Cli, client: &DynProvider) -> Result<DeploymentReport, ScriptError> {
    let chain_id = client
        .get_chain_id()
        .await
        .map_err(|e| ScriptError::Provider(e.to_string()))?;
    let owner = utils::derive_address(&cli.owner_key)?;
    let publisher = utils::derive_address(&cli.publisher_key)?;

    info!(
        network = %cli.network,
        chain_id,
        owner = %format!("{owner:#x}"),
        publisher = %format!("{publisher:#x}"),
        da_oracle = %format!("{:#x}", cli.da_oracle),
        "starting settlement stack deployment"
    );

    let mut report = DeploymentReport {
        chain_id,
        ..Default::default()
    };

    let l2 = utils::l2_client(&cli.l2_rpc_url)?;
    let tip = fetch_latest_block(&l2).await?;
    report.commit(Stage::ChainStateFetched, vec![]);
    info!(number = %tip.number, "fetched latest L2 block");

    let genesis = compose_genesis(&tip)?;
    report.commit(Stage::GenesisComposed, vec![]);
    info!(l2_height = genesis.l2Height, "genesis header composed");

    info!("deploying CanonicalStateChain");
    let chain_args = CanonicalStateChain::constructorCall {
        publisher,
        header: genesis,
    }
    .abi_encode();
    let chain_address =
        utils::deploy_contract(client, SettlementContract::CanonicalStateChain, &chain_args)
            .await?;
    report.records.push(DeploymentRecord {
        contract: SettlementContract::CanonicalStateChain,
        address: chain_address,
        constructor_args: chain_args,
    });
    report.commit(
        Stage::LedgerDeployed,
        vec![(CANONICAL_STATE_CHAIN_KEY, chain_address)],
    );
    info!(address = %format!("{chain_address:#x}"), "CanonicalStateChain deployed");

    info!("deploying Treasury");
    let treasury_address =
        utils::deploy_contract(client, SettlementContract::Treasury, &[]).await?;
    report.records.push(DeploymentRecord {
        contract: SettlementContract::Treasury,
        address: treasury_address,
        constructor_args: Vec::new(),
    });
    report.commit(Stage::TreasuryDeployed, vec![(TREASURY_KEY, treasury_address)]);
    info!(address = %format!("{treasury_address:#x}"), "Treasury deployed");

    let (proxy_address, implementation_address) = deploy_challenge_proxy(
        client,
        treasury_address,
        chain_address,
        cli.da_oracle,
        &mut report,
    )
    .await?;
    report.commit(
        Stage::ChallengeProxyDeployed,
        vec![
            (CHALLENGE_PROXY_KEY, proxy_address),
            (CHALLENGE_IMPL_KEY, implementation_address),
        ],
    );
    info!(
        proxy = %format!("{proxy_address:#x}"),
        implementation = %format!("{implementation_address:#x}"),
        "Challenge deployed behind proxy"
    );

    wire_contracts(client, proxy_address, chain_address, publisher).await?;
    report.commit(Stage::Wired, vec![]);
    info!("all contracts deployed and wired");

    // Manifest and verification are advisory: neither alters the on-chain
    // outcome, so neither may fail the run.
    if let Err(e) = utils::write_deployment_manifest(&cli.deployments_path, &report) {
        warn!(error = %e, "failed to write deployment manifest");
    }

    verify_deployments(cli, &report).await;
    report.commit(Stage::Verified, vec![]);

    Ok(report)
}

/// Deploy the challenge implementation, then the proxy whose constructor
/// records the implementation address and executes the initializer calldata
/// in the same transaction, so the proxy is never live uninitialized.
async fn deploy_challenge_proxy(
    client: &DynProvider,
    treasury: Address,
    chain: Address,
    da_oracle: Address,
    report: &mut DeploymentReport,
) -> Result<(Address, Address), ScriptError> {
    info!("deploying Challenge implementation");
    let implementation =
        utils::deploy_contract(client, SettlementContract::Challenge, &[]).await?;
    report.records.push(DeploymentRecord {
        contract: SettlementContract::Challenge,
        address: implementation,
        constructor_args: Vec::new(),
    });

    let init_data = challenge_initialize_calldata(treasury, chain, da_oracle, Address::ZERO);
    let proxy_args = CoreProxy::constructorCall {
        implementation,
        data: init_data.into(),
    }
    .abi_encode();

    info!("deploying CoreProxy");
    let proxy = utils::deploy_contract(client, SettlementContract::CoreProxy, &proxy_args).await?;
    report.records.push(DeploymentRecord {
        contract: SettlementContract::CoreProxy,
        address: proxy,
        constructor_args: proxy_args,
    });

    Ok((proxy, implementation))
}

/// Issue the post-deploy wiring calls, in fixed order: the challenge module's
/// defender first, then the ledger's challenge-contract reference.
///
/// Each call is an independent transaction with its own confirmation wait. A
/// failure of the second call after the first committed leaves the system
/// partially wired; committed links are never rolled back.
async fn wire_contracts(
    client: &DynProvider,
    proxy: Address,
    chain: Address,
    publisher: Address,
) -> Result<(), ScriptError> {
    let challenge = Challenge::new(proxy, client.clone());
    send_call(challenge.setDefender(publisher), "Challenge.setDefender").await?;
    info!(defender = %format!("{publisher:#x}"), "challenge defender set");

    let state_chain = CanonicalStateChain::new(chain, client.clone());
    send_call(
        state_chain.setChallengeContract(proxy),
        "CanonicalStateChain.setChallengeContract",
    )
    .await?;
    info!(challenge = %format!("{proxy:#x}"), "ledger challenge reference set");

    Ok(())
}

/// ABI-encoded calldata for the challenge module's `initialize` entry point
fn challenge_initialize_calldata(
    treasury: Address,
    chain: Address,
    da_oracle: Address,
    mips_challenge: Address,
) -> Vec<u8> {
    Challenge::initializeCall {
        treasury,
        chain,
        daOracle: da_oracle,
        mipsChallenge: mips_challenge,
    }
    .abi_encode()
}

/// Re-encode the proxy's constructor input from the run's own outputs, for
/// the pre-submission consistency check against the deployment-time encoding
fn reencode_proxy_args(
    report: &DeploymentReport,
    da_oracle: Address,
) -> Result<Vec<u8>, ScriptError> {
    /// Look up a required address emitted earlier in the run
    fn lookup(report: &DeploymentReport, key: &str) -> Result<Address, ScriptError> {
        report.deployed_address(key).ok_or_else(|| {
            ScriptError::Verification(format!("missing {key} address in deployment report"))
        })
    }

    let implementation = lookup(report, CHALLENGE_IMPL_KEY)?;
    let treasury = lookup(report, TREASURY_KEY)?;
    let chain = lookup(report, CANONICAL_STATE_CHAIN_KEY)?;

    let data = challenge_initialize_calldata(treasury, chain, da_oracle, Address::ZERO);
    Ok(CoreProxy::constructorCall {
        implementation,
        data: data.into(),
    }
    .abi_encode())
}

/// Submit each deployed artifact for verification after a single settling
/// delay. Every failure is logged and skipped; nothing here can fail the run.
async fn verify_deployments(cli: &Cli, report: &DeploymentReport) {
    let Some(api_key) = cli.verifier_api_key.clone() else {
        warn!("no verifier API key configured, skipping contract verification");
        return;
    };

    let verifier = match VerificationClient::new(&cli.network, api_key) {
        Ok(verifier) => verifier,
        Err(e) => {
            warn!(error = %e, "could not construct verification client");
            return;
        }
    };

    info!(
        delay_secs = cli.settle_delay_secs,
        "waiting for the explorer indexer before verification"
    );
    sleep(Duration::from_secs(cli.settle_delay_secs)).await;

    for record in &report.records {
        // The proxy's constructor input is re-derived from the run's own
        // outputs and must match the deployment-time encoding exactly before
        // it is submitted.
        if record.contract == SettlementContract::CoreProxy {
            let checked = reencode_proxy_args(report, cli.da_oracle)
                .and_then(|args| ensure_matching_args(record, &args));
            if let Err(e) = checked {
                warn!(contract = %record.contract, error = %e, "skipping verification");
                continue;
            }
        }

        if let Err(e) = verifier.verify(record).await {
            warn!(contract = %record.contract, error = %e, "contract verification failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{keccak256, B256};

    use super::*;
    use crate::solidity::CanonicalStateChain::Header;

    /// A representative genesis header
    fn sample_header() -> Header {
        Header {
            epoch: 0,
            l2Height: 100,
            prevHash: B256::ZERO,
            txRoot: B256::repeat_byte(0x01),
            blockRoot: B256::repeat_byte(0x02),
            stateRoot: B256::repeat_byte(0x03),
            celestiaHeight: 0,
            celestiaDataRoot: B256::ZERO,
        }
    }

    /// The ledger's constructor arguments always lead with the publisher
    /// address, never the owner's
    #[test]
    fn ledger_constructor_leads_with_publisher() {
        let publisher = Address::repeat_byte(0x77);
        let args = CanonicalStateChain::constructorCall {
            publisher,
            header: sample_header(),
        }
        .abi_encode();

        assert_eq!(&args[12..32], publisher.as_slice());
    }

    /// The initializer calldata selects the four-address `initialize` entry
    /// point and embeds the treasury and ledger addresses in order
    #[test]
    fn initializer_selector_and_args() {
        let treasury = Address::repeat_byte(0x01);
        let chain = Address::repeat_byte(0x02);
        let data = challenge_initialize_calldata(
            treasury,
            chain,
            Address::repeat_byte(0x03),
            Address::ZERO,
        );

        let selector = &keccak256(b"initialize(address,address,address,address)")[..4];
        assert_eq!(&data[..4], selector);
        assert_eq!(&data[4 + 12..4 + 32], treasury.as_slice());
        assert_eq!(&data[4 + 32 + 12..4 + 64], chain.as_slice());
    }

    /// Re-encoded proxy verification arguments match the deployment-time
    /// encoding for the same inputs and diverge when an input differs
    #[test]
    fn proxy_args_consistency() {
        let implementation = Address::repeat_byte(0x0a);
        let treasury = Address::repeat_byte(0x0b);
        let chain = Address::repeat_byte(0x0c);
        let da_oracle = Address::repeat_byte(0x0d);
        let proxy = Address::repeat_byte(0x0e);

        let init_data = challenge_initialize_calldata(treasury, chain, da_oracle, Address::ZERO);
        let deployed_args = CoreProxy::constructorCall {
            implementation,
            data: init_data.into(),
        }
        .abi_encode();

        let mut report = DeploymentReport::default();
        report.commit(
            Stage::LedgerDeployed,
            vec![(CANONICAL_STATE_CHAIN_KEY, chain)],
        );
        report.commit(Stage::TreasuryDeployed, vec![(TREASURY_KEY, treasury)]);
        report.commit(
            Stage::ChallengeProxyDeployed,
            vec![
                (CHALLENGE_PROXY_KEY, proxy),
                (CHALLENGE_IMPL_KEY, implementation),
            ],
        );

        let record = DeploymentRecord {
            contract: SettlementContract::CoreProxy,
            address: proxy,
            constructor_args: deployed_args,
        };

        let reencoded = reencode_proxy_args(&report, da_oracle).unwrap();
        assert!(ensure_matching_args(&record, &reencoded).is_ok());

        let diverged = reencode_proxy_args(&report, Address::repeat_byte(0x99)).unwrap();
        assert!(ensure_matching_args(&record, &diverged).is_err());
    }
}
