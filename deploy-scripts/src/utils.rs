//! Utilities for the deploy scripts

use std::{fs, path::Path, str::FromStr};

use alloy::{
    contract::{CallBuilder, CallDecoder},
    network::{Ethereum, EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
};
use reqwest::Url;
use tracing::info;

use crate::{
    constants::{
        CANONICAL_STATE_CHAIN_BYTECODE, CHALLENGE_BYTECODE, CORE_PROXY_BYTECODE, TREASURY_BYTECODE,
    },
    errors::ScriptError,
    types::{DeploymentReport, SettlementContract},
};

// -----------
// | Clients |
// -----------

/// Set up a signer-bound client for the deployment network.
///
/// The returned provider fills gas, chain id, and nonces for the signer, so
/// transaction submission is serialized per signer without further
/// coordination.
pub fn setup_client(priv_key: &str, rpc_url: &str) -> Result<DynProvider, ScriptError> {
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    Ok(ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .on_http(url)
        .erased())
}

/// Set up a read-only client for the external L2 chain
pub fn l2_client(rpc_url: &str) -> Result<DynProvider, ScriptError> {
    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    Ok(ProviderBuilder::new().on_http(url).erased())
}

/// Derive the address controlled by the given private key
pub fn derive_address(priv_key: &str) -> Result<Address, ScriptError> {
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    Ok(signer.address())
}

// ---------------
// | Deployments |
// ---------------

/// Decode a contract artifact's creation bytecode from its hex representation
pub fn parse_artifact_bytecode(artifact: &str) -> Result<Vec<u8>, ScriptError> {
    let trimmed = artifact.trim();
    let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(stripped).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))
}

/// The embedded creation bytecode for the given contract
fn artifact_bytecode(contract: SettlementContract) -> &'static str {
    match contract {
        SettlementContract::CanonicalStateChain => CANONICAL_STATE_CHAIN_BYTECODE,
        SettlementContract::Treasury => TREASURY_BYTECODE,
        SettlementContract::Challenge => CHALLENGE_BYTECODE,
        SettlementContract::CoreProxy => CORE_PROXY_BYTECODE,
    }
}

/// Build the full creation code for a contract: its creation bytecode with
/// the ABI-encoded constructor arguments appended
pub fn creation_code(
    contract: SettlementContract,
    constructor_args: &[u8],
) -> Result<Vec<u8>, ScriptError> {
    let mut code = parse_artifact_bytecode(artifact_bytecode(contract))?;
    code.extend_from_slice(constructor_args);
    Ok(code)
}

/// Deploy the given contract with the provided ABI-encoded constructor
/// arguments, blocking until the creation transaction is confirmed.
///
/// On return the address is live and queryable. A reverted or un-minable
/// creation transaction is fatal: deployed addresses are configuration input
/// to the next stage, so a failed deploy cannot be retried without
/// re-deriving everything downstream.
pub async fn deploy_contract(
    client: &DynProvider,
    contract: SettlementContract,
    constructor_args: &[u8],
) -> Result<Address, ScriptError> {
    let code = creation_code(contract, constructor_args)?;
    let tx = TransactionRequest::default().with_deploy_code(Bytes::from(code));

    let receipt = client
        .send_transaction(tx)
        .await
        .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

    if !receipt.status() {
        return Err(ScriptError::ContractDeployment(format!(
            "{contract} creation transaction reverted: {:#x}",
            receipt.transaction_hash
        )));
    }

    receipt.contract_address.ok_or_else(|| {
        ScriptError::ContractDeployment(format!("no contract address in {contract} receipt"))
    })
}

/// Submit a mutating contract call and wait for its receipt, requiring success
pub async fn send_call<T, P, D>(
    call: CallBuilder<T, P, D, Ethereum>,
    context: &str,
) -> Result<TransactionReceipt, ScriptError>
where
    P: Provider,
    D: CallDecoder,
{
    let receipt = call
        .send()
        .await
        .map_err(|e| ScriptError::ContractInteraction(format!("{context}: {e}")))?
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractInteraction(format!("{context}: {e}")))?;

    if !receipt.status() {
        return Err(ScriptError::ContractInteraction(format!(
            "{context} reverted: {:#x}",
            receipt.transaction_hash
        )));
    }

    Ok(receipt)
}

// ------------
// | Manifest |
// ------------

/// Write the deployment manifest consumed by downstream tooling
pub fn write_deployment_manifest(
    path: &Path,
    report: &DeploymentReport,
) -> Result<(), ScriptError> {
    let rendered = serde_json::to_string_pretty(&report.manifest_json())
        .map_err(|e| ScriptError::WriteManifest(e.to_string()))?;
    fs::write(path, rendered).map_err(|e| ScriptError::WriteManifest(e.to_string()))?;

    info!(path = %path.display(), "deployment manifest written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Artifact decoding tolerates a `0x` prefix and surrounding whitespace
    #[test]
    fn artifact_decoding() {
        assert_eq!(parse_artifact_bytecode("0x6080\n").unwrap(), vec![0x60, 0x80]);
        assert_eq!(parse_artifact_bytecode("6080").unwrap(), vec![0x60, 0x80]);
        assert!(matches!(
            parse_artifact_bytecode("0xzz").unwrap_err(),
            ScriptError::ArtifactParsing(_)
        ));
    }

    /// Every embedded artifact decodes to non-empty bytecode
    #[test]
    fn embedded_artifacts_decode() {
        for contract in [
            SettlementContract::CanonicalStateChain,
            SettlementContract::Treasury,
            SettlementContract::Challenge,
            SettlementContract::CoreProxy,
        ] {
            let code = parse_artifact_bytecode(artifact_bytecode(contract)).unwrap();
            assert!(!code.is_empty(), "{contract} artifact is empty");
        }
    }

    /// Creation code is the artifact bytecode with constructor args appended
    #[test]
    fn creation_code_appends_args() {
        let args = [0xde, 0xad, 0xbe, 0xef];
        let code = creation_code(SettlementContract::Treasury, &args).unwrap();
        let bare = creation_code(SettlementContract::Treasury, &[]).unwrap();

        assert_eq!(code.len(), bare.len() + args.len());
        assert_eq!(&code[..bare.len()], bare.as_slice());
        assert_eq!(&code[bare.len()..], args);
    }
}
