//! Type definitions used throughout the deploy scripts

use std::fmt::{self, Display};

use alloy::primitives::Address;
use serde_json::Value;

use crate::constants::DEPLOYMENTS_KEY;

/// The settlement contracts deployed by the pipeline
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SettlementContract {
    /// The append-only state ledger
    CanonicalStateChain,
    /// The treasury holding system funds
    Treasury,
    /// The challenge module implementation
    Challenge,
    /// The proxy in front of the challenge module
    CoreProxy,
}

impl SettlementContract {
    /// The fully-qualified source path identifier submitted for verification
    pub fn source_path(&self) -> &'static str {
        match self {
            SettlementContract::CanonicalStateChain => {
                "contracts/CanonicalStateChain.sol:CanonicalStateChain"
            }
            SettlementContract::Treasury => "contracts/Treasury.sol:Treasury",
            SettlementContract::Challenge => "contracts/challenge/Challenge.sol:Challenge",
            SettlementContract::CoreProxy => "contracts/proxy/CoreProxy.sol:CoreProxy",
        }
    }
}

impl Display for SettlementContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettlementContract::CanonicalStateChain => write!(f, "canonical-state-chain"),
            SettlementContract::Treasury => write!(f, "treasury"),
            SettlementContract::Challenge => write!(f, "challenge"),
            SettlementContract::CoreProxy => write!(f, "core-proxy"),
        }
    }
}

/// The stages of the deployment pipeline, in execution order.
///
/// Every stage is a hard prerequisite of the next; a failure before `Wired`
/// aborts the run with no rollback of committed stages. `Verified` is
/// advisory and never affects the terminal outcome.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    /// The external chain's tip has been fetched
    ChainStateFetched,
    /// The genesis header has been composed from the tip
    GenesisComposed,
    /// The state chain (ledger) contract is live
    LedgerDeployed,
    /// The treasury contract is live
    TreasuryDeployed,
    /// The challenge implementation and its initialized proxy are live
    ChallengeProxyDeployed,
    /// Both wiring calls have committed
    Wired,
    /// The verification phase has run
    Verified,
}

impl Stage {
    /// All stages in pipeline order
    pub const ALL: [Stage; 7] = [
        Stage::ChainStateFetched,
        Stage::GenesisComposed,
        Stage::LedgerDeployed,
        Stage::TreasuryDeployed,
        Stage::ChallengeProxyDeployed,
        Stage::Wired,
        Stage::Verified,
    ];
}

impl Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::ChainStateFetched => write!(f, "chain-state-fetched"),
            Stage::GenesisComposed => write!(f, "genesis-composed"),
            Stage::LedgerDeployed => write!(f, "ledger-deployed"),
            Stage::TreasuryDeployed => write!(f, "treasury-deployed"),
            Stage::ChallengeProxyDeployed => write!(f, "challenge-proxy-deployed"),
            Stage::Wired => write!(f, "wired"),
            Stage::Verified => write!(f, "verified"),
        }
    }
}

/// A single deployed artifact, as consumed by the verification client
#[derive(Clone, Debug)]
pub struct DeploymentRecord {
    /// Which contract was deployed
    pub contract: SettlementContract,
    /// The address at which it is live
    pub address: Address,
    /// The ABI-encoded constructor arguments used at deployment time
    pub constructor_args: Vec<u8>,
}

/// The outcome of a single committed pipeline stage
#[derive(Clone, Debug)]
pub struct StageOutcome {
    /// The stage that committed
    pub stage: Stage,
    /// Addresses emitted by the stage, labeled by their manifest key
    pub addresses: Vec<(&'static str, Address)>,
}

/// The structured result of a full pipeline run, consumed by the progress
/// reporter and the manifest writer
#[derive(Clone, Debug, Default)]
pub struct DeploymentReport {
    /// Chain id of the deployment network
    pub chain_id: u64,
    /// Per-stage outcomes, in execution order
    pub stages: Vec<StageOutcome>,
    /// One record per deployed artifact
    pub records: Vec<DeploymentRecord>,
}

impl DeploymentReport {
    /// Record a committed stage and the addresses it emitted
    pub fn commit(&mut self, stage: Stage, addresses: Vec<(&'static str, Address)>) {
        self.stages.push(StageOutcome { stage, addresses });
    }

    /// Look up a deployed address by its manifest key
    pub fn deployed_address(&self, key: &str) -> Option<Address> {
        self.stages
            .iter()
            .flat_map(|outcome| outcome.addresses.iter())
            .find(|(label, _)| *label == key)
            .map(|(_, address)| *address)
    }

    /// Render the deployment manifest
    pub fn manifest_json(&self) -> Value {
        let mut deployments = serde_json::Map::new();
        for outcome in &self.stages {
            for (key, address) in &outcome.addresses {
                deployments.insert((*key).to_string(), Value::String(format!("{address:#x}")));
            }
        }

        let mut root = serde_json::Map::new();
        root.insert("chain_id".to_string(), Value::from(self.chain_id));
        root.insert(DEPLOYMENTS_KEY.to_string(), Value::Object(deployments));
        Value::Object(root)
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::Address;

    use super::*;
    use crate::constants::{
        CANONICAL_STATE_CHAIN_KEY, CHALLENGE_IMPL_KEY, CHALLENGE_PROXY_KEY, TREASURY_KEY,
    };

    /// The declared stage order is the pipeline's execution order
    #[test]
    fn stage_order_matches_pipeline() {
        let expected = [
            Stage::ChainStateFetched,
            Stage::GenesisComposed,
            Stage::LedgerDeployed,
            Stage::TreasuryDeployed,
            Stage::ChallengeProxyDeployed,
            Stage::Wired,
            Stage::Verified,
        ];
        assert_eq!(Stage::ALL, expected);
    }

    /// Manifest rendering surfaces every emitted address under its key
    #[test]
    fn manifest_contains_all_addresses() {
        let chain = Address::repeat_byte(0x11);
        let proxy = Address::repeat_byte(0x22);

        let mut report = DeploymentReport {
            chain_id: 11155111,
            ..Default::default()
        };
        report.commit(Stage::LedgerDeployed, vec![(CANONICAL_STATE_CHAIN_KEY, chain)]);
        report.commit(
            Stage::ChallengeProxyDeployed,
            vec![
                (CHALLENGE_PROXY_KEY, proxy),
                (CHALLENGE_IMPL_KEY, Address::repeat_byte(0x33)),
            ],
        );
        report.commit(Stage::Wired, vec![]);

        let manifest = report.manifest_json();
        assert_eq!(manifest["chain_id"], 11155111);
        let deployments = &manifest[DEPLOYMENTS_KEY];
        assert_eq!(
            deployments[CANONICAL_STATE_CHAIN_KEY],
            format!("{chain:#x}")
        );
        assert_eq!(deployments[CHALLENGE_PROXY_KEY], format!("{proxy:#x}"));
        assert!(deployments.get(TREASURY_KEY).is_none());

        assert_eq!(report.deployed_address(CHALLENGE_PROXY_KEY), Some(proxy));
        assert_eq!(report.deployed_address(TREASURY_KEY), None);
    }

    /// Source path identifiers are stable per contract
    #[test]
    fn source_paths() {
        assert_eq!(
            SettlementContract::Treasury.source_path(),
            "contracts/Treasury.sol:Treasury"
        );
        assert_eq!(
            SettlementContract::CoreProxy.source_path(),
            "contracts/proxy/CoreProxy.sol:CoreProxy"
        );
    }
}
