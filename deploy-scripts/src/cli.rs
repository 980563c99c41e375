//! Definitions of CLI arguments for the one-shot settlement deployment

use std::path::PathBuf;

use alloy::primitives::Address;
use clap::Parser;

use crate::constants::DEFAULT_SETTLE_DELAY_SECS;

/// Deploy and wire the settlement stack in a single run.
///
/// Every argument is environment-backed, so the binary is invocable with no
/// flags at all: the deployment is configured entirely by its environment.
#[derive(Debug, Parser)]
pub struct Cli {
    /// Private key of the owner (deploying/admin) account
    #[arg(long, env = "DEPLOYER_PRIVATE_KEY")]
    pub owner_key: String,

    /// Private key of the publisher (operational) account
    #[arg(long, env = "PUBLISHER_PRIVATE_KEY")]
    pub publisher_key: String,

    /// RPC URL of the deployment network
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: String,

    /// RPC URL of the external L2 chain whose tip seeds the genesis header
    #[arg(long, env = "L2_PROVIDER_URL")]
    pub l2_rpc_url: String,

    /// Name of the deployment network, used for logging and to locate the
    /// verification API
    #[arg(long, env = "NETWORK", default_value = "sepolia")]
    pub network: String,

    /// Address of the data-availability oracle referenced by the challenge
    /// module
    #[arg(
        long,
        env = "DA_ORACLE_ADDRESS",
        default_value = "0x3a5cbB6EF4756DA0b3f6DAE7aB6430fD8c46d247"
    )]
    pub da_oracle: Address,

    /// Path the deployment manifest is written to
    #[arg(long, env = "DEPLOYMENTS_PATH", default_value = "deployments.json")]
    pub deployments_path: PathBuf,

    /// API key for the verification service; verification is skipped when
    /// unset
    #[arg(long, env = "VERIFIER_API_KEY")]
    pub verifier_api_key: Option<String>,

    /// Seconds to wait before the first verification submission, giving the
    /// explorer's indexer time to observe the new bytecode
    #[arg(
        long,
        env = "VERIFY_SETTLE_DELAY_SECS",
        default_value_t = DEFAULT_SETTLE_DELAY_SECS
    )]
    pub settle_delay_secs: u64,
}
