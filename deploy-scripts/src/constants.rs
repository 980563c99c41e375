//! Constants used in the deploy scripts

/// The creation bytecode of the CanonicalStateChain contract
pub const CANONICAL_STATE_CHAIN_BYTECODE: &str =
    include_str!("../artifacts/CanonicalStateChain.bin");

/// The creation bytecode of the Treasury contract
pub const TREASURY_BYTECODE: &str = include_str!("../artifacts/Treasury.bin");

/// The creation bytecode of the Challenge implementation contract
pub const CHALLENGE_BYTECODE: &str = include_str!("../artifacts/Challenge.bin");

/// The creation bytecode of the CoreProxy contract
pub const CORE_PROXY_BYTECODE: &str = include_str!("../artifacts/CoreProxy.bin");

/// Preimage of the placeholder transaction root committed in the genesis header
pub const GENESIS_TX_ROOT_PREIMAGE: &[u8] = b"0";

/// The default number of seconds to wait before submitting verification
/// requests, giving the explorer's indexer time to observe the new bytecode
pub const DEFAULT_SETTLE_DELAY_SECS: u64 = 60;

/// The request timeout for the verification API client, in seconds
pub const VERIFICATION_TIMEOUT_SECS: u64 = 10;

/// The deployments key in the deployment manifest
pub const DEPLOYMENTS_KEY: &str = "deployments";

/// The state chain contract key in the deployment manifest
pub const CANONICAL_STATE_CHAIN_KEY: &str = "canonical_state_chain";

/// The treasury contract key in the deployment manifest
pub const TREASURY_KEY: &str = "treasury";

/// The challenge implementation contract key in the deployment manifest
pub const CHALLENGE_IMPL_KEY: &str = "challenge_implementation";

/// The challenge proxy contract key in the deployment manifest
pub const CHALLENGE_PROXY_KEY: &str = "challenge_proxy";
