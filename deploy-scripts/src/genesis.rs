//! Genesis composition from the external L2 chain's current tip

use alloy::{
    primitives::{keccak256, B256},
    providers::{DynProvider, Provider},
};
use serde::Deserialize;

use crate::{
    constants::GENESIS_TX_ROOT_PREIMAGE, errors::ScriptError,
    solidity::CanonicalStateChain::Header,
};

/// The fields of an L2 block consumed for genesis composition.
///
/// Decoded from a raw `eth_getBlockByNumber` response so that absent fields
/// surface as `None` instead of defaulting to zeroed values.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2Block {
    /// The block number, as a hex quantity string
    pub number: String,
    /// The block hash
    #[serde(default)]
    pub hash: Option<B256>,
    /// The block's state root
    #[serde(default)]
    pub state_root: Option<B256>,
}

/// Fetch the latest confirmed block from the L2 provider.
///
/// No retry and no staleness bound: whatever the endpoint reports as its tip
/// at call time seeds the genesis record. Any transport failure is fatal,
/// nothing downstream can be deployed without it.
pub async fn fetch_latest_block(l2_client: &DynProvider) -> Result<L2Block, ScriptError> {
    let block: Option<L2Block> = l2_client
        .raw_request("eth_getBlockByNumber".into(), ("latest", true))
        .await
        .map_err(|e| ScriptError::Provider(e.to_string()))?;

    block.ok_or_else(|| ScriptError::Provider("L2 provider returned no latest block".to_string()))
}

/// Compose the genesis header committed to the state chain from the L2 tip.
///
/// A tip missing its hash or state root is rejected outright: the genesis
/// record is immutable once deployed, so an empty root must never be embedded.
pub fn compose_genesis(block: &L2Block) -> Result<Header, ScriptError> {
    let l2_height = parse_hex_quantity(&block.number)?;

    let block_root = block.hash.ok_or_else(|| {
        ScriptError::GenesisComposition("latest L2 block is missing its hash".to_string())
    })?;
    let state_root = block.state_root.ok_or_else(|| {
        ScriptError::GenesisComposition("latest L2 block is missing its state root".to_string())
    })?;

    Ok(Header {
        epoch: 0,
        l2Height: l2_height,
        prevHash: B256::ZERO,
        txRoot: keccak256(GENESIS_TX_ROOT_PREIMAGE),
        blockRoot: block_root,
        stateRoot: state_root,
        celestiaHeight: 0,
        celestiaDataRoot: B256::ZERO,
    })
}

/// Parse a `0x`-prefixed hex quantity into a `u64`
fn parse_hex_quantity(quantity: &str) -> Result<u64, ScriptError> {
    u64::from_str_radix(quantity.trim_start_matches("0x"), 16).map_err(|e| {
        ScriptError::GenesisComposition(format!("invalid block number {quantity}: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A well-formed L2 tip with the given block number
    fn tip(number: &str) -> L2Block {
        L2Block {
            number: number.to_string(),
            hash: Some(B256::repeat_byte(0xab)),
            state_root: Some(B256::repeat_byte(0xcd)),
        }
    }

    /// The block-number hex quantity decodes to the genesis height
    #[test]
    fn height_decodes_from_hex() {
        let header = compose_genesis(&tip("0x64")).unwrap();
        assert_eq!(header.l2Height, 100);

        let header = compose_genesis(&tip("0x0")).unwrap();
        assert_eq!(header.l2Height, 0);
    }

    /// Fixed fields are sentinels, derived fields come from the tip
    #[test]
    fn fixed_and_derived_fields() {
        let header = compose_genesis(&tip("0x1")).unwrap();

        assert_eq!(header.epoch, 0);
        assert_eq!(header.celestiaHeight, 0);
        assert_eq!(header.prevHash, B256::ZERO);
        assert_eq!(header.celestiaDataRoot, B256::ZERO);
        assert_eq!(header.blockRoot, B256::repeat_byte(0xab));
        assert_eq!(header.stateRoot, B256::repeat_byte(0xcd));
    }

    /// The placeholder transaction root is keccak256 of the fixed preimage
    #[test]
    fn tx_root_is_keccak_of_preimage() {
        let header = compose_genesis(&tip("0x1")).unwrap();

        let expected = B256::from_slice(
            &hex::decode("044852b2a670ade5407e78fb2863c51de9fcb96542a07186fe3aeda6bb8a116d")
                .unwrap(),
        );
        assert_eq!(header.txRoot, expected);
    }

    /// A tip missing its state root is a composition error, not a zeroed genesis
    #[test]
    fn missing_state_root_is_rejected() {
        let mut block = tip("0x64");
        block.state_root = None;

        let err = compose_genesis(&block).unwrap_err();
        assert!(matches!(err, ScriptError::GenesisComposition(_)));
    }

    /// A tip missing its hash is a composition error
    #[test]
    fn missing_hash_is_rejected() {
        let mut block = tip("0x64");
        block.hash = None;

        let err = compose_genesis(&block).unwrap_err();
        assert!(matches!(err, ScriptError::GenesisComposition(_)));
    }

    /// A malformed block number is a composition error
    #[test]
    fn malformed_number_is_rejected() {
        let err = compose_genesis(&tip("0xnope")).unwrap_err();
        assert!(matches!(err, ScriptError::GenesisComposition(_)));
    }
}
