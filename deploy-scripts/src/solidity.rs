//! Definitions of Solidity interfaces called during deployment

#![allow(missing_docs, clippy::missing_docs_in_private_items)]

use alloy::sol;

sol! {
    #![sol(all_derives)]

    #[sol(rpc)]
    contract CanonicalStateChain {
        struct Header {
            uint64 epoch;
            uint64 l2Height;
            bytes32 prevHash;
            bytes32 txRoot;
            bytes32 blockRoot;
            bytes32 stateRoot;
            uint64 celestiaHeight;
            bytes32 celestiaDataRoot;
        }

        constructor(address publisher, Header header);

        function setChallengeContract(address challenge) external;
        function challengeContract() external view returns (address);
        function publisher() external view returns (address);
    }

    #[sol(rpc)]
    contract Treasury {
        function owner() external view returns (address);
    }

    #[sol(rpc)]
    contract Challenge {
        function initialize(address treasury, address chain, address daOracle, address mipsChallenge) external;
        function setDefender(address defender) external;
        function defender() external view returns (address);
    }

    #[sol(rpc)]
    contract CoreProxy {
        constructor(address implementation, bytes data);
    }
}
