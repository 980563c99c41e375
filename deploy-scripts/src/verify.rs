//! Best-effort source verification against a block-explorer API.
//!
//! Verification is advisory tooling: its outcome has no bearing on the
//! deployed system, and every failure here is reported without ever failing
//! the pipeline.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::{
    constants::VERIFICATION_TIMEOUT_SECS, errors::ScriptError, types::DeploymentRecord,
};

/// Client for an Etherscan-compatible contract verification API
pub struct VerificationClient {
    /// The underlying HTTP client
    client: Client,
    /// The verification API base URL
    base_url: String,
    /// API key presented with every submission
    api_key: String,
}

/// An Etherscan-style verification API response
#[derive(Debug, Deserialize)]
struct VerifyResponse {
    /// `"1"` on acceptance, `"0"` on rejection
    status: String,
    /// Human-readable outcome
    message: String,
    /// The submission receipt identifier, or the rejection reason
    result: String,
}

impl VerificationClient {
    /// Create a verification client for the named network
    pub fn new(network: &str, api_key: String) -> Result<Self, ScriptError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(VERIFICATION_TIMEOUT_SECS))
            .build()
            .map_err(|e| ScriptError::Verification(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url_for(network),
            api_key,
        })
    }

    /// Submit a deployed artifact for source verification
    pub async fn verify(&self, record: &DeploymentRecord) -> Result<(), ScriptError> {
        let address = format!("{:#x}", record.address);
        let args = hex::encode(&record.constructor_args);

        let response = self
            .client
            .post(&self.base_url)
            .form(&[
                ("module", "contract"),
                ("action", "verifysourcecode"),
                ("apikey", self.api_key.as_str()),
                ("contractaddress", address.as_str()),
                ("contractname", record.contract.source_path()),
                // the API spells this parameter with the extra "e"
                ("constructorArguements", args.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ScriptError::Verification(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ScriptError::Verification(format!(
                "verification API returned {}",
                response.status()
            )));
        }

        let body: VerifyResponse = response
            .json()
            .await
            .map_err(|e| ScriptError::Verification(e.to_string()))?;

        if body.status != "1" {
            return Err(ScriptError::Verification(format!(
                "{}: {}",
                body.message, body.result
            )));
        }

        info!(
            contract = %record.contract,
            address = %address,
            guid = %body.result,
            "verification submitted"
        );
        Ok(())
    }
}

/// Assert that the constructor arguments about to be submitted for
/// verification are exactly the ones the contract was deployed with
pub fn ensure_matching_args(
    record: &DeploymentRecord,
    submitted: &[u8],
) -> Result<(), ScriptError> {
    if record.constructor_args != submitted {
        return Err(ScriptError::Verification(format!(
            "{} verification arguments diverge from deployment arguments",
            record.contract
        )));
    }
    Ok(())
}

/// Map a network name to its verification API base URL
fn base_url_for(network: &str) -> String {
    match network {
        "mainnet" => "https://api.etherscan.io/api".to_string(),
        "sepolia" => "https://api-sepolia.etherscan.io/api".to_string(),
        _ => format!("https://api-{network}.etherscan.io/api"),
    }
}
