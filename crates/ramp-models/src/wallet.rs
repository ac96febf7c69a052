//! Destination wallet specification.
//!
//! A destination wallet names where purchased assets should land: one
//! on-chain address plus the blockchains and asset symbols the widget may
//! offer for it. The service validates presence only; address formats are
//! the upstream's concern.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// One destination wallet in a session-token request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationWallet {
    /// On-chain destination address.
    pub address: String,
    /// Blockchains this address accepts (e.g. `"base"`, `"ethereum"`).
    #[serde(default)]
    pub blockchains: Vec<String>,
    /// Asset symbols offered for this address (e.g. `"ETH"`, `"USDC"`).
    #[serde(default)]
    pub assets: Vec<String>,
}

impl DestinationWallet {
    /// Check that the wallet carries a non-empty address.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.address.trim().is_empty() {
            return Err(ModelError::InvalidWallet {
                reason: "address must not be empty".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_with_address_is_valid() {
        let wallet = DestinationWallet {
            address: "0xABC".into(),
            blockchains: vec!["base".into()],
            assets: vec!["ETH".into(), "USDC".into()],
        };
        assert!(wallet.validate().is_ok());
    }

    #[test]
    fn empty_address_is_rejected() {
        let wallet = DestinationWallet {
            address: "   ".into(),
            blockchains: vec![],
            assets: vec![],
        };
        assert!(matches!(
            wallet.validate(),
            Err(ModelError::InvalidWallet { .. })
        ));
    }

    #[test]
    fn blockchains_and_assets_default_to_empty() {
        let wallet: DestinationWallet =
            serde_json::from_str(r#"{"address": "0xABC"}"#).unwrap();
        assert!(wallet.blockchains.is_empty());
        assert!(wallet.assets.is_empty());
    }
}
