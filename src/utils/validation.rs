use regex::Regex;

use crate::error::ScreenerError;

const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Input validation for screening requests.
#[derive(Debug, Clone)]
pub struct InputValidator {
    evm_address_regex: Regex,
}

impl Default for InputValidator {
    fn default() -> Self {
        Self {
            evm_address_regex: Regex::new(r"^0x[a-fA-F0-9]{40}$").unwrap(),
        }
    }
}

impl InputValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates an EVM address and returns it lowercased. Malformed and
    /// zero addresses are caller errors.
    pub fn validate_address(&self, address: &str) -> Result<String, ScreenerError> {
        if !self.evm_address_regex.is_match(address) {
            return Err(ScreenerError::InvalidAddress {
                address: address.to_string(),
                reason: "expected 0x-prefixed 40-hex-digit address".to_string(),
            });
        }

        let sanitized = address.to_lowercase();
        if sanitized == ZERO_ADDRESS {
            return Err(ScreenerError::InvalidAddress {
                address: address.to_string(),
                reason: "zero address not allowed".to_string(),
            });
        }

        Ok(sanitized)
    }
}
