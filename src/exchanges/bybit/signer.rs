use crate::core::errors::ExchangeError;
use crate::core::kernel::{hmac_sha256, SignatureResult, Signer};
use std::collections::HashMap;

/// Receive window sent with, and signed into, every request
pub const RECV_WINDOW: &str = "5000";

/// Bybit HMAC-SHA256 signer for authenticated requests using V5 API
#[derive(Debug, Clone)]
pub struct BybitSigner {
    api_key: String,
    secret_key: String,
}

impl BybitSigner {
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key,
            secret_key,
        }
    }

    /// timestamp + api_key + recv_window + payload, hex encoded
    pub fn sign_payload(&self, payload: &str, timestamp: u64) -> Result<String, ExchangeError> {
        let prehash = format!("{}{}{}{}", timestamp, self.api_key, RECV_WINDOW, payload);
        let mac = hmac_sha256(&self.secret_key, prehash.as_bytes())?;
        Ok(hex::encode(mac))
    }
}

impl Signer for BybitSigner {
    fn sign_request(
        &self,
        method: &str,
        _endpoint: &str,
        query_string: &str,
        body: &[u8],
        timestamp: u64,
    ) -> SignatureResult {
        // GET signs the query string, everything else signs the body
        let signature = if method.eq_ignore_ascii_case("GET") {
            self.sign_payload(query_string, timestamp)?
        } else {
            let body_str = std::str::from_utf8(body)
                .map_err(|_| ExchangeError::AuthError("Invalid body encoding".to_string()))?;
            self.sign_payload(body_str, timestamp)?
        };

        let mut headers = HashMap::new();
        headers.insert("X-BAPI-API-KEY".to_string(), self.api_key.clone());
        headers.insert("X-BAPI-TIMESTAMP".to_string(), timestamp.to_string());
        headers.insert("X-BAPI-SIGN".to_string(), signature);
        headers.insert("X-BAPI-SIGN-TYPE".to_string(), "2".to_string());
        headers.insert("X-BAPI-RECV-WINDOW".to_string(), RECV_WINDOW.to_string());
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        Ok(headers)
    }
}
