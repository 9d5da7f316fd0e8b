use crate::core::errors::ExchangeError;
use crate::core::kernel::{hmac_sha256, SignatureResult, Signer};
use base64::{engine::general_purpose, Engine as _};
use std::collections::HashMap;

/// KuCoin signer (API key version 2: the passphrase is itself signed)
pub struct KuCoinSigner {
    api_key: String,
    secret_key: String,
    signed_passphrase: String,
}

impl KuCoinSigner {
    pub fn new(
        api_key: String,
        secret_key: String,
        passphrase: &str,
    ) -> Result<Self, ExchangeError> {
        let signed_passphrase =
            general_purpose::STANDARD.encode(hmac_sha256(&secret_key, passphrase.as_bytes())?);

        Ok(Self {
            api_key,
            secret_key,
            signed_passphrase,
        })
    }

    /// The prehash string format is: timestamp + method + requestPath + body
    fn generate_signature(
        &self,
        timestamp: u64,
        method: &str,
        request_path: &str,
        body: &str,
    ) -> Result<String, ExchangeError> {
        let prehash = format!(
            "{}{}{}{}",
            timestamp,
            method.to_uppercase(),
            request_path,
            body
        );
        let mac = hmac_sha256(&self.secret_key, prehash.as_bytes())?;
        Ok(general_purpose::STANDARD.encode(mac))
    }
}

impl std::fmt::Debug for KuCoinSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KuCoinSigner").finish_non_exhaustive()
    }
}

impl Signer for KuCoinSigner {
    fn sign_request(
        &self,
        method: &str,
        endpoint: &str,
        query_string: &str,
        body: &[u8],
        timestamp: u64,
    ) -> SignatureResult {
        let request_path = if query_string.is_empty() {
            endpoint.to_string()
        } else {
            format!("{}?{}", endpoint, query_string)
        };

        let body_str = std::str::from_utf8(body)
            .map_err(|e| ExchangeError::AuthError(format!("Invalid body encoding: {}", e)))?;

        let signature = self.generate_signature(timestamp, method, &request_path, body_str)?;

        let mut headers = HashMap::new();
        headers.insert("KC-API-SIGN".to_string(), signature);
        headers.insert("KC-API-TIMESTAMP".to_string(), timestamp.to_string());
        headers.insert("KC-API-KEY".to_string(), self.api_key.clone());
        headers.insert(
            "KC-API-PASSPHRASE".to_string(),
            self.signed_passphrase.clone(),
        );
        headers.insert("KC-API-KEY-VERSION".to_string(), "2".to_string());
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        Ok(headers)
    }
}
