use crate::core::errors::ExchangeError;
use crate::core::kernel::{
    create_query_string, timestamp_millis, HttpRequest, HttpTransport, ResponseClassifier,
    RetryingRest, Signer, Verdict,
};
use crate::exchanges::kucoin::signer::KuCoinSigner;
use crate::exchanges::kucoin::types::{
    KuCoinAccount, KuCoinOrderRequest, KuCoinOrderResult, KuCoinResponse, KuCoinSymbol,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

pub const SUCCESS_CODE: &str = "200000";
pub const INVALID_REQUEST_IP: &str = "Invalid request ip";

/// KuCoin answers `code: "200000"` on success
pub struct KuCoinClassifier;

impl ResponseClassifier for KuCoinClassifier {
    fn classify(&self, body: &Value) -> Verdict {
        let code = match body.get("code") {
            Some(Value::String(code)) => code.clone(),
            Some(Value::Number(code)) => code.to_string(),
            _ => return Verdict::Retry("missing code".to_string()),
        };
        if code == SUCCESS_CODE {
            return Verdict::Success;
        }

        let message = body
            .get("msg")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if message == INVALID_REQUEST_IP {
            Verdict::InvalidRequestIp(message)
        } else {
            Verdict::Retry(format!("{}: {}", code, message))
        }
    }
}

/// Typed wrapper over the retrying transport for the KuCoin endpoints we use
pub struct KuCoinRestClient<T: HttpTransport> {
    rest: RetryingRest<T, KuCoinClassifier>,
    signer: KuCoinSigner,
    base_url: String,
}

impl<T: HttpTransport> KuCoinRestClient<T> {
    pub fn new(
        rest: RetryingRest<T, KuCoinClassifier>,
        signer: KuCoinSigner,
        base_url: String,
    ) -> Self {
        Self {
            rest,
            signer,
            base_url,
        }
    }

    /// Run the retry loop, starting over from signing whenever the exchange
    /// rejects the source address. Cycles share `RetryPolicy::max_attempts`
    /// with the inner loop, so a cap of N allows up to N * N sends.
    async fn dispatch<F>(&self, prepare: F) -> Result<Value, ExchangeError>
    where
        F: Fn() -> Result<HttpRequest, ExchangeError> + Send + Sync,
    {
        let mut cycles: u32 = 0;

        loop {
            cycles += 1;
            match self.rest.execute(&prepare).await {
                Err(ExchangeError::InvalidRequestIp(message)) => {
                    if self
                        .rest
                        .policy()
                        .max_attempts
                        .is_some_and(|max| cycles >= max)
                    {
                        return Err(ExchangeError::RetriesExhausted {
                            attempts: cycles,
                            last_error: message,
                        });
                    }
                    warn!(cycle = cycles, "Invalid request ip, signing again");
                }
                other => return other,
            }
        }
    }

    async fn request<R: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> Result<R, ExchangeError> {
        let query_string = create_query_string(params);
        let url = if query_string.is_empty() {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}{}?{}", self.base_url, endpoint, query_string)
        };

        let value = self
            .dispatch(|| {
                let payload = body.as_deref().unwrap_or_default();
                let headers = self.signer.sign_request(
                    method.as_str(),
                    endpoint,
                    &query_string,
                    payload,
                    timestamp_millis()?,
                )?;
                let mut request =
                    HttpRequest::new(method.clone(), url.clone()).with_headers(headers);
                if let Some(bytes) = &body {
                    request = request.with_body(bytes.clone());
                }
                Ok(request)
            })
            .await?;

        serde_json::from_value(value).map_err(|e| {
            ExchangeError::DeserializationError(format!("Failed to deserialize JSON: {}", e))
        })
    }

    pub async fn get_accounts(
        &self,
        currency: &str,
    ) -> Result<KuCoinResponse<Vec<KuCoinAccount>>, ExchangeError> {
        self.request(
            Method::GET,
            "/api/v1/accounts",
            &[("currency", currency), ("type", "trade")],
            None,
        )
        .await
    }

    pub async fn get_symbols(&self) -> Result<KuCoinResponse<Vec<KuCoinSymbol>>, ExchangeError> {
        self.request(Method::GET, "/api/v2/symbols", &[], None).await
    }

    /// Server time in milliseconds
    pub async fn get_server_time(&self) -> Result<KuCoinResponse<u64>, ExchangeError> {
        self.request(Method::GET, "/api/v1/timestamp", &[], None).await
    }

    pub async fn place_order(
        &self,
        order: &KuCoinOrderRequest,
    ) -> Result<KuCoinResponse<KuCoinOrderResult>, ExchangeError> {
        let bytes = serde_json::to_vec(order).map_err(|e| {
            ExchangeError::SerializationError(format!("Failed to serialize order: {}", e))
        })?;
        self.request(Method::POST, "/api/v1/orders", &[], Some(bytes))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classifier() {
        assert_eq!(
            KuCoinClassifier.classify(&json!({"code": "200000", "data": {}})),
            Verdict::Success
        );
        assert_eq!(
            KuCoinClassifier.classify(&json!({"code": "400006", "msg": "Invalid request ip"})),
            Verdict::InvalidRequestIp("Invalid request ip".to_string())
        );
        assert_eq!(
            KuCoinClassifier.classify(&json!({"code": "429000", "msg": "Too Many Requests"})),
            Verdict::Retry("429000: Too Many Requests".to_string())
        );
        assert!(matches!(
            KuCoinClassifier.classify(&json!({"data": 1})),
            Verdict::Retry(_)
        ));
    }
}
