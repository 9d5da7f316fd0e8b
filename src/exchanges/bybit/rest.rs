use crate::core::errors::ExchangeError;
use crate::core::kernel::{
    create_query_string, timestamp_millis, HttpRequest, HttpTransport, ResponseClassifier,
    RetryingRest, Signer, Verdict,
};
use crate::exchanges::bybit::signer::BybitSigner;
use crate::exchanges::bybit::types::{
    BybitApiResponse, BybitInstrumentsResult, BybitOrderRequest, BybitOrderResult,
    BybitServerTime, BybitWalletResult,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Bybit answers `retMsg: "OK"` on success
pub struct BybitClassifier;

impl ResponseClassifier for BybitClassifier {
    fn classify(&self, body: &Value) -> Verdict {
        match body.get("retMsg").and_then(Value::as_str) {
            Some("OK") => Verdict::Success,
            Some(message) => Verdict::Retry(message.to_string()),
            None => Verdict::Retry("missing retMsg".to_string()),
        }
    }
}

/// Thin typed wrapper over the retrying transport for the Bybit endpoints we use
pub struct BybitRestClient<T: HttpTransport> {
    rest: RetryingRest<T, BybitClassifier>,
    signer: BybitSigner,
    base_url: String,
}

impl<T: HttpTransport> BybitRestClient<T> {
    pub fn new(
        rest: RetryingRest<T, BybitClassifier>,
        signer: BybitSigner,
        base_url: String,
    ) -> Self {
        Self {
            rest,
            signer,
            base_url,
        }
    }

    fn url(&self, endpoint: &str, query_string: &str) -> String {
        if query_string.is_empty() {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}{}?{}", self.base_url, endpoint, query_string)
        }
    }

    async fn public_get<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<R, ExchangeError> {
        let url = self.url(endpoint, &create_query_string(params));
        let body = self.rest.execute(|| Ok(HttpRequest::get(url.clone()))).await?;
        decode(body)
    }

    async fn signed_get<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<R, ExchangeError> {
        let query_string = create_query_string(params);
        let url = self.url(endpoint, &query_string);

        let body = self
            .rest
            .execute(|| {
                let headers = self.signer.sign_request(
                    "GET",
                    endpoint,
                    &query_string,
                    &[],
                    timestamp_millis()?,
                )?;
                Ok(HttpRequest::get(url.clone()).with_headers(headers))
            })
            .await?;
        decode(body)
    }

    async fn signed_post<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: &impl serde::Serialize,
    ) -> Result<R, ExchangeError> {
        let bytes = serde_json::to_vec(payload).map_err(|e| {
            ExchangeError::SerializationError(format!("Failed to serialize request body: {}", e))
        })?;
        let url = self.url(endpoint, "");

        let body = self
            .rest
            .execute(|| {
                let headers =
                    self.signer
                        .sign_request("POST", endpoint, "", &bytes, timestamp_millis()?)?;
                Ok(HttpRequest::post(url.clone(), bytes.clone()).with_headers(headers))
            })
            .await?;
        decode(body)
    }

    /// Spot wallet balance for one coin (requires authentication)
    pub async fn get_wallet_balance(
        &self,
        coin: &str,
    ) -> Result<BybitApiResponse<BybitWalletResult>, ExchangeError> {
        self.signed_get(
            "/v5/account/wallet-balance",
            &[("accountType", "SPOT"), ("coin", coin)],
        )
        .await
    }

    /// Spot instrument metadata for one symbol
    pub async fn get_instruments(
        &self,
        symbol: &str,
    ) -> Result<BybitApiResponse<BybitInstrumentsResult>, ExchangeError> {
        self.public_get(
            "/v5/market/instruments-info",
            &[("category", "spot"), ("symbol", symbol)],
        )
        .await
    }

    pub async fn get_server_time(
        &self,
    ) -> Result<BybitApiResponse<BybitServerTime>, ExchangeError> {
        self.public_get("/v5/market/time", &[]).await
    }

    /// Place a new order (requires authentication)
    pub async fn place_order(
        &self,
        order: &BybitOrderRequest,
    ) -> Result<BybitApiResponse<BybitOrderResult>, ExchangeError> {
        self.signed_post("/v5/order/create", order).await
    }
}

fn decode<R: DeserializeOwned>(body: Value) -> Result<R, ExchangeError> {
    serde_json::from_value(body).map_err(|e| {
        ExchangeError::DeserializationError(format!("Failed to deserialize JSON: {}", e))
    })
}
