use crate::core::errors::ExchangeError;
use async_trait::async_trait;
use reqwest::{Client, Method, Proxy};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{instrument, trace};

/// One outgoing HTTP request with its own headers
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Full URL including any query string
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self::new(Method::POST, url).with_body(body)
    }

    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw HTTP response; the body is left for the caller to interpret
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// The injected "send a request, get a response" capability
///
/// Non-2xx statuses are returned as responses, not errors: exchanges put the
/// interesting part of a rejection in the body.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ExchangeError>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ExchangeError> {
        (**self).send(request).await
    }
}

/// Configuration for the HTTP transport
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Exchange name for logging and tracing
    pub exchange_name: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string to include in requests
    pub user_agent: String,
    /// Optional proxy URL (http, https or socks5)
    pub proxy: Option<String>,
}

impl RestClientConfig {
    pub fn new(exchange_name: String) -> Self {
        Self {
            exchange_name,
            timeout_seconds: 10,
            user_agent: "LotusAutosell/0.1".to_string(),
            proxy: None,
        }
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }
}

/// Builder for the reqwest-backed transport
pub struct RestClientBuilder {
    config: RestClientConfig,
}

impl RestClientBuilder {
    pub fn new(config: RestClientConfig) -> Self {
        Self { config }
    }

    /// Build the transport. One pooled client is shared by every attempt.
    pub fn build(self) -> Result<ReqwestTransport, ExchangeError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .user_agent(&self.config.user_agent);

        if let Some(proxy_url) = &self.config.proxy {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                ExchangeError::InvalidParameters(format!("Invalid proxy '{}': {}", proxy_url, e))
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| {
            ExchangeError::NetworkError(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(ReqwestTransport {
            client,
            config: self.config,
        })
    }
}

/// `HttpTransport` over a pooled reqwest client
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    config: RestClientConfig,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("exchange", &self.config.exchange_name)
            .field("has_proxy", &self.config.proxy.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(
        skip(self, request),
        fields(exchange = %self.config.exchange_name, method = %request.method, url = %request.url)
    )]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ExchangeError> {
        let mut builder = self.client.request(request.method, &request.url);

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ExchangeError::NetworkError(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            ExchangeError::NetworkError(format!("Failed to read response body: {}", e))
        })?;

        trace!(status, "Response body: {}", body);

        Ok(HttpResponse { status, body })
    }
}

/// Build a query string from parameters, in the given order
pub fn create_query_string(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_keeps_order() {
        let qs = create_query_string(&[("accountType", "SPOT"), ("coin", "ARB")]);
        assert_eq!(qs, "accountType=SPOT&coin=ARB");
        assert_eq!(create_query_string(&[]), "");
    }

    #[test]
    fn test_builder_rejects_bad_proxy() {
        let config = RestClientConfig::new("bybit".to_string())
            .with_proxy(Some("http://[::1".to_string()));
        assert!(RestClientBuilder::new(config).build().is_err());
    }

    #[test]
    fn test_builder_without_proxy() {
        let config = RestClientConfig::new("kucoin".to_string()).with_timeout(5);
        assert!(RestClientBuilder::new(config).build().is_ok());
    }

    #[test]
    fn test_request_header_lookup() {
        let mut headers = HashMap::new();
        headers.insert("X-BAPI-SIGN".to_string(), "abc".to_string());
        let request = HttpRequest::get("https://example.com").with_headers(headers);
        assert_eq!(request.header("x-bapi-sign"), Some("abc"));
        assert!(request.header("missing").is_none());
    }
}
