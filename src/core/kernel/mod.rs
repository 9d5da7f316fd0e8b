/// Transport kernel shared by every exchange
///
/// - `rest`: the injected `HttpTransport` capability and its reqwest implementation
/// - `signer`: the `Signer` interface and HMAC helpers
/// - `retry`: the error-classifying retry loop (`RetryingRest`)
///
/// Nothing in here knows about a particular exchange. Exchange modules supply
/// a `Signer` and a `ResponseClassifier`; the kernel supplies dispatch and retry.
///
/// ```rust,no_run
/// use lotus_autosell::core::kernel::*;
///
/// # fn example() -> Result<(), lotus_autosell::ExchangeError> {
/// let transport = RestClientBuilder::new(
///     RestClientConfig::new("bybit".to_string()).with_timeout(10),
/// )
/// .build()?;
/// # let _ = transport;
/// # Ok(())
/// # }
/// ```
pub mod rest;
pub mod retry;
pub mod signer;

pub use rest::{
    create_query_string, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport,
    RestClientBuilder, RestClientConfig,
};
pub use retry::{ResponseClassifier, RetryPolicy, RetryingRest, Verdict};
pub use signer::{hmac_sha256, timestamp_millis, SignatureResult, Signer};
