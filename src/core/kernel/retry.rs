use crate::core::errors::ExchangeError;
use crate::core::kernel::rest::{HttpRequest, HttpTransport};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

/// How one parsed response body is judged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Success,
    /// Anything worth sending again: rate limits, clock skew, soft rejections
    Retry(String),
    /// Rejected for the caller's source address; the request must be re-signed
    InvalidRequestIp(String),
}

/// Exchange-specific reading of a response body
pub trait ResponseClassifier: Send + Sync {
    fn classify(&self, body: &Value) -> Verdict;
}

/// Retry bounds. The default retries forever with no pause between attempts.
///
/// `max_attempts` caps sends per `execute` call. KuCoin's invalid-ip handling
/// re-runs `execute` with a fresh signature and counts those cycles against the
/// same cap, so one logical request can send up to `max_attempts²` times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: Option<u32>,
    pub delay: Duration,
}

impl RetryPolicy {
    fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

/// Error-classifying wrapper around an `HttpTransport`
///
/// `execute` keeps dispatching until the classifier accepts a response body.
/// Transport errors, unparseable bodies and non-success markers all loop back
/// to dispatch. The only early exits are `InvalidRequestIp`, an error from
/// the request builder, and an exhausted `RetryPolicy`.
pub struct RetryingRest<T: HttpTransport, C: ResponseClassifier> {
    transport: T,
    classifier: C,
    policy: RetryPolicy,
    exchange_name: String,
}

impl<T: HttpTransport, C: ResponseClassifier> RetryingRest<T, C> {
    pub fn new(transport: T, classifier: C, exchange_name: impl Into<String>) -> Self {
        Self {
            transport,
            classifier,
            policy: RetryPolicy::default(),
            exchange_name: exchange_name.into(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Dispatch until success.
    ///
    /// `prepare` is called before every dispatch, so signed requests carry a
    /// fresh timestamp on each retry.
    pub async fn execute<F>(&self, prepare: F) -> Result<Value, ExchangeError>
    where
        F: Fn() -> Result<HttpRequest, ExchangeError> + Send + Sync,
    {
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let request = prepare()?;
            debug!(
                exchange = %self.exchange_name,
                attempt = attempts,
                method = %request.method,
                url = %request.url,
                "Dispatching request"
            );

            let failure = match self.transport.send(request).await {
                Ok(response) => match serde_json::from_str::<Value>(&response.body) {
                    Ok(body) => match self.classifier.classify(&body) {
                        Verdict::Success => return Ok(body),
                        Verdict::InvalidRequestIp(message) => {
                            error!(
                                exchange = %self.exchange_name,
                                status = response.status,
                                "Wrong response: {}",
                                response.body
                            );
                            return Err(ExchangeError::InvalidRequestIp(message));
                        }
                        Verdict::Retry(reason) => {
                            error!(
                                exchange = %self.exchange_name,
                                status = response.status,
                                attempt = attempts,
                                "Wrong response: {}",
                                response.body
                            );
                            reason
                        }
                    },
                    Err(e) => {
                        error!(
                            exchange = %self.exchange_name,
                            status = response.status,
                            attempt = attempts,
                            "Unexpected error: {}, response text: {}",
                            e,
                            response.body
                        );
                        e.to_string()
                    }
                },
                Err(e) => {
                    error!(
                        exchange = %self.exchange_name,
                        attempt = attempts,
                        "Unexpected error: {}",
                        e
                    );
                    e.to_string()
                }
            };

            if self.policy.exhausted(attempts) {
                return Err(ExchangeError::RetriesExhausted {
                    attempts,
                    last_error: failure,
                });
            }

            if !self.policy.delay.is_zero() {
                tokio::time::sleep(self.policy.delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kernel::rest::HttpResponse;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays a fixed list of outcomes; the last one repeats forever
    struct ScriptedTransport {
        script: Mutex<VecDeque<Result<&'static str, &'static str>>>,
        last: Result<&'static str, &'static str>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<&'static str, &'static str>>) -> Self {
            let last = *script.last().unwrap();
            Self {
                script: Mutex::new(script.into()),
                last,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, ExchangeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front().unwrap_or(self.last);
            match next {
                Ok(body) => Ok(HttpResponse {
                    status: 200,
                    body: body.to_string(),
                }),
                Err(e) => Err(ExchangeError::NetworkError(e.to_string())),
            }
        }
    }

    struct CodeClassifier;

    impl ResponseClassifier for CodeClassifier {
        fn classify(&self, body: &Value) -> Verdict {
            match body.get("code").and_then(Value::as_str) {
                Some("ok") => Verdict::Success,
                Some("ip") => Verdict::InvalidRequestIp("bad ip".to_string()),
                other => Verdict::Retry(format!("{:?}", other)),
            }
        }
    }

    fn client(
        script: Vec<Result<&'static str, &'static str>>,
    ) -> RetryingRest<std::sync::Arc<ScriptedTransport>, CodeClassifier> {
        let transport = std::sync::Arc::new(ScriptedTransport::new(script));
        RetryingRest::new(transport, CodeClassifier, "test")
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let rest = client(vec![
            Ok(r#"{"code":"busy"}"#),
            Ok(r#"{"code":"busy"}"#),
            Ok(r#"{"code":"ok","data":1}"#),
        ]);
        let prepared = AtomicUsize::new(0);

        let body = rest
            .execute(|| {
                prepared.fetch_add(1, Ordering::SeqCst);
                Ok(HttpRequest::get("http://localhost/x"))
            })
            .await
            .unwrap();

        assert_eq!(body["data"], 1);
        assert_eq!(rest.transport.calls.load(Ordering::SeqCst), 3);
        assert_eq!(prepared.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_invalid_ip_raised_after_one_attempt() {
        let rest = client(vec![Ok(r#"{"code":"ip"}"#), Ok(r#"{"code":"ok"}"#)]);

        let err = rest
            .execute(|| Ok(HttpRequest::get("http://localhost/x")))
            .await
            .unwrap_err();

        assert!(matches!(err, ExchangeError::InvalidRequestIp(_)));
        assert_eq!(rest.transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_and_parse_errors_are_retried() {
        let rest = client(vec![
            Err("connection reset"),
            Ok("<html>rate limited</html>"),
            Ok(r#"{"code":"ok"}"#),
        ]);

        let body = rest
            .execute(|| Ok(HttpRequest::get("http://localhost/x")))
            .await
            .unwrap();

        assert_eq!(body["code"], "ok");
        assert_eq!(rest.transport.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_max_attempts_caps_the_loop() {
        let rest = client(vec![Ok(r#"{"code":"busy"}"#)]).with_policy(RetryPolicy {
            max_attempts: Some(4),
            delay: Duration::ZERO,
        });

        let err = rest
            .execute(|| Ok(HttpRequest::get("http://localhost/x")))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ExchangeError::RetriesExhausted { attempts: 4, .. }
        ));
        assert_eq!(rest.transport.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_prepare_error_is_not_retried() {
        let rest = client(vec![Ok(r#"{"code":"ok"}"#)]);

        let err = rest
            .execute(|| Err(ExchangeError::AuthError("bad secret".to_string())))
            .await
            .unwrap_err();

        assert!(matches!(err, ExchangeError::AuthError(_)));
        assert_eq!(rest.transport.calls.load(Ordering::SeqCst), 0);
    }
}
