//! A client for posting payloads to a Slack incoming webhook.

use crate::core::Payload;
use crate::notification::{ErrorHook, NotifyError, ACK_BODY};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Name of the form field that carries the JSON payload.
pub const PAYLOAD_FIELD: &str = "payload";

/// Performs the raw HTTP exchange with a webhook.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// Posts `payload` (already JSON-encoded) to `url` and returns the
    /// response body, whatever the status code.
    async fn post_payload(&self, url: &str, payload: &str) -> anyhow::Result<String>;
}

/// A `reqwest`-backed transport that posts the payload form-encoded.
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport. Without a timeout, an exchange runs until it
    /// completes or fails.
    pub fn new(timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl WebhookTransport for HttpTransport {
    async fn post_payload(&self, url: &str, payload: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .post(url)
            .form(&[(PAYLOAD_FIELD, payload)])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = %status, "Webhook responded");
        Ok(body)
    }
}

/// Delivers one payload per call and classifies the outcome.
#[derive(Clone)]
pub struct Dispatcher {
    webhook_url: String,
    transport: Arc<dyn WebhookTransport>,
    on_error: Option<ErrorHook>,
}

impl Dispatcher {
    pub fn new(webhook_url: String, transport: Arc<dyn WebhookTransport>) -> Self {
        Self {
            webhook_url,
            transport,
            on_error: None,
        }
    }

    /// Installs the observer that is told about every failed delivery.
    pub fn with_error_hook(mut self, hook: ErrorHook) -> Self {
        self.on_error = Some(hook);
        self
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    /// Serializes and posts `payload`. Succeeds only when the webhook answers
    /// with the exact body `ok`.
    #[instrument(skip(self, payload), fields(channel = payload.channel.as_deref().unwrap_or("-")))]
    pub async fn dispatch(&self, payload: &Payload) -> Result<(), NotifyError> {
        let result = self.exchange(payload).await;

        match &result {
            Ok(()) => debug!("Slack accepted the message."),
            Err(e) => {
                error!(error = %e, "Failed to send Slack notification");
                if let Some(hook) = &self.on_error {
                    hook(e);
                }
            }
        }
        result
    }

    async fn exchange(&self, payload: &Payload) -> Result<(), NotifyError> {
        let encoded = serde_json::to_string(payload)?;
        let body = self
            .transport
            .post_payload(&self.webhook_url, &encoded)
            .await
            .map_err(NotifyError::Transport)?;

        if body == ACK_BODY {
            Ok(())
        } else {
            Err(NotifyError::Rejected { body })
        }
    }
}

#[cfg(test)]
mod slack_client_tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // A fake transport that records what it was asked to post.
    struct FakeTransport {
        reply: Result<String, String>,
        posted: Mutex<Vec<(String, String)>>,
    }

    impl FakeTransport {
        fn replying(body: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(body.to_string()),
                posted: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                posted: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl WebhookTransport for FakeTransport {
        async fn post_payload(&self, url: &str, payload: &str) -> anyhow::Result<String> {
            self.posted
                .lock()
                .unwrap()
                .push((url.to_string(), payload.to_string()));
            self.reply.clone().map_err(|e| anyhow::anyhow!(e))
        }
    }

    fn counting_hook() -> (ErrorHook, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let hook: ErrorHook = Arc::new(move |_: &NotifyError| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (hook, calls)
    }

    fn payload(text: &str) -> Payload {
        Payload {
            text: text.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_ok_body_is_success() {
        // Arrange
        let transport = FakeTransport::replying("ok");
        let (hook, calls) = counting_hook();
        let dispatcher =
            Dispatcher::new("https://hooks.test/x".into(), transport.clone()).with_error_hook(hook);

        // Act
        let result = dispatcher.dispatch(&payload("hello")).await;

        // Assert
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let posted = transport.posted.lock().unwrap();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].0, "https://hooks.test/x");
        assert_eq!(posted[0].1, r#"{"text":"hello"}"#);
    }

    #[tokio::test]
    async fn test_other_body_is_rejected_with_body_as_message() {
        let (hook, calls) = counting_hook();
        let dispatcher = Dispatcher::new("https://hooks.test/x".into(), FakeTransport::replying("invalid_token"))
            .with_error_hook(hook);

        let err = dispatcher.dispatch(&payload("hello")).await.unwrap_err();

        assert!(matches!(err, NotifyError::Rejected { .. }));
        assert_eq!(err.to_string(), "invalid_token");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_near_miss_bodies_are_rejected() {
        for body in ["OK", "ok\n", " ok", ""] {
            let dispatcher = Dispatcher::new("https://hooks.test/x".into(), FakeTransport::replying(body));
            let err = dispatcher.dispatch(&payload("x")).await.unwrap_err();
            assert_eq!(err.to_string(), body);
        }
    }

    #[tokio::test]
    async fn test_transport_failure_reaches_hook_once() {
        let (hook, calls) = counting_hook();
        let dispatcher =
            Dispatcher::new("https://hooks.test/x".into(), FakeTransport::failing("connection reset"))
                .with_error_hook(hook);

        let err = dispatcher.dispatch(&payload("x")).await.unwrap_err();

        assert!(matches!(err, NotifyError::Transport(_)));
        assert_eq!(err.to_string(), "connection reset");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_http_transport_posts_form_field() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("payload="))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let dispatcher = Dispatcher::new(
            format!("{}/webhook", server.uri()),
            Arc::new(HttpTransport::default()),
        );

        // Act
        let result = dispatcher.dispatch(&payload("from wiremock")).await;

        // Assert
        assert!(result.is_ok());
        let requests = server.received_requests().await.unwrap();
        let form: Vec<(String, String)> = serde_urlencoded::from_bytes(&requests[0].body).unwrap();
        assert_eq!(form.len(), 1);
        assert_eq!(form[0].0, "payload");
        let sent: Payload = serde_json::from_str(&form[0].1).unwrap();
        assert_eq!(sent, payload("from wiremock"));
    }

    #[tokio::test]
    async fn test_http_error_status_is_classified_by_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("channel_not_found"))
            .mount(&server)
            .await;

        let dispatcher = Dispatcher::new(server.uri(), Arc::new(HttpTransport::default()));
        let err = dispatcher.dispatch(&payload("x")).await.unwrap_err();

        assert!(matches!(err, NotifyError::Rejected { .. }));
        assert_eq!(err.to_string(), "channel_not_found");
    }

    #[test]
    fn test_http_transport_timeout() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            // Arrange
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_string("ok")
                        .set_delay(Duration::from_secs(2)),
                )
                .mount(&server)
                .await;

            let transport = HttpTransport::new(Some(Duration::from_millis(500))).unwrap();
            let dispatcher = Dispatcher::new(server.uri(), Arc::new(transport));

            // Act
            let err = dispatcher.dispatch(&payload("x")).await.unwrap_err();

            // Assert
            let cause = match err {
                NotifyError::Transport(cause) => cause,
                other => panic!("expected a transport error, got {other}"),
            };
            let is_timeout = cause
                .chain()
                .any(|c| c.downcast_ref::<reqwest::Error>().is_some_and(|e| e.is_timeout()));
            assert!(is_timeout, "Error should be a timeout error, but was: {}", cause);
        });
    }
}
