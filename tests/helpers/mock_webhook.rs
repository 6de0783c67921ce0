//! A wiremock-backed stand-in for a Slack incoming webhook.

use slack_notify::Payload;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const WEBHOOK_PATH: &str = "/services/T000/B000/XXXX";

pub struct MockWebhook {
    pub server: MockServer,
}

impl MockWebhook {
    /// Starts a webhook that answers every form POST with `status` and `body`.
    pub async fn replying(status: u16, body: &str) -> Self {
        Self::start(ResponseTemplate::new(status).set_body_string(body)).await
    }

    /// Starts a webhook that acknowledges after `delay`.
    pub async fn delayed(delay: Duration) -> Self {
        Self::start(
            ResponseTemplate::new(200)
                .set_body_string("ok")
                .set_delay(delay),
        )
        .await
    }

    async fn start(response: ResponseTemplate) -> Self {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(WEBHOOK_PATH))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .respond_with(response)
            .mount(&server)
            .await;
        Self { server }
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.server.uri(), WEBHOOK_PATH)
    }

    /// Decodes the `payload` form field of every request received so far.
    pub async fn received_payloads(&self) -> Vec<Payload> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| {
                let form: Vec<(String, String)> =
                    serde_urlencoded::from_bytes(&request.body).expect("form-encoded body");
                let (_, json) = form
                    .into_iter()
                    .find(|(key, _)| key == "payload")
                    .expect("payload field");
                serde_json::from_str(&json).expect("JSON payload")
            })
            .collect()
    }

    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }
}
