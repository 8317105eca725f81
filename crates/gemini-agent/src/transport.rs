use crate::error::TransportError;
use crate::wire::GenerateRequest;
use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The seam between the engine and the remote model. Production uses
/// [`HttpTransport`]; tests inject scripted fakes.
///
/// Returns the raw response body: navigation into the generateContent
/// envelope happens in the engine, where a malformed body is handled as a
/// reply-format problem rather than a transport one.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    async fn generate(&self, req: &GenerateRequest) -> Result<String, TransportError>;
}

// ─── HttpTransport ────────────────────────────────────────────────────────

/// Blocking-per-turn reqwest client for the generateContent endpoint.
/// One outstanding request at a time; there is no cancellation path.
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    /// `base_url` is joined as `{base_url}/models/{model}:generateContent`;
    /// the key travels as a query parameter per the endpoint's contract.
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let base = base_url.trim_end_matches('/');
        Ok(HttpTransport {
            client,
            url: format!("{base}/models/{model}:generateContent?key={api_key}"),
        })
    }
}

#[async_trait]
impl ModelTransport for HttpTransport {
    async fn generate(&self, req: &GenerateRequest) -> Result<String, TransportError> {
        let response = self
            .client
            .post(&self.url)
            .json(req)
            .send()
            .await
            // The URL carries the API key; strip it before the error can
            // reach a log line.
            .map_err(|e| TransportError::Request(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.without_url()))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }
        Ok(body)
    }
}

/// First few hundred characters of a server error body, enough to surface
/// the endpoint's complaint without flooding the console.
fn snippet(body: &str) -> String {
    const MAX: usize = 300;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut cut = MAX;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}…", &body[..cut])
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
