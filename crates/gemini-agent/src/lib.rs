//! `gemini-agent` — the conversation engine behind the `foreman` CLI.
//!
//! Sends the full ordered chat history to a Gemini `generateContent`
//! endpoint and interprets the generated text as a structured
//! [`ActionResponse`].
//!
//! # Architecture
//!
//! ```text
//! Vec<ChatMessage>                    (foreman-core)
//!     │
//!     ▼
//! GenerateRequest   ← typed wire structs, responseMimeType = JSON
//!     │
//!     ▼
//! ModelTransport    ← trait seam: HttpTransport (reqwest) or test fakes
//!     │
//!     ▼
//! Engine::send      ← bounded backoff retry + bounded JSON-repair loop
//!     │
//!     ▼
//! ActionResponse    ← message + requires_approval + typed Action
//! ```
//!
//! Two failure budgets are tracked independently: transport failures
//! (timeouts, non-2xx, connection errors) consume the [`RetryPolicy`]
//! attempt budget with exponential backoff between attempts, while replies
//! that fail to parse as the advertised JSON shape consume a separate
//! repair budget — each repair appends a corrective message asking the
//! model to reformat and reissues the request. When either budget runs out
//! the turn fails cleanly: the history keeps the just-submitted user
//! message and nothing else from the failed turn.

pub mod credentials;
pub mod engine;
pub mod error;
pub mod prompt;
pub mod transport;
pub mod wire;

pub use credentials::load_api_key;
pub use engine::{Engine, RetryPolicy, DEFAULT_REPAIR_LIMIT};
pub use error::{AgentError, TransportError};
pub use prompt::{base_prompt, DECLINED_NOTICE};
pub use transport::{HttpTransport, ModelTransport, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use wire::{ActionResponse, GenerateRequest, GenerateResponse};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, AgentError>;
