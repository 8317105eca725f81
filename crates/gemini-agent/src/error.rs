use std::path::PathBuf;
use thiserror::Error;

/// Transport-level failures: anything that stops a request/response cycle
/// before the model's generated text is in hand. These consume the retry
/// budget; malformed generated text does not (see the engine's repair loop).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("API key file not found: {0}")]
    KeyFileMissing(PathBuf),

    #[error("API key in '{0}' is missing or too short")]
    KeyFileInvalid(PathBuf),

    #[error("no response from the model after {0} attempts")]
    RetriesExhausted(u32),

    #[error("model kept returning malformed JSON after {0} reformat attempts")]
    RepairExhausted(u32),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
