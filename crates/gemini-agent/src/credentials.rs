use crate::error::AgentError;
use crate::Result;
use std::io::ErrorKind;
use std::path::Path;

/// Real Gemini keys are ~39 characters; anything shorter than this is a
/// placeholder or a paste accident.
pub const MIN_KEY_LEN: usize = 30;

/// Load the API key from a plain-text file, trimming surrounding
/// whitespace. Missing file and too-short key are distinct errors; both
/// are fatal at startup (the loop is never entered without a key).
pub fn load_api_key(path: &Path) -> Result<String> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AgentError::KeyFileMissing(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    let key = raw.trim();
    if key.len() < MIN_KEY_LEN {
        return Err(AgentError::KeyFileInvalid(path.to_path_buf()));
    }
    Ok(key.to_string())
}
