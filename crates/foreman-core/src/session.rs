use crate::error::{ForemanError, Result};
use crate::io::atomic_write;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ChatMessage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One conversational turn. The ordered history is the model's context
/// window: it is never reordered or deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The resumable session state: active project root plus the running
/// conversation. Persisted as a full-file overwrite after every executed
/// action or approval decision. The `root_dir`/`chat_history` keys are the
/// on-disk contract inherited from earlier versions of the tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub root_dir: Option<PathBuf>,
    #[serde(rename = "chat_history")]
    pub history: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Load a previously saved session. Missing file means a fresh start,
    /// not an error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.saved_at = Some(Utc::now());
        let data = serde_json::to_string_pretty(self)?;
        atomic_write(path, data.as_bytes())
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.history.push(ChatMessage::user(text));
    }

    pub fn push_model(&mut self, text: impl Into<String>) {
        self.history.push(ChatMessage::model(text));
    }

    /// The active project root, or `ProjectNotInitialized` when no
    /// init_project has run yet.
    pub fn require_root(&self) -> Result<&Path> {
        self.root_dir
            .as_deref()
            .ok_or(ForemanError::ProjectNotInitialized)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_returns_none_when_no_file() {
        let dir = TempDir::new().unwrap();
        let loaded = Session::load(&dir.path().join("none.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn round_trip_preserves_root_and_ordered_history() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        let mut session = Session {
            root_dir: Some(PathBuf::from("/tmp/demo_app")),
            ..Default::default()
        };
        session.push_user("make me a project");
        session.push_model("{\"message\":\"sure\"}");
        session.push_user("now list files");
        session.save(&path).unwrap();

        let loaded = Session::load(&path).unwrap().unwrap();
        assert_eq!(loaded.root_dir, Some(PathBuf::from("/tmp/demo_app")));
        assert_eq!(loaded.history, session.history);
    }

    #[test]
    fn save_overwrites_previous_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        let mut session = Session::default();
        session.push_user("one");
        session.save(&path).unwrap();

        session.push_model("two");
        session.save(&path).unwrap();

        let loaded = Session::load(&path).unwrap().unwrap();
        assert_eq!(loaded.history.len(), 2);
    }

    #[test]
    fn require_root_errors_until_initialized() {
        let mut session = Session::default();
        assert!(matches!(
            session.require_root(),
            Err(ForemanError::ProjectNotInitialized)
        ));

        session.root_dir = Some(PathBuf::from("/tmp/p"));
        assert_eq!(session.require_root().unwrap(), Path::new("/tmp/p"));
    }

    #[test]
    fn on_disk_keys_match_the_contract() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let mut session = Session {
            root_dir: Some(PathBuf::from("p")),
            ..Default::default()
        };
        session.push_user("hi");
        session.save(&path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw.get("root_dir").is_some());
        assert!(raw.get("chat_history").is_some());
        assert_eq!(raw["chat_history"][0]["role"], "user");
    }
}
