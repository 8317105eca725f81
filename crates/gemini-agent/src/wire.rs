use foreman_core::action::Action;
use foreman_core::session::{ChatMessage, ChatRole};
use serde::{Deserialize, Serialize};

// ─── generateContent request ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// One history entry on the wire. The endpoint accepts only the literal
/// role strings `"user"` and `"model"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    fn from_message(msg: &ChatMessage) -> Self {
        let role = match msg.role {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        };
        Content {
            role: role.to_string(),
            parts: vec![Part {
                text: msg.text.clone(),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateRequest {
    /// Build a request carrying the entire ordered history, with the
    /// directive to answer only in the structured JSON mime type.
    pub fn from_history(history: &[ChatMessage]) -> Self {
        GenerateRequest {
            contents: history.iter().map(Content::from_message).collect(),
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        }
    }
}

// ─── generateContent response ─────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Content,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// The generated text at `candidates[0].content.parts[0].text`.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .parts
            .first()
            .map(|p| p.text.as_str())
    }
}

// ─── ActionResponse ───────────────────────────────────────────────────────

/// The model's structured reply: a conversational message, an approval
/// flag, and one typed action.
#[derive(Debug, Clone)]
pub struct ActionResponse {
    pub message: String,
    pub requires_approval: bool,
    pub action: Action,
}

#[derive(Debug, Deserialize)]
struct ActionResponseWire {
    message: String,
    requires_approval: bool,
    action: ActionEnvelope,
}

#[derive(Debug, Deserialize)]
struct ActionEnvelope {
    command: String,
    #[serde(default)]
    payload: serde_json::Value,
}

impl ActionResponse {
    /// Strictly parse the model's generated text.
    ///
    /// Every field's presence and type is validated before dispatch; any
    /// mismatch with the advertised schema is an error so the engine can
    /// treat it as a malformed reply. Unrecognized command strings are not
    /// errors — they become [`Action::Unknown`] for the executor to report.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let wire: ActionResponseWire = serde_json::from_str(raw)?;
        let action = Action::from_envelope(&wire.action.command, wire.action.payload)?;
        Ok(ActionResponse {
            message: wire.message,
            requires_approval: wire.requires_approval,
            action,
        })
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
