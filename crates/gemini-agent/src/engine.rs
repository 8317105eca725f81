use crate::error::AgentError;
use crate::transport::ModelTransport;
use crate::wire::{ActionResponse, GenerateRequest, GenerateResponse};
use crate::Result;
use foreman_core::session::ChatMessage;
use std::time::Duration;
use tracing::{debug, warn};

// ─── RetryPolicy ──────────────────────────────────────────────────────────

/// Bounded exponential backoff for transport failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_secs(2),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Deterministic millisecond delays for tests.
    pub fn fast() -> Self {
        RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(1),
            jitter: false,
        }
    }

    /// Backoff after failed attempt `attempt` (1-based):
    /// `base_delay * 2^(attempt-1)`, plus up to 50% uniform jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let base = self.base_delay.saturating_mul(1u32 << exp);
        if self.jitter {
            base.mul_f64(1.0 + rand::random::<f64>() * 0.5)
        } else {
            base
        }
    }
}

/// How many times a malformed reply may be sent back for reformatting
/// before the turn fails. Deliberately independent of the transport retry
/// budget.
pub const DEFAULT_REPAIR_LIMIT: u32 = 3;

// ─── Engine ───────────────────────────────────────────────────────────────

/// The conversation engine: one `send` per user turn.
pub struct Engine<T: ModelTransport> {
    transport: T,
    retry: RetryPolicy,
    repair_limit: u32,
}

impl<T: ModelTransport> Engine<T> {
    pub fn new(transport: T) -> Self {
        Engine {
            transport,
            retry: RetryPolicy::default(),
            repair_limit: DEFAULT_REPAIR_LIMIT,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_repair_limit(mut self, limit: u32) -> Self {
        self.repair_limit = limit;
        self
    }

    /// Append `user_text` to `history`, transmit the full history, and
    /// return the parsed [`ActionResponse`].
    ///
    /// Transport failures are retried with backoff up to
    /// `retry.max_attempts`. A reply that is not the advertised JSON shape
    /// is never surfaced as an action: a corrective message is appended and
    /// the request reissued, up to `repair_limit` times.
    ///
    /// On success the raw reply is appended as a model turn (context
    /// continuity). On failure the history is rolled back to hold exactly
    /// the pre-call turns plus the one new user turn — no orphan model
    /// message, no leftover repair prompts.
    pub async fn send(
        &self,
        history: &mut Vec<ChatMessage>,
        user_text: &str,
    ) -> Result<ActionResponse> {
        history.push(ChatMessage::user(user_text));
        let turn_start = history.len();

        let mut attempts = 0u32;
        let mut repairs_left = self.repair_limit;

        loop {
            let request = GenerateRequest::from_history(history);
            let body = match self.transport.generate(&request).await {
                Ok(body) => body,
                Err(e) => {
                    attempts += 1;
                    warn!(
                        attempt = attempts,
                        max = self.retry.max_attempts,
                        error = %e,
                        "model call failed"
                    );
                    if attempts >= self.retry.max_attempts {
                        history.truncate(turn_start);
                        return Err(AgentError::RetriesExhausted(self.retry.max_attempts));
                    }
                    tokio::time::sleep(self.retry.delay_for(attempts)).await;
                    continue;
                }
            };

            match parse_reply(&body) {
                Ok((raw, parsed)) => {
                    history.push(ChatMessage::model(raw));
                    return Ok(parsed);
                }
                Err(reason) => {
                    if repairs_left == 0 {
                        history.truncate(turn_start);
                        return Err(AgentError::RepairExhausted(self.repair_limit));
                    }
                    repairs_left -= 1;
                    debug!(%reason, repairs_left, "malformed reply, requesting reformat");
                    history.push(ChatMessage::user(repair_prompt(&reason)));
                }
            }
        }
    }
}

// ─── Reply handling ───────────────────────────────────────────────────────

/// Navigate the generateContent envelope and parse the generated text.
/// Returns the raw generated text (for history continuity) and the parsed
/// response, or a human-readable reason usable in a repair prompt.
fn parse_reply(body: &str) -> std::result::Result<(String, ActionResponse), String> {
    let envelope: GenerateResponse =
        serde_json::from_str(body).map_err(|e| format!("unparseable response body: {e}"))?;
    let raw = envelope
        .first_text()
        .ok_or_else(|| "response contained no candidates".to_string())?;
    let parsed = ActionResponse::parse(raw).map_err(|e| e.to_string())?;
    Ok((raw.to_string(), parsed))
}

fn repair_prompt(reason: &str) -> String {
    format!(
        "The previous response was not a valid JSON object. Please re-format \
         your response into a single JSON object with 'message', \
         'requires_approval', and 'action' keys. The error was: {reason}"
    )
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use async_trait::async_trait;
    use foreman_core::action::Action;
    use foreman_core::session::ChatRole;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Plays back a fixed script of transport results, counting calls.
    struct ScriptedTransport {
        script: Mutex<VecDeque<std::result::Result<String, TransportError>>>,
        calls: AtomicU32,
    }

    impl ScriptedTransport {
        fn new(script: Vec<std::result::Result<String, TransportError>>) -> Self {
            ScriptedTransport {
                script: Mutex::new(script.into()),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelTransport for ScriptedTransport {
        async fn generate(
            &self,
            _req: &GenerateRequest,
        ) -> std::result::Result<String, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(unavailable()))
        }
    }

    fn unavailable() -> TransportError {
        TransportError::Status {
            status: 503,
            body: "unavailable".into(),
        }
    }

    /// Wrap generated text in a generateContent response envelope.
    fn envelope(text: &str) -> String {
        json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": text}]}}
            ]
        })
        .to_string()
    }

    fn good_reply() -> String {
        envelope(
            r#"{"message":"done","requires_approval":false,"action":{"command":"no_action","payload":{}}}"#,
        )
    }

    fn engine(transport: ScriptedTransport) -> Engine<ScriptedTransport> {
        Engine::new(transport).with_retry(RetryPolicy::fast())
    }

    #[tokio::test]
    async fn success_appends_user_then_model_turn() {
        let eng = engine(ScriptedTransport::new(vec![Ok(good_reply())]));
        let mut history = vec![ChatMessage::user("system prompt")];

        let resp = eng.send(&mut history, "make a project").await.unwrap();

        assert_eq!(resp.message, "done");
        assert!(!resp.requires_approval);
        assert!(matches!(resp.action, Action::NoAction));
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].role, ChatRole::User);
        assert_eq!(history[1].text, "make a project");
        assert_eq!(history[2].role, ChatRole::Model);
        assert!(history[2].text.contains("\"command\":\"no_action\""));
    }

    #[tokio::test]
    async fn transport_failures_retry_then_fail_cleanly() {
        let eng = engine(ScriptedTransport::new(vec![
            Err(unavailable()),
            Err(unavailable()),
            Err(unavailable()),
            Err(unavailable()),
            Err(unavailable()),
        ]));
        let mut history = vec![ChatMessage::user("system prompt")];

        let err = eng.send(&mut history, "hello").await.unwrap_err();

        assert!(matches!(err, AgentError::RetriesExhausted(5)));
        assert_eq!(eng.transport.calls(), 5);
        // The just-submitted user turn is retained; nothing else from the
        // failed turn survives.
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].text, "hello");
    }

    #[tokio::test]
    async fn transport_recovers_within_the_budget() {
        let eng = engine(ScriptedTransport::new(vec![
            Err(unavailable()),
            Err(unavailable()),
            Ok(good_reply()),
        ]));
        let mut history = Vec::new();

        let resp = eng.send(&mut history, "hello").await.unwrap();
        assert_eq!(resp.message, "done");
        assert_eq!(eng.transport.calls(), 3);
    }

    #[tokio::test]
    async fn malformed_reply_gets_a_repair_prompt_then_succeeds() {
        let eng = engine(ScriptedTransport::new(vec![
            Ok(envelope("this is not the JSON you are looking for")),
            Ok(good_reply()),
        ]));
        let mut history = Vec::new();

        let resp = eng.send(&mut history, "hello").await.unwrap();

        assert_eq!(resp.message, "done");
        // user turn, corrective user turn, model turn
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].role, ChatRole::User);
        assert!(history[1].text.contains("was not a valid JSON object"));
        assert_eq!(history[2].role, ChatRole::Model);
    }

    #[tokio::test]
    async fn repair_budget_is_bounded_and_independent() {
        let eng = engine(ScriptedTransport::new(vec![
            Ok(envelope("junk")),
            Ok(envelope("junk")),
            Ok(envelope("junk")),
            Ok(envelope("junk")),
        ]));
        let mut history = vec![ChatMessage::user("system prompt")];

        let err = eng.send(&mut history, "hello").await.unwrap_err();

        assert!(matches!(err, AgentError::RepairExhausted(3)));
        // 1 original + 3 repairs, none of which touched the retry budget.
        assert_eq!(eng.transport.calls(), 4);
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].text, "hello");
    }

    #[tokio::test]
    async fn missing_candidates_is_repaired_not_fatal() {
        let eng = engine(ScriptedTransport::new(vec![
            Ok("{}".to_string()),
            Ok(good_reply()),
        ]));
        let mut history = Vec::new();

        let resp = eng.send(&mut history, "hello").await.unwrap();
        assert_eq!(resp.message, "done");
        assert_eq!(eng.transport.calls(), 2);
    }

    #[tokio::test]
    async fn unknown_command_is_a_valid_reply_not_a_repair() {
        let eng = engine(ScriptedTransport::new(vec![Ok(envelope(
            r#"{"message":"hm","requires_approval":false,"action":{"command":"frobnicate","payload":{}}}"#,
        ))]));
        let mut history = Vec::new();

        let resp = eng.send(&mut history, "hello").await.unwrap();
        assert!(matches!(resp.action, Action::Unknown(c) if c == "frobnicate"));
        assert_eq!(eng.transport.calls(), 1);
    }

    #[test]
    fn delay_doubles_per_attempt_without_jitter() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_secs(2),
            jitter: false,
        };
        let delays: Vec<u64> = (1..=5).map(|a| policy.delay_for(a).as_secs()).collect();
        assert_eq!(delays, vec![2, 4, 8, 16, 32]);
    }

    #[test]
    fn jittered_delay_stays_within_half_of_base() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_secs(2),
            jitter: true,
        };
        for _ in 0..100 {
            let d = policy.delay_for(3);
            assert!(d >= Duration::from_secs(8));
            assert!(d <= Duration::from_secs(12));
        }
    }
}
