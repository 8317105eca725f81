use crate::milestone::Milestone;
use crate::paths::CREATE_DIR_SENTINEL;
use crate::presentation::PresentationPlan;
use serde::Deserialize;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Payload shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitProjectPayload {
    #[serde(default)]
    pub project_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFilesPayload {
    /// Informational only: the executor always lists the active project root.
    #[serde(default)]
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MilestonesPayload {
    pub milestones: Vec<Milestone>,
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A single structured instruction parsed from a model reply.
///
/// Payloads are fully typed; the only `serde_json::Value` in the pipeline is
/// the envelope's raw payload, which is schema-polymorphic by command.
#[derive(Debug, Clone)]
pub enum Action {
    InitProject(InitProjectPayload),
    /// path → content; the `__CREATE_DIR__` sentinel value means "create
    /// this path as an empty directory".
    CreateFiles(BTreeMap<String, String>),
    ListFiles(ListFilesPayload),
    Milestones(MilestonesPayload),
    CreatePresentationPlan(PresentationPlan),
    NoAction,
    /// Any command string outside the known vocabulary. Reported by the
    /// executor, never fatal.
    Unknown(String),
}

impl Action {
    /// Convert an envelope `{command, payload}` into a typed action.
    ///
    /// A known command with a payload that does not match its schema is an
    /// error — the engine treats that as a malformed reply and asks the
    /// model to reformat. An *unrecognized* command parses successfully to
    /// [`Action::Unknown`] so the executor can report it.
    pub fn from_envelope(
        command: &str,
        payload: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match command {
            "init_project" => Action::InitProject(serde_json::from_value(payload)?),
            "create_files" => Action::CreateFiles(serde_json::from_value(payload)?),
            "list_files" => Action::ListFiles(serde_json::from_value(payload)?),
            "milestones" => Action::Milestones(serde_json::from_value(payload)?),
            "create_presentation_plan" => {
                Action::CreatePresentationPlan(serde_json::from_value(payload)?)
            }
            "no_action" => Action::NoAction,
            other => Action::Unknown(other.to_string()),
        })
    }

    /// The approval-gate description: a short statement of the pending
    /// filesystem effect, derived mechanically from the payload (never from
    /// the model's free-text message). `None` for actions with nothing to
    /// approve.
    pub fn describe(&self) -> Option<String> {
        match self {
            Action::InitProject(p) => {
                let name = p.project_name.as_deref().unwrap_or("(unnamed)");
                Some(format!("create the project directory named '{name}'."))
            }
            Action::CreateFiles(entries) => {
                let dirs: Vec<&str> = entries
                    .iter()
                    .filter(|(_, v)| v.as_str() == CREATE_DIR_SENTINEL)
                    .map(|(k, _)| k.as_str())
                    .collect();
                let files: Vec<&str> = entries
                    .iter()
                    .filter(|(_, v)| v.as_str() != CREATE_DIR_SENTINEL)
                    .map(|(k, _)| k.as_str())
                    .collect();
                match (files.is_empty(), dirs.is_empty()) {
                    (false, false) => Some(format!(
                        "create the following directories: {} and files: {}.",
                        dirs.join(", "),
                        files.join(", ")
                    )),
                    (false, true) => {
                        Some(format!("create the following files: {}.", files.join(", ")))
                    }
                    (true, false) => Some(format!(
                        "create the following directories: {}.",
                        dirs.join(", ")
                    )),
                    (true, true) => None,
                }
            }
            Action::Milestones(_) => Some("update the project milestones.".to_string()),
            Action::CreatePresentationPlan(plan) => Some(format!(
                "create a Markdown file for the '{}' presentation.",
                plan.title
            )),
            Action::ListFiles(_) | Action::NoAction | Action::Unknown(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn init_project_with_and_without_name() {
        let a = Action::from_envelope("init_project", json!({"project_name": "demo"})).unwrap();
        let Action::InitProject(p) = a else {
            panic!("expected InitProject")
        };
        assert_eq!(p.project_name.as_deref(), Some("demo"));

        let a = Action::from_envelope("init_project", json!({})).unwrap();
        let Action::InitProject(p) = a else {
            panic!("expected InitProject")
        };
        assert!(p.project_name.is_none());
    }

    #[test]
    fn create_files_payload_is_a_path_map() {
        let a = Action::from_envelope(
            "create_files",
            json!({"src/main.rs": "fn main() {}", "assets": "__CREATE_DIR__"}),
        )
        .unwrap();
        let Action::CreateFiles(map) = a else {
            panic!("expected CreateFiles")
        };
        assert_eq!(map.len(), 2);
        assert_eq!(map["assets"], CREATE_DIR_SENTINEL);
    }

    #[test]
    fn known_command_with_bad_payload_is_an_error() {
        // milestones requires a list, not a string
        let err = Action::from_envelope("milestones", json!({"milestones": "nope"}));
        assert!(err.is_err());

        let err = Action::from_envelope("create_files", json!({"a.txt": 42}));
        assert!(err.is_err());
    }

    #[test]
    fn unrecognized_command_parses_to_unknown() {
        let a = Action::from_envelope("deploy_to_prod", json!({"anything": true})).unwrap();
        assert!(matches!(a, Action::Unknown(c) if c == "deploy_to_prod"));
    }

    #[test]
    fn describe_create_files_splits_dirs_and_files() {
        let a = Action::from_envelope(
            "create_files",
            json!({"src/main.rs": "", "assets": "__CREATE_DIR__"}),
        )
        .unwrap();
        let desc = a.describe().unwrap();
        assert!(desc.contains("directories: assets"));
        assert!(desc.contains("files: src/main.rs"));
    }

    #[test]
    fn describe_is_none_for_read_only_actions() {
        assert!(Action::NoAction.describe().is_none());
        assert!(Action::ListFiles(ListFilesPayload::default())
            .describe()
            .is_none());
        assert!(Action::Unknown("x".into()).describe().is_none());
    }

    #[test]
    fn describe_presentation_names_the_title() {
        let a = Action::from_envelope(
            "create_presentation_plan",
            json!({"title": "Q3 Review", "audience": "Execs", "slides": []}),
        )
        .unwrap();
        assert_eq!(
            a.describe().unwrap(),
            "create a Markdown file for the 'Q3 Review' presentation."
        );
    }
}
