use crate::action::Action;
use crate::error::{ForemanError, Result};
use crate::io::ensure_dir;
use crate::milestone::MilestoneSet;
use crate::paths::CREATE_DIR_SENTINEL;
use crate::session::Session;
use std::fmt;
use std::path::{Component, Path, PathBuf};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Done,
    /// Precondition not met; nothing was attempted.
    Skipped(String),
    /// Attempted and failed; the rest of the batch still runs.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub subject: String,
    pub status: OutcomeStatus,
}

impl Outcome {
    fn done(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            status: OutcomeStatus::Done,
        }
    }

    fn skipped(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            status: OutcomeStatus::Skipped(reason.into()),
        }
    }

    fn failed(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            status: OutcomeStatus::Failed(reason.into()),
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == OutcomeStatus::Done
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            OutcomeStatus::Done => write!(f, "{}", self.subject),
            OutcomeStatus::Skipped(reason) => write!(f, "skipped {}: {reason}", self.subject),
            OutcomeStatus::Failed(reason) => write!(f, "failed {}: {reason}", self.subject),
        }
    }
}

/// Per-item report for one executed action. `listing` carries the rendered
/// tree for list_files.
#[derive(Debug, Default)]
pub struct ExecutionResult {
    pub outcomes: Vec<Outcome>,
    pub listing: Option<String>,
}

impl ExecutionResult {
    fn single(outcome: Outcome) -> Self {
        Self {
            outcomes: vec![outcome],
            listing: None,
        }
    }
}

// ---------------------------------------------------------------------------
// execute
// ---------------------------------------------------------------------------

/// Perform the local effect of `action` against the session's project root.
///
/// Every failure is reported in an [`Outcome`] rather than returned: local
/// I/O trouble never aborts the remaining batch or the process. The only
/// mutation besides the filesystem is setting `session.root_dir` on a
/// successful init_project.
pub fn execute(action: &Action, session: &mut Session, cwd: &Path) -> ExecutionResult {
    match action {
        Action::InitProject(payload) => {
            let Some(name) = payload.project_name.as_deref() else {
                return ExecutionResult::single(Outcome::failed(
                    "project directory",
                    ForemanError::MissingProjectName.to_string(),
                ));
            };
            let root = cwd.join(name);
            match ensure_dir(&root) {
                Ok(()) => {
                    session.root_dir = Some(root.clone());
                    ExecutionResult::single(Outcome::done(format!(
                        "created project directory: {}",
                        root.display()
                    )))
                }
                Err(e) => ExecutionResult::single(Outcome::failed(
                    format!("project directory {}", root.display()),
                    e.to_string(),
                )),
            }
        }

        Action::CreateFiles(entries) => {
            let root = match session.require_root() {
                Ok(root) => root.to_path_buf(),
                Err(e) => {
                    return ExecutionResult::single(Outcome::skipped("create_files", e.to_string()))
                }
            };
            let mut outcomes = Vec::with_capacity(entries.len());
            for (rel, content) in entries {
                outcomes.push(create_entry(&root, rel, content));
            }
            ExecutionResult {
                outcomes,
                listing: None,
            }
        }

        Action::ListFiles(_) => {
            // The payload's directory argument is informational only; the
            // listing always covers the active project root.
            let root = match session.require_root() {
                Ok(root) => root.to_path_buf(),
                Err(e) => {
                    return ExecutionResult::single(Outcome::skipped("list_files", e.to_string()))
                }
            };
            match render_tree(&root) {
                Ok(listing) => ExecutionResult {
                    outcomes: vec![Outcome::done(format!(
                        "directory structure for '{}'",
                        root.file_name().unwrap_or_default().to_string_lossy()
                    ))],
                    listing: Some(listing),
                },
                Err(e) => {
                    ExecutionResult::single(Outcome::failed("directory listing", e.to_string()))
                }
            }
        }

        Action::Milestones(payload) => {
            let root = match session.require_root() {
                Ok(root) => root.to_path_buf(),
                Err(e) => {
                    return ExecutionResult::single(Outcome::skipped("milestones", e.to_string()))
                }
            };
            let set = MilestoneSet::new(payload.milestones.clone());
            match set.save(&root) {
                Ok(path) => ExecutionResult::single(Outcome::done(format!(
                    "updated milestones in '{}'",
                    path.display()
                ))),
                Err(e) => {
                    ExecutionResult::single(Outcome::failed("milestone file", e.to_string()))
                }
            }
        }

        Action::CreatePresentationPlan(plan) => {
            let root = match session.require_root() {
                Ok(root) => root.to_path_buf(),
                Err(e) => {
                    return ExecutionResult::single(Outcome::skipped(
                        "presentation plan",
                        e.to_string(),
                    ))
                }
            };
            match plan.save(&root) {
                Ok(path) => ExecutionResult::single(Outcome::done(format!(
                    "created presentation plan at '{}'",
                    path.display()
                ))),
                Err(e) => {
                    ExecutionResult::single(Outcome::failed("presentation plan", e.to_string()))
                }
            }
        }

        Action::NoAction => ExecutionResult::default(),

        Action::Unknown(command) => ExecutionResult::single(Outcome::failed(
            "action",
            format!("unknown command '{command}'"),
        )),
    }
}

/// Create one create_files entry: a directory when the content is the
/// sentinel, otherwise a file with its parents.
fn create_entry(root: &Path, rel: &str, content: &str) -> Outcome {
    let path = match resolve_in_root(root, rel) {
        Ok(path) => path,
        Err(e) => return Outcome::failed(format!("path {rel}"), e.to_string()),
    };
    if content == CREATE_DIR_SENTINEL {
        match ensure_dir(&path) {
            Ok(()) => Outcome::done(format!("created directory: {}", path.display())),
            Err(e) => Outcome::failed(format!("directory {rel}"), e.to_string()),
        }
    } else {
        let write = || -> Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, content)?;
            Ok(())
        };
        match write() {
            Ok(()) => Outcome::done(format!("created file: {}", path.display())),
            Err(e) => Outcome::failed(format!("file {rel}"), e.to_string()),
        }
    }
}

/// Join `rel` under `root`, rejecting absolute paths and any `..` component
/// so a payload cannot write outside the project directory.
fn resolve_in_root(root: &Path, rel: &str) -> Result<PathBuf> {
    let rel_path = Path::new(rel);
    if rel_path.is_absolute() {
        return Err(ForemanError::PathEscapesRoot(rel.to_string()));
    }
    for component in rel_path.components() {
        match component {
            Component::ParentDir | Component::Prefix(_) | Component::RootDir => {
                return Err(ForemanError::PathEscapesRoot(rel.to_string()))
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }
    Ok(root.join(rel_path))
}

// ---------------------------------------------------------------------------
// Tree listing
// ---------------------------------------------------------------------------

/// Indented tree of everything under `root`: each directory line ends with
/// `/`, its files follow (sorted), then its subdirectories (sorted), four
/// spaces of indent per level.
pub fn render_tree(root: &Path) -> std::io::Result<String> {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());
    let mut out = String::new();
    walk(root, &name, 0, &mut out)?;
    Ok(out)
}

fn walk(dir: &Path, name: &str, depth: usize, out: &mut String) -> std::io::Result<()> {
    let indent = "    ".repeat(depth);
    out.push_str(&indent);
    out.push_str(name);
    out.push_str("/\n");

    let mut files: Vec<String> = Vec::new();
    let mut dirs: Vec<(PathBuf, String)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let entry_name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_dir() {
            dirs.push((entry.path(), entry_name));
        } else {
            files.push(entry_name);
        }
    }
    files.sort();
    dirs.sort_by(|a, b| a.1.cmp(&b.1));

    let child_indent = "    ".repeat(depth + 1);
    for file in files {
        out.push_str(&child_indent);
        out.push_str(&file);
        out.push('\n');
    }
    for (path, dir_name) in dirs {
        walk(&path, &dir_name, depth + 1, out)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
