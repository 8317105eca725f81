use crate::error::Result;
use crate::io::atomic_write;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// MilestoneStatus
// ---------------------------------------------------------------------------

/// Status strings are spelled exactly as the model produces them
/// ("Not Started", "In Progress", "Complete"); anything else is a
/// deserialization error, which the engine treats as a malformed reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MilestoneStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Complete,
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MilestoneStatus::NotStarted => "Not Started",
            MilestoneStatus::InProgress => "In Progress",
            MilestoneStatus::Complete => "Complete",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Milestone / MilestoneSet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub name: String,
    pub status: MilestoneStatus,
    pub notes: String,
}

/// The full milestone list for a project. The on-disk file is replaced
/// wholesale on every save; there is no merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MilestoneSet {
    pub milestones: Vec<Milestone>,
}

impl MilestoneSet {
    pub fn new(milestones: Vec<Milestone>) -> Self {
        Self { milestones }
    }

    /// Overwrite `<root>/milestones.json` with this set.
    pub fn save(&self, root: &Path) -> Result<PathBuf> {
        let path = paths::milestone_path(root);
        let data = serde_json::to_string_pretty(self)?;
        atomic_write(&path, data.as_bytes())?;
        Ok(path)
    }

    pub fn load(root: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(paths::milestone_path(root))?;
        Ok(serde_json::from_str(&data)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
