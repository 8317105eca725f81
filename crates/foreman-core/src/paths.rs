use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File-name constants
// ---------------------------------------------------------------------------

/// Milestone file written inside the project root. The model is told this
/// name in the system prompt, so it is part of the external contract.
pub const MILESTONE_FILE: &str = "milestones.json";

/// Default session-state file, kept in the working directory (not the
/// project root) so a session survives before any project is initialized.
pub const SESSION_FILE: &str = "foreman_session.json";

/// Default API-key file.
pub const KEY_FILE: &str = "api_key.txt";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn milestone_path(root: &Path) -> PathBuf {
    root.join(MILESTONE_FILE)
}

/// Content sentinel in a create_files payload meaning "create this path as
/// an empty directory" rather than a file.
pub const CREATE_DIR_SENTINEL: &str = "__CREATE_DIR__";

// ---------------------------------------------------------------------------
// Slugs
// ---------------------------------------------------------------------------

/// Derive a filesystem-safe slug from a human-readable title:
/// lowercase, whitespace runs become single hyphens, anything outside
/// `[a-z0-9._-]` is dropped, runs of hyphens collapse, edges are trimmed.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_hyphen = true; // suppress a leading hyphen
    for ch in title.trim().chars() {
        let ch = if ch.is_whitespace() { '-' } else { ch };
        match ch.to_ascii_lowercase() {
            '-' => {
                if !last_hyphen {
                    slug.push('-');
                    last_hyphen = true;
                }
            }
            c if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '_' => {
                slug.push(c);
                last_hyphen = false;
            }
            _ => {}
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
