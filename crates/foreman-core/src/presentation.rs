use crate::error::Result;
use crate::io::atomic_write;
use crate::paths::slugify;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// PresentationPlan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub heading: String,
    pub content: String,
}

/// A presentation outline written as a Markdown document named after the
/// slugified title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationPlan {
    pub title: String,
    pub audience: String,
    pub slides: Vec<Slide>,
}

impl PresentationPlan {
    /// `<slug>.md`, falling back to `presentation-plan.md` when the title
    /// slugs to nothing.
    pub fn file_name(&self) -> String {
        let slug = slugify(&self.title);
        if slug.is_empty() {
            "presentation-plan.md".to_string()
        } else {
            format!("{slug}.md")
        }
    }

    /// Title heading, audience line, then one section per slide; every
    /// slide block is terminated by a horizontal rule.
    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# {}", self.title);
        let _ = writeln!(out, "**Audience:** {}\n\n---\n", self.audience);
        for (i, slide) in self.slides.iter().enumerate() {
            let _ = writeln!(out, "## Slide {}: {}\n", i + 1, slide.heading);
            let _ = writeln!(out, "{}\n\n---\n", slide.content);
        }
        out
    }

    pub fn save(&self, root: &Path) -> Result<PathBuf> {
        let path = root.join(self.file_name());
        atomic_write(&path, self.render_markdown().as_bytes())?;
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
