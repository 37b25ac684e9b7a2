use crate::domain::Commit;
use crate::ports::History;
use anyhow::{Context, Result};
use regex::Regex;

/// Whether the change `child` introduced on top of `parent` matches `regex`.
///
/// Patch texts are rendered one changed path at a time and the first hit
/// wins; later paths are never rendered.
pub fn commit_matches<H: History + ?Sized>(
    regex: &Regex,
    history: &H,
    parent: &Commit,
    child: &Commit,
) -> Result<bool> {
    let patches = history
        .patches(parent, child)
        .with_context(|| format!("Failed to diff {} against {}", child.short_id(), parent.short_id()))?;

    for patch in patches {
        let patch = patch.with_context(|| format!("Failed to render patch of {}", child.short_id()))?;
        if regex.is_match(&patch) {
            return Ok(true);
        }
    }

    Ok(false)
}
