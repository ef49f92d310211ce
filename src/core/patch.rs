//! Writing replacements back into source files.
//!
//! Offsets are never recomputed after an edit, so only one replacement per
//! file is applied per iteration. Remaining diagnostics for that file come
//! back on the next run of the wrapped command.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::models::Replacement;

/// Keep only the first replacement for each file, preserving order
pub fn dedupe_by_file(replacements: Vec<Replacement>) -> Vec<Replacement> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let before = replacements.len();
    let deduped: Vec<Replacement> = replacements
        .into_iter()
        .filter(|r| seen.insert(r.abs_file_path.clone()))
        .collect();
    if deduped.len() < before {
        debug!(
            "Dropped {} replacement(s) targeting an already patched file",
            before - deduped.len()
        );
    }
    deduped
}

/// Splice a replacement into file content line by line.
///
/// Line `i` in `[start, end)` becomes line `i - start` of the replacement, or
/// an empty line when the replacement is shorter than the window. Replacement
/// lines beyond the window size are not written. Each replaced line keeps the
/// original line's ending, so CRLF files stay CRLF.
pub fn apply_replacement(original: &str, replacement: &Replacement) -> String {
    let new_lines: Vec<&str> = replacement.text.lines().collect();

    original
        .split('\n')
        .enumerate()
        .map(|(i, line)| {
            if i >= replacement.start && i < replacement.end {
                let new_line = new_lines.get(i - replacement.start).copied().unwrap_or("");
                if line.ends_with('\r') {
                    format!("{}\r", new_line)
                } else {
                    new_line.to_string()
                }
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Files touched by one call to [`PatchApplier::apply`]
#[derive(Debug, Default)]
pub struct PatchReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<(PathBuf, String)>,
}

/// Applies replacements to files on disk, one per file, sequentially
#[derive(Debug, Default)]
pub struct PatchApplier;

impl PatchApplier {
    pub fn new() -> Self {
        Self
    }

    /// Overwrite each file with its replacement spliced in.
    ///
    /// Writes are plain overwrites with no backup. A file that vanished or
    /// cannot be written is logged and reported as skipped.
    pub fn apply(&self, replacements: Vec<Replacement>) -> PatchReport {
        let mut report = PatchReport::default();

        for replacement in dedupe_by_file(replacements) {
            let path = replacement.abs_file_path.clone();

            let original = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping patch for {}: {}", path.display(), e);
                    report.skipped.push((path, e.to_string()));
                    continue;
                }
            };

            let window_lines = replacement.end.saturating_sub(replacement.start);
            let new_lines = replacement.text.lines().count();
            if new_lines < window_lines {
                warn!(
                    "Replacement for {} has {} line(s) for a {}-line window; padding with blank lines",
                    path.display(),
                    new_lines,
                    window_lines
                );
            } else if new_lines > window_lines {
                warn!(
                    "Replacement for {} has {} line(s) for a {}-line window; extra lines dropped",
                    path.display(),
                    new_lines,
                    window_lines
                );
            }

            let patched = apply_replacement(&original, &replacement);
            if patched == original {
                debug!("Replacement for {} is a no-op", path.display());
            }

            if let Err(e) = fs::write(&path, &patched) {
                error!("Failed to write {}: {}", path.display(), e);
                report.skipped.push((path, e.to_string()));
                continue;
            }

            info!(
                "Patched {} (lines {}-{})",
                path.display(),
                replacement.start + 1,
                replacement.end
            );
            report.written.push(path);
        }

        report
    }
}
