//! Selection of the text region sent to the completion service.

use crate::models::{ContextWindow, RepairConfig};

/// Files shorter than this many characters are sent whole
pub const WHOLE_FILE_THRESHOLD: usize = 1000;

/// Lines above and below the diagnostic line for larger files
pub const WINDOW_RADIUS: usize = 5;

/// Computes the context window for a diagnostic
#[derive(Debug, Clone, Copy)]
pub struct ContextWindower {
    whole_file_threshold: usize,
    radius: usize,
}

impl Default for ContextWindower {
    fn default() -> Self {
        Self {
            whole_file_threshold: WHOLE_FILE_THRESHOLD,
            radius: WINDOW_RADIUS,
        }
    }
}

impl ContextWindower {
    pub fn new(whole_file_threshold: usize, radius: usize) -> Self {
        Self {
            whole_file_threshold,
            radius,
        }
    }

    pub fn from_config(config: &RepairConfig) -> Self {
        Self::new(config.whole_file_threshold, config.window_radius)
    }

    /// Select the region of `file_text` around zero-based `line_index`.
    ///
    /// Small files are sent whole. Otherwise the window covers
    /// `[line_index - radius, line_index + radius)` clamped to the file, and
    /// blank lines are dropped from the sent text only: `start`/`end` still
    /// refer to the original line numbers, so a reply that keeps the non-blank
    /// lines will be shifted relative to the range it is written back into.
    pub fn window(&self, file_text: &str, line_index: usize) -> ContextWindow {
        let lines: Vec<&str> = file_text.lines().collect();
        let line_count = lines.len();

        if file_text.chars().count() < self.whole_file_threshold {
            return ContextWindow {
                text: file_text.to_string(),
                start: 0,
                end: line_count,
                whole_file: true,
            };
        }

        let end = line_count.min(line_index.saturating_add(self.radius));
        let start = line_index.saturating_sub(self.radius).min(end);

        let text = lines[start..end]
            .iter()
            .filter(|line| !line.trim().is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n");

        ContextWindow {
            text,
            start,
            end,
            whole_file: false,
        }
    }
}
