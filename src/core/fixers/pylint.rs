use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

use super::{fix_instruction, resolve_path, strip_ansi, ToolFixer};
use crate::models::Diagnostic;

/// pylint in its default text format
pub struct PylintFixer;

/// `pkg/mod.py:12:4: E0602: Undefined variable 'foo' (undefined-variable)`
fn message_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<path>[^:\s][^:]*):(?P<line>\d+):(?P<col>\d+): (?P<code>[A-Z]\d{4}): (?P<msg>.+)$")
            .unwrap()
    })
}

impl ToolFixer for PylintFixer {
    fn name(&self) -> &'static str {
        "pylint"
    }

    fn commands(&self) -> &'static [&'static str] {
        &["pylint"]
    }

    fn parse(&self, output: &str, root: &Path) -> Vec<Diagnostic> {
        strip_ansi(output)
            .lines()
            .filter_map(|line| {
                let line = line.trim_end_matches('\r');
                let caps = message_re().captures(line)?;
                let (Ok(line_no), Ok(col)) = (caps["line"].parse::<usize>(), caps["col"].parse::<usize>()) else {
                    debug!("Skipping pylint entry with unreadable position: {}", line);
                    return None;
                };
                let message = format!("{}: {}", &caps["code"], caps["msg"].trim());
                Some(Diagnostic {
                    abs_file_path: resolve_path(root, &caps["path"]),
                    line: line_no,
                    // pylint columns are 0-based
                    column: Some(col + 1),
                    instruction: fix_instruction("python", &message),
                    message,
                })
            })
            .collect()
    }
}
