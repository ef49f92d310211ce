use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

use super::{fix_instruction, resolve_path, strip_ansi, ToolFixer};
use crate::models::Diagnostic;

/// rustc diagnostics, as printed by `cargo build/check/clippy/test` and `rustc`
pub struct CargoFixer;

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<level>error|warning)(?:\[(?P<code>[A-Za-z0-9_:]+)\])?: (?P<msg>.+)$").unwrap()
    })
}

fn location_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*--> (?P<path>.+?):(?P<line>\d+):(?P<col>\d+)\s*$").unwrap())
}

impl ToolFixer for CargoFixer {
    fn name(&self) -> &'static str {
        "cargo"
    }

    fn commands(&self) -> &'static [&'static str] {
        &["cargo", "rustc"]
    }

    fn parse(&self, output: &str, root: &Path) -> Vec<Diagnostic> {
        let cleaned = strip_ansi(output);
        let mut diagnostics = Vec::new();
        // Error header waiting for its `-->` location line
        let mut pending: Option<String> = None;

        for line in cleaned.lines() {
            let line = line.trim_end_matches('\r');

            if let Some(caps) = header_re().captures(line) {
                pending = if &caps["level"] == "error" {
                    Some(match caps.name("code") {
                        Some(code) => format!("error[{}]: {}", code.as_str(), caps["msg"].trim()),
                        None => format!("error: {}", caps["msg"].trim()),
                    })
                } else {
                    None
                };
                continue;
            }

            if let Some(caps) = location_re().captures(line) {
                let Some(message) = pending.take() else {
                    continue;
                };
                let (Ok(line_no), Ok(col)) = (caps["line"].parse::<usize>(), caps["col"].parse::<usize>()) else {
                    debug!("Skipping rustc entry with unreadable position: {}", line);
                    continue;
                };
                diagnostics.push(Diagnostic {
                    abs_file_path: resolve_path(root, &caps["path"]),
                    line: line_no,
                    column: Some(col),
                    instruction: fix_instruction("rust", &message),
                    message,
                });
                continue;
            }

            if line.trim().is_empty() {
                pending = None;
            }
        }

        diagnostics
    }
}
