use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

use super::{fix_instruction, resolve_path, strip_ansi, ToolFixer};
use crate::models::Diagnostic;

/// TypeScript compiler
pub struct TscFixer;

/// `src/a.ts(3,7): error TS2304: Cannot find name 'x'.`
fn plain_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<path>[^\s(][^(]*)\((?P<line>\d+),(?P<col>\d+)\): error (?P<code>TS\d+): (?P<msg>.*)$")
            .unwrap()
    })
}

/// `src/a.ts:3:7 - error TS2304: Cannot find name 'x'.` (tsc --pretty)
fn pretty_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<path>\S.*?):(?P<line>\d+):(?P<col>\d+) - error (?P<code>TS\d+): (?P<msg>.*)$")
            .unwrap()
    })
}

impl ToolFixer for TscFixer {
    fn name(&self) -> &'static str {
        "tsc"
    }

    fn commands(&self) -> &'static [&'static str] {
        &["tsc"]
    }

    fn parse(&self, output: &str, root: &Path) -> Vec<Diagnostic> {
        let cleaned = strip_ansi(output);
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let mut continuing = false;

        for line in cleaned.lines() {
            let line = line.trim_end_matches('\r');

            let caps = plain_re().captures(line).or_else(|| pretty_re().captures(line));
            if let Some(caps) = caps {
                continuing = false;
                let (Ok(line_no), Ok(col)) = (caps["line"].parse::<usize>(), caps["col"].parse::<usize>()) else {
                    debug!("Skipping tsc entry with unreadable position: {}", line);
                    continue;
                };
                let message = format!("{}: {}", &caps["code"], caps["msg"].trim());
                diagnostics.push(Diagnostic {
                    abs_file_path: resolve_path(root, &caps["path"]),
                    line: line_no,
                    column: Some(col),
                    instruction: String::new(),
                    message,
                });
                continuing = true;
                continue;
            }

            // Multi-line messages continue on indented lines
            if continuing && line.starts_with(char::is_whitespace) && !line.trim().is_empty() {
                if let Some(last) = diagnostics.last_mut() {
                    last.message.push('\n');
                    last.message.push_str(line.trim());
                }
            } else {
                continuing = false;
            }
        }

        for diagnostic in &mut diagnostics {
            diagnostic.instruction = fix_instruction("typescript", &diagnostic.message);
        }
        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const PLAIN: &str = "src/bug.ts(1,22): error TS2307: Cannot find module 'child_processx' or its corresponding type declarations.\n\
src/bug.ts(5,9): error TS2322: Type 'string' is not assignable to type 'number'.\n";

    #[test]
    fn test_parse_plain_output() {
        let diagnostics = TscFixer.parse(PLAIN, Path::new("/work"));
        assert_eq!(diagnostics.len(), 2);

        let first = &diagnostics[0];
        assert_eq!(first.abs_file_path, PathBuf::from("/work/src/bug.ts"));
        assert_eq!(first.line, 1);
        assert_eq!(first.column, Some(22));
        assert!(first.message.starts_with("TS2307: Cannot find module"));
        assert!(first.instruction.contains("typescript"));
        assert!(first.instruction.contains("try to not add any new code"));

        assert_eq!(diagnostics[1].line, 5);
        assert_eq!(diagnostics[1].column, Some(9));
    }

    #[test]
    fn test_parse_pretty_output_with_colours() {
        let output = "\x1b[96msrc/index.ts\x1b[0m:\x1b[93m12\x1b[0m:\x1b[93m3\x1b[0m - \x1b[91merror\x1b[0m\x1b[90m TS2304: \x1b[0mCannot find name 'foo'.\n\
\n\
\x1b[7m12\x1b[0m   foo();\n\
\x1b[7m  \x1b[0m   \x1b[91m~~~\x1b[0m\n\
\n\
Found 1 error in src/index.ts\x1b[90m:12\x1b[0m\n";
        let diagnostics = TscFixer.parse(output, Path::new("/work"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].abs_file_path, PathBuf::from("/work/src/index.ts"));
        assert_eq!(diagnostics[0].line, 12);
        assert_eq!(diagnostics[0].column, Some(3));
        assert_eq!(diagnostics[0].message, "TS2304: Cannot find name 'foo'.");
    }

    #[test]
    fn test_continuation_lines_join_message() {
        let output = "src/a.ts(4,5): error TS2345: Argument of type '{ a: number; }' is not assignable to parameter of type 'B'.\n  Object literal may only specify known properties.\nsrc/b.ts(1,1): error TS1005: ';' expected.\n";
        let diagnostics = TscFixer.parse(output, Path::new("/work"));
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics[0].message.ends_with("\nObject literal may only specify known properties."));
        assert!(diagnostics[0].instruction.contains("Object literal"));
        assert_eq!(diagnostics[1].message, "TS1005: ';' expected.");
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let output = "src/a.ts(99999999999999999999999,1): error TS1005: ';' expected.\n\
garbage line\n\
src/ok.ts(2,3): error TS1005: ';' expected.\n";
        let diagnostics = TscFixer.parse(output, Path::new("/work"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].abs_file_path, PathBuf::from("/work/src/ok.ts"));
    }

    #[test]
    fn test_no_errors_yields_empty() {
        assert!(TscFixer.parse("", Path::new("/work")).is_empty());
        assert!(TscFixer.parse("Done in 1.2s\n", Path::new("/work")).is_empty());
    }

    #[test]
    fn test_parse_is_deterministic() {
        let root = Path::new("/work");
        assert_eq!(TscFixer.parse(PLAIN, root), TscFixer.parse(PLAIN, root));
    }

    #[test]
    fn test_windows_line_endings() {
        let output = "src/a.ts(2,3): error TS1005: ';' expected.\r\n";
        let diagnostics = TscFixer.parse(output, Path::new("/work"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "TS1005: ';' expected.");
    }
}
