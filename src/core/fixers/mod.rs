//! Per-tool parsing of failure output into located diagnostics.
//!
//! Each supported tool implements [`ToolFixer`]; the loop only ever talks to
//! the trait, so adding a tool means adding one implementation to [`FIXERS`].

mod cargo;
mod pylint;
mod tsc;

pub use cargo::CargoFixer;
pub use pylint::PylintFixer;
pub use tsc::TscFixer;

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::FixplsError;
use crate::models::Diagnostic;

/// Tool-specific parsing strategy for a wrapped command's output
pub trait ToolFixer: Send + Sync {
    /// Display name of the tool
    fn name(&self) -> &'static str;

    /// Command names this fixer handles
    fn commands(&self) -> &'static [&'static str];

    /// Parse raw combined output into diagnostics.
    ///
    /// Relative paths are resolved against `root`. Entries that cannot be
    /// parsed are skipped; this never fails as a whole.
    fn parse(&self, output: &str, root: &Path) -> Vec<Diagnostic>;
}

static FIXERS: &[&dyn ToolFixer] = &[&TscFixer, &CargoFixer, &PylintFixer];

/// Look up the fixer registered for a tool name
pub fn fixer_for(tool: &str) -> Option<&'static dyn ToolFixer> {
    FIXERS
        .iter()
        .copied()
        .find(|fixer| fixer.commands().iter().any(|c| *c == tool))
}

/// Sorted list of every supported command name
pub fn supported_commands() -> Vec<&'static str> {
    let mut commands: Vec<&'static str> = FIXERS
        .iter()
        .flat_map(|fixer| fixer.commands().iter().copied())
        .collect();
    commands.sort_unstable();
    commands.dedup();
    commands
}

/// Resolve the fixer for a wrapped command line, or fail before anything runs
pub fn fixer_for_command(
    command: &str,
    args: &[String],
) -> Result<&'static dyn ToolFixer, FixplsError> {
    let tool = resolve_tool_name(command, args);
    fixer_for(&tool).ok_or_else(|| FixplsError::UnsupportedTool {
        tool,
        supported: supported_commands().join(", "),
    })
}

/// Work out which tool a command line actually runs.
///
/// Uses the program's file stem (`/usr/bin/tsc`, `tsc.cmd` -> `tsc`) and looks
/// through package-runner wrappers such as `npx tsc` or `python -m pylint`.
pub fn resolve_tool_name(command: &str, args: &[String]) -> String {
    let program = program_stem(command);
    let first_operand = || args.iter().find(|a| !a.starts_with('-')).map(String::as_str);

    let wrapped = match program.as_str() {
        "npx" | "bunx" | "pnpx" | "yarn" => first_operand().and_then(|first| {
            if first == "exec" || first == "dlx" || first == "run" {
                args.iter()
                    .skip_while(|a| a.as_str() != first)
                    .skip(1)
                    .find(|a| !a.starts_with('-'))
                    .map(String::as_str)
            } else {
                Some(first)
            }
        }),
        "npm" | "pnpm" => match first_operand() {
            Some("exec") | Some("x") | Some("dlx") => args
                .iter()
                .skip_while(|a| !matches!(a.as_str(), "exec" | "x" | "dlx"))
                .skip(1)
                .find(|a| !a.starts_with('-'))
                .map(String::as_str),
            _ => None,
        },
        "python" | "python3" => match args {
            [flag, module, ..] if flag == "-m" => Some(module.as_str()),
            _ => None,
        },
        _ => None,
    };

    match wrapped {
        Some(inner) => program_stem(inner),
        None => program,
    }
}

fn program_stem(command: &str) -> String {
    Path::new(command)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(command)
        .to_lowercase()
}

/// Resolve a tool-reported path against the working directory
pub(crate) fn resolve_path(root: &Path, raw: &str) -> PathBuf {
    let path = Path::new(raw.trim());
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Instruction text sent with every diagnostic
pub(crate) fn fix_instruction(language: &str, message: &str) -> String {
    format!(
        "Fix the following {} error, try to not add any new code:\n{}\n",
        language, message
    )
}

/// Remove ANSI colour sequences so patterns match pretty output too
pub(crate) fn strip_ansi(text: &str) -> std::borrow::Cow<'_, str> {
    static ANSI_RE: OnceLock<Regex> = OnceLock::new();
    let re = ANSI_RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").unwrap());
    re.replace_all(text, "")
}
