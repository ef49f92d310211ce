//! Prompts for fix requests
//!
//! The system prompt fixes the model's behavior; the user message carries the
//! tool's instruction and the code window.

use crate::models::ContextWindow;

/// System prompt for every fix request
pub const SYSTEM_PROMPT_FIX: &str = r#"You are a code repair tool. You receive an error description and a snippet of source code.
Return the snippet with the error fixed and nothing else.
Critical rules:
- Output ONLY the corrected snippet: no explanations, no markdown fences
- Keep every line that does not need to change exactly as it is, including indentation
- Keep the same number of lines where possible
- Do not add new code beyond what the fix requires"#;

/// Assemble the user message for one diagnostic
pub fn assemble_fix_prompt(instruction: &str, window: &ContextWindow) -> String {
    let scope = if window.whole_file {
        "the whole file".to_string()
    } else {
        format!("lines {}-{} of the file", window.start + 1, window.end)
    };
    format!(
        "{}\n## Code ({})\n\n```\n{}\n```\n\nReturn the corrected code.",
        instruction.trim_end(),
        scope,
        window.text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_forbids_commentary() {
        assert!(SYSTEM_PROMPT_FIX.contains("no markdown fences"));
        assert!(SYSTEM_PROMPT_FIX.contains("Do not add new code"));
    }

    #[test]
    fn test_fix_prompt_for_window() {
        let window = ContextWindow {
            text: "let a: number = 'x';".to_string(),
            start: 9,
            end: 19,
            whole_file: false,
        };
        let prompt = assemble_fix_prompt("Fix the following typescript error:\nTS2322\n", &window);
        assert!(prompt.starts_with("Fix the following typescript error:\nTS2322\n## Code (lines 10-19"));
        assert!(prompt.contains("```\nlet a: number = 'x';\n```"));
    }

    #[test]
    fn test_fix_prompt_for_whole_file() {
        let window = ContextWindow {
            text: "x".to_string(),
            start: 0,
            end: 1,
            whole_file: true,
        };
        assert!(assemble_fix_prompt("Fix it", &window).contains("(the whole file)"));
    }
}
