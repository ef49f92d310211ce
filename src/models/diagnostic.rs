use serde::Serialize;
use std::path::PathBuf;

/// One located failure reported by the wrapped tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Absolute path of the offending file
    pub abs_file_path: PathBuf,
    /// 1-based line as reported by the tool
    pub line: usize,
    /// 1-based column, when the tool reports one
    pub column: Option<usize>,
    /// Message as printed by the tool
    pub message: String,
    /// Natural-language instruction sent to the completion service
    pub instruction: String,
}

impl Diagnostic {
    /// Zero-based line index into the file
    pub fn line_index(&self) -> usize {
        self.line.saturating_sub(1)
    }

    /// `path:line[:column]` for log lines
    pub fn location(&self) -> String {
        match self.column {
            Some(col) => format!("{}:{}:{}", self.abs_file_path.display(), self.line, col),
            None => format!("{}:{}", self.abs_file_path.display(), self.line),
        }
    }
}

/// Text region sent to the completion service for one diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindow {
    /// Text sent in the request
    pub text: String,
    /// First line index covered (inclusive)
    pub start: usize,
    /// Last line index covered (exclusive)
    pub end: usize,
    pub whole_file: bool,
}

impl ContextWindow {
    /// Number of original file lines the window covers
    pub fn line_span(&self) -> usize {
        self.end - self.start
    }
}

/// A proposed fix for one window of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub abs_file_path: PathBuf,
    pub text: String,
    /// Same half-open range as the window the fix was requested for
    pub start: usize,
    pub end: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnostic(line: usize, column: Option<usize>) -> Diagnostic {
        Diagnostic {
            abs_file_path: PathBuf::from("/work/src/index.ts"),
            line,
            column,
            message: "Cannot find name 'foo'.".to_string(),
            instruction: String::new(),
        }
    }

    #[test]
    fn test_line_index_is_zero_based() {
        assert_eq!(diagnostic(1, None).line_index(), 0);
        assert_eq!(diagnostic(12, None).line_index(), 11);
        // Some tools report line 0 for file-level problems
        assert_eq!(diagnostic(0, None).line_index(), 0);
    }

    #[test]
    fn test_location_formatting() {
        assert_eq!(diagnostic(3, Some(7)).location(), "/work/src/index.ts:3:7");
        assert_eq!(diagnostic(3, None).location(), "/work/src/index.ts:3");
    }

    #[test]
    fn test_window_line_span() {
        let window = ContextWindow {
            text: "a\nb".to_string(),
            start: 4,
            end: 14,
            whole_file: false,
        };
        assert_eq!(window.line_span(), 10);
    }
}
