use crate::error::FixplsError;

/// Separator between fixpls's own arguments and the wrapped command
pub const SEPARATOR: &str = "--";

/// Wrapped command line given after `--`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// Command line as typed, for display
    pub fn display(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Split raw process arguments at the first `--`.
///
/// Returns fixpls's own arguments (program name included) and everything after
/// the separator, or None when there is no separator.
pub fn split_args<I>(argv: I) -> (Vec<String>, Option<Vec<String>>)
where
    I: IntoIterator<Item = String>,
{
    let mut own = Vec::new();
    let mut argv = argv.into_iter();

    for arg in argv.by_ref() {
        if arg == SEPARATOR {
            return (own, Some(argv.collect()));
        }
        own.push(arg);
    }

    (own, None)
}

/// Turn the arguments after `--` into an invocation
pub fn parse_invocation(wrapped: Option<Vec<String>>) -> Result<Invocation, FixplsError> {
    let wrapped = wrapped.ok_or_else(|| {
        FixplsError::Usage("Please provide a command to run after --, like `fixpls -- tsc`".into())
    })?;

    let mut parts = wrapped.into_iter();
    let command = parts
        .next()
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| FixplsError::Usage("Please provide a command to run after --".into()))?;

    Ok(Invocation {
        command,
        args: parts.collect(),
    })
}
