pub mod completion;
pub mod config;
pub mod credentials;
pub mod fixers;
pub mod git;
pub mod patch;
pub mod process;
pub mod prompts;
pub mod repair;
pub mod requester;
pub mod window;

pub use completion::*;
pub use config::*;
pub use credentials::*;
pub use fixers::{
    fixer_for, fixer_for_command, resolve_tool_name, CargoFixer, PylintFixer, ToolFixer, TscFixer,
};
pub use git::*;
pub use patch::*;
pub use process::*;
pub use prompts::*;
pub use repair::*;
pub use requester::*;
pub use window::*;
