//! fixpls - wraps a build, lint or type-check command and repairs what it reports
//!
//! fixpls runs the wrapped command, parses its failure output into located
//! diagnostics, asks an OpenAI-compatible completion service for a fix per
//! diagnostic, patches the files in place and runs the command again, up to a
//! fixed number of attempts.
//!
//! # Architecture
//!
//! - **commands**: CLI command implementations (repair, login, logout)
//! - **core**: Repair loop, tool fixers, windowing, completion client, patching
//! - **models**: Data structures (config, diagnostic, session)
//! - **error**: Error types

pub mod commands;
pub mod core;
pub mod error;
pub mod models;

pub use error::{FixplsError, Result};
