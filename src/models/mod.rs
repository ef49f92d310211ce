pub mod config;
pub mod diagnostic;
pub mod session;

pub use config::*;
pub use diagnostic::*;
pub use session::*;
