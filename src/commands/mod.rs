pub mod fix;
pub mod invocation;
pub mod login;

pub use fix::*;
pub use invocation::*;
pub use login::*;
