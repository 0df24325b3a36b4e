//! CLI command handlers, one file per command.

mod fetch;
mod serve;
mod sweep;

pub use fetch::run_fetch;
pub use serve::run_serve;
pub use sweep::run_sweep;
