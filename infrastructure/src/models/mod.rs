//! Model invocation through external AI command-line tools

mod cli_runner;

pub use cli_runner::{CliModelRunner, default_commands};
