//! Output formatting for review results

pub mod console;
pub mod formatter;

pub use console::ConsoleFormatter;
pub use formatter::ReportFormatter;
