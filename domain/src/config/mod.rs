//! Configuration value objects used across layers

mod output_format;

pub use output_format::OutputFormat;
