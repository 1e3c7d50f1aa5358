//! Prompt domain
//!
//! Templates for the review, observation and specification-check prompts.

mod template;

pub use template::PromptTemplate;
