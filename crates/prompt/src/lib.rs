//! Prompts for the guide RAG tool.
//!
//! The grounded-answer prompt is built in and can be replaced per workspace
//! by a YAML file under `.guide/prompts/`. Templates render with Handlebars
//! in strict mode.

pub mod builder;
pub mod builtin;
pub mod loader;
pub mod types;

pub use builder::build_prompt;
pub use loader::load_prompt;
pub use types::{BuiltPrompt, PromptDefinition};
