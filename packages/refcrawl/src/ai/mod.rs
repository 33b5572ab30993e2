//! Language-model backed capability implementations.

pub mod openai;
pub mod prompts;

pub use openai::OpenAi;
