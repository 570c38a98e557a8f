// CV/job matching pipeline: validate -> build prompt -> call provider -> parse.
// All provider calls go through llm_client::LlmProvider.

pub mod handlers;
pub mod matcher;
pub mod parser;
pub mod prompts;
pub mod validation;
