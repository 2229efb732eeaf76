// Resume analysis: upload → extract → score against a job description.
// All model calls go through llm_client.

pub mod analyzer;
pub mod handlers;
pub mod prompts;
