// Resume enhancement: full rewrite and single-section generation.
// All model calls go through llm_client.

pub mod enhancer;
pub mod handlers;
pub mod prompts;
