// Cross-cutting prompt fragments.
// Each service that calls the model defines its own prompts.rs alongside it.

/// Closing line for every prompt that expects a JSON object back.
pub const JSON_ONLY_INSTRUCTION: &str =
    "Respond ONLY with valid JSON. Do not include any explanation or extra text.";
