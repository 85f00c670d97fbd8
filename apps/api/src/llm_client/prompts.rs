// Shared prompt fragments.
// Each feature that needs LLM calls defines its own prompts.rs alongside it.

/// Appended to every prompt whose reply is decoded with `call_json_array`.
pub const JSON_ARRAY_INSTRUCTION: &str = "Respond with the JSON array only. \
    Do NOT include any text before or after the array. \
    Do NOT include explanations or apologies.";
