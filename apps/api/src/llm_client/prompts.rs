// Shared prompt fragments.
// Each feature that calls the model defines its own prompts.rs alongside it.

/// Appended to prompts whose output is shown to the user verbatim.
pub const NO_COMMENTARY_INSTRUCTION: &str =
    "Return ONLY the requested text without any additional commentary, \
    preamble, or explanation.";

/// Appended to prompts whose output is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "Return ONLY valid JSON. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";
