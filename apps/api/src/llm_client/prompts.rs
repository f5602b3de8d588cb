// Shared prompt fragments used by every structured inference call.
// Each feature module keeps its own templates in a prompts.rs alongside it.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant for a marketplace \
    that connects organizations with Learning & Development professionals. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Placeholder substituted for any absent or empty attribute, so the model
/// always sees every field it is asked to reason about.
pub const NONE_SPECIFIED: &str = "None specified";
