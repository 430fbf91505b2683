// Shared prompt fragments. Each service that needs LLM calls defines its
// own prompts.rs alongside it and reuses these.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Output language of every user-visible string the model writes.
pub const LOCALE_INSTRUCTION: &str = "Write every human-readable value in Brazilian Portuguese (pt-BR).";

/// Guards against the model inventing résumé content.
pub const FIDELITY_INSTRUCTION: &str = "\
    Use only information present in the résumé text. \
    Do NOT invent employers, dates, degrees, certifications or metrics. \
    If a field is not present, use null or an empty list.";
