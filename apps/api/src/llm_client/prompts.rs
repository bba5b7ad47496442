// Cross-cutting prompt fragments shared by every LLM caller.
// Feature-specific prompts live next to the feature (see ranking::prompts).

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every prompt that asks the model to judge candidate data.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Every reason, gap, and matched skill you return must be traceable to a field \
    of the candidate profile provided. Do NOT infer, interpolate, or invent details. \
    If the profile does not support a claim, omit it.";
