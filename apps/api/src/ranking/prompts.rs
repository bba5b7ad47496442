// LLM prompt constants for the Ranking module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// System prompt for candidate re-ranking.
pub fn rank_system() -> String {
    format!(
        "You are an experienced technical recruiter ranking anonymized candidate profiles \
        against a single role. {JSON_ONLY_SYSTEM}"
    )
}

/// Ranking prompt template.
/// Replace: {grounding_instruction}, {role_json}, {taxonomy_json}, {candidates_json}
pub const RANK_PROMPT_TEMPLATE: &str = r#"{grounding_instruction}

Rank every candidate below against the role. Candidates are identified only by "candidateId".

Return a JSON object with this EXACT schema (no extra fields):
{
  "rankings": [
    {
      "candidateId": "<id copied from the input>",
      "score": 0,
      "matchedSkills": ["React"],
      "reasons": ["reason 1", "reason 2", "reason 3"],
      "gaps": ["gap 1", "gap 2"],
      "atsReadiness": "high"
    }
  ]
}

Rules:
- "score" is an integer from 0 to 100 reflecting fit for this role.
- "reasons" has EXACTLY 3 entries. "gaps" has EXACTLY 2 entries.
- "matchedSkills" only lists role skills the profile actually shows.
- "atsReadiness": "high" when score > 75, "medium" when 50 to 75, "low" when below 50.
- "heuristicScore" is a keyword-overlap pre-score; use it as a hint, not as the answer.
- Use the career taxonomy to judge whether a field of study leads to this kind of role.

ROLE:
{role_json}

CAREER TAXONOMY:
{taxonomy_json}

CANDIDATES:
{candidates_json}"#;
