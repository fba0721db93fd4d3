#![allow(dead_code)]

// All oracle prompt constants for the evaluation pipeline.
// Scoring happens once per uploaded answer; the pattern summary runs once
// per finalize over the whole score map.

/// System prompt for per-answer scoring.
pub const SCORE_ANSWER_SYSTEM: &str =
    "You are an expert hiring manager with exceptional skills in candidate evaluation.";

/// Per-answer scoring prompt template.
/// Replace: {job_description}, {question}, {answer}
pub const SCORE_ANSWER_PROMPT_TEMPLATE: &str = r#"Act as expert QA hiring analyst. Analyze ONLY the candidate's answer in relation to: 1. Job requirements: {job_description}
2. Interview question: '{question}'
3. Candidate response: '{answer}'

Evaluation Criteria:
- Relevance to job requirements (30% weight)
- Technical accuracy for QA roles (25% weight)
- Problem-solving approach (20% weight)
- Communication clarity (15% weight)
- Alignment with QA best practices (10% weight)

Output format: Only return numerical score between 0-10 (1 decimal allowed) based on weighted criteria. No explanations. Example: 7.5"#;

/// System prompt for the strengths/gaps pass — enforces JSON-only output.
pub const PATTERN_SUMMARY_SYSTEM: &str =
    "You are an expert hiring analyst summarizing interview performance. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Pattern summary prompt template.
/// Replace: {job_description}, {scores_json}
pub const PATTERN_SUMMARY_PROMPT_TEMPLATE: &str = r#"Analyze these interview scores for a {job_description} role:
{scores_json}

Identify 3 key strengths and 2 improvement areas based on:
1. Consistency across technical questions
2. Job requirement alignment
3. Communication skill progression

Format as JSON:
{
    "strengths": [],
    "improvement_areas": []
}"#;
