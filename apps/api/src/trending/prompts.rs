// LLM prompt constants for trend analysis.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for keyword extraction.
pub const KEYWORDS_SYSTEM: &str = "You are a factual keyword extractor. \
    Only provide keywords directly related to the given topic. \
    You MUST respond with valid JSON only. \
    Do NOT use markdown code fences.";

/// Keyword extraction prompt. Replace `{topic}` and `{industry}`.
pub const KEYWORDS_PROMPT_TEMPLATE: &str = r##"Extract keywords and hashtags for the topic "{topic}" in the {industry} industry.

{no_fabrication}

Return a JSON object with this EXACT schema:
{
  "keywords": ["keyword1", "keyword2", "keyword3", "keyword4", "keyword5"],
  "hashtags": ["#hashtag1", "#hashtag2", "#hashtag3", "#hashtag4", "#hashtag5"],
  "related_topics": ["topic1", "topic2"]
}

Base keywords and hashtags ONLY on the topic provided: "{topic}""##;

/// System prompt for topic-set analysis.
pub const ANALYSIS_SYSTEM: &str = "You are a factual data analyst. \
    Only analyze the data you are given. \
    You MUST respond with valid JSON only. \
    Do NOT use markdown code fences.";

/// Topic analysis prompt. Replace `{field}` and `{topics}`.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Trending topics in {field}:
{topics}

{no_fabrication}

Return a JSON object with this EXACT schema:
{
  "summary": "Factual summary of what topics are trending",
  "key_insights": ["Fact 1 based on data", "Fact 2 based on data"],
  "field_analysis": "Factual analysis of the {field} field trends"
}"#;

/// System prompt for strategic recommendations.
pub const RECOMMENDATIONS_SYSTEM: &str = "You are a strategic business advisor. \
    Generate specific recommendations based only on the provided data. \
    You MUST respond with a JSON array of strings only.";

/// Recommendations prompt. Replace `{field}` and `{topics_json}`.
pub const RECOMMENDATIONS_PROMPT_TEMPLATE: &str = r#"Based on these trending topics in {field}, generate 5 specific, actionable strategic recommendations.

TOPICS:
{topics_json}

Each recommendation must:
1. Reference a specific topic from the data above
2. Give an actionable next step
3. Use only the revenue and popularity figures provided

Return a JSON array of exactly 5 strings."#;
