//! Optional LLM layer over trending topics.
//!
//! Every operation returns a usable answer: when the model is not configured,
//! or a call fails or returns something unparseable, the deterministic
//! fallback is used and the failure is logged.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::prompts::{
    ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM, KEYWORDS_PROMPT_TEMPLATE, KEYWORDS_SYSTEM,
    RECOMMENDATIONS_PROMPT_TEMPLATE, RECOMMENDATIONS_SYSTEM,
};
use super::TrendingTopic;
use crate::llm_client::prompts::NO_FABRICATION_INSTRUCTION;
use crate::llm_client::{strip_json_fences, LlmClient, LlmError};

const MAX_RECOMMENDATIONS: usize = 5;
const TOPICS_FOR_PROMPT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordAnalysis {
    pub keywords: Vec<String>,
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub related_topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicAnalysis {
    pub summary: String,
    #[serde(alias = "insights")]
    pub key_insights: Vec<String>,
    pub field_analysis: String,
}

/// A result plus whether the model produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysed<T> {
    pub value: T,
    pub by_model: bool,
}

impl<T> Analysed<T> {
    fn model(value: T) -> Self {
        Self {
            value,
            by_model: true,
        }
    }

    fn fallback(value: T) -> Self {
        Self {
            value,
            by_model: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct TopicSummary<'a> {
    title: &'a str,
    source: &'a str,
    popularity: f64,
    business_score: f64,
    revenue_potential: &'a str,
}

#[derive(Clone)]
pub struct TrendAnalyst {
    llm: Option<LlmClient>,
}

impl TrendAnalyst {
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self { llm }
    }

    pub fn is_enabled(&self) -> bool {
        self.llm.is_some()
    }

    /// Keywords, hashtags and related topics for a free-form topic.
    pub async fn extract_keywords_and_hashtags(
        &self,
        topic: &str,
        industry: &str,
    ) -> Analysed<KeywordAnalysis> {
        let Some(llm) = &self.llm else {
            return Analysed::fallback(fallback_keywords(topic, industry));
        };
        let prompt = KEYWORDS_PROMPT_TEMPLATE
            .replace("{no_fabrication}", NO_FABRICATION_INSTRUCTION)
            .replace("{topic}", topic)
            .replace("{industry}", industry);

        match llm.call_json::<KeywordAnalysis>(&prompt, KEYWORDS_SYSTEM).await {
            Ok(analysis) if !analysis.keywords.is_empty() => Analysed::model(analysis),
            Ok(_) => {
                warn!("Keyword extraction for '{}' returned no keywords", topic);
                Analysed::fallback(fallback_keywords(topic, industry))
            }
            Err(e) => {
                warn!("Keyword extraction for '{}' failed: {}", topic, e);
                Analysed::fallback(fallback_keywords(topic, industry))
            }
        }
    }

    /// Summary and insights over a ranked topic list.
    pub async fn analyze_topics(
        &self,
        topics: &[TrendingTopic],
        field: &str,
    ) -> Analysed<TopicAnalysis> {
        let Some(llm) = &self.llm else {
            return Analysed::fallback(fallback_analysis(topics, field));
        };
        let listing = topics
            .iter()
            .take(TOPICS_FOR_PROMPT)
            .map(|t| format!("- {} (Score: {:.1})", t.title, t.popularity_score))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = ANALYSIS_PROMPT_TEMPLATE
            .replace("{no_fabrication}", NO_FABRICATION_INSTRUCTION)
            .replace("{topics}", &listing)
            .replace("{field}", field);

        match llm.call_json::<TopicAnalysis>(&prompt, ANALYSIS_SYSTEM).await {
            Ok(analysis) => Analysed::model(analysis),
            Err(e) => {
                warn!("Topic analysis for {} failed: {}", field, e);
                Analysed::fallback(fallback_analysis(topics, field))
            }
        }
    }

    /// At most five recommendations grounded in the top topics.
    pub async fn strategic_recommendations(
        &self,
        topics: &[TrendingTopic],
        field: &str,
    ) -> Analysed<Vec<String>> {
        let Some(llm) = &self.llm else {
            return Analysed::fallback(fallback_recommendations(topics, field));
        };
        match self.model_recommendations(llm, topics, field).await {
            Ok(recs) if !recs.is_empty() => Analysed::model(recs),
            Ok(_) => Analysed::fallback(fallback_recommendations(topics, field)),
            Err(e) => {
                warn!("Recommendations for {} failed: {}", field, e);
                Analysed::fallback(fallback_recommendations(topics, field))
            }
        }
    }

    async fn model_recommendations(
        &self,
        llm: &LlmClient,
        topics: &[TrendingTopic],
        field: &str,
    ) -> Result<Vec<String>, LlmError> {
        let summaries: Vec<TopicSummary<'_>> = topics
            .iter()
            .take(TOPICS_FOR_PROMPT)
            .map(|t| TopicSummary {
                title: &t.title,
                source: &t.source,
                popularity: t.popularity_score,
                business_score: t.business_score(),
                revenue_potential: t
                    .monetization_opportunities
                    .first()
                    .map_or("No estimate", |m| m.revenue_estimate.as_str()),
            })
            .collect();
        let prompt = RECOMMENDATIONS_PROMPT_TEMPLATE
            .replace("{topics_json}", &serde_json::to_string_pretty(&summaries)?)
            .replace("{field}", field);

        let response = llm.call(&prompt, RECOMMENDATIONS_SYSTEM).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        Ok(parse_recommendations(text))
    }
}

/// JSON array when the model complied, otherwise one recommendation per line.
fn parse_recommendations(text: &str) -> Vec<String> {
    let body = strip_json_fences(text);
    let items = match serde_json::from_str::<Vec<String>>(body) {
        Ok(items) => items,
        Err(_) => body
            .lines()
            .map(|line| line.trim().trim_start_matches(['-', '*']).trim().to_string())
            .collect(),
    };
    items
        .into_iter()
        .filter(|s| !s.is_empty())
        .take(MAX_RECOMMENDATIONS)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Fallbacks
// ────────────────────────────────────────────────────────────────────────────

pub fn fallback_keywords(topic: &str, industry: &str) -> KeywordAnalysis {
    let mut keywords: Vec<String> = topic
        .to_lowercase()
        .split_whitespace()
        .take(5)
        .map(str::to_string)
        .collect();
    for filler in [industry, "trending", "popular"] {
        if keywords.len() >= 5 {
            break;
        }
        keywords.push(filler.to_string());
    }
    let hashtags = keywords
        .iter()
        .map(|k| format!("#{}", k.replace(' ', "")))
        .collect();
    KeywordAnalysis {
        keywords,
        hashtags,
        related_topics: Vec::new(),
    }
}

pub fn fallback_analysis(topics: &[TrendingTopic], field: &str) -> TopicAnalysis {
    let total = topics.len();
    let average = topics.iter().map(|t| t.popularity_score).sum::<f64>() / total.max(1) as f64;
    TopicAnalysis {
        summary: format!("Analysis of {total} trending topics in {field} field"),
        key_insights: vec![
            format!("Total topics analyzed: {total}"),
            format!("Average popularity score: {average:.2}"),
            "Analysis based on real trending data sources".to_string(),
        ],
        field_analysis: format!(
            "Current trends in {field} show active engagement with {total} topics"
        ),
    }
}

pub fn fallback_recommendations(topics: &[TrendingTopic], field: &str) -> Vec<String> {
    let mut recs = Vec::new();

    let best = topics
        .iter()
        .filter(|t| t.business_score() > 70.0)
        .max_by(|a, b| a.business_score().total_cmp(&b.business_score()));
    if let Some(top) = best {
        let head: String = top.title.chars().take(50).collect();
        recs.push(format!(
            "Prioritize '{head}...' from {} - shows {}/100 business potential",
            top.source,
            top.business_score()
        ));
    }

    let monetizable = topics
        .iter()
        .filter(|t| !t.monetization_opportunities.is_empty())
        .count();
    if monetizable > 0 {
        recs.push(format!(
            "Focus on {monetizable} topics with clear monetization paths - immediate revenue opportunities identified"
        ));
    }

    let mut sources: Vec<&str> = Vec::new();
    for topic in topics {
        if !sources.contains(&topic.source.as_str()) {
            sources.push(&topic.source);
        }
    }
    let shown = sources.iter().take(3).copied().collect::<Vec<_>>().join(", ");
    let more = if sources.len() > 3 { "..." } else { "" };
    recs.push(format!(
        "Leverage {} active platforms: {shown}{more}",
        sources.len()
    ));

    if topics.len() > 10 {
        recs.push(format!(
            "Act quickly on {} trending opportunities - daily variation ensures fresh content",
            topics.len()
        ));
    }

    recs.push(format!(
        "Implement multi-platform strategy across identified {field} trends for maximum market penetration"
    ));

    recs.truncate(MAX_RECOMMENDATIONS);
    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trending::{BusinessPotential, Level, MonetizationIdea};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn topic(title: &str, source: &str, popularity: f64, business: f64) -> TrendingTopic {
        TrendingTopic {
            title: title.to_string(),
            source: source.to_string(),
            popularity_score: popularity,
            business_potential: Some(BusinessPotential::preset(business, Level::High, Level::Low)),
            ..TrendingTopic::default()
        }
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
    }

    async fn analyst_with(body: serde_json::Value, status: u16) -> (MockServer, TrendAnalyst) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;
        let llm = LlmClient::with_base_url("k".to_string(), &server.uri());
        (server, TrendAnalyst::new(Some(llm)))
    }

    #[test]
    fn test_fallback_keywords_pads_short_topics() {
        let analysis = fallback_keywords("Remote Work", "technology");
        assert_eq!(
            analysis.keywords,
            vec!["remote", "work", "technology", "trending", "popular"]
        );
        assert_eq!(analysis.hashtags[0], "#remote");
    }

    #[test]
    fn test_fallback_keywords_caps_long_topics() {
        let analysis = fallback_keywords("one two three four five six", "finance");
        assert_eq!(analysis.keywords.len(), 5);
        assert!(!analysis.keywords.contains(&"finance".to_string()));
    }

    #[test]
    fn test_fallback_analysis_averages_popularity() {
        let topics = vec![topic("A", "Reddit", 80.0, 10.0), topic("B", "GitHub", 60.0, 10.0)];
        let analysis = fallback_analysis(&topics, "technology");
        assert_eq!(analysis.summary, "Analysis of 2 trending topics in technology field");
        assert_eq!(analysis.key_insights[1], "Average popularity score: 70.00");
    }

    #[test]
    fn test_fallback_recommendations_reference_best_topic() {
        let mut topics: Vec<TrendingTopic> = (0..12)
            .map(|i| topic(&format!("Topic {i}"), "Reddit", 50.0, 40.0))
            .collect();
        topics.push(topic("Standout opportunity", "LinkedIn", 70.0, 95.0));
        topics[0].monetization_opportunities.push(MonetizationIdea {
            kind: "Premium Community".to_string(),
            description: String::new(),
            potential: String::new(),
            timeframe: String::new(),
            action_steps: Vec::new(),
            revenue_estimate: "$3,000".to_string(),
        });

        let recs = fallback_recommendations(&topics, "technology");
        assert_eq!(recs.len(), 5);
        assert_eq!(
            recs[0],
            "Prioritize 'Standout opportunity...' from LinkedIn - shows 95/100 business potential"
        );
        assert!(recs[1].starts_with("Focus on 1 topics"));
        assert_eq!(recs[2], "Leverage 2 active platforms: Reddit, LinkedIn");
        assert!(recs[3].starts_with("Act quickly on 13"));
    }

    #[test]
    fn test_parse_recommendations_accepts_lines() {
        let recs = parse_recommendations("- First idea\n\n* Second idea\nThird");
        assert_eq!(recs, vec!["First idea", "Second idea", "Third"]);
    }

    #[tokio::test]
    async fn test_disabled_analyst_uses_fallbacks() {
        let analyst = TrendAnalyst::new(None);
        let keywords = analyst.extract_keywords_and_hashtags("AI tools", "tech").await;
        assert!(!keywords.by_model);
        let recs = analyst.strategic_recommendations(&[], "finance").await;
        assert!(!recs.by_model);
        assert_eq!(recs.value.len(), 2);
    }

    #[tokio::test]
    async fn test_model_keywords_are_used() {
        let (_server, analyst) = analyst_with(
            completion(r##"{"keywords": ["ai", "agents"], "hashtags": ["#AI"]}"##),
            200,
        )
        .await;
        let result = analyst.extract_keywords_and_hashtags("AI agents", "technology").await;
        assert!(result.by_model);
        assert_eq!(result.value.keywords, vec!["ai", "agents"]);
        assert!(result.value.related_topics.is_empty());
    }

    #[tokio::test]
    async fn test_model_error_falls_back() {
        let (_server, analyst) =
            analyst_with(json!({ "error": { "message": "bad key" } }), 401).await;
        let topics = vec![topic("A", "Reddit", 80.0, 10.0)];
        let analysis = analyst.analyze_topics(&topics, "technology").await;
        assert!(!analysis.by_model);
        assert_eq!(analysis.value.key_insights[0], "Total topics analyzed: 1");
    }

    #[tokio::test]
    async fn test_model_recommendations_are_capped() {
        let (_server, analyst) = analyst_with(
            completion(r#"["a", "b", "c", "d", "e", "f"]"#),
            200,
        )
        .await;
        let recs = analyst
            .strategic_recommendations(&[topic("A", "Reddit", 80.0, 10.0)], "technology")
            .await;
        assert!(recs.by_model);
        assert_eq!(recs.value, vec!["a", "b", "c", "d", "e"]);
    }
}
