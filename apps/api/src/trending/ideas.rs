//! Content planning built on top of trending topics: post ideas, custom
//! topics, keyword research and calendars.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use super::analyst::KeywordAnalysis;
use super::TrendingTopic;

pub const CUSTOM_SOURCE: &str = "Custom";
pub const CUSTOM_AI_SOURCE: &str = "Custom + AI";
pub const CUSTOM_ANALYSIS_SOURCE: &str = "Custom Analysis";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentIdea {
    pub topic: String,
    pub hook: String,
    pub main_content: Vec<String>,
    pub call_to_action: String,
    pub keywords: Vec<String>,
    pub hashtags: Vec<String>,
    pub platforms: Vec<String>,
    /// Always zero: reach is never estimated.
    pub estimated_reach: u64,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// One idea per template for `content_type`; unknown types use the social
/// media template. Only facts already on the topic are used.
pub fn content_ideas(topic: &TrendingTopic, content_type: &str) -> Vec<ContentIdea> {
    let title = &topic.title;
    let source = &topic.source;
    let score = topic.popularity_score;

    let (hook, main_content, call_to_action, platforms) = match content_type {
        "blog" => (
            format!("Data Analysis: {title}"),
            vec![
                format!("Topic: {title}"),
                format!("Data Source: {source}"),
                format!("Current Popularity: {score:.1}/100"),
                "Analysis based on real trending data only".to_string(),
            ],
            "View source data for verification",
            strings(&["website", "linkedin"]),
        ),
        "video" => (
            format!("Trending Data: {title}"),
            vec![
                format!("Current trend: {title}"),
                format!("Source: {source}"),
                format!("Score: {score:.1}/100"),
                "Based on verified data".to_string(),
            ],
            "Check the source for more details",
            strings(&["tiktok", "instagram", "youtube"]),
        ),
        _ => (
            format!("Trending Now: {title}"),
            vec![
                format!("Real data shows: {title}"),
                format!("Source: {source}"),
                format!("Popularity Score: {score:.1}/100"),
                format!("Based on actual trending data from {source}"),
            ],
            "What are your thoughts on this trend?",
            strings(&["linkedin", "twitter", "facebook"]),
        ),
    };

    vec![ContentIdea {
        topic: title.clone(),
        hook,
        main_content,
        call_to_action: call_to_action.to_string(),
        keywords: topic.keywords.iter().take(5).cloned().collect(),
        hashtags: topic.hashtags.iter().take(3).cloned().collect(),
        platforms,
        estimated_reach: 0,
    }]
}

// ────────────────────────────────────────────────────────────────────────────
// Custom topics
// ────────────────────────────────────────────────────────────────────────────

fn field_keywords(field: &str) -> &'static [&'static str] {
    match field {
        "technology" => &["tech", "digital", "automation", "AI", "software", "innovation"],
        "marketing" => &["strategy", "campaign", "brand", "social media", "content", "engagement"],
        "finance" => &["investment", "financial", "business", "ROI", "growth", "revenue"],
        "health" => &["wellness", "healthcare", "fitness", "medical", "treatment", "prevention"],
        "education" => &["learning", "training", "skills", "knowledge", "development", "course"],
        "fashion" => &["style", "trend", "design", "fashion", "lifestyle", "beauty"],
        _ => &[],
    }
}

/// Topic words, three field terms and generic marketing terms; at most eight.
pub fn custom_topic_keywords(topic: &str, field: &str) -> Vec<String> {
    let mut keywords: Vec<String> = topic
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    keywords.extend(field_keywords(&field.to_lowercase()).iter().take(3).map(|s| s.to_string()));
    keywords.extend(strings(&["strategy", "tips", "guide", "best practices"]));
    keywords.truncate(8);
    keywords
}

fn pascal_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// At most eight hashtags built from the topic and field.
pub fn custom_topic_hashtags(topic: &str, field: &str) -> Vec<String> {
    let topic_tag = pascal_case(topic);
    let field_tag = pascal_case(field);
    let mut tags = vec![
        format!("#{topic_tag}"),
        format!("#{field_tag}"),
        format!("#{topic_tag}{field_tag}"),
        "#Marketing".to_string(),
        "#BusinessGrowth".to_string(),
        "#ContentStrategy".to_string(),
    ];

    let lowered = topic.to_lowercase();
    let mentions_ai = lowered.split_whitespace().any(|w| w == "ai") || lowered.contains("artificial");
    if mentions_ai {
        tags.extend(strings(&["#AI", "#ArtificialIntelligence", "#TechTrends"]));
    } else if lowered.contains("social") {
        tags.extend(strings(&["#SocialMedia", "#DigitalMarketing", "#SocialStrategy"]));
    } else if lowered.contains("video") {
        tags.extend(strings(&["#VideoMarketing", "#VideoContent", "#ContentCreation"]));
    }
    tags.truncate(8);
    tags
}

/// A user-supplied topic. `analysis` is the model's keyword extraction when
/// it succeeded.
pub fn custom_topic(
    topic: &str,
    field: &str,
    analysis: Option<KeywordAnalysis>,
    now: DateTime<Utc>,
) -> TrendingTopic {
    let mut angles = vec![
        format!("Why {topic} matters in {field}"),
        format!("How to leverage {topic} for business growth"),
        format!("Latest trends in {topic}"),
    ];

    let base = TrendingTopic {
        title: topic.to_string(),
        trending_since: now.to_rfc3339(),
        ..TrendingTopic::default()
    };

    match analysis {
        Some(analysis) => {
            angles.push(format!("{topic} best practices for {field}"));
            TrendingTopic {
                description: format!(
                    "Custom analysis: {topic} - AI-enhanced insights for {field} marketing"
                ),
                popularity_score: 80.0,
                keywords: analysis.keywords,
                hashtags: analysis.hashtags,
                engagement_potential: "high".to_string(),
                content_angles: angles,
                source: CUSTOM_AI_SOURCE.to_string(),
                ..base
            }
        }
        None => TrendingTopic {
            description: format!(
                "Custom topic: {topic} - User-generated content focus for {field} marketing"
            ),
            popularity_score: 75.0,
            keywords: custom_topic_keywords(topic, field),
            hashtags: custom_topic_hashtags(topic, field),
            engagement_potential: "medium".to_string(),
            content_angles: angles,
            source: CUSTOM_SOURCE.to_string(),
            ..base
        },
    }
}

/// Stand-alone analysis of a single topic. Popularity varies by day within
/// 60..=84.9.
pub fn analyze_custom_topic(
    title: &str,
    description: Option<&str>,
    field: &str,
    target_keywords: &[String],
    seed: u64,
    now: DateTime<Utc>,
) -> TrendingTopic {
    let keywords = if target_keywords.is_empty() {
        custom_topic_keywords(title, field)
    } else {
        target_keywords.to_vec()
    };
    let popularity = 60.0 + (seed % 250) as f64 / 10.0;
    let description = match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => d.to_string(),
        None => format!("Custom analysis for {title} in the {field} sector"),
    };

    TrendingTopic {
        title: title.to_string(),
        description,
        popularity_score: popularity,
        keywords,
        hashtags: custom_topic_hashtags(title, field),
        engagement_potential: if popularity >= 72.5 { "high" } else { "medium" }.to_string(),
        content_angles: vec![
            format!("Introduction to {title}"),
            format!("{title} best practices"),
            format!("Future of {title}"),
            format!("How {title} impacts {field}"),
        ],
        source: CUSTOM_ANALYSIS_SOURCE.to_string(),
        trending_since: now.to_rfc3339(),
        ..TrendingTopic::default()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Keyword research and planning
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordTrend {
    pub keyword: &'static str,
    pub volume: u64,
    pub difficulty: &'static str,
    pub trend: &'static str,
}

/// Curated search keywords for a field; empty for fields without data.
pub fn trending_keywords(field: &str) -> Vec<KeywordTrend> {
    let rows: &[(&'static str, u64, &'static str, &'static str)] = match field {
        "technology" => &[
            ("AI automation", 45_000, "medium", "rising"),
            ("no-code development", 32_000, "low", "rising"),
            ("customer experience AI", 28_000, "high", "stable"),
        ],
        "marketing" => &[
            ("video marketing strategy", 52_000, "medium", "rising"),
            ("social media automation", 38_000, "low", "rising"),
            ("content creation AI", 29_000, "medium", "rising"),
        ],
        _ => &[],
    };
    rows.iter()
        .map(|&(keyword, volume, difficulty, trend)| KeywordTrend {
            keyword,
            volume,
            difficulty,
            trend,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEntry {
    pub date: NaiveDate,
    pub content_type: &'static str,
    pub topic: String,
    pub platforms: Vec<String>,
    pub optimal_time: &'static str,
    pub hashtags: Vec<String>,
    pub status: &'static str,
}

const CALENDAR_ROTATION: [&str; 4] = ["educational", "promotional", "engaging", "trending"];

/// One planned post per day starting at `start`.
pub fn content_calendar(field: &str, days: u32, start: NaiveDate) -> Vec<CalendarEntry> {
    let field_title = pascal_case(field);
    (0..days)
        .map(|i| CalendarEntry {
            date: start + Duration::days(i64::from(i)),
            content_type: CALENDAR_ROTATION[i as usize % CALENDAR_ROTATION.len()],
            topic: format!("Day {} - {field_title} insights", i + 1),
            platforms: strings(&["linkedin", "twitter"]),
            optimal_time: "09:00 AM",
            hashtags: vec![
                format!("#{}", field.replace(' ', "")),
                "#Marketing".to_string(),
                "#Business".to_string(),
            ],
            status: "planned",
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Market insights
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketInsights {
    pub total_topics_analyzed: usize,
    pub custom_topics_added: usize,
    pub average_popularity_score: f64,
    pub data_sources: Vec<String>,
    pub analysis_timestamp: DateTime<Utc>,
    pub field_analyzed: String,
    pub content_type_requested: String,
    pub target_audience: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub key_insights: Vec<String>,
    pub note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl MarketInsights {
    pub fn from_topics(
        topics: &[TrendingTopic],
        custom_topics_added: usize,
        field: &str,
        content_type: &str,
        target_audience: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let total = topics.len();
        let average = topics.iter().map(|t| t.popularity_score).sum::<f64>() / total.max(1) as f64;
        let mut data_sources: Vec<String> = Vec::new();
        for topic in topics {
            if !data_sources.contains(&topic.source) {
                data_sources.push(topic.source.clone());
            }
        }

        Self {
            total_topics_analyzed: total,
            custom_topics_added,
            average_popularity_score: (average * 100.0).round() / 100.0,
            data_sources,
            analysis_timestamp: now,
            field_analyzed: field.to_string(),
            content_type_requested: content_type.to_string(),
            target_audience: target_audience.to_string(),
            summary: None,
            key_insights: Vec::new(),
            note: "All data is fact-based from trending sources. No predictions or speculation included."
                .to_string(),
            status: None,
        }
    }

    /// Marks the insights as built from canned fallback topics.
    pub fn limited(mut self) -> Self {
        self.note = "Using fallback data because no trending source returned topics.".to_string();
        self.status = Some("Limited Data Mode".to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_topic() -> TrendingTopic {
        TrendingTopic {
            title: "Edge AI chips".to_string(),
            source: "Hacker News".to_string(),
            popularity_score: 87.26,
            keywords: (1..=7).map(|i| format!("k{i}")).collect(),
            hashtags: (1..=5).map(|i| format!("#h{i}")).collect(),
            ..TrendingTopic::default()
        }
    }

    #[test]
    fn test_social_media_idea_uses_topic_facts() {
        let ideas = content_ideas(&sample_topic(), "social_media");
        assert_eq!(ideas.len(), 1);
        let idea = &ideas[0];
        assert_eq!(idea.hook, "Trending Now: Edge AI chips");
        assert_eq!(idea.main_content[2], "Popularity Score: 87.3/100");
        assert_eq!(idea.keywords.len(), 5);
        assert_eq!(idea.hashtags, vec!["#h1", "#h2", "#h3"]);
        assert_eq!(idea.platforms, vec!["linkedin", "twitter", "facebook"]);
        assert_eq!(idea.estimated_reach, 0);
    }

    #[test]
    fn test_unknown_content_type_uses_social_template() {
        let ideas = content_ideas(&sample_topic(), "newsletter");
        assert_eq!(ideas[0].call_to_action, "What are your thoughts on this trend?");
        let video = content_ideas(&sample_topic(), "video");
        assert_eq!(video[0].platforms, vec!["tiktok", "instagram", "youtube"]);
    }

    #[test]
    fn test_custom_topic_keywords() {
        assert_eq!(
            custom_topic_keywords("Remote Hiring", "technology"),
            vec!["remote", "hiring", "tech", "digital", "automation", "strategy", "tips", "guide"]
        );
        assert_eq!(
            custom_topic_keywords("x", "gardening"),
            vec!["x", "strategy", "tips", "guide", "best practices"]
        );
    }

    #[test]
    fn test_custom_topic_hashtags() {
        let tags = custom_topic_hashtags("AI agents", "technology");
        assert_eq!(tags[0], "#AIAgents");
        assert_eq!(tags[1], "#Technology");
        assert_eq!(tags[2], "#AIAgentsTechnology");
        assert_eq!(tags.len(), 8);
        assert_eq!(tags[6], "#AI");

        let plain = custom_topic_hashtags("Pricing pages", "marketing");
        assert_eq!(plain.len(), 6);
    }

    #[test]
    fn test_custom_topic_with_and_without_model() {
        let now = Utc::now();
        let plain = custom_topic("Pricing pages", "marketing", None, now);
        assert_eq!(plain.source, CUSTOM_SOURCE);
        assert_eq!(plain.popularity_score, 75.0);
        assert_eq!(plain.content_angles.len(), 3);

        let analysis = KeywordAnalysis {
            keywords: vec!["pricing".to_string()],
            hashtags: vec!["#Pricing".to_string()],
            related_topics: Vec::new(),
        };
        let enhanced = custom_topic("Pricing pages", "marketing", Some(analysis), now);
        assert_eq!(enhanced.source, CUSTOM_AI_SOURCE);
        assert_eq!(enhanced.keywords, vec!["pricing"]);
        assert_eq!(
            enhanced.content_angles[3],
            "Pricing pages best practices for marketing"
        );
    }

    #[test]
    fn test_analyze_custom_topic_prefers_caller_keywords() {
        let now = Utc::now();
        let topic = analyze_custom_topic(
            "Loyalty programs",
            None,
            "marketing",
            &["loyalty".to_string()],
            249,
            now,
        );
        assert_eq!(topic.keywords, vec!["loyalty"]);
        assert!((topic.popularity_score - 84.9).abs() < 1e-9);
        assert_eq!(topic.engagement_potential, "high");
        assert_eq!(
            topic.description,
            "Custom analysis for Loyalty programs in the marketing sector"
        );
        assert_eq!(topic.content_angles[3], "How Loyalty programs impacts marketing");
    }

    #[test]
    fn test_trending_keywords() {
        assert_eq!(trending_keywords("technology").len(), 3);
        assert_eq!(trending_keywords("marketing")[0].volume, 52_000);
        assert!(trending_keywords("gardening").is_empty());
    }

    #[test]
    fn test_content_calendar_rotates_types() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 30).unwrap();
        let calendar = content_calendar("finance", 5, start);
        assert_eq!(calendar.len(), 5);
        assert_eq!(calendar[0].content_type, "educational");
        assert_eq!(calendar[4].content_type, "educational");
        assert_eq!(calendar[3].content_type, "trending");
        assert_eq!(calendar[2].date, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(calendar[1].topic, "Day 2 - Finance insights");
        assert_eq!(calendar[0].hashtags[0], "#finance");
    }

    #[test]
    fn test_market_insights() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let mut second = sample_topic();
        second.popularity_score = 50.0;
        second.source = "Reddit".to_string();
        let topics = vec![sample_topic(), second, sample_topic()];

        let insights =
            MarketInsights::from_topics(&topics, 0, "technology", "blog", "general", now);
        assert_eq!(insights.total_topics_analyzed, 3);
        assert_eq!(insights.data_sources, vec!["Hacker News", "Reddit"]);
        assert!((insights.average_popularity_score - 74.84).abs() < 1e-9);
        assert!(insights.status.is_none());

        let limited = insights.limited();
        assert_eq!(limited.status.as_deref(), Some("Limited Data Mode"));
    }
}
