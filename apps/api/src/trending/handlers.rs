use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::extract::{Json, Path, Query};
use crate::state::AppState;

use super::ideas::{self, CalendarEntry, ContentIdea, KeywordTrend, MarketInsights};
use super::scripts::{build_script, ContentScript, ScriptType};
use super::{
    daily_seed, normalize_field, MonetizationIdea, TrendAnalyst, TrendingService, TrendingTopic,
};

/// Topics that receive generated content ideas.
const IDEA_TOPICS: usize = 15;
const MAX_CALENDAR_DAYS: u32 = 90;

fn default_field() -> String {
    "technology".to_string()
}

fn default_content_type() -> String {
    "social_media".to_string()
}

fn default_audience() -> String {
    "general".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverTopicsRequest {
    #[serde(default = "default_field")]
    pub field: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default = "default_audience")]
    pub target_audience: String,
    pub industry: Option<String>,
    #[serde(default)]
    pub custom_topics: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscoverTopicsResponse {
    pub trending_topics: Vec<TrendingTopic>,
    pub content_ideas: Vec<ContentIdea>,
    pub market_insights: MarketInsights,
    pub generated_at: DateTime<Utc>,
}

/// Aggregation, custom topics, ideas and insights for one request. Shared by
/// the discovery endpoint and the PDF report.
pub async fn build_discovery(
    trending: &TrendingService,
    analyst: &TrendAnalyst,
    req: &DiscoverTopicsRequest,
    now: DateTime<Utc>,
) -> Result<DiscoverTopicsResponse, AppError> {
    let field = normalize_field(&req.field);
    if field.is_empty() {
        return Err(AppError::Validation("field must not be empty".to_string()));
    }

    let discovery = trending.discover(&field, now).await;
    let mut topics = discovery.topics;

    let industry = req.industry.as_deref().unwrap_or(&field);
    let mut custom_added = 0;
    for custom in req.custom_topics.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        let analysis = if analyst.is_enabled() {
            let extracted = analyst.extract_keywords_and_hashtags(custom, industry).await;
            extracted.by_model.then_some(extracted.value)
        } else {
            None
        };
        topics.push(ideas::custom_topic(custom, &field, analysis, now));
        custom_added += 1;
    }
    topics.sort_by(|a, b| b.popularity_score.total_cmp(&a.popularity_score));

    let content_ideas = topics
        .iter()
        .take(IDEA_TOPICS)
        .flat_map(|t| ideas::content_ideas(t, &req.content_type))
        .collect();

    let mut insights = MarketInsights::from_topics(
        &topics,
        custom_added,
        &field,
        &req.content_type,
        &req.target_audience,
        now,
    );
    if analyst.is_enabled() && !topics.is_empty() {
        let analysis = analyst.analyze_topics(&topics, &field).await;
        if analysis.by_model {
            insights.summary = Some(analysis.value.summary);
            insights.key_insights = analysis.value.key_insights;
        }
    }
    if discovery.fallback {
        insights = insights.limited();
    }

    Ok(DiscoverTopicsResponse {
        trending_topics: topics,
        content_ideas,
        market_insights: insights,
        generated_at: now,
    })
}

/// POST /api/v1/content/discover-topics
pub async fn handle_discover_topics(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<DiscoverTopicsRequest>,
) -> Result<Json<DiscoverTopicsResponse>, AppError> {
    let response = build_discovery(&state.trending, &state.analyst, &req, Utc::now()).await?;
    info!(
        user_id = %user.id,
        field = %response.market_insights.field_analyzed,
        topics = response.trending_topics.len(),
        "Discovered trending topics"
    );
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeCustomTopicRequest {
    pub topic_title: String,
    pub description: Option<String>,
    #[serde(default = "default_field")]
    pub field: String,
    #[serde(default)]
    pub target_keywords: Vec<String>,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeCustomTopicResponse {
    pub topic: TrendingTopic,
    pub content_ideas: Vec<ContentIdea>,
}

fn analyze_custom(req: &AnalyzeCustomTopicRequest, now: DateTime<Utc>) -> Result<AnalyzeCustomTopicResponse, AppError> {
    let title = req.topic_title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("topic_title must not be empty".to_string()));
    }
    let field = normalize_field(&req.field);
    let seed = daily_seed(now.date_naive())
        .wrapping_add(title.bytes().map(u64::from).sum::<u64>());
    let topic = ideas::analyze_custom_topic(
        title,
        req.description.as_deref(),
        &field,
        &req.target_keywords,
        seed,
        now,
    );
    let content_ideas = ideas::content_ideas(&topic, &req.content_type);
    Ok(AnalyzeCustomTopicResponse {
        topic,
        content_ideas,
    })
}

/// POST /api/v1/content/analyze-custom-topic
pub async fn handle_analyze_custom_topic(
    _user: CurrentUser,
    Json(req): Json<AnalyzeCustomTopicRequest>,
) -> Result<Json<AnalyzeCustomTopicResponse>, AppError> {
    Ok(Json(analyze_custom(&req, Utc::now())?))
}

#[derive(Debug, Serialize)]
pub struct TrendingKeywordsResponse {
    pub field: String,
    pub keywords: Vec<KeywordTrend>,
    pub last_updated: DateTime<Utc>,
}

/// GET /api/v1/content/trending-keywords/:field
pub async fn handle_trending_keywords(
    _user: CurrentUser,
    Path(field): Path<String>,
) -> Json<TrendingKeywordsResponse> {
    let field = normalize_field(&field);
    Json(TrendingKeywordsResponse {
        keywords: ideas::trending_keywords(&field),
        field,
        last_updated: Utc::now(),
    })
}

#[derive(Debug, Deserialize)]
pub struct ContentCalendarRequest {
    #[serde(default = "default_field")]
    pub field: String,
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ContentCalendarResponse {
    pub calendar: Vec<CalendarEntry>,
    pub total_posts: usize,
    pub field: String,
}

fn build_calendar(req: &ContentCalendarRequest, now: DateTime<Utc>) -> Result<ContentCalendarResponse, AppError> {
    let days = req.days.unwrap_or(30);
    if !(1..=MAX_CALENDAR_DAYS).contains(&days) {
        return Err(AppError::Validation(format!(
            "days must be between 1 and {MAX_CALENDAR_DAYS}"
        )));
    }
    let field = normalize_field(&req.field);
    let calendar = ideas::content_calendar(&field, days, now.date_naive());
    Ok(ContentCalendarResponse {
        total_posts: calendar.len(),
        calendar,
        field,
    })
}

/// POST /api/v1/content/generate-content-calendar
pub async fn handle_content_calendar(
    _user: CurrentUser,
    Json(req): Json<ContentCalendarRequest>,
) -> Result<Json<ContentCalendarResponse>, AppError> {
    Ok(Json(build_calendar(&req, Utc::now())?))
}

#[derive(Debug, Deserialize)]
pub struct ContentScriptQuery {
    #[serde(default)]
    pub script_type: ScriptType,
    #[serde(default = "default_field")]
    pub field: String,
}

#[derive(Debug, Serialize)]
pub struct ContentScriptResponse {
    pub topic: String,
    pub script_type: ScriptType,
    pub script_content: ContentScript,
    pub generated_at: DateTime<Utc>,
    pub monetization_opportunities: Vec<MonetizationIdea>,
    pub hashtags: Vec<String>,
    pub content_angles: Vec<String>,
}

/// Draft for the `position`-th (1-based) of today's topics in `field`, ranked
/// as the discovery endpoint ranks them.
pub async fn build_content_script(
    trending: &TrendingService,
    field: &str,
    position: usize,
    script_type: ScriptType,
    now: DateTime<Utc>,
) -> Result<ContentScriptResponse, AppError> {
    let field = normalize_field(field);
    if field.is_empty() {
        return Err(AppError::Validation("field must not be empty".to_string()));
    }
    let mut topics = trending.discover(&field, now).await.topics;
    topics.sort_by(|a, b| b.popularity_score.total_cmp(&a.popularity_score));

    let topic = position
        .checked_sub(1)
        .and_then(|i| topics.get(i))
        .ok_or_else(|| AppError::NotFound(format!("Topic {position} not found for {field}")))?;

    Ok(ContentScriptResponse {
        topic: topic.title.clone(),
        script_type,
        script_content: build_script(topic, script_type),
        generated_at: now,
        monetization_opportunities: topic.monetization_opportunities.clone(),
        hashtags: topic.hashtags.clone(),
        content_angles: topic.content_angles.clone(),
    })
}

/// POST /api/v1/content/generate-script/:topic_id
pub async fn handle_generate_content_script(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(topic_id): Path<usize>,
    Query(q): Query<ContentScriptQuery>,
) -> Result<Json<ContentScriptResponse>, AppError> {
    let response =
        build_content_script(&state.trending, &q.field, topic_id, q.script_type, Utc::now())
            .await?;
    info!(
        user_id = %user.id,
        topic = %response.topic,
        script_type = ?response.script_type,
        "Generated content script"
    );
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trending::sources::catalog::CatalogSource;
    use crate::trending::sources::{Platform, TrendSource};
    use std::sync::Arc;
    use std::time::Duration;

    fn request(field: &str, custom: &[&str]) -> DiscoverTopicsRequest {
        DiscoverTopicsRequest {
            field: field.to_string(),
            content_type: "blog".to_string(),
            target_audience: "founders".to_string(),
            industry: None,
            custom_topics: custom.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn catalogue_service() -> TrendingService {
        let sources: Vec<Arc<dyn TrendSource>> = Platform::ALL
            .iter()
            .filter(|p| !matches!(p, Platform::Reddit | Platform::HackerNews))
            .map(|p| Arc::new(CatalogSource::new(*p)) as Arc<dyn TrendSource>)
            .collect();
        TrendingService::new(sources, Duration::from_secs(1))
    }

    #[test]
    fn test_discover_request_defaults() {
        let req: DiscoverTopicsRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.field, "technology");
        assert_eq!(req.content_type, "social_media");
        assert_eq!(req.target_audience, "general");
        assert!(req.custom_topics.is_empty());
    }

    #[tokio::test]
    async fn test_build_discovery_with_custom_topics() {
        let now = Utc::now();
        let response = build_discovery(
            &catalogue_service(),
            &TrendAnalyst::new(None),
            &request(" Marketing ", &["Pricing pages", "  "]),
            now,
        )
        .await
        .unwrap();

        assert!(!response.trending_topics.is_empty());
        assert!(response
            .trending_topics
            .iter()
            .any(|t| t.title == "Pricing pages" && t.source == ideas::CUSTOM_SOURCE));
        assert!(response
            .trending_topics
            .windows(2)
            .all(|w| w[0].popularity_score >= w[1].popularity_score));
        assert!(response.content_ideas.len() <= IDEA_TOPICS);
        assert!(response.content_ideas.iter().all(|i| i.hook.starts_with("Data Analysis:")));

        let insights = &response.market_insights;
        assert_eq!(insights.custom_topics_added, 1);
        assert_eq!(insights.field_analyzed, "marketing");
        assert_eq!(insights.target_audience, "founders");
        assert!(insights.summary.is_none());
        assert!(insights.status.is_none());
    }

    #[tokio::test]
    async fn test_build_discovery_rejects_blank_field() {
        let err = build_discovery(
            &catalogue_service(),
            &TrendAnalyst::new(None),
            &request("   ", &[]),
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_build_discovery_marks_fallback() {
        let empty = TrendingService::new(Vec::new(), Duration::from_secs(1));
        let response = build_discovery(
            &empty,
            &TrendAnalyst::new(None),
            &request("finance", &[]),
            Utc::now(),
        )
        .await
        .unwrap();
        assert_eq!(response.trending_topics.len(), 1);
        assert_eq!(
            response.market_insights.status.as_deref(),
            Some("Limited Data Mode")
        );
        assert_eq!(response.market_insights.data_sources, vec!["Fallback"]);
    }

    #[test]
    fn test_analyze_custom_requires_title() {
        let req = AnalyzeCustomTopicRequest {
            topic_title: "  ".to_string(),
            description: None,
            field: "marketing".to_string(),
            target_keywords: Vec::new(),
            content_type: "video".to_string(),
        };
        assert!(analyze_custom(&req, Utc::now()).is_err());

        let req = AnalyzeCustomTopicRequest {
            topic_title: "Referral loops".to_string(),
            ..req
        };
        let response = analyze_custom(&req, Utc::now()).unwrap();
        assert_eq!(response.topic.source, ideas::CUSTOM_ANALYSIS_SOURCE);
        assert!((60.0..85.0).contains(&response.topic.popularity_score));
        assert_eq!(response.content_ideas[0].platforms[0], "tiktok");
    }

    #[test]
    fn test_calendar_bounds() {
        let now = Utc::now();
        let req = |days| ContentCalendarRequest {
            field: "health".to_string(),
            days,
        };
        assert_eq!(build_calendar(&req(None), now).unwrap().total_posts, 30);
        assert_eq!(build_calendar(&req(Some(90)), now).unwrap().total_posts, 90);
        assert!(build_calendar(&req(Some(0)), now).is_err());
        assert!(build_calendar(&req(Some(91)), now).is_err());
    }

    #[tokio::test]
    async fn test_content_script_picks_ranked_topic() {
        let now = Utc::now();
        let service = catalogue_service();
        let analyst = TrendAnalyst::new(None);
        let ranked = build_discovery(&service, &analyst, &request("technology", &[]), now)
            .await
            .unwrap()
            .trending_topics;

        let response = build_content_script(&service, "Technology", 2, ScriptType::Blog, now)
            .await
            .unwrap();
        assert_eq!(response.topic, ranked[1].title);
        assert_eq!(response.hashtags, ranked[1].hashtags);
        assert!(matches!(response.script_content, ContentScript::Blog(_)));
    }

    #[tokio::test]
    async fn test_content_script_out_of_range_is_404() {
        let service = catalogue_service();
        for position in [0, 10_000] {
            let err =
                build_content_script(&service, "technology", position, ScriptType::Video, Utc::now())
                    .await
                    .unwrap_err();
            assert!(matches!(err, AppError::NotFound(_)));
        }
    }
}
