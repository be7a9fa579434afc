use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use super::{engagement_rate, round1, FetchContext, Platform, RawTrend, TrendSource};
use crate::trending::enrich::truncate_chars;
use crate::trending::EngagementData;

const REDDIT_BASE_URL: &str = "https://www.reddit.com";
const USER_AGENT: &str = "OpsdeskTrendBot/1.0";
const MAX_TRENDS: usize = 8;

/// Hot posts from the subreddit that matches the field.
pub struct RedditSource {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: u64,
    subreddit: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    permalink: Option<String>,
}

impl RedditSource {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, REDDIT_BASE_URL)
    }

    pub fn with_base_url(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

fn subreddit_for(field: &str) -> &str {
    match field {
        "finance" => "investing",
        "technology" | "marketing" | "health" | "education" | "fashion" | "beauty"
        | "lifestyle" | "fitness" | "food" | "travel" | "entertainment" | "sports" | "gaming"
        | "art" => field,
        _ => "all",
    }
}

#[async_trait]
impl TrendSource for RedditSource {
    fn platform(&self) -> Platform {
        Platform::Reddit
    }

    async fn fetch(&self, ctx: &FetchContext) -> anyhow::Result<Vec<RawTrend>> {
        let subreddit = subreddit_for(&ctx.field);
        let limit = 25 + ctx.seed % 25;
        let url = format!("{}/r/{subreddit}/hot.json?limit={limit}", self.base_url);

        let listing: Listing = self
            .http
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("Unexpected Reddit listing shape")?;

        let mut posts: Vec<Post> = listing.data.children.into_iter().map(|c| c.data).collect();
        posts.sort_by(|a, b| b.score.cmp(&a.score));

        Ok(posts
            .into_iter()
            .take(MAX_TRENDS)
            .map(|post| {
                let score = post.score.max(0) as u64;
                let description = if post.selftext.trim().is_empty() {
                    post.title.clone()
                } else {
                    truncate_chars(post.selftext.trim(), 200)
                };
                let discussion_url = match &post.permalink {
                    Some(permalink) => format!("{REDDIT_BASE_URL}{permalink}"),
                    None => format!("{REDDIT_BASE_URL}/r/{}/", post.subreddit),
                };
                RawTrend {
                    platform: Platform::Reddit,
                    title: post.title,
                    description,
                    popularity_score: round1((score as f64 / 100.0).min(100.0)),
                    source_url: post.url.unwrap_or_default(),
                    discussion_url,
                    engagement: EngagementData {
                        score: Some(score),
                        comments: Some(post.num_comments),
                        volume: None,
                        engagement_rate: engagement_rate(post.num_comments, score),
                    },
                    signal_score: score as f64,
                    keywords: Vec::new(),
                    business_potential: None,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_subreddit_mapping() {
        assert_eq!(subreddit_for("finance"), "investing");
        assert_eq!(subreddit_for("gaming"), "gaming");
        assert_eq!(subreddit_for("underwater basketry"), "all");
    }

    #[tokio::test]
    async fn test_fetch_sorts_by_score_and_maps_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/technology/hot.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "children": [
                    { "data": { "title": "Small post", "score": 150, "num_comments": 30,
                                "subreddit": "technology", "url": "https://a.test", "selftext": "" } },
                    { "data": { "title": "Big AI launch", "score": 12000, "num_comments": 900,
                                "subreddit": "technology", "url": "https://b.test",
                                "selftext": "Details here", "permalink": "/r/technology/comments/x1/" } }
                ]}
            })))
            .mount(&server)
            .await;

        let source = RedditSource::with_base_url(reqwest::Client::new(), &server.uri());
        let ctx = FetchContext {
            field: "technology".to_string(),
            seed: 3,
        };
        let trends = source.fetch(&ctx).await.unwrap();

        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].title, "Big AI launch");
        assert!((trends[0].popularity_score - 100.0).abs() < 1e-9);
        assert_eq!(trends[0].description, "Details here");
        assert_eq!(
            trends[0].discussion_url,
            "https://www.reddit.com/r/technology/comments/x1/"
        );
        assert_eq!(trends[1].description, "Small post");
        assert!((trends[1].popularity_score - 1.5).abs() < 1e-9);
        assert!((trends[1].engagement.engagement_rate - 20.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_http_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let source = RedditSource::with_base_url(reqwest::Client::new(), &server.uri());
        let ctx = FetchContext {
            field: "marketing".to_string(),
            seed: 0,
        };
        assert!(source.fetch(&ctx).await.is_err());
    }
}
