use async_trait::async_trait;
use serde::Deserialize;
use tokio::task::JoinSet;
use tracing::debug;

use super::{engagement_rate, round1, FetchContext, Platform, RawTrend, TrendSource};
use crate::trending::EngagementData;

const HN_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";
const STORIES_TO_INSPECT: usize = 30;
const MAX_TRENDS: usize = 6;

/// Top stories from the Hacker News Firebase API.
pub struct HackerNewsSource {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Item {
    id: u64,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    score: u64,
    #[serde(default)]
    descendants: u64,
    #[serde(default)]
    url: Option<String>,
}

impl HackerNewsSource {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, HN_BASE_URL)
    }

    pub fn with_base_url(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

async fn fetch_item(http: reqwest::Client, url: String) -> anyhow::Result<Option<Item>> {
    let item = http
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json::<Option<Item>>()
        .await?;
    Ok(item)
}

#[async_trait]
impl TrendSource for HackerNewsSource {
    fn platform(&self) -> Platform {
        Platform::HackerNews
    }

    async fn fetch(&self, _ctx: &FetchContext) -> anyhow::Result<Vec<RawTrend>> {
        let ids: Vec<u64> = self
            .http
            .get(format!("{}/topstories.json", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut set = JoinSet::new();
        for id in ids.into_iter().take(STORIES_TO_INSPECT) {
            let url = format!("{}/item/{id}.json", self.base_url);
            set.spawn(fetch_item(self.http.clone(), url));
        }

        let mut stories = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(Ok(Some(item))) if item.kind == "story" && item.title.is_some() => {
                    stories.push(item)
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => debug!("Skipping Hacker News item: {e}"),
                Err(e) => debug!("Hacker News item task failed: {e}"),
            }
        }
        stories.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));

        Ok(stories
            .into_iter()
            .take(MAX_TRENDS)
            .map(|item| {
                let discussion_url = format!("https://news.ycombinator.com/item?id={}", item.id);
                RawTrend {
                    platform: Platform::HackerNews,
                    title: item.title.unwrap_or_default(),
                    description: format!(
                        "Trending on Hacker News with {} points - Tech community favorite",
                        item.score
                    ),
                    popularity_score: round1((item.score as f64 / 10.0).min(100.0)),
                    source_url: item.url.unwrap_or_else(|| discussion_url.clone()),
                    discussion_url,
                    engagement: EngagementData {
                        score: Some(item.score),
                        comments: Some(item.descendants),
                        volume: None,
                        engagement_rate: engagement_rate(item.descendants, item.score),
                    },
                    signal_score: item.score as f64,
                    keywords: Vec::new(),
                    business_potential: None,
                }
            })
            .collect())
    }
}
