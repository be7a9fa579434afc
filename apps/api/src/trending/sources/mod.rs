pub mod catalog;
pub mod hackernews;
pub mod reddit;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{BusinessPotential, EngagementData};

/// Every platform the aggregator knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Reddit,
    HackerNews,
    Twitter,
    Instagram,
    TikTok,
    GitHub,
    ProductHunt,
    Medium,
    DevTo,
    YouTube,
    LinkedIn,
    StackOverflow,
    Quora,
    Pinterest,
    News,
}

impl Platform {
    pub const ALL: [Platform; 15] = [
        Platform::Reddit,
        Platform::HackerNews,
        Platform::Twitter,
        Platform::Instagram,
        Platform::TikTok,
        Platform::GitHub,
        Platform::ProductHunt,
        Platform::Medium,
        Platform::DevTo,
        Platform::YouTube,
        Platform::LinkedIn,
        Platform::StackOverflow,
        Platform::Quora,
        Platform::Pinterest,
        Platform::News,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Reddit => "Reddit",
            Platform::HackerNews => "Hacker News",
            Platform::Twitter => "Twitter/X",
            Platform::Instagram => "Instagram",
            Platform::TikTok => "TikTok",
            Platform::GitHub => "GitHub",
            Platform::ProductHunt => "Product Hunt",
            Platform::Medium => "Medium",
            Platform::DevTo => "DEV.to",
            Platform::YouTube => "YouTube",
            Platform::LinkedIn => "LinkedIn",
            Platform::StackOverflow => "Stack Overflow",
            Platform::Quora => "Quora",
            Platform::Pinterest => "Pinterest",
            Platform::News => "News",
        }
    }

    /// Ranking boost for platforms whose audiences convert better.
    pub fn ranking_factor(&self) -> f64 {
        match self {
            Platform::LinkedIn | Platform::YouTube | Platform::GitHub => 1.2,
            Platform::News | Platform::Medium | Platform::DevTo => 1.1,
            _ => 1.0,
        }
    }

    /// Developer-centric platforms are only consulted for technical fields.
    pub fn serves_field(&self, field: &str) -> bool {
        match self {
            Platform::HackerNews => {
                matches!(field, "technology" | "startup" | "programming" | "business")
            }
            Platform::GitHub | Platform::DevTo => {
                matches!(field, "technology" | "programming" | "startup")
            }
            Platform::StackOverflow => matches!(field, "technology" | "programming"),
            _ => true,
        }
    }
}

/// What a source knows about one trend before enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTrend {
    pub platform: Platform,
    pub title: String,
    pub description: String,
    /// 0..=100
    pub popularity_score: f64,
    pub source_url: String,
    pub discussion_url: String,
    pub engagement: EngagementData,
    /// Raw platform metric (upvotes, stars, volume) that feeds business signals.
    pub signal_score: f64,
    /// Empty means "extract from the title".
    pub keywords: Vec<String>,
    /// `None` means "derive from the title and engagement".
    pub business_potential: Option<BusinessPotential>,
}

/// Inputs every source receives.
#[derive(Debug, Clone)]
pub struct FetchContext {
    /// Normalised field, e.g. "technology".
    pub field: String,
    pub seed: u64,
}

/// A platform feed.
#[async_trait]
pub trait TrendSource: Send + Sync {
    fn platform(&self) -> Platform;

    async fn fetch(&self, ctx: &FetchContext) -> anyhow::Result<Vec<RawTrend>>;
}

/// The full set of sources: live Reddit and Hacker News, catalogues for the rest.
pub fn default_sources(http: reqwest::Client) -> Vec<Arc<dyn TrendSource>> {
    let mut sources: Vec<Arc<dyn TrendSource>> = vec![
        Arc::new(reddit::RedditSource::new(http.clone())),
        Arc::new(hackernews::HackerNewsSource::new(http)),
    ];
    sources.extend(
        Platform::ALL
            .iter()
            .filter(|p| !matches!(p, Platform::Reddit | Platform::HackerNews))
            .map(|p| Arc::new(catalog::CatalogSource::new(*p)) as Arc<dyn TrendSource>),
    );
    sources
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Percent of comments per point, rounded to two decimals.
pub(crate) fn engagement_rate(comments: u64, score: u64) -> f64 {
    let rate = comments as f64 / score.max(1) as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}
