//! Fans out to a daily subset of sources, enriches what comes back and ranks
//! the result.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::task::JoinSet;
use tracing::{info, warn};

use super::enrich::enrich;
use super::fallback::fallback_topics;
use super::sources::{FetchContext, RawTrend, TrendSource};
use super::{daily_seed, normalize_field, TrendingTopic};

/// Sources consulted per request.
const SOURCES_PER_DAY: usize = 8;
/// Topics kept after ranking.
const MAX_TOPICS: usize = 35;
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(8);

/// Outcome of a discovery run.
#[derive(Debug, Clone)]
pub struct Discovery {
    pub topics: Vec<TrendingTopic>,
    /// True when every source came back empty and canned topics were used.
    pub fallback: bool,
}

pub struct TrendingService {
    sources: Vec<Arc<dyn TrendSource>>,
    source_timeout: Duration,
}

impl TrendingService {
    pub fn new(sources: Vec<Arc<dyn TrendSource>>, source_timeout: Duration) -> Self {
        Self {
            sources,
            source_timeout,
        }
    }

    /// Sources enabled today for `field`, in a seed-determined order.
    fn select_sources(&self, field: &str, seed: u64) -> Vec<Arc<dyn TrendSource>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pool: Vec<Arc<dyn TrendSource>> = self
            .sources
            .iter()
            .filter(|s| s.platform().serves_field(field))
            .cloned()
            .collect();
        pool.shuffle(&mut rng);
        pool.truncate(SOURCES_PER_DAY);
        pool
    }

    async fn collect(&self, sources: Vec<Arc<dyn TrendSource>>, ctx: FetchContext) -> Vec<RawTrend> {
        let ctx = Arc::new(ctx);
        let mut set = JoinSet::new();
        for source in sources {
            let ctx = Arc::clone(&ctx);
            let limit = self.source_timeout;
            set.spawn(async move {
                let platform = source.platform();
                (platform, tokio::time::timeout(limit, source.fetch(&ctx)).await)
            });
        }

        let mut raw = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((_, Ok(Ok(trends)))) => raw.extend(trends),
                Ok((platform, Ok(Err(e)))) => {
                    warn!(source = platform.display_name(), error = %e, "Trend source failed");
                }
                Ok((platform, Err(_))) => {
                    warn!(source = platform.display_name(), "Trend source timed out");
                }
                Err(e) => warn!(error = %e, "Trend source task panicked"),
            }
        }
        // Completion order varies; ranking jitter must not.
        raw.sort_by_key(|r| r.platform as u8);
        raw
    }

    /// Ranked topics for `field` as of `now`.
    pub async fn discover(&self, field: &str, now: DateTime<Utc>) -> Discovery {
        let field = normalize_field(field);
        let seed = daily_seed(now.date_naive());
        let selected = self.select_sources(&field, seed);
        info!(field = %field, seed, sources = selected.len(), "Discovering trending topics");

        let raw = self
            .collect(
                selected,
                FetchContext {
                    field: field.clone(),
                    seed,
                },
            )
            .await;

        let topics = rank(
            raw.into_iter().map(|r| {
                let factor = r.platform.ranking_factor();
                (enrich(r, &field, now), factor)
            }),
            seed,
        );

        if topics.is_empty() {
            warn!(field = %field, "No trending topics from any source; using fallback");
            return Discovery {
                topics: fallback_topics(&field, now),
                fallback: true,
            };
        }
        Discovery {
            topics,
            fallback: false,
        }
    }
}

/// Scores every topic, sorts best first and keeps the top [`MAX_TOPICS`].
/// Jitter is seeded so the order is stable within a day.
fn rank(topics: impl Iterator<Item = (TrendingTopic, f64)>, seed: u64) -> Vec<TrendingTopic> {
    let mut rng = StdRng::seed_from_u64(seed ^ 0x5eed);
    let mut ranked: Vec<TrendingTopic> = topics
        .map(|(mut topic, factor)| {
            let jitter: f64 = rng.gen_range(-5.0..=5.0);
            let base = topic.popularity_score * 0.4 + topic.business_score() * 0.3 + jitter * 0.3;
            topic.comprehensive_score = (base * factor * 100.0).round() / 100.0;
            topic
        })
        .collect();
    ranked.sort_by(|a, b| b.comprehensive_score.total_cmp(&a.comprehensive_score));
    ranked.truncate(MAX_TOPICS);
    ranked
}
