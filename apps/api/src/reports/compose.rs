//! Turns a discovery result into report blocks.

use chrono::{DateTime, Utc};

use super::render::Block;
use crate::trending::enrich::truncate_chars;
use crate::trending::handlers::DiscoverTopicsResponse;
use crate::trending::TrendingTopic;

/// Topics printed in full.
pub const MAX_REPORT_TOPICS: usize = 15;
const HIGH_POTENTIAL: f64 = 70.0;

/// Executive-summary figures.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub average_popularity: f64,
    pub high_potential: usize,
    pub revenue_opportunities: usize,
    pub sources: usize,
}

impl SummaryStats {
    pub fn from_topics(topics: &[TrendingTopic]) -> Self {
        let average_popularity = if topics.is_empty() {
            0.0
        } else {
            topics.iter().map(|t| t.popularity_score).sum::<f64>() / topics.len() as f64
        };
        let mut sources: Vec<&str> = topics.iter().map(|t| t.source.as_str()).collect();
        sources.sort_unstable();
        sources.dedup();

        Self {
            average_popularity,
            high_potential: topics
                .iter()
                .filter(|t| t.business_score() > HIGH_POTENTIAL)
                .count(),
            revenue_opportunities: topics
                .iter()
                .map(|t| t.monetization_opportunities.len())
                .sum(),
            sources: sources.len(),
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn report_title(field: &str) -> String {
    format!("Trending Topics Report: {}", capitalize(field))
}

fn topic_blocks(index: usize, topic: &TrendingTopic) -> Vec<Block> {
    let mut blocks = vec![
        Block::Subheading(format!("{}. {}", index + 1, topic.title)),
        Block::Paragraph(format!(
            "Source: {} | Popularity: {:.1}/100",
            topic.source, topic.popularity_score
        )),
    ];
    if !topic.source_url.is_empty() {
        blocks.push(Block::Paragraph(format!(
            "Source URL: {}",
            truncate_chars(&topic.source_url, 50)
        )));
    }
    if !topic.discussion_url.is_empty() && topic.discussion_url != topic.source_url {
        blocks.push(Block::Paragraph(format!(
            "Discussion: {}",
            truncate_chars(&topic.discussion_url, 50)
        )));
    }
    if !topic.description.is_empty() {
        blocks.push(Block::Paragraph(truncate_chars(&topic.description, 200)));
    }
    if let Some(bp) = &topic.business_potential {
        blocks.push(Block::Paragraph(format!(
            "Business potential: {:.0}/100 ({} market, {} competition)",
            bp.score,
            bp.market_size.label(),
            bp.competition_level.label()
        )));
    }
    if let Some(idea) = topic.monetization_opportunities.first() {
        blocks.push(Block::Paragraph(format!(
            "Top opportunity: {} - {} ({})",
            idea.kind, idea.description, idea.revenue_estimate
        )));
    }
    blocks.extend(
        topic
            .content_angles
            .iter()
            .take(3)
            .map(|angle| Block::Bullet(angle.clone())),
    );
    if !topic.hashtags.is_empty() {
        let tags: Vec<&str> = topic.hashtags.iter().take(8).map(String::as_str).collect();
        blocks.push(Block::Paragraph(format!("Hashtags: {}", tags.join(" "))));
    }
    blocks
}

/// The full report body.
pub fn compose_report(
    discovery: &DiscoverTopicsResponse,
    recommendations: &[String],
    generated_by: &str,
    now: DateTime<Utc>,
) -> Vec<Block> {
    let insights = &discovery.market_insights;
    let topics = &discovery.trending_topics;
    let stats = SummaryStats::from_topics(topics);

    let mut blocks = vec![
        Block::Title(report_title(&insights.field_analyzed)),
        Block::Spacer(2.0),
        Block::Paragraph(format!("Field: {}", capitalize(&insights.field_analyzed))),
        Block::Paragraph(format!("Generated by: {generated_by}")),
        Block::Paragraph(format!("Generated on: {}", now.format("%B %d, %Y at %H:%M UTC"))),
        Block::Paragraph(format!("Topics analyzed: {}", topics.len())),
        Block::Paragraph(format!("Data sources: {}", stats.sources)),
        Block::Heading("Executive Summary".to_string()),
        Block::Paragraph(format!(
            "Average popularity score: {:.1}/100",
            stats.average_popularity
        )),
        Block::Paragraph(format!(
            "High-potential topics (business potential above {HIGH_POTENTIAL:.0}): {}",
            stats.high_potential
        )),
        Block::Paragraph(format!(
            "Revenue opportunities identified: {}",
            stats.revenue_opportunities
        )),
        Block::Paragraph(format!("Sources represented: {}", stats.sources)),
    ];
    if let Some(summary) = &insights.summary {
        blocks.push(Block::Paragraph(summary.clone()));
    }
    if let Some(status) = &insights.status {
        blocks.push(Block::Paragraph(format!("Data status: {status}. {}", insights.note)));
    }

    blocks.push(Block::Heading("Trending Topics".to_string()));
    if topics.is_empty() {
        blocks.push(Block::Paragraph(
            "No trending topics were available for this field.".to_string(),
        ));
    }
    for (i, topic) in topics.iter().take(MAX_REPORT_TOPICS).enumerate() {
        blocks.extend(topic_blocks(i, topic));
    }

    if !recommendations.is_empty() {
        blocks.push(Block::Heading("Strategic Recommendations".to_string()));
        blocks.extend(recommendations.iter().map(|r| Block::Bullet(r.clone())));
    }
    blocks
}
