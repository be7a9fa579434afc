//! Turns a [`RawTrend`] into a client-ready [`TrendingTopic`].
//!
//! All heuristics here are keyword driven and deterministic: the same trend
//! enriched on the same day always yields the same topic.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::sources::{Platform, RawTrend};
use super::{
    AudienceTargeting, BusinessPotential, Level, MonetizationIdea, RevenueInsights,
    TrendingTopic,
};

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did",
    "will", "would", "could", "should", "may", "might", "must", "shall", "can", "this", "that",
    "these", "those",
];

const BUSINESS_TERMS: &[&str] = &[
    "startup", "business", "revenue", "profit", "funding", "investment", "market", "industry",
    "company", "enterprise", "saas", "b2b", "marketing", "growth", "acquisition",
    "monetization", "finance", "economy", "trade", "commerce", "success", "launch", "product",
];

const TECH_TERMS: &[&str] = &[
    "ai", "machine learning", "automation", "cloud", "software", "app", "api", "technology",
    "tech", "digital", "platform", "tool", "service", "innovation", "development", "programming",
];

const MAX_KEYWORDS: usize = 10;
const MAX_HASHTAGS: usize = 8;
const MAX_ANGLES: usize = 4;
const MAX_IDEAS: usize = 3;
const MAX_DESCRIPTION: usize = 150;

/// Truncates to `max` characters, appending "..." when something was cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{cut}...")
}

fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whole-word match for single terms, substring match for phrases.
fn mentions(tokens: &[String], lowered: &str, term: &str) -> bool {
    if term.contains(' ') {
        lowered.contains(term)
    } else {
        tokens.iter().any(|t| t == term)
    }
}

fn mentions_any(tokens: &[String], lowered: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| mentions(tokens, lowered, term))
}

// ────────────────────────────────────────────────────────────────────────────
// Keywords
// ────────────────────────────────────────────────────────────────────────────

/// Most frequent non-stop-words of three or more letters, ties broken by
/// first appearance.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let lowered = text.to_lowercase();
    let candidates = lowered
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|w| w.len() >= 3 && !STOP_WORDS.contains(w));
    for (position, word) in candidates.enumerate() {
        counts
            .entry(word.to_string())
            .and_modify(|(count, _)| *count += 1)
            .or_insert((1, position));
    }

    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|(_, (ca, pa)), (_, (cb, pb))| cb.cmp(ca).then(pa.cmp(pb)));
    ranked
        .into_iter()
        .take(MAX_KEYWORDS)
        .map(|(word, _)| word)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Business signals
// ────────────────────────────────────────────────────────────────────────────

/// Scores the commercial relevance of a title.
///
/// `signal` is the raw platform metric (upvotes, stars, volume) and `ratio`
/// the comment-to-score ratio as a fraction.
pub fn analyze_business_potential(title: &str, signal: f64, ratio: f64) -> BusinessPotential {
    let lowered = title.to_lowercase();
    let tokens = words(title);
    let business = BUSINESS_TERMS
        .iter()
        .filter(|t| mentions(&tokens, &lowered, t))
        .count();
    let tech = TECH_TERMS
        .iter()
        .filter(|t| mentions(&tokens, &lowered, t))
        .count();

    let market_size = match business {
        n if n >= 2 => Level::High,
        1 => Level::Medium,
        _ => Level::Low,
    };
    let competition_level = match tech {
        n if n >= 2 => Level::Low,
        1 => Level::Medium,
        _ => Level::High,
    };

    let raw = business as f64 * 20.0
        + tech as f64 * 15.0
        + (signal / 100.0).min(1.0) * 30.0
        + ratio * 100.0 * 0.35;
    let score = (raw.clamp(0.0, 100.0) * 10.0).round() / 10.0;

    BusinessPotential {
        score,
        market_size,
        competition_level,
        key_factors: key_factors(title),
    }
}

/// Up to three qualitative drivers named by the title.
pub fn key_factors(title: &str) -> Vec<String> {
    let lowered = title.to_lowercase();
    let tokens = words(title);
    let rules: [(&[&str], &str); 5] = [
        (&["new", "launch", "announce", "release"], "Market timing opportunity"),
        (
            &["ai", "automation", "blockchain", "ar", "vr"],
            "Technology disruption potential",
        ),
        (&["problem", "solution", "fix", "improve"], "Problem-solving opportunity"),
        (&["scale", "global", "enterprise", "platform"], "Scalability potential"),
        (
            &["subscription", "saas", "marketplace", "advertising"],
            "Clear revenue model",
        ),
    ];
    rules
        .iter()
        .filter(|(terms, _)| mentions_any(&tokens, &lowered, terms))
        .map(|(_, factor)| factor.to_string())
        .take(3)
        .collect()
}

fn idea(
    kind: &str,
    description: &str,
    potential: &str,
    timeframe: &str,
    steps: [&str; 4],
    revenue: &str,
) -> MonetizationIdea {
    MonetizationIdea {
        kind: kind.to_string(),
        description: description.to_string(),
        potential: potential.to_string(),
        timeframe: timeframe.to_string(),
        action_steps: steps.iter().map(|s| s.to_string()).collect(),
        revenue_estimate: revenue.to_string(),
    }
}

/// Up to three keyword-triggered revenue plays, most actionable first.
pub fn monetization_ideas(title: &str, signal: f64, ratio: f64) -> Vec<MonetizationIdea> {
    let lowered = title.to_lowercase();
    let tokens = words(title);
    let has = |terms: &[&str]| mentions_any(&tokens, &lowered, terms);
    let mut ideas = Vec::new();

    if signal > 500.0 || ratio > 0.1 {
        ideas.push(idea(
            "Content Marketing Campaign",
            "Launch a comprehensive content series around this topic. Expected ROI: 300-500% within 6 months",
            "High ($10K-50K revenue potential)",
            "2-4 weeks",
            [
                "Create 5-7 blog posts targeting related keywords",
                "Develop video content for YouTube/LinkedIn",
                "Build email nurture sequence",
                "Create lead magnets (guides, templates)",
            ],
            "$10,000-$50,000",
        ));
    }
    if has(&["ai", "automation", "software", "tool", "app"]) {
        ideas.push(idea(
            "Consulting & Implementation",
            "Offer specialized consulting services for businesses adopting this technology",
            "Very High ($25K-100K revenue potential)",
            "4-8 weeks",
            [
                "Create service packages ($2K-15K each)",
                "Develop case studies and templates",
                "Build LinkedIn thought leadership",
                "Launch targeted LinkedIn ads to CTOs/CEOs",
            ],
            "$25,000-$100,000",
        ));
    }
    if has(&["problem", "issue", "challenge", "crisis", "fix"]) {
        ideas.push(idea(
            "Solution Development",
            "Create a digital product or service that solves this specific problem",
            "High ($15K-75K revenue potential)",
            "6-12 weeks",
            [
                "Validate problem with target audience",
                "Build MVP (software/course/framework)",
                "Launch with early-bird pricing",
                "Scale through partnerships",
            ],
            "$15,000-$75,000",
        ));
    }
    if has(&["new", "learn", "guide", "how", "tutorial"]) {
        ideas.push(idea(
            "Online Course/Workshop",
            "Create premium educational content around this trending topic",
            "Medium-High ($5K-30K revenue potential)",
            "3-6 weeks",
            [
                "Record comprehensive course (5-10 modules)",
                "Launch on multiple platforms (Udemy, Teachable)",
                "Create live workshop series ($200-500 each)",
                "Build affiliate program for promotion",
            ],
            "$5,000-$30,000",
        ));
    }
    if has(&["business", "enterprise", "company", "industry", "corporate"]) {
        ideas.push(idea(
            "B2B SaaS/Service",
            "Develop enterprise solution targeting businesses in this space",
            "Very High ($50K-200K revenue potential)",
            "8-16 weeks",
            [
                "Research enterprise pain points",
                "Build B2B landing pages",
                "Create sales deck and case studies",
                "Launch outbound sales campaign",
            ],
            "$50,000-$200,000",
        ));
    }
    if ratio > 0.08 {
        ideas.push(idea(
            "Premium Community",
            "Build a paid community around this trending topic",
            "Medium ($3K-20K recurring revenue)",
            "2-4 weeks",
            [
                "Create Discord/Circle community",
                "Offer tiered memberships ($29-99/month)",
                "Provide exclusive content and networking",
                "Host monthly expert sessions",
            ],
            "$3,000-$20,000/month recurring",
        ));
    }

    ideas.truncate(MAX_IDEAS);
    ideas
}

// ────────────────────────────────────────────────────────────────────────────
// Content assets
// ────────────────────────────────────────────────────────────────────────────

pub fn content_angles(topic: &TrendingTopic, field: &str) -> Vec<String> {
    let mut angles = vec![format!(
        "Fact: This is trending on {} with a {:.1} popularity score",
        topic.source, topic.popularity_score
    )];

    let engagement = &topic.engagement_data;
    angles.push(format!(
        "Data: {} comments, {}% engagement rate",
        engagement.comments.unwrap_or(0),
        engagement.engagement_rate
    ));

    if let Some(bp) = topic.business_potential.as_ref().filter(|bp| bp.score > 50.0) {
        angles.push(format!(
            "Opportunity: High business potential ({}/100) in {} market",
            bp.score,
            bp.market_size.label()
        ));
    }

    if topic.title.chars().count() > 50 {
        let head: String = topic.title.chars().take(50).collect();
        angles.push(format!(
            "Trend: Growing interest in {field} sector with {head}..."
        ));
    } else {
        angles.push(format!("Trend: {}", topic.title));
    }

    if let Some(top) = topic.monetization_opportunities.first() {
        angles.push(format!(
            "Action: {} opportunity with {} potential",
            top.kind, top.potential
        ));
    }

    angles.truncate(MAX_ANGLES);
    angles
}

fn field_hashtags(field: &str) -> &'static [&'static str] {
    match field {
        "technology" => &["#TechTrends", "#Innovation", "#DigitalTransformation", "#StartupTech"],
        "marketing" => &["#MarketingTrends", "#DigitalMarketing", "#ContentStrategy", "#GrowthHacking"],
        "finance" => &["#FinTech", "#Investing", "#MarketTrends", "#FinancialPlanning"],
        "health" => &["#HealthTech", "#Wellness", "#MedicalInnovation", "#HealthTrends"],
        "education" => &["#EdTech", "#OnlineLearning", "#EducationTrends", "#SkillDevelopment"],
        _ => &["#Trending", "#BusinessGrowth"],
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .filter(|c| !c.is_whitespace())
            .collect(),
        None => String::new(),
    }
}

/// Field, keyword and platform hashtags; first occurrence wins.
pub fn hashtags(topic: &TrendingTopic, platform: Option<Platform>, field: &str) -> Vec<String> {
    let mut tags: Vec<String> = field_hashtags(field).iter().map(|t| t.to_string()).collect();
    tags.extend(
        topic
            .keywords
            .iter()
            .take(3)
            .map(|k| format!("#{}", capitalize(k))),
    );
    match platform {
        Some(Platform::Reddit) => tags.push("#RedditTrends".to_string()),
        Some(Platform::HackerNews) => tags.push("#HackerNews".to_string()),
        Some(Platform::Twitter) => tags.push("#TwitterTrends".to_string()),
        _ => {}
    }
    if topic.engagement_data.engagement_rate > 5.0 {
        tags.push("#ViralContent".to_string());
    }

    let mut unique: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if tag.len() > 1 && !unique.iter().any(|u| u.eq_ignore_ascii_case(&tag)) {
            unique.push(tag);
        }
    }
    unique.truncate(MAX_HASHTAGS);
    unique
}

/// Qualitative engagement bucket from the comment ratio (percent).
pub fn engagement_potential(engagement_rate: f64) -> &'static str {
    if engagement_rate > 10.0 {
        "high"
    } else if engagement_rate > 5.0 {
        "medium"
    } else {
        "low"
    }
}

fn freshness_label(platform: Platform) -> &'static str {
    match platform {
        Platform::Reddit => "Fresh data for",
        Platform::HackerNews => "HN trending for",
        Platform::TikTok => "TikTok viral",
        Platform::ProductHunt => "Product Hunt launch",
        Platform::LinkedIn => "LinkedIn professional",
        Platform::News => "Breaking news",
        Platform::Twitter => "Twitter trending",
        Platform::Instagram => "Instagram trending",
        Platform::GitHub => "GitHub trending",
        Platform::Medium => "Medium trending",
        Platform::DevTo => "DEV.to trending",
        Platform::YouTube => "YouTube trending",
        Platform::StackOverflow => "Stack Overflow trending",
        Platform::Quora => "Quora trending",
        Platform::Pinterest => "Pinterest trending",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Revenue insights
// ────────────────────────────────────────────────────────────────────────────

fn immediate_action(topic: &TrendingTopic) -> String {
    let score = topic.popularity_score;
    if score > 80.0 {
        format!(
            "HIGH PRIORITY: Act within 24 hours - {} viral content opportunity",
            topic.source
        )
    } else if score > 60.0 {
        format!(
            "MEDIUM PRIORITY: Create content within 3 days - strong {} trend",
            topic.source
        )
    } else if topic.engagement_data.engagement_rate > 10.0 {
        "ENGAGEMENT PLAY: High discussion activity - join the conversation".to_string()
    } else {
        "RESEARCH OPPORTUNITY: Monitor trend development - potential future opportunity"
            .to_string()
    }
}

fn content_opportunities(platform: Option<Platform>, field: &str) -> Vec<String> {
    let mut items: Vec<String> = match platform {
        Some(Platform::Reddit) => vec![
            "Create detailed analysis post for Reddit community".to_string(),
            "Record 'Reddit Reaction' video for YouTube".to_string(),
        ],
        Some(Platform::Instagram) => vec![
            "Design infographic series for Instagram".to_string(),
            "Create Instagram Stories with polls/questions".to_string(),
        ],
        Some(Platform::TikTok) => vec![
            "Create educational TikTok using trending audio".to_string(),
            "Film quick tips video jumping on viral trend".to_string(),
        ],
        _ => Vec::new(),
    };
    items.push(format!("Write comprehensive blog post about {field} trend"));
    items.push("Record podcast episode discussing implications".to_string());
    items.push("Create data visualization showing trend impact".to_string());
    items.truncate(4);
    items
}

fn audience_targeting(
    topic: &TrendingTopic,
    platform: Option<Platform>,
    field: &str,
) -> AudienceTargeting {
    let market = topic
        .business_potential
        .as_ref()
        .map_or(Level::Medium, |bp| bp.market_size)
        .label()
        .to_lowercase();

    let primary = match field {
        "technology" => format!("Tech professionals, CTOs, developers ({market} market)"),
        "marketing" => format!("Marketing managers, CMOs, agency owners ({market} market)"),
        "finance" => format!("Financial advisors, investors, CFOs ({market} market)"),
        "health" => format!("Healthcare professionals, wellness coaches ({market} market)"),
        "education" => {
            format!("Educators, training managers, L&D professionals ({market} market)")
        }
        _ => format!("Business professionals in {field} ({market} market)"),
    };
    let secondary = match field {
        "technology" => "Entrepreneurs, business owners interested in tech solutions".to_string(),
        "marketing" => "Small business owners, content creators, consultants".to_string(),
        "finance" => "Individual investors, financial planners, accountants".to_string(),
        "health" => "Health-conscious consumers, fitness enthusiasts".to_string(),
        "education" => "Students, career changers, skill upgraders".to_string(),
        _ => format!("General audience interested in {field}"),
    };
    let demographics = match platform {
        Some(Platform::TikTok) => "Ages 18-34, mobile-first, video-native users",
        Some(Platform::Instagram) => "Ages 25-44, visual content consumers, lifestyle-focused",
        Some(Platform::Reddit) => "Ages 25-44, early adopters, discussion-oriented",
        Some(Platform::HackerNews) => "Ages 28-45, technical professionals, innovation-focused",
        _ => "Ages 25-54, professional decision-makers",
    };
    let business = topic.business_score();
    let psychographics = if business > 70.0 {
        "Early adopters, risk-takers, innovation enthusiasts"
    } else if business > 50.0 {
        "Informed professionals, strategic thinkers, growth-minded"
    } else {
        "Cautious adopters, research-oriented, value-conscious"
    };

    AudienceTargeting {
        primary_audience: primary,
        secondary_audience: secondary,
        demographics: demographics.to_string(),
        psychographics: psychographics.to_string(),
    }
}

fn competitive_advantage(topic: &TrendingTopic) -> String {
    let competition = topic
        .business_potential
        .as_ref()
        .map_or(Level::Medium, |bp| bp.competition_level);
    let score = topic.popularity_score;
    let text = match competition {
        Level::Low if score > 60.0 => {
            "BLUE OCEAN: Low competition, high interest - first-mover advantage"
        }
        Level::Medium if score > 80.0 => "SPEED ADVANTAGE: Act fast to capture market share",
        Level::High => "NICHE FOCUS: Differentiate with unique angle or specific audience",
        _ => "RESEARCH PHASE: Monitor and prepare for future opportunity",
    };
    text.to_string()
}

pub fn revenue_insights(
    topic: &TrendingTopic,
    platform: Option<Platform>,
    field: &str,
) -> RevenueInsights {
    RevenueInsights {
        immediate_action: immediate_action(topic),
        content_opportunities: content_opportunities(platform, field),
        audience_targeting: audience_targeting(topic, platform, field),
        competitive_advantage: competitive_advantage(topic),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Full enrichment of one raw trend. `comprehensive_score` is left at zero
/// for the ranker.
pub fn enrich(raw: RawTrend, field: &str, now: DateTime<Utc>) -> TrendingTopic {
    let ratio = raw.engagement.engagement_rate / 100.0;
    let keywords = if raw.keywords.is_empty() {
        extract_keywords(&raw.title)
    } else {
        raw.keywords
    };
    let business_potential = raw
        .business_potential
        .unwrap_or_else(|| analyze_business_potential(&raw.title, raw.signal_score, ratio));
    let monetization = monetization_ideas(&raw.title, raw.signal_score, ratio);

    let mut topic = TrendingTopic {
        description: truncate_chars(&raw.description, MAX_DESCRIPTION),
        popularity_score: raw.popularity_score.clamp(0.0, 100.0),
        source: raw.platform.display_name().to_string(),
        source_url: raw.source_url,
        discussion_url: raw.discussion_url,
        keywords,
        engagement_potential: engagement_potential(raw.engagement.engagement_rate).to_string(),
        engagement_data: raw.engagement,
        business_potential: Some(business_potential),
        monetization_opportunities: monetization,
        daily_freshness: format!(
            "{} {}",
            freshness_label(raw.platform),
            now.format("%B %d, %Y")
        ),
        trending_since: now.to_rfc3339(),
        title: raw.title,
        ..TrendingTopic::default()
    };
    topic.content_angles = content_angles(&topic, field);
    topic.hashtags = hashtags(&topic, Some(raw.platform), field);
    topic.revenue_insights = Some(revenue_insights(&topic, Some(raw.platform), field));
    topic
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trending::EngagementData;
    use chrono::TimeZone;

    fn raw(title: &str, popularity: f64, signal: f64, rate: f64) -> RawTrend {
        RawTrend {
            platform: Platform::Reddit,
            title: title.to_string(),
            description: "d".repeat(180),
            popularity_score: popularity,
            source_url: "https://example.test/post".to_string(),
            discussion_url: "https://www.reddit.com/r/technology/".to_string(),
            engagement: EngagementData {
                score: Some(signal as u64),
                comments: Some(12),
                volume: None,
                engagement_rate: rate,
            },
            signal_score: signal,
            keywords: Vec::new(),
            business_potential: None,
        }
    }

    #[test]
    fn test_extract_keywords_filters_and_ranks() {
        let keywords = extract_keywords("The AI tool that fixes the AI tool problem, and more tools");
        assert_eq!(keywords[0], "tool");
        assert!(!keywords.contains(&"the".to_string()));
        assert!(!keywords.contains(&"ai".to_string()), "two-letter words are dropped");
        assert!(keywords.contains(&"problem".to_string()));
    }

    #[test]
    fn test_extract_keywords_caps_at_ten() {
        let text = "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo lima";
        assert_eq!(extract_keywords(text).len(), 10);
    }

    #[test]
    fn test_business_potential_scoring() {
        let bp = analyze_business_potential("AI startup raises funding for automation platform", 250.0, 0.2);
        // business: startup, funding = 2; tech: ai, automation, platform = 3
        // 40 + 45 + 30 + 7 = 122 -> capped
        assert!((bp.score - 100.0).abs() < 1e-9);
        assert_eq!(bp.market_size, Level::High);
        assert_eq!(bp.competition_level, Level::Low);
        assert_eq!(
            bp.key_factors,
            vec!["Technology disruption potential", "Scalability potential"]
        );
    }

    #[test]
    fn test_business_potential_for_plain_title() {
        let bp = analyze_business_potential("Cats sleeping in boxes", 50.0, 0.0);
        assert!((bp.score - 15.0).abs() < 1e-9);
        assert_eq!(bp.market_size, Level::Low);
        assert_eq!(bp.competition_level, Level::High);
        assert!(bp.key_factors.is_empty());
    }

    #[test]
    fn test_words_do_not_match_inside_other_words() {
        // "market" contains "ar" but is not an AR/VR mention
        assert!(key_factors("Market update").is_empty());
    }

    #[test]
    fn test_monetization_ideas_are_capped_and_ordered() {
        let ideas = monetization_ideas("New AI tool fixes business problem", 900.0, 0.2);
        let kinds: Vec<&str> = ideas.iter().map(|i| i.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec![
                "Content Marketing Campaign",
                "Consulting & Implementation",
                "Solution Development"
            ]
        );
        assert!(ideas.iter().all(|i| i.action_steps.len() == 4));
    }

    #[test]
    fn test_monetization_needs_a_trigger() {
        assert!(monetization_ideas("Quiet afternoon", 10.0, 0.0).is_empty());
        let community = monetization_ideas("Quiet afternoon", 10.0, 0.09);
        assert_eq!(community.len(), 1);
        assert_eq!(community[0].kind, "Premium Community");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("ééééé", 2), "éé...");
    }

    #[test]
    fn test_enrich_builds_complete_topic() {
        let now = Utc.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap();
        let topic = enrich(
            raw("New AI platform for small business automation", 85.0, 8500.0, 12.0),
            "technology",
            now,
        );

        assert_eq!(topic.source, "Reddit");
        assert_eq!(topic.description.chars().count(), 153);
        assert!(topic.description.ends_with("..."));
        assert_eq!(topic.daily_freshness, "Fresh data for March 09, 2025");
        assert_eq!(topic.engagement_potential, "high");
        assert!(topic.keywords.contains(&"platform".to_string()));
        assert!(topic.hashtags.len() <= 8);
        assert_eq!(topic.hashtags[0], "#TechTrends");
        assert!(topic.hashtags.contains(&"#RedditTrends".to_string()));
        assert!(topic.content_angles.len() <= 4);
        assert!(topic.content_angles[0].starts_with("Fact: This is trending on Reddit"));
        assert_eq!(topic.content_angles[1], "Data: 12 comments, 12% engagement rate");

        let insights = topic.revenue_insights.as_ref().unwrap();
        assert!(insights.immediate_action.starts_with("HIGH PRIORITY"));
        assert_eq!(insights.content_opportunities.len(), 4);
        assert_eq!(
            insights.audience_targeting.demographics,
            "Ages 25-44, early adopters, discussion-oriented"
        );
        assert!(insights
            .audience_targeting
            .primary_audience
            .ends_with("(medium market)"));
    }

    #[test]
    fn test_enrich_keeps_preset_potential_and_keywords() {
        let mut trend = raw("LinkedIn Professional: #RemoteWork", 60.5, 1250.0, 7.2);
        trend.platform = Platform::LinkedIn;
        trend.keywords = vec!["RemoteWork".to_string(), "professional".to_string()];
        trend.business_potential = Some(BusinessPotential::preset(
            93.0,
            Level::VeryHigh,
            Level::Medium,
        ));

        let topic = enrich(trend, "marketing", Utc::now());
        assert_eq!(topic.business_score(), 93.0);
        assert_eq!(topic.keywords[0], "RemoteWork");
        assert!(topic.hashtags.contains(&"#Remotework".to_string()));
        assert!(topic
            .revenue_insights
            .as_ref()
            .unwrap()
            .immediate_action
            .starts_with("MEDIUM PRIORITY"));
    }

    #[test]
    fn test_competitive_advantage_buckets() {
        let mut topic = TrendingTopic {
            popularity_score: 65.0,
            business_potential: Some(BusinessPotential::preset(80.0, Level::High, Level::Low)),
            ..TrendingTopic::default()
        };
        assert!(competitive_advantage(&topic).starts_with("BLUE OCEAN"));

        topic.business_potential = Some(BusinessPotential::preset(80.0, Level::High, Level::High));
        assert!(competitive_advantage(&topic).starts_with("NICHE FOCUS"));

        topic.business_potential = None;
        assert!(competitive_advantage(&topic).starts_with("RESEARCH PHASE"));
    }

    #[test]
    fn test_hashtags_dedupe_case_insensitively() {
        let topic = TrendingTopic {
            keywords: vec!["innovation".to_string(), "robots".to_string()],
            ..TrendingTopic::default()
        };
        let tags = hashtags(&topic, None, "technology");
        assert_eq!(
            tags,
            vec![
                "#TechTrends",
                "#Innovation",
                "#DigitalTransformation",
                "#StartupTech",
                "#Robots"
            ]
        );
    }
}
