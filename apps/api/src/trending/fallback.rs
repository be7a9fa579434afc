//! Static topics served when every live and catalogued source came back empty.

use chrono::{DateTime, Utc};

use super::TrendingTopic;

pub const FALLBACK_SOURCE: &str = "Fallback";

struct Seed {
    title: &'static str,
    description: &'static str,
    keywords: &'static [&'static str],
    hashtags: &'static [&'static str],
    popularity: f64,
    engagement: &'static str,
    angles: &'static [&'static str],
}

const TECHNOLOGY: &[Seed] = &[
    Seed {
        title: "AI-Powered Customer Service Revolution",
        description: "Businesses are adopting AI chatbots and virtual assistants to enhance customer experience and reduce response times.",
        keywords: &["AI customer service", "chatbots", "automation", "customer experience", "virtual assistants"],
        hashtags: &["#AICustomerService", "#ChatbotsRevolution", "#CustomerExperience", "#AIAutomation"],
        popularity: 92.5,
        engagement: "high",
        angles: &[
            "How AI is transforming customer support",
            "ROI of implementing AI customer service",
            "Best practices for AI chatbot deployment",
        ],
    },
    Seed {
        title: "No-Code Platform Market Boom",
        description: "The no-code/low-code development market is experiencing unprecedented growth as businesses seek faster digital transformation.",
        keywords: &["no-code", "low-code", "digital transformation", "business automation", "citizen developers"],
        hashtags: &["#NoCode", "#LowCode", "#DigitalTransformation", "#BusinessAutomation"],
        popularity: 88.3,
        engagement: "high",
        angles: &[],
    },
];

const MARKETING: &[Seed] = &[
    Seed {
        title: "Video-First Marketing Strategy",
        description: "Short-form video content is dominating social media engagement rates and marketing ROI across all platforms.",
        keywords: &["video marketing", "short-form content", "social media engagement", "content strategy", "ROI"],
        hashtags: &["#VideoMarketing", "#ShortFormContent", "#SocialMediaStrategy", "#ContentCreation"],
        popularity: 95.8,
        engagement: "high",
        angles: &[
            "Why video content gets 10x more engagement",
            "Creating viral short-form videos on a budget",
            "Video marketing trends for 2025",
        ],
    },
    Seed {
        title: "AI-Generated Content Ethics",
        description: "Marketers are grappling with ethical considerations and transparency requirements for AI-generated marketing content.",
        keywords: &["AI content", "marketing ethics", "transparency", "authentic marketing", "AI disclosure"],
        hashtags: &["#AIMarketing", "#MarketingEthics", "#AuthenticContent", "#AITransparency"],
        popularity: 87.2,
        engagement: "medium",
        angles: &[],
    },
];

const FINANCE: &[Seed] = &[Seed {
    title: "Cryptocurrency Payment Integration",
    description: "Small businesses are increasingly accepting cryptocurrency payments as digital currencies become mainstream.",
    keywords: &["cryptocurrency payments", "digital currency", "payment processing", "fintech", "business payments"],
    hashtags: &["#CryptoPayments", "#DigitalCurrency", "#Fintech", "#PaymentInnovation"],
    popularity: 89.7,
    engagement: "high",
    angles: &[],
}];

const HEALTH: &[Seed] = &[Seed {
    title: "Mental Health in Remote Work",
    description: "Organizations are prioritizing employee mental health support as remote and hybrid work models become permanent.",
    keywords: &["mental health", "remote work", "employee wellness", "work-life balance", "corporate wellness"],
    hashtags: &["#MentalHealthAtWork", "#RemoteWork", "#EmployeeWellness", "#WorkLifeBalance"],
    popularity: 91.4,
    engagement: "high",
    angles: &[],
}];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Up to three canned topics for `field`, most popular first. Unknown fields
/// get nothing.
pub fn fallback_topics(field: &str, now: DateTime<Utc>) -> Vec<TrendingTopic> {
    let seeds: &[Seed] = match field {
        "technology" => TECHNOLOGY,
        "marketing" => MARKETING,
        "finance" => FINANCE,
        "health" => HEALTH,
        _ => &[],
    };

    let mut topics: Vec<TrendingTopic> = seeds
        .iter()
        .take(3)
        .map(|seed| TrendingTopic {
            title: seed.title.to_string(),
            description: seed.description.to_string(),
            popularity_score: seed.popularity,
            source: FALLBACK_SOURCE.to_string(),
            keywords: strings(seed.keywords),
            hashtags: strings(seed.hashtags),
            content_angles: strings(seed.angles),
            engagement_potential: seed.engagement.to_string(),
            trending_since: now.to_rfc3339(),
            ..TrendingTopic::default()
        })
        .collect();
    topics.sort_by(|a, b| b.popularity_score.total_cmp(&a.popularity_score));
    topics
}
