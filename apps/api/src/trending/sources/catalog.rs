//! Deterministic catalogues for platforms without a usable public feed.
//!
//! Every value that would come from a live API is derived from the daily
//! seed, so two calls on the same day produce the same topics while
//! consecutive days vary.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::{engagement_rate, round1, FetchContext, Platform, RawTrend, TrendSource};
use crate::trending::{BusinessPotential, EngagementData, Level};

pub struct CatalogSource {
    platform: Platform,
}

impl CatalogSource {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl TrendSource for CatalogSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch(&self, ctx: &FetchContext) -> anyhow::Result<Vec<RawTrend>> {
        Ok(catalog_trends(self.platform, &ctx.field, ctx.seed))
    }
}

/// Catalogue entries for `platform`, varied by `seed`.
pub fn catalog_trends(platform: Platform, field: &str, seed: u64) -> Vec<RawTrend> {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_mul(31).wrapping_add(platform as u64));
    match platform {
        Platform::Twitter => twitter(field, seed, &mut rng),
        Platform::Instagram => instagram(seed, &mut rng),
        Platform::TikTok => tiktok(field, seed, &mut rng),
        Platform::GitHub => github(field, seed, &mut rng),
        Platform::ProductHunt => product_hunt(field, seed, &mut rng),
        Platform::Medium => medium(field, seed, &mut rng),
        Platform::DevTo => dev_to(field, seed, &mut rng),
        Platform::YouTube => youtube(field, seed, &mut rng),
        Platform::LinkedIn => linkedin(field, seed),
        Platform::StackOverflow => stack_overflow(field, seed, &mut rng),
        Platform::Quora => quora(field, seed, &mut rng),
        Platform::Pinterest => pinterest(field, seed),
        Platform::News => news(field, seed, &mut rng),
        // Live feeds; the catalogue has nothing for them.
        Platform::Reddit | Platform::HackerNews => Vec::new(),
    }
}

fn keywords(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn preset(score: u64, market: Level, competition: Level) -> Option<BusinessPotential> {
    Some(BusinessPotential::preset(score as f64, market, competition))
}

fn volume_only(volume: u64, rate: f64) -> EngagementData {
    EngagementData {
        score: None,
        comments: None,
        volume: Some(volume),
        engagement_rate: (rate * 100.0).round() / 100.0,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Social
// ────────────────────────────────────────────────────────────────────────────

fn twitter(field: &str, seed: u64, rng: &mut StdRng) -> Vec<RawTrend> {
    let tags = [
        ("#AI", 50_000 + seed % 10_000, "Artificial Intelligence discussions trending"),
        ("#Startup", 25_000 + seed % 5_000, "Startup ecosystem conversations"),
        ("#Marketing", 30_000 + seed % 8_000, "Digital marketing trends and strategies"),
        ("#Investing", 35_000 + seed % 7_000, "Investment and financial market discussions"),
    ];
    tags.choose_multiple(rng, 3)
        .map(|(tag, volume, description)| {
            let search = format!("https://twitter.com/search?q={}", tag.replace('#', "%23"));
            RawTrend {
                platform: Platform::Twitter,
                title: format!("Twitter Trend: {tag}"),
                description: description.to_string(),
                popularity_score: round1((*volume as f64 / 1000.0).min(100.0)),
                discussion_url: format!("{search}&src=trend_click"),
                source_url: search,
                engagement: volume_only(*volume, 5.0 + (seed % 50) as f64 / 10.0),
                signal_score: *volume as f64 / 100.0,
                keywords: keywords(&[tag.trim_start_matches('#'), field, "trending"]),
                business_potential: preset(65 + seed % 30, Level::High, Level::Medium),
            }
        })
        .collect()
}

fn instagram(seed: u64, rng: &mut StdRng) -> Vec<RawTrend> {
    let by_field: [(&str, [&str; 2]); 5] = [
        ("technology", ["#TechTrends", "#Innovation"]),
        ("marketing", ["#MarketingTips", "#SocialMediaMarketing"]),
        ("finance", ["#FinTech", "#Investing"]),
        ("health", ["#Wellness", "#HealthyLifestyle"]),
        ("fashion", ["#Fashion", "#Style"]),
    ];
    let insights: Vec<(&str, &str)> = by_field
        .iter()
        .flat_map(|(field, tags)| tags.iter().map(move |tag| (*field, *tag)))
        .collect();
    let posts = 10_000 + seed % 5_000;
    let rate = 2.5 + (seed % 100) as f64 / 100.0;

    insights
        .choose_multiple(rng, 4)
        .take(3)
        .map(|(tag_field, tag)| {
            let bare = tag.trim_start_matches('#');
            let url = format!("https://www.instagram.com/explore/tags/{bare}");
            RawTrend {
                platform: Platform::Instagram,
                title: format!("Instagram Trend: {tag}"),
                description: format!("Trending hashtag in {tag_field} with high engagement"),
                popularity_score: round1((posts as f64 / 200.0).min(100.0)),
                source_url: url.clone(),
                discussion_url: url,
                engagement: volume_only(posts, rate),
                signal_score: posts as f64 / 10.0,
                keywords: keywords(&[bare, *tag_field, "visual", "social"]),
                business_potential: preset(70 + seed % 25, Level::High, Level::Medium),
            }
        })
        .collect()
}

fn tiktok(field: &str, seed: u64, rng: &mut StdRng) -> Vec<RawTrend> {
    let sounds = [
        ("Viral Business Tip Audio", 15_000 + seed % 3_000, "business", "High"),
        ("Tech Explanation Trend", 20_000 + seed % 4_000, "technology", "Very High"),
        ("Marketing Hack Audio", 12_000 + seed % 2_500, "marketing", "High"),
        ("Fashion Outfit Reveal", 25_000 + seed % 5_000, "fashion", "Very High"),
        ("Style Transformation Audio", 18_000 + seed % 3_500, "fashion", "High"),
        ("Sustainable Fashion Trend", 13_000 + seed % 2_800, "fashion", "High"),
    ];
    let relevant: Vec<_> = sounds
        .iter()
        .filter(|(_, _, category, _)| field == "general" || category.contains(field))
        .collect();

    relevant
        .choose_multiple(rng, 2)
        .map(|(name, usage, category, potential)| RawTrend {
            platform: Platform::TikTok,
            title: format!("TikTok Trend: {name}"),
            description: format!(
                "Viral audio with {usage} uses - {potential} engagement potential"
            ),
            popularity_score: round1((*usage as f64 / 300.0).min(100.0)),
            source_url: format!("https://www.tiktok.com/music/{}", name.replace(' ', "-")),
            discussion_url: format!("https://www.tiktok.com/tag/{field}"),
            engagement: volume_only(*usage, 3.5 + (seed % 20) as f64 / 10.0),
            signal_score: *usage as f64 / 50.0,
            keywords: keywords(&[*category, field, "viral", "video"]),
            business_potential: preset(80 + seed % 15, Level::VeryHigh, Level::Low),
        })
        .collect()
}

fn linkedin(field: &str, seed: u64) -> Vec<RawTrend> {
    let topics: &[(&str, u64, f64)] = match field {
        "marketing" => &[
            ("#ContentMarketing", 11_000, 9.1),
            ("#SocialMediaMarketing", 9_500, 8.3),
            ("#InfluencerMarketing", 6_800, 7.9),
            ("#MarketingStrategy", 8_200, 7.4),
        ],
        "finance" => &[
            ("#FinTech", 8_900, 7.8),
            ("#Investment", 10_500, 8.1),
            ("#BlockChain", 6_700, 9.2),
            ("#PersonalFinance", 5_400, 6.9),
        ],
        _ => &[
            ("#ArtificialIntelligence", 15_000, 8.5),
            ("#RemoteWork", 12_000, 7.2),
            ("#DigitalTransformation", 9_000, 6.8),
            ("#Cybersecurity", 7_500, 6.1),
        ],
    };

    topics
        .iter()
        .take(3)
        .map(|(tag, posts, engagement)| {
            let posts = posts + seed % 1_000;
            let engagement = engagement + (seed % 100) as f64 / 100.0;
            let bare = tag.trim_start_matches('#');
            let url = format!("https://www.linkedin.com/feed/hashtag/{bare}");
            RawTrend {
                platform: Platform::LinkedIn,
                title: format!("LinkedIn Professional: {tag}"),
                description: format!(
                    "Professional network trend with {posts} posts and {engagement:.2}% engagement"
                ),
                popularity_score: round1((posts as f64 / 200.0).min(100.0)),
                source_url: url.clone(),
                discussion_url: url,
                engagement: volume_only(posts, engagement),
                signal_score: posts as f64 / 10.0,
                keywords: keywords(&[bare, "professional", "linkedin", field]),
                business_potential: preset(90 + seed % 8, Level::VeryHigh, Level::Medium),
            }
        })
        .collect()
}

fn pinterest(field: &str, seed: u64) -> Vec<RawTrend> {
    let pins: &[(&str, u64, &str)] = match field {
        "technology" => &[
            ("Tech Setup Inspiration", 38_000, "workspace"),
            ("App UI Design Ideas", 29_000, "design"),
            ("Coding Cheat Sheets", 35_000, "education"),
        ],
        "marketing" => &[
            ("Instagram Story Templates", 67_000, "social_media"),
            ("Email Newsletter Designs", 31_000, "email"),
            ("Brand Color Palette Ideas", 54_000, "branding"),
        ],
        "fashion" => &[
            ("Sustainable Fashion Outfit Ideas", 89_000, "sustainability"),
            ("Capsule Wardrobe Essentials", 76_000, "minimalism"),
            ("Street Style Inspiration", 85_000, "street_style"),
        ],
        "beauty" => &[
            ("Natural Skincare Routines", 78_000, "skincare"),
            ("Makeup Looks for Every Season", 91_000, "makeup"),
        ],
        "lifestyle" => &[
            ("Minimalist Home Decor", 95_000, "home"),
            ("Self Care Routine Ideas", 72_000, "wellness"),
        ],
        _ => &[
            ("Home Office Setup Ideas", 45_000, "workspace"),
            ("Business Card Design Templates", 32_000, "branding"),
            ("Social Media Post Templates", 58_000, "marketing"),
        ],
    };

    pins.iter()
        .take(2)
        .map(|(idea, saves, category)| {
            let saves = saves + seed % 5_000;
            let url = format!(
                "https://www.pinterest.com/search/pins/?q={}",
                idea.replace(' ', "%20")
            );
            RawTrend {
                platform: Platform::Pinterest,
                title: format!("Pinterest Trending: {idea}"),
                description: format!(
                    "Visual trend with {saves} saves - high visual content potential"
                ),
                popularity_score: round1((saves as f64 / 1000.0).min(100.0)),
                source_url: url.clone(),
                discussion_url: url,
                engagement: volume_only(saves, 0.0),
                signal_score: saves as f64 / 100.0,
                keywords: keywords(&[*category, "visual content", "pinterest", field]),
                business_potential: preset(75 + seed % 20, Level::High, Level::Medium),
            }
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Developer communities
// ────────────────────────────────────────────────────────────────────────────

fn github(field: &str, seed: u64, rng: &mut StdRng) -> Vec<RawTrend> {
    let mut repos = [
        ("ollama/ollama", "Get up and running with large language models locally", "Go", 4_200),
        ("astral-sh/uv", "An extremely fast Python package and project manager", "Rust", 3_800),
        ("microsoft/autogen", "A programming framework for agentic AI", "Python", 3_100),
        ("n8n-io/n8n", "Workflow automation platform with native AI capabilities", "TypeScript", 2_900),
        ("supabase/supabase", "The open source Postgres development platform", "TypeScript", 2_600),
        ("tauri-apps/tauri", "Build smaller, faster and more secure desktop apps", "Rust", 2_200),
    ];
    repos.shuffle(rng);

    repos
        .iter()
        .take(4)
        .map(|(name, description, language, stars)| {
            let stars = stars + seed % 500;
            let url = format!("https://github.com/{name}");
            RawTrend {
                platform: Platform::GitHub,
                title: format!("GitHub Trending: {name}"),
                description: description.to_string(),
                popularity_score: round1((stars as f64 / 100.0).min(100.0)),
                discussion_url: format!("{url}/issues"),
                source_url: url,
                engagement: EngagementData {
                    score: Some(stars),
                    ..EngagementData::default()
                },
                signal_score: stars as f64 / 10.0,
                keywords: keywords(&[*language, "github", "open-source", field]),
                business_potential: preset(85 + seed % 10, Level::High, Level::Low),
            }
        })
        .collect()
}

fn dev_to(field: &str, seed: u64, rng: &mut StdRng) -> Vec<RawTrend> {
    let mut titles = [
        "How I Automated My Side Project Deployments",
        "Building an AI Code Review Tool in a Weekend",
        "Postgres Tips Every Backend Developer Should Know",
        "Why We Moved Our API to Rust",
        "A Practical Guide to Observability for Small Teams",
    ];
    titles.shuffle(rng);

    titles
        .iter()
        .take(3)
        .map(|title| {
            let reactions = rng.gen_range(20..=200u64) + seed % 100;
            RawTrend {
                platform: Platform::DevTo,
                title: format!("DEV.to: {title}"),
                description: format!("Developer community post with {reactions} reactions"),
                popularity_score: round1((reactions as f64 * 2.0).min(100.0)),
                source_url: "https://dev.to/top/week".to_string(),
                discussion_url: "https://dev.to/top/week".to_string(),
                engagement: EngagementData {
                    score: Some(reactions),
                    ..EngagementData::default()
                },
                signal_score: reactions as f64,
                keywords: keywords(&["developers", "programming", "tech community", field]),
                business_potential: preset(75 + seed % 15, Level::Medium, Level::Low),
            }
        })
        .collect()
}

fn stack_overflow(field: &str, seed: u64, rng: &mut StdRng) -> Vec<RawTrend> {
    let mut tags = [
        ("javascript", 2_500_000),
        ("python", 2_200_000),
        ("java", 1_900_000),
        ("reactjs", 480_000),
        ("typescript", 250_000),
        ("rust", 45_000),
    ];
    tags.shuffle(rng);

    tags.iter()
        .take(2)
        .map(|(tag, questions)| {
            let questions = questions + seed % 1_000;
            let url = format!("https://stackoverflow.com/questions/tagged/{tag}");
            RawTrend {
                platform: Platform::StackOverflow,
                title: format!("Stack Overflow: {tag} Questions"),
                description: format!(
                    "Developer community discussing {tag} with {questions} questions"
                ),
                popularity_score: round1((questions as f64 / 1000.0).min(100.0)),
                source_url: url.clone(),
                discussion_url: url,
                engagement: volume_only(questions, 0.0),
                signal_score: questions as f64 / 100.0,
                keywords: keywords(&[*tag, "programming", "developer questions", field]),
                business_potential: preset(70 + seed % 20, Level::Medium, Level::Low),
            }
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Publishing
// ────────────────────────────────────────────────────────────────────────────

fn product_hunt(field: &str, seed: u64, rng: &mut StdRng) -> Vec<RawTrend> {
    let mut products = [
        ("InvoiceFlow AI", "Automated invoicing and payment reminders for freelancers"),
        ("MeetNotes", "AI meeting assistant that writes follow-ups for you"),
        ("LeadPilot", "Lead scoring and outreach automation for small sales teams"),
        ("BrandKit Studio", "Generate on-brand social media assets in seconds"),
        ("TaskLoom", "Visual task planning for remote-first teams"),
    ];
    products.shuffle(rng);

    products
        .iter()
        .take(3)
        .enumerate()
        .map(|(position, (name, description))| {
            let popularity = 100u64.saturating_sub(position as u64 * 10).max(10) as f64;
            RawTrend {
                platform: Platform::ProductHunt,
                title: format!("Product Hunt: {name}"),
                description: description.to_string(),
                popularity_score: popularity,
                source_url: "https://www.producthunt.com".to_string(),
                discussion_url: "https://www.producthunt.com/discussions".to_string(),
                engagement: EngagementData::default(),
                signal_score: popularity,
                keywords: keywords(&["product launch", "startup", "innovation", field]),
                business_potential: preset(80 + seed % 15, Level::High, Level::Medium),
            }
        })
        .collect()
}

fn medium(field: &str, seed: u64, rng: &mut StdRng) -> Vec<RawTrend> {
    let mut titles: Vec<&str> = match field {
        "marketing" => vec![
            "The Content Strategy That Tripled Our Inbound Leads",
            "Short-Form Video Is Eating Marketing",
            "What Small Brands Get Wrong About Community",
            "Email Is Not Dead: A Data Story",
        ],
        "finance" => vec![
            "How Small Businesses Should Think About Cash Flow in 2025",
            "The Quiet Rise of Embedded Finance",
            "Subscription Revenue Explained for Founders",
            "Budgeting Frameworks That Actually Work",
        ],
        _ => vec![
            "Lessons From Shipping AI Features to Real Customers",
            "The Hidden Costs of Automation",
            "Why Every Startup Needs an API Strategy",
            "Cloud Bills Are the New Technical Debt",
        ],
    };
    titles.shuffle(rng);

    titles
        .into_iter()
        .take(3)
        .map(|title| {
            let claps = rng.gen_range(50..=500u64) + seed % 200;
            let url = format!("https://medium.com/tag/{field}");
            RawTrend {
                platform: Platform::Medium,
                title: format!("Medium Trending: {title}"),
                description: format!("Popular article with {claps} claps on Medium"),
                popularity_score: round1((claps as f64 / 10.0).min(100.0)),
                source_url: url.clone(),
                discussion_url: url,
                engagement: EngagementData {
                    score: Some(claps),
                    ..EngagementData::default()
                },
                signal_score: claps as f64 / 5.0,
                keywords: keywords(&[field, "thought leadership", "content"]),
                business_potential: preset(70 + seed % 20, Level::Medium, Level::Medium),
            }
        })
        .collect()
}

fn youtube(field: &str, seed: u64, rng: &mut StdRng) -> Vec<RawTrend> {
    let terms: &[&str] = match field {
        "technology" => &["AI", "startup", "coding", "tech news", "software"],
        "marketing" => &["digital marketing", "social media", "content marketing", "SEO"],
        "finance" => &["investing", "stocks", "crypto", "fintech", "trading"],
        "health" => &["wellness", "fitness", "nutrition", "mental health"],
        "education" => &["online learning", "skills", "courses", "training"],
        _ => &["trending", "popular"],
    };

    terms
        .iter()
        .take(2)
        .map(|term| {
            let videos = rng.gen_range(1_000..=10_000u64) + seed % 5_000;
            let engagement: f64 = rng.gen_range(3.0..15.0);
            let engagement = (engagement * 100.0).round() / 100.0;
            let url = format!(
                "https://www.youtube.com/results?search_query={}",
                term.replace(' ', "+")
            );
            RawTrend {
                platform: Platform::YouTube,
                title: format!("{} - Trending Content", title_case(term)),
                description: format!(
                    "YouTube trend with {videos} videos and {engagement}% engagement"
                ),
                popularity_score: round1((videos as f64 / 200.0).min(100.0)),
                source_url: url.clone(),
                discussion_url: url,
                engagement: volume_only(videos, engagement),
                signal_score: videos as f64 / 100.0,
                keywords: keywords(&[*term, "video content", "youtube", field]),
                business_potential: preset(85 + seed % 10, Level::VeryHigh, Level::Medium),
            }
        })
        .collect()
}

fn quora(field: &str, seed: u64, rng: &mut StdRng) -> Vec<RawTrend> {
    let questions: &[&str] = match field {
        "marketing" => &[
            "What are the most effective digital marketing strategies?",
            "How do you build a personal brand on social media?",
            "What is the future of influencer marketing?",
        ],
        "finance" => &[
            "What are the best investment strategies for beginners?",
            "How does cryptocurrency work?",
            "What is the impact of AI on financial services?",
        ],
        _ => &[
            "What are the latest trends in artificial intelligence?",
            "How is blockchain technology changing business?",
            "What are the best practices for cybersecurity?",
        ],
    };

    questions
        .iter()
        .take(2)
        .map(|question| {
            let views = rng.gen_range(10_000..=100_000u64) + seed % 50_000;
            let answers = rng.gen_range(5..=50u64) + seed % 25;
            let url = format!("https://www.quora.com/search?q={}", question.replace(' ', "+"));
            RawTrend {
                platform: Platform::Quora,
                title: format!("Quora Question: {question}"),
                description: format!("Popular question with {views} views and {answers} answers"),
                popularity_score: round1((views as f64 / 1000.0).min(100.0)),
                source_url: url.clone(),
                discussion_url: url,
                engagement: EngagementData {
                    score: None,
                    comments: Some(answers),
                    volume: Some(views),
                    engagement_rate: engagement_rate(answers, views),
                },
                signal_score: views as f64 / 500.0,
                keywords: keywords(&["questions", "knowledge", "quora", field]),
                business_potential: preset(65 + seed % 25, Level::Medium, Level::Medium),
            }
        })
        .collect()
}

fn news(field: &str, seed: u64, rng: &mut StdRng) -> Vec<RawTrend> {
    let (category, mut headlines) = match field {
        "business" | "finance" => (
            "business",
            vec![
                ("Small business lending rebounds as rates stabilise", "fortune.com"),
                ("Founders turn to revenue-based financing", "entrepreneur.com"),
                ("Why mid-market firms are consolidating software spend", "fortune.com"),
                ("Remote hiring reshapes regional economies", "entrepreneur.com"),
            ],
        ),
        "marketing" => (
            "marketing",
            vec![
                ("Search engines roll out AI answers to more markets", "searchengineland.com"),
                ("Brands shift budget from paid social to creators", "marketingland.com"),
                ("First-party data becomes the new ad currency", "searchengineland.com"),
                ("Retail media networks keep growing", "marketingland.com"),
            ],
        ),
        _ => (
            "technology",
            vec![
                ("Open-weight AI models close the gap with frontier labs", "techcrunch.com"),
                ("Chipmakers race to meet inference demand", "wired.com"),
                ("Startups bet on agents for back-office automation", "techcrunch.com"),
                ("The security cost of shadow AI in the workplace", "arstechnica.com"),
            ],
        ),
    };
    headlines.shuffle(rng);

    headlines
        .into_iter()
        .take(3)
        .map(|(headline, outlet)| {
            let url = format!("https://{outlet}/");
            RawTrend {
                platform: Platform::News,
                title: format!("News: {headline}"),
                description: format!("{headline} ({outlet})"),
                popularity_score: (75 + seed % 20) as f64,
                source_url: url.clone(),
                discussion_url: url,
                engagement: EngagementData::default(),
                signal_score: 80.0,
                keywords: keywords(&["news", category, "breaking", field]),
                business_potential: preset(85 + seed % 12, Level::VeryHigh, Level::High),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOGUED: [Platform; 13] = [
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

    #[test]
    fn test_same_seed_same_catalogue() {
        for platform in CATALOGUED {
            assert_eq!(
                catalog_trends(platform, "technology", 417),
                catalog_trends(platform, "technology", 417),
                "{platform:?} is not deterministic"
            );
        }
    }

    #[test]
    fn test_every_catalogue_is_well_formed() {
        for seed in [0, 1, 499, 999] {
            for platform in CATALOGUED {
                let trends = catalog_trends(platform, "technology", seed);
                assert!(!trends.is_empty(), "{platform:?} empty for seed {seed}");
                for trend in trends {
                    assert_eq!(trend.platform, platform);
                    assert!(!trend.title.is_empty());
                    assert!((0.0..=100.0).contains(&trend.popularity_score));
                    assert!(!trend.keywords.is_empty());
                    let bp = trend.business_potential.expect("catalogues preset potential");
                    assert!((0.0..=100.0).contains(&bp.score));
                }
            }
        }
    }

    #[test]
    fn test_twitter_preset_tracks_seed() {
        let trends = catalog_trends(Platform::Twitter, "marketing", 42);
        assert_eq!(trends.len(), 3);
        for trend in &trends {
            let bp = trend.business_potential.as_ref().unwrap();
            assert!((bp.score - 77.0).abs() < 1e-9);
            assert_eq!(bp.market_size, Level::High);
            assert!(trend.title.starts_with("Twitter Trend: #"));
        }
    }

    #[test]
    fn test_tiktok_filters_by_field() {
        let fashion = catalog_trends(Platform::TikTok, "fashion", 5);
        assert_eq!(fashion.len(), 2);
        assert!(fashion.iter().all(|t| t.keywords[0] == "fashion"));

        let tech = catalog_trends(Platform::TikTok, "technology", 5);
        assert_eq!(tech.len(), 1);
        assert_eq!(tech[0].title, "TikTok Trend: Tech Explanation Trend");

        assert!(catalog_trends(Platform::TikTok, "gardening", 5).is_empty());
    }

    #[test]
    fn test_youtube_unknown_field_uses_generic_terms() {
        let trends = catalog_trends(Platform::YouTube, "gardening", 3);
        let titles: Vec<&str> = trends.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Trending - Trending Content", "Popular - Trending Content"]
        );
    }

    #[test]
    fn test_live_platforms_have_no_catalogue() {
        assert!(catalog_trends(Platform::Reddit, "technology", 1).is_empty());
        assert!(catalog_trends(Platform::HackerNews, "technology", 1).is_empty());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("tech news"), "Tech News");
        assert_eq!(title_case("AI"), "AI");
    }
}
