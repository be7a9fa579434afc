//! Ready-to-edit content drafts for one trending topic.

use serde::{Deserialize, Serialize};

use super::enrich::truncate_chars;
use super::TrendingTopic;

const SOCIAL_HASHTAGS: usize = 10;
const VIDEO_HASHTAGS: usize = 15;
const SEO_KEYWORDS: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptType {
    #[default]
    SocialMedia,
    Video,
    Blog,
    Email,
}

#[derive(Debug, Clone, Serialize)]
pub struct SocialMediaScript {
    pub platform: &'static str,
    pub hook: String,
    pub main_content: Vec<String>,
    pub call_to_action: &'static str,
    pub hashtags: Vec<String>,
    pub estimated_reach: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoSections {
    pub hook: String,
    pub introduction: String,
    pub main_points: Vec<String>,
    pub conclusion: &'static str,
    pub call_to_action: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoScript {
    pub platform: &'static str,
    pub script_sections: VideoSections,
    pub video_length: &'static str,
    pub hashtags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlogScript {
    pub title: String,
    pub outline: Vec<String>,
    pub key_points: Vec<String>,
    pub seo_keywords: Vec<String>,
    pub estimated_word_count: &'static str,
    pub target_audience: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailStructure {
    pub opening: String,
    pub body: Vec<String>,
    pub closing: &'static str,
    pub signature: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailScript {
    pub subject_line: String,
    pub email_structure: EmailStructure,
    pub personalization_tips: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ContentScript {
    SocialMedia(SocialMediaScript),
    Video(VideoScript),
    Blog(BlogScript),
    Email(EmailScript),
}

fn head(items: &[String], n: usize) -> Vec<String> {
    items.iter().take(n).cloned().collect()
}

fn angle<'a>(topic: &'a TrendingTopic, i: usize, default: &'a str) -> &'a str {
    topic.content_angles.get(i).map_or(default, String::as_str)
}

fn opportunity_kind<'a>(topic: &'a TrendingTopic, default: &'a str) -> &'a str {
    topic
        .monetization_opportunities
        .first()
        .map_or(default, |m| m.kind.as_str())
}

fn opportunity<'a>(topic: &'a TrendingTopic, default: &'a str) -> &'a str {
    topic
        .monetization_opportunities
        .first()
        .map_or(default, |m| m.description.as_str())
}

pub fn build_script(topic: &TrendingTopic, script_type: ScriptType) -> ContentScript {
    let title = topic.title.as_str();
    let description = topic.description.as_str();

    match script_type {
        ScriptType::SocialMedia => ContentScript::SocialMedia(SocialMediaScript {
            platform: "Multi-platform",
            hook: format!("Trending now: {}", truncate_chars(title, 60)),
            main_content: vec![
                format!("Why this matters: {}", angle(topic, 0, "A breaking trend in the industry")),
                format!("Key insight: {}", truncate_chars(description, 100)),
                format!("Action: {}", angle(topic, 1, "Stay ahead of the curve")),
                format!(
                    "Opportunity: {}",
                    opportunity_kind(topic, "Business potential detected")
                ),
            ],
            call_to_action: "What's your take on this trend? Share your thoughts below.",
            hashtags: head(&topic.hashtags, SOCIAL_HASHTAGS),
            estimated_reach: "5K-50K impressions",
        }),
        ScriptType::Video => ContentScript::Video(VideoScript {
            platform: "YouTube/TikTok",
            script_sections: VideoSections {
                hook: format!("Here is what is trending right now: {}", truncate_chars(title, 40)),
                introduction: format!("Today we're diving into {title}."),
                main_points: vec![
                    format!(
                        "First, why this is taking off: {}",
                        angle(topic, 0, "A major industry shift")
                    ),
                    format!("What the data shows: {}", truncate_chars(description, 80)),
                    format!(
                        "Where the money is: {}",
                        opportunity(topic, "The business implications are significant")
                    ),
                ],
                conclusion: "This trend is just getting started. Position yourself to take advantage.",
                call_to_action: "Subscribe for more trend breakdowns like this.",
            },
            video_length: "60-180 seconds",
            hashtags: head(&topic.hashtags, VIDEO_HASHTAGS),
        }),
        ScriptType::Blog => ContentScript::Blog(BlogScript {
            title: format!("Deep Dive: {title}"),
            outline: vec![
                "Introduction: Why This Trend Matters".to_string(),
                format!("The Data Behind {}", truncate_chars(title, 30)),
                "Market Analysis and Opportunities".to_string(),
                "Revenue Implications for Businesses".to_string(),
                "Action Steps and Recommendations".to_string(),
                "Conclusion: Future Outlook".to_string(),
            ],
            key_points: topic.content_angles.clone(),
            seo_keywords: head(&topic.hashtags, SEO_KEYWORDS),
            estimated_word_count: "1500-2500 words",
            target_audience: "Business professionals and industry stakeholders",
        }),
        ScriptType::Email => ContentScript::Email(EmailScript {
            subject_line: format!("Trending alert: {}", truncate_chars(title, 40)),
            email_structure: EmailStructure {
                opening: format!(
                    "Hi [Name],\n\nI just spotted something that could affect your business: {title}"
                ),
                body: vec![
                    format!("What's happening: {}", truncate_chars(description, 150)),
                    format!("Why it matters: {}", angle(topic, 0, "This could change the game")),
                    format!(
                        "The opportunity: {}",
                        opportunity(topic, "Business potential detected")
                    ),
                ],
                closing: "Want to talk through how this affects your plans? Reply and let's set up a call.",
                signature: "Best regards,\n[Your Name]",
            },
            personalization_tips: vec![
                "Customize the opening for the recipient's industry",
                "Add examples relevant to their business",
                "Include a timeline if action is urgent",
            ],
        }),
    }
}
