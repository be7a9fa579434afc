//! Video script generation.
//!
//! Scripts come from the LLM when one is configured and from a sectioned
//! template otherwise. Either way the caller gets a script and learns which
//! path produced it.

pub mod handlers;
mod prompts;

use serde::Deserialize;
use tracing::warn;

use self::prompts::{SCRIPT_PROMPT_TEMPLATE, SCRIPT_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::script::ScriptAuthor;

const MAX_TOPIC_CHARS: usize = 200;
const MIN_DURATION_SECS: i32 = 15;
const MAX_DURATION_SECS: i32 = 600;
/// Spoken pace used to size the script.
const WORDS_PER_MINUTE: i32 = 150;

pub const HOOK: &str = "[HOOK]";
pub const INTRODUCTION: &str = "[INTRODUCTION]";
pub const MAIN_CONTENT: &str = "[MAIN CONTENT]";
pub const CONCLUSION: &str = "[CONCLUSION]";
pub const CALL_TO_ACTION: &str = "[CALL TO ACTION]";

fn default_video_style() -> String {
    "educational".to_string()
}

fn default_target_duration() -> i32 {
    60
}

fn default_tone() -> String {
    "professional".to_string()
}

fn default_include_hook() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptRequest {
    pub topic: String,
    #[serde(default = "default_video_style")]
    pub video_style: String,
    /// Seconds.
    #[serde(default = "default_target_duration")]
    pub target_duration: i32,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default = "default_include_hook")]
    pub include_hook: bool,
}

impl ScriptRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(AppError::Validation("Topic must not be empty".to_string()));
        }
        if topic.chars().count() > MAX_TOPIC_CHARS {
            return Err(AppError::Validation(format!(
                "Topic must be at most {MAX_TOPIC_CHARS} characters"
            )));
        }
        if !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&self.target_duration) {
            return Err(AppError::Validation(format!(
                "target_duration must be between {MIN_DURATION_SECS} and {MAX_DURATION_SECS} seconds"
            )));
        }
        if self.video_style.trim().is_empty() || self.tone.trim().is_empty() {
            return Err(AppError::Validation(
                "video_style and tone must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn sections(&self) -> Vec<&'static str> {
        let mut sections = Vec::with_capacity(5);
        if self.include_hook {
            sections.push(HOOK);
        }
        sections.extend([INTRODUCTION, MAIN_CONTENT, CONCLUSION, CALL_TO_ACTION]);
        sections
    }

    fn word_budget(&self) -> i32 {
        (self.target_duration * WORDS_PER_MINUTE / 60).max(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub content: String,
    pub author: ScriptAuthor,
}

#[derive(Clone)]
pub struct ScriptWriter {
    llm: Option<LlmClient>,
}

impl ScriptWriter {
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self { llm }
    }

    /// Model-written script, or the template when the model is off or fails.
    pub async fn write(&self, req: &ScriptRequest) -> Script {
        let Some(llm) = &self.llm else {
            return template_script(req);
        };
        match request_script(llm, req).await {
            Ok(content) => Script {
                content,
                author: ScriptAuthor::Model,
            },
            Err(e) => {
                warn!("Script generation for '{}' failed: {}", req.topic.trim(), e);
                template_script(req)
            }
        }
    }
}

async fn request_script(llm: &LlmClient, req: &ScriptRequest) -> Result<String, LlmError> {
    let prompt = SCRIPT_PROMPT_TEMPLATE
        .replace("{topic}", req.topic.trim())
        .replace("{duration}", &req.target_duration.to_string())
        .replace("{style}", req.video_style.trim())
        .replace("{tone}", req.tone.trim())
        .replace("{words}", &req.word_budget().to_string())
        .replace("{sections}", &req.sections().join("\n"));

    let response = llm.call(&prompt, SCRIPT_SYSTEM).await?;
    let text = response.text().map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    Ok(text.to_string())
}

/// Sectioned script built around the topic.
pub fn template_script(req: &ScriptRequest) -> Script {
    let topic = req.topic.trim();
    let style = req.video_style.trim();
    let tone = req.tone.trim();
    let mut parts = Vec::with_capacity(5);

    if req.include_hook {
        parts.push(format!(
            "{HOOK}\nMost people overlook {topic}. In the next {} seconds, here is why it deserves your attention.",
            req.target_duration
        ));
    }
    parts.push(format!(
        "{INTRODUCTION}\nToday we are taking a {tone}, {style} look at {topic}: what it is, why it matters now, and how to act on it."
    ));
    parts.push(format!(
        "{MAIN_CONTENT}\nFirst, the core idea behind {topic} and the problem it solves.\n\
         Second, where it pays off in day-to-day work.\n\
         Third, the mistakes to avoid when you get started."
    ));
    parts.push(format!(
        "{CONCLUSION}\n{topic} rewards people who start small and stay consistent."
    ));
    parts.push(format!(
        "{CALL_TO_ACTION}\nFollow for more on {topic}, and share this with someone who should see it."
    ));

    Script {
        content: parts.join("\n\n"),
        author: ScriptAuthor::Template,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(topic: &str) -> ScriptRequest {
        serde_json::from_value(json!({ "topic": topic })).unwrap()
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
    }

    async fn writer_with(body: serde_json::Value, status: u16) -> (MockServer, ScriptWriter) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;
        let llm = LlmClient::with_base_url("k".to_string(), &server.uri());
        (server, ScriptWriter::new(Some(llm)))
    }

    #[test]
    fn test_request_defaults() {
        let req = request("Cold email");
        assert_eq!(req.video_style, "educational");
        assert_eq!(req.target_duration, 60);
        assert_eq!(req.tone, "professional");
        assert!(req.include_hook);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_validation_bounds() {
        let mut req = request("  ");
        assert!(req.validate().is_err());
        req.topic = "Invoicing".to_string();
        req.target_duration = 5;
        assert!(req.validate().is_err());
        req.target_duration = MAX_DURATION_SECS + 1;
        assert!(req.validate().is_err());
        req.target_duration = 90;
        req.tone = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_template_has_every_section_in_order() {
        let script = template_script(&request("Client onboarding"));
        assert_eq!(script.author, ScriptAuthor::Template);
        let positions: Vec<usize> = [HOOK, INTRODUCTION, MAIN_CONTENT, CONCLUSION, CALL_TO_ACTION]
            .iter()
            .map(|marker| script.content.find(marker).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(script.content.contains("Client onboarding"));
    }

    #[test]
    fn test_template_without_hook() {
        let mut req = request("Bookkeeping");
        req.include_hook = false;
        let script = template_script(&req);
        assert!(!script.content.contains(HOOK));
        assert!(script.content.starts_with(INTRODUCTION));
    }

    #[test]
    fn test_word_budget_follows_duration() {
        let mut req = request("Pricing");
        req.target_duration = 120;
        assert_eq!(req.word_budget(), 300);
    }

    #[tokio::test]
    async fn test_disabled_writer_uses_template() {
        let script = ScriptWriter::new(None).write(&request("Hiring")).await;
        assert_eq!(script.author, ScriptAuthor::Template);
    }

    #[tokio::test]
    async fn test_model_script_is_used() {
        let (_server, writer) =
            writer_with(completion("  [HOOK]\nShort.\n[MAIN CONTENT]\nBody.  "), 200).await;
        let script = writer.write(&request("Hiring")).await;
        assert_eq!(script.author, ScriptAuthor::Model);
        assert_eq!(script.content, "[HOOK]\nShort.\n[MAIN CONTENT]\nBody.");
    }

    #[tokio::test]
    async fn test_blank_model_reply_falls_back() {
        let (_server, writer) = writer_with(completion("   "), 200).await;
        let script = writer.write(&request("Hiring")).await;
        assert_eq!(script.author, ScriptAuthor::Template);
    }

    #[tokio::test]
    async fn test_failed_call_falls_back() {
        let (_server, writer) = writer_with(json!({ "error": "boom" }), 500).await;
        let script = writer.write(&request("Hiring")).await;
        assert_eq!(script.author, ScriptAuthor::Template);
        assert!(script.content.contains("Hiring"));
    }
}
