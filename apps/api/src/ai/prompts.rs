// LLM prompt constants for video script generation.

/// System prompt for script writing.
pub const SCRIPT_SYSTEM: &str = "You are a scriptwriter for short business videos. \
    Write natural spoken text only. \
    Do NOT use markdown, emojis, or stage directions outside the section markers.";

/// Script prompt. Replace `{topic}`, `{duration}`, `{style}`, `{tone}`,
/// `{words}` and `{sections}`.
pub const SCRIPT_PROMPT_TEMPLATE: &str = r#"Write a {duration}-second {style} video script about "{topic}".
Tone: {tone}.

Structure the script with these section markers, each on its own line:
{sections}

Keep the spoken text to roughly {words} words.
Only make claims that are true of "{topic}" in general. Do NOT invent statistics."#;
