// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Appended to prompts that ask for facts about supplied topics.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    Only use the topics and figures provided. Do NOT invent statistics, \
    companies, or sources. If the data does not support a claim, omit it.";
