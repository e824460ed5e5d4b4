// Instruction templates for the rewrite strategies.
// Replace `{user_prompt}` before sending. Every template must stay textually
// distinct from the others; the generator relies on that.

/// Alternative vocabulary and sentence structure.
pub const PARAPHRASE_TEMPLATE: &str = "Paraphrase the prompt completely using alternative \
    vocabulary and sentence structure to make it engaging. Original prompt: '{user_prompt}'";

/// Fresh perspective while keeping the essential meaning.
pub const RECAST_TEMPLATE: &str = "Recast the following prompt into an innovative query with a \
    fresh perspective and completely different wording, while preserving its essential meaning: \
    '{user_prompt}'";

/// Varied expressions and terminology.
pub const REFORMULATE_TEMPLATE: &str = "Reformulate the prompt by expressing it in an entirely \
    new way using varied expressions and terminology to enhance clarity and originality. \
    Original prompt: '{user_prompt}'";

/// Unique phrasing and structure.
pub const CONVERT_TEMPLATE: &str = "Convert the prompt into a new form with unique phrasing and \
    structure that makes it vivid and distinct. Original prompt: '{user_prompt}'";

/// Completely different words, creative language.
pub const REGENERATE_TEMPLATE: &str = "Generate an alternative version of the prompt with \
    completely different words and sentences, focusing on creative language and originality. \
    Original prompt: '{user_prompt}'";

// Offline rephrasings used when no generation service is configured.

pub const PARAPHRASE_LOCAL: &str = "Could you elaborate further on '{user_prompt}'?";
pub const RECAST_LOCAL: &str = "In what ways does '{user_prompt}' impact modern technology?";
pub const REFORMULATE_LOCAL: &str =
    "Discuss the challenges and opportunities related to '{user_prompt}'.";
pub const CONVERT_LOCAL: &str =
    "How can the concept of '{user_prompt}' be applied in real-world scenarios?";
pub const REGENERATE_LOCAL: &str =
    "What are the potential benefits and risks associated with '{user_prompt}'?";
