// Refine pipeline: strategy instructions → concurrent generation → scoring → stable ranking.
// Generation goes through the `TextGenerator` trait; the Gemini client lives in llm_client.

pub mod generator;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod ranker;
pub mod scoring;
pub mod strategy;
