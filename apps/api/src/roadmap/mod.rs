// Roadmap pipeline: topic → skills → per-skill resources → PDF document.
// All LLM calls go through llm_client; no direct provider calls here.

pub mod document;
pub mod handlers;
pub mod pdf;
pub mod prompts;
pub mod resources;
pub mod skills;

pub use skills::Skill;
