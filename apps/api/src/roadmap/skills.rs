//! Skill Extractor: turns a learning topic into a list of named skills via the LLM.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ARRAY_INSTRUCTION;
use crate::llm_client::{call_json_array, CompletionProvider};
use crate::roadmap::prompts::SKILLS_PROMPT_TEMPLATE;

/// A named competency, the first-level unit of a roadmap.
///
/// `name` is mandatory on the wire: records without it fail deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

pub fn build_skills_prompt(topic: &str) -> String {
    SKILLS_PROMPT_TEMPLATE
        .replace("{topic}", topic)
        .replace("{json_instruction}", JSON_ARRAY_INSTRUCTION)
}

/// Asks the LLM for the skills needed to learn `topic`.
///
/// Returns a non-empty list whose every `name` is non-blank, or fails with
/// `AppError::Provider` / `AppError::PromptParse`.
pub async fn extract_skills(
    topic: &str,
    llm: &dyn CompletionProvider,
) -> Result<Vec<Skill>, AppError> {
    info!("Generating skills for topic '{topic}'");
    let prompt = build_skills_prompt(topic);
    let skills: Vec<Skill> = call_json_array(llm, &prompt).await?;

    if skills.is_empty() {
        return Err(AppError::PromptParse(format!(
            "LLM returned no skills for topic '{topic}'"
        )));
    }
    if skills.iter().any(|s| s.name.trim().is_empty()) {
        return Err(AppError::PromptParse(format!(
            "LLM returned a skill without a name for topic '{topic}'"
        )));
    }

    info!("Generated {} skills for topic '{topic}'", skills.len());
    Ok(skills)
}
