//! Resource Extractor: suggests learning resources for a single skill.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ARRAY_INSTRUCTION;
use crate::llm_client::{call_json_array, CompletionProvider, LlmError};
use crate::roadmap::prompts::RESOURCES_PROMPT_TEMPLATE;

/// A single learning material reference tied to one skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
    /// Category label, e.g. "video" or "course". Empty when the model omits it.
    #[serde(rename = "type", default)]
    pub resource_type: String,
}

pub fn build_resources_prompt(skill_name: &str) -> String {
    RESOURCES_PROMPT_TEMPLATE
        .replace("{skill_name}", skill_name)
        .replace("{json_instruction}", JSON_ARRAY_INSTRUCTION)
}

/// Asks the LLM for learning resources covering `skill_name`.
///
/// An empty list is a valid answer. An envelope with no choices is reported
/// separately from malformed content, but both surface as `AppError::PromptParse`.
pub async fn extract_resources(
    skill_name: &str,
    llm: &dyn CompletionProvider,
) -> Result<Vec<Resource>, AppError> {
    let prompt = build_resources_prompt(skill_name);

    match call_json_array::<Resource>(llm, &prompt).await {
        Ok(resources) => {
            info!(
                "Generated {} resources for skill '{skill_name}'",
                resources.len()
            );
            Ok(resources)
        }
        Err(LlmError::EmptyChoices) => {
            error!("No choices in LLM response for skill '{skill_name}'");
            Err(AppError::PromptParse(format!(
                "No choices found in LLM response for skill '{skill_name}'"
            )))
        }
        Err(e) => {
            error!("Error generating resources for skill '{skill_name}': {e}");
            Err(e.into())
        }
    }
}
