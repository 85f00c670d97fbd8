//! Axum route handlers for the skill and resource generation API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use tracing::error;

use crate::errors::AppError;
use crate::roadmap::resources::{extract_resources, Resource};
use crate::roadmap::skills::{extract_skills, Skill};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateSkillsRequest {
    #[serde(default)]
    pub topic: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResourcesRequest {
    #[serde(default)]
    pub skill_name: String,
}

/// POST /api/v1/openai/generate-skills
///
/// Returns the skills needed to learn `topic` as `[{name, description}]`.
pub async fn handle_generate_skills(
    State(state): State<AppState>,
    payload: Result<Json<GenerateSkillsRequest>, JsonRejection>,
) -> Result<Json<Vec<Skill>>, AppError> {
    let Json(request) = payload?;
    if request.topic.trim().is_empty() {
        return Err(AppError::Validation("Topic cannot be empty.".to_string()));
    }

    let skills = extract_skills(&request.topic, state.llm.as_ref())
        .await
        .map_err(|e| {
            error!("Error generating skills for topic '{}': {e}", request.topic);
            e.map_message(|m| format!("Failed to fetch skills: {m}"))
        })?;

    Ok(Json(skills))
}

/// POST /api/v1/openai/generate-resources
///
/// Returns learning resources for `skillName` as `[{title, url, type}]`.
pub async fn handle_generate_resources(
    State(state): State<AppState>,
    payload: Result<Json<GenerateResourcesRequest>, JsonRejection>,
) -> Result<Json<Vec<Resource>>, AppError> {
    let Json(request) = payload?;
    if request.skill_name.trim().is_empty() {
        return Err(AppError::Validation(
            "Skill name cannot be empty.".to_string(),
        ));
    }

    let resources = extract_resources(&request.skill_name, state.llm.as_ref())
        .await
        .map_err(|e| {
            e.map_message(|m| {
                format!(
                    "Failed to fetch resources for skill: {}. {m}",
                    request.skill_name
                )
            })
        })?;

    Ok(Json(resources))
}
