//! Roadmap Document Builder: topic + skills → per-skill resources → PDF bytes.
//!
//! Flow: fetch resources for every skill (bounded fan-out, input order kept) →
//!       reduce each skill's outcome to text lines → render PDF off the async executor.
//!
//! A failed resource lookup never fails the roadmap: that skill's section gets
//! the fallback line and the build carries on.

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::CompletionProvider;
use crate::roadmap::pdf::render_lines;
use crate::roadmap::resources::{extract_resources, Resource};
use crate::roadmap::skills::Skill;

pub const NO_RESOURCES_LINE: &str = "No resources available.";

pub fn title_line(topic: &str) -> String {
    format!("Roadmap for: {topic}")
}

/// Builds the roadmap PDF for `topic`.
///
/// Steps:
/// 1. extract_resources() per skill, at most `concurrency` lookups in flight
/// 2. roadmap_lines() → Vec<String> (failures reduced to the fallback line)
/// 3. render_lines() inside spawn_blocking → PDF bytes
pub async fn build_roadmap(
    topic: &str,
    skills: &[Skill],
    llm: &dyn CompletionProvider,
    concurrency: usize,
) -> Result<Vec<u8>, AppError> {
    info!(
        "Building roadmap for topic '{topic}' with {} skills",
        skills.len()
    );

    let outcomes = fetch_all_resources(skills, llm, concurrency).await;
    let lines = roadmap_lines(topic, skills, outcomes);

    let title = title_line(topic);
    let bytes = tokio::task::spawn_blocking(move || render_lines(&title, &lines))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "spawn_blocking failed rendering roadmap: {e}"
            ))
        })??;

    info!("Rendered roadmap for topic '{topic}' ({} bytes)", bytes.len());
    Ok(bytes)
}

/// Looks up resources for every skill. The result at index `i` belongs to `skills[i]`.
async fn fetch_all_resources(
    skills: &[Skill],
    llm: &dyn CompletionProvider,
    concurrency: usize,
) -> Vec<Result<Vec<Resource>, AppError>> {
    let semaphore = Semaphore::new(concurrency.max(1));

    let lookups = skills.iter().map(|skill| {
        let semaphore = &semaphore;
        async move {
            // The semaphore is never closed, so acquire only fails if that changes.
            let _permit = semaphore.acquire().await.ok();
            extract_resources(&skill.name, llm).await
        }
    });

    join_all(lookups).await
}

/// Assembles the full line sequence of the document.
pub fn roadmap_lines(
    topic: &str,
    skills: &[Skill],
    outcomes: Vec<Result<Vec<Resource>, AppError>>,
) -> Vec<String> {
    let mut lines = vec![title_line(topic), String::new(), "Skills:".to_string()];

    for (skill, outcome) in skills.iter().zip(outcomes) {
        if let Err(e) = &outcome {
            warn!(
                "Error fetching resources for skill '{}' (topic '{topic}'): {e}",
                skill.name
            );
        }
        lines.extend(section_lines(skill, outcome));
    }

    lines
}

/// One skill's section. A failed or empty lookup yields the fallback line.
pub fn section_lines(skill: &Skill, outcome: Result<Vec<Resource>, AppError>) -> Vec<String> {
    let mut lines = vec![
        format!("Skill: {}", skill.name),
        format!("Description: {}", skill.description),
        String::new(),
        "Learning Resources:".to_string(),
    ];

    match outcome {
        Ok(resources) if !resources.is_empty() => {
            for resource in resources {
                if resource.resource_type.trim().is_empty() {
                    lines.push(format!(" - {}", resource.title));
                } else {
                    lines.push(format!(" - {} ({})", resource.title, resource.resource_type));
                }
                lines.push(format!("   URL: {}", resource.url));
            }
        }
        _ => lines.push(NO_RESOURCES_LINE.to_string()),
    }

    lines.push(String::new());
    lines
}
