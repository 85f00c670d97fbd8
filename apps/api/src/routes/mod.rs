pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::email::handlers as email_handlers;
use crate::roadmap::handlers as roadmap_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation API
        .route(
            "/api/v1/openai/generate-skills",
            post(roadmap_handlers::handle_generate_skills),
        )
        .route(
            "/api/v1/openai/generate-resources",
            post(roadmap_handlers::handle_generate_resources),
        )
        // Email API
        .route(
            "/api/v1/email/send-roadmap-email",
            post(email_handlers::handle_send_roadmap_email),
        )
        .route(
            "/api/v1/email-test/send",
            post(email_handlers::handle_send_test_email),
        )
        .with_state(state)
}
