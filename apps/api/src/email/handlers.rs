//! Axum route handlers for the Email API.

use axum::body::Bytes;
use axum::http::{header::CONTENT_TYPE, HeaderMap};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use lettre::message::Mailbox;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::email::{MailAttachment, OutgoingMail};
use crate::errors::AppError;
use crate::roadmap::document::build_roadmap;
use crate::roadmap::Skill;
use crate::state::AppState;

pub const ROADMAP_ATTACHMENT_NAME: &str = "Roadmap.pdf";
const TEST_ATTACHMENT_NAME: &str = "Sample.txt";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SendRoadmapRequest {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl SendRoadmapRequest {
    /// Rejects the request before any LLM or mail work starts.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.topic.trim().is_empty()
            || self.email.trim().is_empty()
            || self.skills.is_empty()
        {
            return Err(AppError::Validation(
                "Topic, email, and skills are required.".to_string(),
            ));
        }
        if self.skills.iter().any(|s| s.name.trim().is_empty()) {
            return Err(AppError::Validation(
                "Every skill needs a non-empty name.".to_string(),
            ));
        }
        validate_recipient(&self.email)
    }
}

/// The recipient must parse as a mailbox before any work is spent on it.
fn validate_recipient(email: &str) -> Result<(), AppError> {
    email
        .trim()
        .parse::<Mailbox>()
        .map(|_| ())
        .map_err(|_| AppError::Validation(format!("Invalid email address: {email}")))
}

#[derive(Debug, Default, Deserialize)]
pub struct TestEmailRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl TestEmailRequest {
    /// An empty body means "no body". Anything else must be a well-formed JSON request.
    fn from_body(headers: &HeaderMap, body: &[u8]) -> Result<Self, AppError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        if !has_json_content_type(headers) {
            return Err(AppError::Validation(
                "Expected request with `Content-Type: application/json`".to_string(),
            ));
        }
        let Json(request) = Json::<Self>::from_bytes(body)?;
        Ok(request)
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

pub fn roadmap_subject(topic: &str) -> String {
    format!("Your Roadmap for {topic}")
}

pub fn roadmap_body(topic: &str) -> String {
    format!(
        "Dear User,\n\nPlease find attached your roadmap for learning {topic}.\n\nBest regards,\nThe Roadmap Team"
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/email/send-roadmap-email
///
/// Builds the roadmap PDF for the given skills and mails it to `email`.
/// Mail transport failures are logged in full; clients get a generic message.
pub async fn handle_send_roadmap_email(
    State(state): State<AppState>,
    payload: Result<Json<SendRoadmapRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(request) = payload?;
    request.validate()?;

    let pdf = build_roadmap(
        &request.topic,
        &request.skills,
        state.llm.as_ref(),
        state.config.resource_fetch_concurrency,
    )
    .await
    .map_err(|e| {
        error!("Unexpected error building roadmap for '{}': {e}", request.topic);
        e
    })?;

    let mail = OutgoingMail {
        to: request.email.trim().to_string(),
        subject: roadmap_subject(&request.topic),
        body: roadmap_body(&request.topic),
        attachment: MailAttachment {
            filename: ROADMAP_ATTACHMENT_NAME.to_string(),
            bytes: pdf,
        },
    };

    state.mailer.send_with_attachment(mail).await.map_err(|e| {
        error!("Failed to send email to {}: {e}", request.email);
        AppError::from(e)
    })?;

    info!("Email sent successfully to: {}", request.email);
    Ok(Json(MessageResponse {
        message: format!("Roadmap sent to {}", request.email),
    }))
}

/// POST /api/v1/email-test/send
///
/// Sends a small test message to check the mail transport configuration.
/// Goes to the configured sender address unless `email` is given.
pub async fn handle_send_test_email(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<MessageResponse>, AppError> {
    let request = TestEmailRequest::from_body(&headers, &body)?;
    let to = match request.email.filter(|e| !e.trim().is_empty()) {
        Some(email) => {
            validate_recipient(&email)?;
            email
        }
        None => state.config.mail_from.clone(),
    };

    let mail = OutgoingMail {
        to: to.clone(),
        subject: "Test Email".to_string(),
        body: "This is a test email with an attachment.".to_string(),
        attachment: MailAttachment {
            filename: TEST_ATTACHMENT_NAME.to_string(),
            bytes: b"Sample attachment content".to_vec(),
        },
    };

    state.mailer.send_with_attachment(mail).await.map_err(|e| {
        error!("Test email to {to} failed: {e}");
        AppError::from(e)
    })?;

    info!("Test email sent to: {to}");
    Ok(Json(MessageResponse {
        message: "Email sent successfully.".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(topic: &str, email: &str, skills: Vec<Skill>) -> SendRoadmapRequest {
        SendRoadmapRequest {
            topic: topic.to_string(),
            email: email.to_string(),
            skills,
        }
    }

    fn ownership() -> Skill {
        Skill {
            name: "Ownership".to_string(),
            description: "Who frees what".to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_complete_request() {
        assert!(request("Rust", "a@b.co", vec![ownership()]).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let cases = vec![
            request("", "a@b.co", vec![ownership()]),
            request("   ", "a@b.co", vec![ownership()]),
            request("Rust", "", vec![ownership()]),
            request("Rust", "a@b.co", vec![]),
        ];
        for case in cases {
            assert!(matches!(case.validate(), Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn test_validate_rejects_unparseable_email() {
        for email in ["not-an-address", "learner at example.com"] {
            let result = request("Rust", email, vec![ownership()]).validate();
            assert!(matches!(result, Err(AppError::Validation(_))), "email: {email}");
        }
        assert!(request("Rust", " a@b.co ", vec![ownership()]).validate().is_ok());
    }

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "application/json".parse().unwrap());
        headers
    }

    #[test]
    fn test_test_email_body_may_be_empty() {
        for body in [&b""[..], b"  \n"] {
            let request = TestEmailRequest::from_body(&HeaderMap::new(), body).unwrap();
            assert!(request.email.is_none());
        }
    }

    #[test]
    fn test_test_email_body_must_be_well_formed_json() {
        for body in [&b"{\"email\": 42}"[..], b"{\"email\": ", b"\"learner@example.com\""] {
            let result = TestEmailRequest::from_body(&json_headers(), body);
            assert!(matches!(result, Err(AppError::Validation(_))));
        }

        let result = TestEmailRequest::from_body(&HeaderMap::new(), b"{\"email\": \"a@b.co\"}");
        assert!(matches!(result, Err(AppError::Validation(_))));

        let request =
            TestEmailRequest::from_body(&json_headers(), b"{\"email\": \"a@b.co\"}").unwrap();
        assert_eq!(request.email.as_deref(), Some("a@b.co"));
    }

    #[test]
    fn test_validate_rejects_blank_skill_name() {
        let blank = Skill {
            name: " ".to_string(),
            description: String::new(),
        };
        let result = request("Rust", "a@b.co", vec![ownership(), blank]).validate();
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_request_tolerates_extra_skill_fields_and_missing_description() {
        let json = serde_json::json!({
            "topic": "Rust",
            "email": "a@b.co",
            "skills": [
                {"name": "Ownership", "resources": []},
                {"name": "Traits", "description": "Shared behavior"}
            ]
        });
        let request: SendRoadmapRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.skills[0].description, "");
        assert_eq!(request.skills[1].name, "Traits");
    }

    #[test]
    fn test_subject_and_body_mention_topic() {
        assert_eq!(roadmap_subject("Rust"), "Your Roadmap for Rust");
        assert!(roadmap_body("Rust").contains("roadmap for learning Rust."));
    }
}
