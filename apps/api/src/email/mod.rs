//! Notifier: delivers a single message with one binary attachment over SMTP.
//!
//! `AppState` holds an `Arc<dyn Mailer>`; production uses `SmtpMailer`.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::{error, info};

use crate::config::Config;

pub mod handlers;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("invalid attachment content type: {0}")]
    ContentType(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// A named binary attachment.
#[derive(Debug, Clone)]
pub struct MailAttachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: MailAttachment,
}

/// The outbound mail seam. Implement this to swap transports without touching handlers.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Submits exactly one message. Returns once the transport has accepted it.
    async fn send_with_attachment(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

/// Content type implied by the attachment's file extension.
pub fn content_type_for(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Builds the MIME message: plain-text body plus the attachment, multipart/mixed.
pub fn build_message(from: &Mailbox, mail: OutgoingMail) -> Result<Message, MailError> {
    let content_type = ContentType::parse(content_type_for(&mail.attachment.filename))
        .map_err(|e| MailError::ContentType(e.to_string()))?;

    let message = Message::builder()
        .from(from.clone())
        .to(mail.to.parse::<Mailbox>()?)
        .subject(mail.subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(mail.body))
                .singlepart(
                    Attachment::new(mail.attachment.filename)
                        .body(mail.attachment.bytes, content_type),
                ),
        )?;

    Ok(message)
}

/// SMTP mailer over a STARTTLS relay, authenticated with the configured credentials.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &Config) -> Result<Self, MailError> {
        let from = config.mail_from.parse::<Mailbox>()?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_with_attachment(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let to = mail.to.clone();
        let message = build_message(&self.from, mail)?;

        info!("Sending email to: {to}");
        self.transport.send(message).await.map_err(|e| {
            error!("Error while sending email to {to}: {e}");
            MailError::Transport(e.to_string())
        })?;
        info!("Email sent successfully to: {to}");

        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    //! Recording mailer for handler tests.

    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct RecordingMailer {
        sent: Mutex<Vec<OutgoingMail>>,
        failure: Option<String>,
    }

    impl RecordingMailer {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every send attempt is recorded, then rejected with a transport error.
        pub fn failing(reason: &str) -> Self {
            Self {
                sent: Mutex::default(),
                failure: Some(reason.to_string()),
            }
        }

        pub fn sent(&self) -> Vec<OutgoingMail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send_with_attachment(&self, mail: OutgoingMail) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(mail);
            match &self.failure {
                Some(reason) => Err(MailError::Transport(reason.clone())),
                None => Ok(()),
            }
        }
    }
}
