/// Transactional e-mail
///
/// The rest of the crate talks to a [`Mailer`]; which one is wired in depends
/// on configuration:
///
/// - [`HttpMailer`]: JSON POST to a transactional-mail API with a bearer key
/// - [`LogMailer`]: used when mail is not configured, logs and reports
///   [`Delivery::Skipped`]
/// - [`RecordingMailer`]: keeps every message in memory for assertions
///
/// Sending is always best-effort from the caller's point of view; see
/// [`crate::effects`].

pub mod templates;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Rendered message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub subject: String,
    pub html: String,
}

/// What happened to a message that did not error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent { message_id: Option<String> },
    Skipped,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Mail API rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to build mail client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        MailError::Transport(err.to_string())
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, message: &EmailMessage) -> Result<Delivery, MailError>;
}

/// Settings for [`HttpMailer`]
#[derive(Debug, Clone)]
pub struct HttpMailerConfig {
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
    pub from_name: String,

    /// Deadline for one send, connect included
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    from: String,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default, alias = "messageId")]
    id: Option<String>,
}

pub struct HttpMailer {
    client: reqwest::Client,
    config: HttpMailerConfig,
}

impl HttpMailer {
    pub fn new(config: HttpMailerConfig) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MailError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn sender(&self) -> String {
        format!("{} <{}>", self.config.from_name, self.config.from_address)
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, message: &EmailMessage) -> Result<Delivery, MailError> {
        let body = OutboundMessage {
            from: self.sender(),
            to: [to],
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        // Providers differ on the id field; a missing id is still a send
        let message_id = response
            .json::<SendResponse>()
            .await
            .ok()
            .and_then(|r| r.id);

        tracing::info!(to = %to, subject = %message.subject, ?message_id, "Email sent");
        Ok(Delivery::Sent { message_id })
    }
}

/// Stand-in used when no mail API is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, message: &EmailMessage) -> Result<Delivery, MailError> {
        tracing::info!(to = %to, subject = %message.subject, "Mail not configured, skipping email");
        Ok(Delivery::Skipped)
    }
}

/// A message captured by [`RecordingMailer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub message: EmailMessage,
}

/// In-memory mailer for tests; can be switched to fail every send
#[derive(Debug, Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<SentEmail>>>,
    failing: Arc<std::sync::atomic::AtomicBool>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_to(&self, to: &str) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| m.to.eq_ignore_ascii_case(to))
            .map(|m| m.message.clone())
            .collect()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, message: &EmailMessage) -> Result<Delivery, MailError> {
        if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(MailError::Transport("connection refused".into()));
        }

        let mut sent = self.sent.lock().await;
        sent.push(SentEmail {
            to: to.to_string(),
            message: message.clone(),
        });
        Ok(Delivery::Sent {
            message_id: Some(format!("test-{}", sent.len())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> EmailMessage {
        EmailMessage {
            subject: "Hello".into(),
            html: "<p>Hi</p>".into(),
        }
    }

    #[tokio::test]
    async fn test_log_mailer_skips() {
        let delivery = LogMailer.send("a@x.com", &message()).await.unwrap();
        assert_eq!(delivery, Delivery::Skipped);
    }

    #[tokio::test]
    async fn test_recording_mailer_records() {
        let mailer = RecordingMailer::new();
        mailer.send("a@x.com", &message()).await.unwrap();
        mailer.send("b@x.com", &message()).await.unwrap();

        assert_eq!(mailer.sent().await.len(), 2);
        assert_eq!(mailer.sent_to("A@X.com").await, vec![message()]);
    }

    #[tokio::test]
    async fn test_recording_mailer_failure() {
        let mailer = RecordingMailer::new();
        mailer.set_failing(true);
        assert!(mailer.send("a@x.com", &message()).await.is_err());
        assert!(mailer.sent().await.is_empty());
    }

    fn http_config(api_url: String, timeout: Duration) -> HttpMailerConfig {
        HttpMailerConfig {
            api_url,
            api_key: "key".into(),
            from_address: "noreply@suryoday.org".into(),
            from_name: "Suryoday Old Age Home".into(),
            timeout,
        }
    }

    #[test]
    fn test_sender_format() {
        let mailer =
            HttpMailer::new(http_config("http://localhost/send".into(), Duration::from_secs(10)))
                .unwrap();
        assert_eq!(mailer.sender(), "Suryoday Old Age Home <noreply@suryoday.org>");
    }

    #[tokio::test]
    async fn test_stalled_provider_times_out() {
        // Accepts connections and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let stall = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let mailer = HttpMailer::new(http_config(
            format!("http://{address}/send"),
            Duration::from_millis(200),
        ))
        .unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), mailer.send("a@x.com", &message()))
            .await
            .expect("send must give up on its own");
        assert!(matches!(result, Err(MailError::Transport(_))));

        let outcome = crate::effects::notify(&mailer, "a@x.com", &message()).await;
        assert_eq!(outcome, crate::effects::EffectOutcome::Failed("delivery failed"));

        stall.abort();
    }
}
