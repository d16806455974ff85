//! Outbound email

use crate::domain::collaborators::{Mailer, OutgoingEmail};
use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MailConfig {
    /// Empty disables SMTP; emails are then only logged
    #[serde(default)]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_username: Option<String>,

    #[serde(default)]
    pub smtp_password: Option<String>,

    #[serde(default = "default_from")]
    pub from: String,

    #[serde(default = "default_use_starttls")]
    pub use_starttls: bool,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            from: default_from(),
            use_starttls: default_use_starttls(),
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from() -> String {
    "Newskoop <no-reply@newskoop.local>".to_string()
}

fn default_use_starttls() -> bool {
    true
}

/// SMTP when a host is configured, otherwise a logging mailer
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>> {
    if config.smtp_host.trim().is_empty() {
        tracing::info!("no SMTP host configured, outgoing email will only be logged");
        return Ok(Arc::new(LogMailer));
    }
    Ok(Arc::new(SmtpMailer::new(config)?))
}

// ===== SMTP =====

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let host = config.smtp_host.trim();
        let mut builder = if config.use_starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .with_context(|| format!("invalid SMTP relay {}", host))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        }
        .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let from = config
            .from
            .parse::<Mailbox>()
            .with_context(|| format!("invalid sender address {}", config.from))?;
        tracing::info!(host, port = config.smtp_port, "SMTP mailer configured");
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn message(&self, email: OutgoingEmail) -> Result<Message> {
        let to = email
            .to
            .parse::<Mailbox>()
            .with_context(|| format!("invalid recipient address {}", email.to))?;
        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject);
        let message = match email.html {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(email.text, html))?,
            None => builder.singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_PLAIN)
                    .body(email.text),
            )?,
        };
        Ok(message)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        let to = email.to.clone();
        let message = self.message(email)?;
        self.transport
            .send(message)
            .await
            .with_context(|| format!("SMTP delivery to {} failed", to))?;
        tracing::info!(to = %to, "email sent");
        Ok(())
    }

    fn is_configured(&self) -> bool {
        true
    }
}

// ===== Logging =====

/// Logs every email and reports success
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        tracing::info!(to = %email.to, subject = %email.subject, "email not sent, SMTP disabled");
        tracing::debug!(body = %email.text, "email body");
        Ok(())
    }

    fn is_configured(&self) -> bool {
        false
    }
}

// ===== Recording =====

/// Keeps sent emails in memory; can be told to fail
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().clone()
    }

    /// Most recent email to `to`
    pub fn last_to(&self, to: &str) -> Option<OutgoingEmail> {
        self.sent.lock().iter().rev().find(|e| e.to == to).cloned()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("mail transport unavailable");
        }
        self.sent.lock().push(email);
        Ok(())
    }

    fn is_configured(&self) -> bool {
        true
    }
}
