//! Outbound email
//!
//! Transactional mail (verification links, MFA bootstrap tokens, deletion
//! codes) goes through one [`Mailer`]. Development logs messages instead of
//! sending them; tests capture them in memory.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::env;

const BREVO_ENDPOINT: &str = "https://api.brevo.com/v3/smtp/email";
const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
const USER_AGENT: &str = "permit-platform/0.1";

/// One plain-text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl Email {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail transport is misconfigured: {0}")]
    Config(String),

    #[error("Mail request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mail provider rejected the message (status={status}): {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Clone)]
pub enum Mailer {
    /// Writes messages to the log
    Log,
    Brevo(HttpTransport),
    Resend(HttpTransport),
    /// Keeps messages for inspection
    Memory(Arc<Mutex<Vec<Email>>>),
}

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    api_key: String,
    sender: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoAddress<'a> {
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoBody<'a> {
    sender: BrevoAddress<'a>,
    to: Vec<BrevoAddress<'a>>,
    subject: &'a str,
    text_content: &'a str,
}

#[derive(Serialize)]
struct ResendBody<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    text: &'a str,
}

impl Mailer {
    /// `EMAIL_API_PROVIDER`, `EMAIL_API_KEY`, `EMAIL_SENDER`
    pub fn from_env() -> Result<Self, MailError> {
        let provider = env::var("EMAIL_API_PROVIDER").unwrap_or_else(|| "log".to_string());
        Self::from_parts(
            &provider,
            env::var("EMAIL_API_KEY"),
            env::var("EMAIL_SENDER"),
        )
    }

    pub fn from_parts(
        provider: &str,
        api_key: Option<String>,
        sender: Option<String>,
    ) -> Result<Self, MailError> {
        let provider = provider.trim().to_ascii_lowercase();
        if provider == "log" {
            return Ok(Mailer::Log);
        }

        let api_key =
            api_key.ok_or_else(|| MailError::Config(format!("{provider} needs EMAIL_API_KEY")))?;
        let sender =
            sender.ok_or_else(|| MailError::Config(format!("{provider} needs EMAIL_SENDER")))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;
        let transport = HttpTransport {
            client,
            api_key,
            sender,
        };

        match provider.as_str() {
            "brevo" => Ok(Mailer::Brevo(transport)),
            "resend" => Ok(Mailer::Resend(transport)),
            other => Err(MailError::Config(format!("unknown provider `{other}`"))),
        }
    }

    /// In-memory mailer plus a handle on its outbox
    pub fn memory() -> (Self, Arc<Mutex<Vec<Email>>>) {
        let outbox = Arc::new(Mutex::new(Vec::new()));
        (Mailer::Memory(outbox.clone()), outbox)
    }

    pub fn transport_name(&self) -> &'static str {
        match self {
            Mailer::Log => "log",
            Mailer::Brevo(_) => "brevo",
            Mailer::Resend(_) => "resend",
            Mailer::Memory(_) => "memory",
        }
    }

    pub async fn send(&self, email: &Email) -> Result<(), MailError> {
        match self {
            Mailer::Log => {
                tracing::info!(
                    to = %email.to,
                    subject = %email.subject,
                    body = %email.text,
                    "Email (log transport)"
                );
                Ok(())
            }
            Mailer::Memory(outbox) => {
                if let Ok(mut outbox) = outbox.lock() {
                    outbox.push(email.clone());
                }
                Ok(())
            }
            Mailer::Brevo(t) => {
                let body = BrevoBody {
                    sender: BrevoAddress { email: &t.sender },
                    to: vec![BrevoAddress { email: &email.to }],
                    subject: &email.subject,
                    text_content: &email.text,
                };
                let resp = t
                    .client
                    .post(BREVO_ENDPOINT)
                    .header("api-key", &t.api_key)
                    .json(&body)
                    .send()
                    .await?;
                check_status(resp).await
            }
            Mailer::Resend(t) => {
                let body = ResendBody {
                    from: &t.sender,
                    to: vec![&email.to],
                    subject: &email.subject,
                    text: &email.text,
                };
                let resp = t
                    .client
                    .post(RESEND_ENDPOINT)
                    .bearer_auth(&t.api_key)
                    .json(&body)
                    .send()
                    .await?;
                check_status(resp).await
            }
        }
    }
}

async fn check_status(resp: reqwest::Response) -> Result<(), MailError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(MailError::Rejected {
        status: status.as_u16(),
        body,
    })
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Mailer").field(&self.transport_name()).finish()
    }
}
