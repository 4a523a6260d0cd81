use serde::Serialize;
use worker::{Env, Headers, Method, Request, RequestInit};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::mail::{EmailMessage, EmailSender};
use crate::worker_wasm::env::env_string;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoEmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoSendEmailBody {
    sender: BrevoEmailAddress,
    to: Vec<BrevoEmailAddress>,
    subject: String,
    html_content: String,
}

fn is_success_status(status: u16) -> bool {
    (200..=299).contains(&status)
}

/// Delivers mail through the Brevo transactional email API.
#[derive(Debug, Clone)]
pub struct BrevoEmailSender {
    api_key: String,
    sender_email: String,
    sender_name: Option<String>,
}

impl BrevoEmailSender {
    /// `None` when `BREVO_API_KEY` is not configured.
    pub fn from_env(env: &Env, config: &AppConfig) -> Option<Self> {
        let api_key = env_string(env, "BREVO_API_KEY")?;
        Some(Self {
            api_key,
            sender_email: config.mail_sender_email.clone(),
            sender_name: config.mail_sender_name.clone(),
        })
    }

    async fn post(&self, json: String) -> worker::Result<(u16, String)> {
        let headers = Headers::new();
        headers.set("api-key", &self.api_key)?;
        headers.set("Content-Type", "application/json")?;
        headers.set("Accept", "application/json")?;
        headers.set("User-Agent", "Studyolle/0.1 (Cloudflare Worker)")?;

        let mut init = RequestInit::new();
        init.with_method(Method::Post);
        init.with_headers(headers);
        init.with_body(Some(json.into()));

        let req = Request::new_with_init("https://api.brevo.com/v3/smtp/email", &init)?;
        let mut resp = worker::Fetch::Request(req).send().await?;
        let status = resp.status_code();
        let body = resp.text().await.unwrap_or_default();
        Ok((status, body))
    }
}

#[async_trait::async_trait(?Send)]
impl EmailSender for BrevoEmailSender {
    async fn send_email(&self, message: &EmailMessage) -> AppResult<()> {
        let body = BrevoSendEmailBody {
            sender: BrevoEmailAddress {
                email: self.sender_email.clone(),
                name: self.sender_name.clone(),
            },
            to: vec![BrevoEmailAddress {
                email: message.to.clone(),
                name: None,
            }],
            subject: message.subject.clone(),
            html_content: message.message.clone(),
        };

        let json = serde_json::to_string(&body)
            .map_err(|e| AppError::Mail(format!("Failed to serialize Brevo payload: {e}")))?;

        let (status, text) = self
            .post(json)
            .await
            .map_err(|e| AppError::Mail(e.to_string()))?;
        if is_success_status(status) {
            return Ok(());
        }

        Err(AppError::Mail(format!(
            "Brevo send failed (status={status}): {text}"
        )))
    }
}
