//! Controllers, independent of the HTTP runtime.
//!
//! A controller turns an already-parsed request into a [`Reply`]; the Worker
//! layer only decodes requests and encodes replies.

pub mod account;
pub mod response;
pub mod settings;
pub mod study;
pub mod study_settings;

use serde::Serialize;
use serde_json::{Map, Value};

use entity::account::Model as Account;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::mail::EmailSender;
use crate::validator::Errors;

/// What a controller needs besides the request itself.
pub struct Ctx<'a, C> {
    pub db: &'a C,
    pub config: &'a AppConfig,
    pub mailer: &'a dyn EmailSender,
}

impl<'a, C> Ctx<'a, C> {
    pub fn new(db: &'a C, config: &'a AppConfig, mailer: &'a dyn EmailSender) -> Self {
        Self { db, config, mailer }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// A named view rendered from a JSON model.
    View { name: &'static str, model: Map<String, Value> },
    Redirect { location: String },
    Json(Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    Keep,
    Start(String),
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Body,
    /// Message shown once on the page the redirect lands on.
    pub flash: Option<String>,
    pub session: SessionChange,
}

impl Reply {
    pub fn view(name: &'static str) -> Self {
        Self {
            status: 200,
            body: Body::View {
                name,
                model: Map::new(),
            },
            flash: None,
            session: SessionChange::Keep,
        }
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            status: 302,
            body: Body::Redirect {
                location: location.into(),
            },
            flash: None,
            session: SessionChange::Keep,
        }
    }

    pub fn json(status: u16, value: Value) -> Self {
        Self {
            status,
            body: Body::Json(value),
            flash: None,
            session: SessionChange::Keep,
        }
    }

    pub fn ok() -> Self {
        Self::json(200, serde_json::json!({ "success": true }))
    }

    pub fn bad_request() -> Self {
        Self::json(400, serde_json::json!({ "success": false }))
    }

    /// Add a model attribute. Values that fail to serialize become `null`.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        if let Body::View { model, .. } = &mut self.body {
            model.insert(
                key.to_string(),
                serde_json::to_value(value).unwrap_or(Value::Null),
            );
        }
        self
    }

    pub fn with_errors(self, errors: &Errors) -> Self {
        self.with("errors", errors)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn flash(mut self, message: impl Into<String>) -> Self {
        self.flash = Some(message.into());
        self
    }

    pub fn start_session(mut self, token: String) -> Self {
        self.session = SessionChange::Start(token);
        self
    }

    pub fn end_session(mut self) -> Self {
        self.session = SessionChange::End;
        self
    }

    pub fn view_name(&self) -> Option<&str> {
        match &self.body {
            Body::View { name, .. } => Some(*name),
            _ => None,
        }
    }

    pub fn model(&self, key: &str) -> Option<&Value> {
        match &self.body {
            Body::View { model, .. } => model.get(key),
            _ => None,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match &self.body {
            Body::Redirect { location } => Some(location.as_str()),
            _ => None,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.model("errors")
            .and_then(Value::as_object)
            .is_some_and(|e| !e.is_empty())
    }
}

/// Map a failed request to what the client sees.
pub fn error_reply(err: &AppError) -> Reply {
    match err {
        AppError::Unauthenticated => Reply::redirect("/login"),
        AppError::BadRequest(_) => Reply::bad_request(),
        AppError::NotFound(message) | AppError::AccessDenied(message) => Reply::view("error")
            .with("code", err.code())
            .with("message", message)
            .with_status(err.status()),
        _ => Reply::view("error")
            .with("code", err.code())
            .with("message", "Something went wrong.")
            .with_status(err.status()),
    }
}

/// Routes behind login call this first.
pub fn require_login(current: Option<Account>) -> AppResult<Account> {
    current.ok_or(AppError::Unauthenticated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_view_models() {
        let reply = Reply::view("settings/profile").with("message", "saved");
        assert_eq!(reply.view_name(), Some("settings/profile"));
        assert_eq!(reply.model("message"), Some(&Value::from("saved")));
        assert!(!reply.has_errors());
    }

    #[test]
    fn maps_errors_to_statuses() {
        assert_eq!(error_reply(&AppError::NotFound("x".into())).status, 404);
        assert_eq!(error_reply(&AppError::AccessDenied("x".into())).status, 403);
        assert_eq!(error_reply(&AppError::BadRequest("x".into())).status, 400);
        assert_eq!(
            error_reply(&AppError::Unauthenticated).location(),
            Some("/login")
        );
        let internal = error_reply(&AppError::Mail("smtp down".into()));
        assert_eq!(internal.status, 500);
        assert_eq!(internal.model("message"), Some(&Value::from("Something went wrong.")));
    }
}
