//! Runtime configuration.
//!
//! Values come from a key lookup so the same parsing serves the Worker `Env`
//! and plain closures in tests.

use crate::error::AppError;

const DEFAULT_APP_HOST: &str = "http://localhost:8080";
const DEFAULT_SESSION_TTL_SECS: i64 = 14 * 24 * 60 * 60;
const DEFAULT_PASSWORD_ITERATIONS: u32 = 100_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Absolute origin used to build links in outgoing emails.
    pub app_host: String,
    pub session_ttl_secs: i64,
    pub password_iterations: u32,
    pub mail_sender_email: String,
    pub mail_sender_name: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_host: DEFAULT_APP_HOST.to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            password_iterations: DEFAULT_PASSWORD_ITERATIONS,
            mail_sender_email: "no-reply@studyolle.local".to_string(),
            mail_sender_name: Some("Studyolle".to_string()),
        }
    }
}

/// Strip surrounding whitespace and one level of matching quotes.
pub fn normalize_env_value(raw: String) -> String {
    let trimmed = raw.trim();

    if let Some(inner) = trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return inner.trim().to_string();
    }
    if let Some(inner) = trimmed.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        return inner.trim().to_string();
    }

    trimmed.to_string()
}

impl AppConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(normalize_env_value)
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let session_ttl_secs = match get("SESSION_TTL_SECS") {
            Some(v) => v
                .parse::<i64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| AppError::Config(format!("SESSION_TTL_SECS is not a positive integer: {v}")))?,
            None => defaults.session_ttl_secs,
        };

        let password_iterations = match get("PASSWORD_ITERATIONS") {
            Some(v) => v
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| AppError::Config(format!("PASSWORD_ITERATIONS is not a positive integer: {v}")))?,
            None => defaults.password_iterations,
        };

        Ok(Self {
            app_host: get("APP_HOST")
                .map(|h| h.trim_end_matches('/').to_string())
                .unwrap_or(defaults.app_host),
            session_ttl_secs,
            password_iterations,
            mail_sender_email: get("MAIL_SENDER_EMAIL").unwrap_or(defaults.mail_sender_email),
            mail_sender_name: get("MAIL_SENDER_NAME").or(defaults.mail_sender_name),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn falls_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn reads_and_normalizes_values() {
        let config = AppConfig::from_lookup(lookup(&[
            ("APP_HOST", " \"https://studyolle.example/\" "),
            ("PASSWORD_ITERATIONS", "'1000'"),
            ("MAIL_SENDER_NAME", ""),
        ]))
        .unwrap();

        assert_eq!(config.app_host, "https://studyolle.example");
        assert_eq!(config.password_iterations, 1000);
        assert_eq!(config.mail_sender_name.as_deref(), Some("Studyolle"));
    }

    #[test]
    fn rejects_non_numeric_ttl() {
        let err = AppConfig::from_lookup(lookup(&[("SESSION_TTL_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
