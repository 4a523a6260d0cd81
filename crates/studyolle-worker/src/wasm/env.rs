use worker::{Env, Error, Result};

use crate::config::{normalize_env_value, AppConfig};

pub fn env_string(env: &Env, key: &str) -> Option<String> {
    env.var(key)
        .ok()
        .map(|v| normalize_env_value(v.to_string()))
        .filter(|s| !s.is_empty())
}

/// `APP_HOST`, falling back to the configured default.
pub fn app_host(env: &Env) -> String {
    env_string(env, "APP_HOST").unwrap_or_else(|| AppConfig::default().app_host)
}

pub fn load_config(env: &Env) -> Result<AppConfig> {
    AppConfig::from_lookup(|key| env.var(key).ok().map(|v| v.to_string()))
        .map_err(|e| Error::RustError(e.to_string()))
}
