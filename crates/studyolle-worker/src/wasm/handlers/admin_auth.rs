use subtle::ConstantTimeEq;
use worker::{Env, Request, Response, Result};

use crate::worker_wasm::env::env_string;
use crate::worker_wasm::http::error_response;

pub fn extract_bearer_token(req: &Request) -> Result<Option<String>> {
    let Some(raw) = req.headers().get("Authorization")? else {
        return Ok(None);
    };

    let raw = raw.trim();
    let Some((scheme, rest)) = raw.split_once(' ') else {
        return Ok(None);
    };
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Ok(None);
    }

    let token = rest.trim();
    if token.is_empty() {
        return Ok(None);
    }

    Ok(Some(token.to_string()))
}

/// Admin endpoints require `ADMIN_TOKEN` as a bearer token; without it they are disabled.
///
/// Returns `Ok(None)` when authorized; otherwise returns an error response.
pub fn ensure_admin_authorized(req: &Request, env: &Env) -> Result<Option<Response>> {
    let Some(required) = env_string(env, "ADMIN_TOKEN") else {
        return Ok(Some(error_response(
            403,
            "admin_disabled",
            "ADMIN_TOKEN is not configured",
        )?));
    };

    let Some(token) = extract_bearer_token(req)? else {
        return Ok(Some(error_response(
            401,
            "missing_token",
            "Missing Authorization Bearer token",
        )?));
    };

    if !bool::from(token.as_bytes().ct_eq(required.as_bytes())) {
        return Ok(Some(error_response(401, "unauthorized", "Invalid admin token")?));
    }

    Ok(None)
}
