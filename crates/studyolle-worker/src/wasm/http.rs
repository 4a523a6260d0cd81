use std::fmt::Display;

use serde::de::DeserializeOwned;
use worker::{Request, Response, Result};

use crate::form::FormFields;
use crate::web::response::{self, Content};
use crate::web::Reply;

/// CORS grant for the application's own origin. Other origins get none.
pub fn json_with_cors(req: &Request, app_host: &str, mut resp: Response) -> Result<Response> {
    let origin = req.headers().get("Origin")?;
    let headers = resp.headers_mut();
    headers.set("Vary", "Origin")?;

    if let Some(origin) = response::allowed_origin(origin.as_deref(), app_host) {
        headers.set("Access-Control-Allow-Origin", &origin)?;
        headers.set("Access-Control-Allow-Credentials", "true")?;
        headers.set("Access-Control-Allow-Methods", "GET,POST,OPTIONS")?;
        headers.set(
            "Access-Control-Allow-Headers",
            "Authorization,Content-Type,Accept,X-Requested-With",
        )?;
    }

    Ok(resp)
}

pub fn error_response(status: u16, code: &str, message: &str) -> Result<Response> {
    let body = serde_json::json!({
        "success": false,
        "error": {
            "code": code,
            "message": message
        }
    });

    Ok(Response::from_json(&body)?.with_status(status))
}

pub fn internal_error_response<E: Display>(context: &str, err: &E) -> Result<Response> {
    tracing::error!("{context}: {err}");
    error_response(500, "internal_error", "Internal server error")
}

pub fn not_found() -> Result<Response> {
    error_response(404, "not_found", "Not found")
}

/// Value of a request cookie, if sent.
pub fn cookie(req: &Request, name: &str) -> Result<Option<String>> {
    let raw = req.headers().get("Cookie")?;
    Ok(response::cookie_value(raw.as_deref(), name))
}

pub fn query_fields(req: &Request) -> Result<FormFields> {
    let url = req.url()?;
    Ok(FormFields::parse(url.query().unwrap_or_default()))
}

/// Raw request body; empty for anything but POST.
pub async fn read_body(req: &mut Request) -> Result<String> {
    if req.method() != worker::Method::Post {
        return Ok(String::new());
    }
    req.text().await
}

/// `None` when the body is missing or malformed.
pub fn json_body<T: DeserializeOwned>(body: &str) -> Option<T> {
    serde_json::from_str(body).ok()
}

pub fn reply_response(
    req: &Request,
    app_host: &str,
    reply: Reply,
    incoming_flash: Option<String>,
    session_ttl_secs: i64,
) -> Result<Response> {
    let encoded = response::encode(reply, incoming_flash, session_ttl_secs);
    let mut resp = match encoded.content {
        Content::Json(value) => Response::from_json(&value)?.with_status(encoded.status),
        Content::Redirect(location) => {
            let mut resp = Response::empty()?.with_status(encoded.status);
            resp.headers_mut().set("Location", &location)?;
            resp
        }
    };

    let headers = resp.headers_mut();
    for cookie in &encoded.set_cookies {
        headers.append("Set-Cookie", cookie)?;
    }

    json_with_cors(req, app_host, resp)
}
