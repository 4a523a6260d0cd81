use worker::*;

#[path = "wasm/db/mod.rs"]
pub mod db;
#[path = "wasm/brevo.rs"]
pub mod brevo;
#[path = "wasm/env.rs"]
pub mod env;
#[path = "wasm/handlers/mod.rs"]
pub mod handlers;
#[path = "wasm/http.rs"]
pub mod http;

use env::app_host;
use http::{json_with_cors, not_found};

#[event(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let sink = crate::logging::LineSink::new(|line| worker::console_log!("{}", line));
    let _ = tracing::subscriber::set_global_default(crate::logging::subscriber(sink));
}

#[event(fetch)]
pub async fn fetch(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    console_error_panic_hook::set_once();

    if req.method() == Method::Options {
        let resp = Response::empty()?.with_status(204);
        return json_with_cors(&req, &app_host(&env), resp);
    }

    let url = req.url()?;
    let path = url.path().to_string();

    if req.method() == Method::Get && path == "/health" {
        let body = serde_json::json!({
            "ok": true,
            "service": "studyolle",
            "now": crate::util::ts_to_rfc3339(crate::util::now_ts()),
        });
        let resp = Response::from_json(&body)?;
        return json_with_cors(&req, &app_host(&env), resp);
    }

    if req.method() == Method::Post && path == "/admin/migrations/up" {
        return handlers::migrations::handle_migrations_up(&req, &env).await;
    }

    // Account pages.
    if matches!(
        path.as_str(),
        "/" | "/sign-up"
            | "/check-email-token"
            | "/check-email"
            | "/resend-confirm-email"
            | "/login"
            | "/logout"
    ) || path.starts_with("/profile/")
    {
        return handlers::account::handle_account(req, &env, &path).await;
    }

    if let Some(page) = path.strip_prefix("/settings/") {
        let page = page.trim_end_matches('/').to_string();
        return handlers::settings::handle_settings(req, &env, &page).await;
    }

    // Studies.
    if path == "/new-study" {
        return handlers::study::handle_study(req, &env, None).await;
    }
    if let Some(rest) = path.strip_prefix("/study/") {
        let rest = rest.trim_end_matches('/').to_string();
        if !rest.is_empty() {
            return handlers::study::handle_study(req, &env, Some(&rest)).await;
        }
    }

    not_found()
}
