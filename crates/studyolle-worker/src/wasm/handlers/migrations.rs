use worker::{Env, Request, Response, Result};

use migration::MigratorTrait;

use crate::service::zone::init_zone_data;
use crate::worker_wasm::db::db_connect;
use crate::worker_wasm::env::app_host;
use crate::worker_wasm::http::{internal_error_response, json_with_cors};

use super::admin_auth::ensure_admin_authorized;

/// POST /admin/migrations/up
///
/// Applies up to `steps` pending migrations (default 1, to stay under the
/// Worker subrequest limit). Once none are pending, seeds the zone table.
pub async fn handle_migrations_up(req: &Request, env: &Env) -> Result<Response> {
    if let Some(resp) = ensure_admin_authorized(req, env)? {
        return Ok(resp);
    }

    let db = match db_connect(env).await {
        Ok(db) => db,
        Err(e) => return internal_error_response("Failed to open database connection", &e),
    };

    let steps: u32 = req
        .url()
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(k, _)| k == "steps" || k == "limit")
                .and_then(|(_, v)| v.parse::<u32>().ok())
        })
        .filter(|n| *n > 0)
        .unwrap_or(1);

    let pending_before = match migration::Migrator::get_pending_migrations(&db).await {
        Ok(p) => p,
        Err(e) => return internal_error_response("Failed to read pending migrations", &e),
    };

    let steps_to_apply = steps.min(pending_before.len().try_into().unwrap_or(u32::MAX));

    if steps_to_apply > 0 {
        if let Err(e) = migration::Migrator::up(&db, Some(steps_to_apply)).await {
            return internal_error_response("Failed to apply migrations", &e);
        }
    }

    let pending_after = match migration::Migrator::get_pending_migrations(&db).await {
        Ok(p) => p,
        Err(e) => return internal_error_response("Failed to read pending migrations", &e),
    };

    let done = pending_after.is_empty();
    let zones_seeded = if done {
        match init_zone_data(&db).await {
            Ok(n) => n,
            Err(e) => return internal_error_response("Failed to seed zone data", &e),
        }
    } else {
        0
    };

    let resp = Response::from_json(&serde_json::json!({
        "success": true,
        "migrations": {
            "requested_steps": steps,
            "applied_steps": steps_to_apply,
            "applied_now": pending_before.len().saturating_sub(pending_after.len()),
            "pending": pending_after.len(),
            "done": done,
            "next": pending_after.first().map(|m| m.name()),
        },
        "zones_seeded": zones_seeded,
    }))?;

    json_with_cors(req, &app_host(env), resp)
}
