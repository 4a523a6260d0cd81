use sea_orm::DatabaseTransaction;
use worker::{Env, Method, Request, Response, Result};

use entity::account::Model as Account;

use crate::error::{AppError, AppResult};
use crate::form::{FormFields, TagForm, ZoneForm};
use crate::web::{require_login, settings, Ctx, Reply};
use crate::worker_wasm::http::{internal_error_response, json_body, read_body};

use super::RequestState;

/// `/settings/{page}`
pub async fn handle_settings(mut req: Request, env: &Env, page: &str) -> Result<Response> {
    let state = match RequestState::open(&req, env).await {
        Ok(state) => state,
        Err(e) => return internal_error_response("Failed to prepare request", &e),
    };

    let method = req.method();
    let body = read_body(&mut req).await?;

    let txn = state.begin().await?;
    let result = route(&state.ctx(&txn), state.account.clone(), method, page, &body).await;
    state.finish(&req, txn, result).await
}

async fn route(
    ctx: &Ctx<'_, DatabaseTransaction>,
    current: Option<Account>,
    method: Method,
    page: &str,
    body: &str,
) -> AppResult<Reply> {
    let account = require_login(current)?;

    match (method, page) {
        (Method::Get, "profile") => Ok(settings::profile_form(&account)),
        (Method::Post, "profile") => {
            settings::update_profile(ctx, account, &FormFields::parse(body)).await
        }
        (Method::Get, "password") => Ok(settings::password_form(&account)),
        (Method::Post, "password") => {
            settings::update_password(ctx, account, &FormFields::parse(body)).await
        }
        (Method::Get, "notifications") => Ok(settings::notifications_form(&account)),
        (Method::Post, "notifications") => {
            settings::update_notifications(ctx, account, &FormFields::parse(body)).await
        }
        (Method::Get, "account") => Ok(settings::account_form(&account)),
        (Method::Post, "account") => {
            settings::update_nickname(ctx, account, &FormFields::parse(body)).await
        }
        (Method::Get, "tags") => settings::tags_form(ctx, &account).await,
        (Method::Post, "tags/add") => match json_body::<TagForm>(body) {
            Some(form) => settings::add_tag(ctx, &account, &form).await,
            None => Ok(Reply::bad_request()),
        },
        (Method::Post, "tags/remove") => match json_body::<TagForm>(body) {
            Some(form) => settings::remove_tag(ctx, &account, &form).await,
            None => Ok(Reply::bad_request()),
        },
        (Method::Get, "zones") => settings::zones_form(ctx, &account).await,
        (Method::Post, "zones/add") => match json_body::<ZoneForm>(body) {
            Some(form) => settings::add_zone(ctx, &account, &form).await,
            None => Ok(Reply::bad_request()),
        },
        (Method::Post, "zones/remove") => match json_body::<ZoneForm>(body) {
            Some(form) => settings::remove_zone(ctx, &account, &form).await,
            None => Ok(Reply::bad_request()),
        },
        _ => Err(AppError::NotFound(format!("No settings page {page}."))),
    }
}
