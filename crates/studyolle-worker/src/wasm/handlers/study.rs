use sea_orm::DatabaseTransaction;
use worker::{Env, Method, Request, Response, Result};

use entity::account::Model as Account;

use crate::error::{AppError, AppResult};
use crate::form::{FormFields, TagForm, ZoneForm};
use crate::web::{require_login, study, study_settings as manage, Ctx, Reply};
use crate::web::response::decode_component;
use crate::worker_wasm::http::{internal_error_response, json_body, read_body};

use super::RequestState;

/// `/new-study` and everything under `/study/{path}`.
///
/// `rest` is `None` for `/new-study`, otherwise the part after `/study/`.
pub async fn handle_study(mut req: Request, env: &Env, rest: Option<&str>) -> Result<Response> {
    let state = match RequestState::open(&req, env).await {
        Ok(state) => state,
        Err(e) => return internal_error_response("Failed to prepare request", &e),
    };

    let method = req.method();
    let body = read_body(&mut req).await?;

    let txn = state.begin().await?;
    let ctx = state.ctx(&txn);
    let result = match rest {
        None => new_study(&ctx, state.account.clone(), method, &body).await,
        Some(rest) => {
            let (path, tail) = rest.split_once('/').unwrap_or((rest, ""));
            let path = decode_component(path);
            route(&ctx, state.account.clone(), method, &path, tail, &body).await
        }
    };
    drop(ctx);
    state.finish(&req, txn, result).await
}

async fn new_study(
    ctx: &Ctx<'_, DatabaseTransaction>,
    current: Option<Account>,
    method: Method,
    body: &str,
) -> AppResult<Reply> {
    let account = require_login(current)?;
    match method {
        Method::Get => Ok(study::new_study_form(&account)),
        Method::Post => study::new_study_submit(ctx, &account, &FormFields::parse(body)).await,
        _ => Err(AppError::NotFound("/new-study".to_string())),
    }
}

async fn route(
    ctx: &Ctx<'_, DatabaseTransaction>,
    current: Option<Account>,
    method: Method,
    path: &str,
    tail: &str,
    body: &str,
) -> AppResult<Reply> {
    match (&method, tail) {
        (Method::Get, "") => return study::view_study(ctx, current.as_ref(), path).await,
        (Method::Get, "members") => return study::view_members(ctx, current.as_ref(), path).await,
        _ => {}
    }

    let account = require_login(current)?;
    let form = || FormFields::parse(body);

    match (method, tail) {
        (Method::Post, "join") => study::join(ctx, &account, path).await,
        (Method::Post, "leave") => study::leave(ctx, &account, path).await,

        (Method::Get, "settings/description") => manage::description_form(ctx, &account, path).await,
        (Method::Post, "settings/description") => {
            manage::update_description(ctx, &account, path, &form()).await
        }
        (Method::Get, "settings/banner") => manage::banner_form(ctx, &account, path).await,
        (Method::Post, "settings/banner") => manage::update_banner(ctx, &account, path, &form()).await,
        (Method::Post, "settings/banner/enable") => manage::enable_banner(ctx, &account, path).await,
        (Method::Post, "settings/banner/disable") => manage::disable_banner(ctx, &account, path).await,

        (Method::Get, "settings/tags") => manage::tags_form(ctx, &account, path).await,
        (Method::Post, "settings/tags/add") => match json_body::<TagForm>(body) {
            Some(tag) => manage::add_tag(ctx, &account, path, &tag).await,
            None => Ok(Reply::bad_request()),
        },
        (Method::Post, "settings/tags/remove") => match json_body::<TagForm>(body) {
            Some(tag) => manage::remove_tag(ctx, &account, path, &tag).await,
            None => Ok(Reply::bad_request()),
        },
        (Method::Get, "settings/zones") => manage::zones_form(ctx, &account, path).await,
        (Method::Post, "settings/zones/add") => match json_body::<ZoneForm>(body) {
            Some(zone) => manage::add_zone(ctx, &account, path, &zone).await,
            None => Ok(Reply::bad_request()),
        },
        (Method::Post, "settings/zones/remove") => match json_body::<ZoneForm>(body) {
            Some(zone) => manage::remove_zone(ctx, &account, path, &zone).await,
            None => Ok(Reply::bad_request()),
        },

        (Method::Get, "settings/study") => manage::study_form(ctx, &account, path).await,
        (Method::Post, "settings/study/publish") => manage::publish(ctx, &account, path).await,
        (Method::Post, "settings/study/close") => manage::close(ctx, &account, path).await,
        (Method::Post, "settings/study/path") => manage::update_path(ctx, &account, path, &form()).await,
        (Method::Post, "settings/study/title") => manage::update_title(ctx, &account, path, &form()).await,
        (Method::Post, "settings/study/remove") => manage::remove(ctx, &account, path).await,
        (Method::Post, "settings/recruit/start") => manage::start_recruit(ctx, &account, path).await,
        (Method::Post, "settings/recruit/stop") => manage::stop_recruit(ctx, &account, path).await,

        _ => Err(AppError::NotFound(format!("No study page {tail}."))),
    }
}
