use sea_orm::DatabaseTransaction;
use worker::{Env, Method, Request, Response, Result};

use entity::account::Model as Account;

use crate::error::{AppError, AppResult};
use crate::form::FormFields;
use crate::web::{self, Ctx, Reply};
use crate::web::response::decode_component;
use crate::worker_wasm::http::{internal_error_response, query_fields, read_body};

use super::RequestState;

/// `/`, sign-up, email verification, login/logout and public profiles.
pub async fn handle_account(mut req: Request, env: &Env, path: &str) -> Result<Response> {
    let state = match RequestState::open(&req, env).await {
        Ok(state) => state,
        Err(e) => return internal_error_response("Failed to prepare request", &e),
    };

    let method = req.method();
    let query = query_fields(&req)?;
    let body = read_body(&mut req).await?;

    let txn = state.begin().await?;
    let result = route(
        &state.ctx(&txn),
        state.account.clone(),
        state.session_token.as_deref(),
        method,
        path,
        &query,
        &body,
    )
    .await;
    state.finish(&req, txn, result).await
}

async fn route(
    ctx: &Ctx<'_, DatabaseTransaction>,
    current: Option<Account>,
    session_token: Option<&str>,
    method: Method,
    path: &str,
    query: &FormFields,
    body: &str,
) -> AppResult<Reply> {
    if let Some(nickname) = path.strip_prefix("/profile/") {
        if method != Method::Get {
            return Err(AppError::NotFound(path.to_string()));
        }
        return web::account::view_profile(ctx, current, &decode_component(nickname)).await;
    }

    match (method, path) {
        (Method::Get, "/") => Ok(web::account::home(current)),
        (Method::Get, "/sign-up") => Ok(web::account::sign_up_form()),
        (Method::Post, "/sign-up") => {
            web::account::sign_up_submit(ctx, &FormFields::parse(body)).await
        }
        (Method::Get, "/check-email-token") => web::account::check_email_token(ctx, query).await,
        (Method::Get, "/check-email") => web::account::check_email(current),
        (Method::Get, "/resend-confirm-email") => {
            web::account::resend_confirm_email(ctx, current).await
        }
        (Method::Get, "/login") => Ok(web::account::login_form()),
        (Method::Post, "/login") => web::account::login_submit(ctx, &FormFields::parse(body)).await,
        (Method::Post, "/logout") => web::account::logout(ctx, session_token).await,
        _ => Err(AppError::NotFound(format!("No page at {path}."))),
    }
}
