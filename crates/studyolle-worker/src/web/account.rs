use sea_orm::ConnectionTrait;

use entity::account::Model as Account;

use crate::error::{AppError, AppResult};
use crate::form::{FormFields, LoginForm, SignUpForm};
use crate::service::{account as accounts, session};
use crate::util::now_ts;
use crate::validator::validate_sign_up;

use super::{require_login, Ctx, Reply};

pub fn home(current: Option<Account>) -> Reply {
    Reply::view("index").with("account", current)
}

pub fn sign_up_form() -> Reply {
    Reply::view("account/sign-up").with("signUpForm", SignUpForm::default())
}

/// Create the account, mail the confirmation link and log the new user in.
pub async fn sign_up_submit<C: ConnectionTrait>(ctx: &Ctx<'_, C>, fields: &FormFields) -> AppResult<Reply> {
    let form = SignUpForm::from_fields(fields);
    let errors = validate_sign_up(ctx.db, &form).await?;
    if errors.has_errors() {
        return Ok(sign_up_form().with("signUpForm", &form).with_errors(&errors));
    }

    let account = accounts::process_new_account(ctx.db, ctx.config, ctx.mailer, &form).await?;
    let token = session::login(ctx.db, ctx.config, &account).await?;
    Ok(Reply::redirect("/").start_session(token))
}

pub async fn check_email_token<C: ConnectionTrait>(ctx: &Ctx<'_, C>, query: &FormFields) -> AppResult<Reply> {
    let view = Reply::view("account/checked-email");
    let token = query.text("token");
    let email = query.text("email");

    let Some(account) = accounts::find_by_email(ctx.db, &email).await? else {
        return Ok(view.with("error", "wrong.email"));
    };
    if !account.is_valid_token(&token) {
        tracing::warn!(email = %email, "email check token mismatch");
        return Ok(view.with("error", "wrong.token"));
    }

    let account = accounts::complete_sign_up(ctx.db, account).await?;
    let session_token = session::login(ctx.db, ctx.config, &account).await?;
    let number_of_user = accounts::count(ctx.db).await?;

    Ok(view
        .with("numberOfUser", number_of_user)
        .with("nickname", &account.nickname)
        .start_session(session_token))
}

pub fn check_email(current: Option<Account>) -> AppResult<Reply> {
    let account = require_login(current)?;
    Ok(Reply::view("account/check-email").with("email", &account.email))
}

/// Re-send the confirmation email, at most once an hour.
pub async fn resend_confirm_email<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    current: Option<Account>,
) -> AppResult<Reply> {
    let account = require_login(current)?;
    if !account.can_send_confirm_email(now_ts()) {
        return Ok(Reply::view("account/check-email")
            .with("error", "A confirmation email can only be sent once an hour.")
            .with("email", &account.email));
    }

    accounts::send_sign_up_confirm_email(ctx.db, ctx.config, ctx.mailer, account).await?;
    Ok(Reply::redirect("/"))
}

pub fn login_form() -> Reply {
    Reply::view("login")
}

pub async fn login_submit<C: ConnectionTrait>(ctx: &Ctx<'_, C>, fields: &FormFields) -> AppResult<Reply> {
    let form = LoginForm::from_fields(fields);
    let Some(account) = accounts::authenticate(ctx.db, &form.username, &form.password).await? else {
        return Ok(login_form()
            .with("username", &form.username)
            .with("error", "wrong.credentials"));
    };

    let token = session::login(ctx.db, ctx.config, &account).await?;
    Ok(Reply::redirect("/").start_session(token))
}

pub async fn logout<C: ConnectionTrait>(ctx: &Ctx<'_, C>, session_token: Option<&str>) -> AppResult<Reply> {
    if let Some(token) = session_token {
        session::logout(ctx.db, token).await?;
    }
    Ok(Reply::redirect("/").end_session())
}

pub async fn view_profile<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    current: Option<Account>,
    nickname: &str,
) -> AppResult<Reply> {
    let Some(owner) = accounts::find_by_nickname(ctx.db, nickname).await? else {
        return Err(AppError::NotFound(format!("There is no user named {nickname}.")));
    };

    let is_owner = current.as_ref().is_some_and(|a| a.id == owner.id);
    Ok(Reply::view("account/profile")
        .with("account", &owner)
        .with("isOwner", is_owner))
}
