use sea_orm::ConnectionTrait;

use entity::account::Model as Account;

use crate::error::{AppError, AppResult};
use crate::form::{FormFields, StudyForm};
use crate::service::study::{self as studies, StudyDetail};
use crate::util::encode_path;
use crate::validator::validate_study;

use super::{Ctx, Reply};

fn study_view(name: &'static str, account: Option<&Account>, detail: &StudyDetail) -> Reply {
    let account_id = account.map(|a| a.id.as_str()).unwrap_or_default();
    Reply::view(name)
        .with("account", account)
        .with("study", detail)
        .with("isManager", detail.is_manager(account_id))
        .with("isMember", detail.is_member(account_id))
        .with("isJoinable", account.is_some() && detail.is_joinable(account_id))
}

pub fn new_study_form(account: &Account) -> Reply {
    Reply::view("study/form")
        .with("account", account)
        .with("studyForm", StudyForm::default())
}

pub async fn new_study_submit<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: &Account,
    fields: &FormFields,
) -> AppResult<Reply> {
    let form = StudyForm::from_fields(fields);
    let errors = validate_study(ctx.db, &form).await?;
    if errors.has_errors() {
        return Ok(new_study_form(account)
            .with("studyForm", &form)
            .with_errors(&errors));
    }

    let study = studies::create_new_study(ctx.db, &form, account).await?;
    Ok(Reply::redirect(format!("/study/{}", encode_path(&study.path))))
}

pub async fn view_study<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: Option<&Account>,
    path: &str,
) -> AppResult<Reply> {
    let detail = studies::get_study_detail(ctx.db, path).await?;
    Ok(study_view("study/view", account, &detail))
}

pub async fn view_members<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: Option<&Account>,
    path: &str,
) -> AppResult<Reply> {
    let detail = studies::get_study_detail(ctx.db, path).await?;
    Ok(study_view("study/members", account, &detail))
}

fn members_location(path: &str) -> String {
    format!("/study/{}/members", encode_path(path))
}

pub async fn join<C: ConnectionTrait>(ctx: &Ctx<'_, C>, account: &Account, path: &str) -> AppResult<Reply> {
    let detail = studies::get_study_detail(ctx.db, path).await?;
    let location = members_location(&detail.study.path);
    match studies::add_member(ctx.db, &detail, account).await {
        Ok(()) => Ok(Reply::redirect(location)),
        Err(AppError::InvalidState(message)) => Ok(Reply::redirect(location).flash(message)),
        Err(err) => Err(err),
    }
}

pub async fn leave<C: ConnectionTrait>(ctx: &Ctx<'_, C>, account: &Account, path: &str) -> AppResult<Reply> {
    let detail = studies::get_study_detail(ctx.db, path).await?;
    let location = members_location(&detail.study.path);
    match studies::remove_member(ctx.db, &detail, account).await {
        Ok(()) => Ok(Reply::redirect(location)),
        Err(AppError::InvalidState(message)) => Ok(Reply::redirect(location).flash(message)),
        Err(err) => Err(err),
    }
}
