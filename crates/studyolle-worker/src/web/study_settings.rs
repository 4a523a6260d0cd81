//! `/study/{path}/settings/*`: manager-only study administration.

use sea_orm::ConnectionTrait;

use entity::account::Model as Account;

use crate::error::{AppError, AppResult};
use crate::form::{FormFields, StudyDescriptionForm, TagForm, Validate, ZoneForm};
use crate::service::study::{self as studies, StudyDetail};
use crate::service::{tag as tags, zone as zones};
use crate::util::encode_path;
use crate::validator::Errors;

use super::{Ctx, Reply};

pub const DESCRIPTION_VIEW: &str = "study/settings/description";
pub const BANNER_VIEW: &str = "study/settings/banner";
pub const TAGS_VIEW: &str = "study/settings/tags";
pub const ZONES_VIEW: &str = "study/settings/zones";
pub const STUDY_VIEW: &str = "study/settings/study";

fn settings_location(path: &str, page: &str) -> String {
    format!("/study/{}/settings/{page}", encode_path(path))
}

fn settings_view(name: &'static str, account: &Account, detail: &StudyDetail) -> Reply {
    Reply::view(name).with("account", account).with("study", detail)
}

/// Turn a refused lifecycle transition into a flash on the settings page.
fn flash_refusal(result: AppResult<Reply>, location: String) -> AppResult<Reply> {
    match result {
        Err(AppError::InvalidState(message)) => Ok(Reply::redirect(location).flash(message)),
        other => other,
    }
}

pub async fn description_form<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: &Account,
    path: &str,
) -> AppResult<Reply> {
    let detail = studies::get_study_to_update(ctx.db, account, path).await?;
    let form = StudyDescriptionForm::of(&detail.study);
    Ok(settings_view(DESCRIPTION_VIEW, account, &detail).with("studyDescriptionForm", form))
}

pub async fn update_description<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: &Account,
    path: &str,
    fields: &FormFields,
) -> AppResult<Reply> {
    let detail = studies::get_study_to_update(ctx.db, account, path).await?;
    let form = StudyDescriptionForm::from_fields(fields);
    let mut errors = Errors::default();
    form.validate(&mut errors);
    if errors.has_errors() {
        return Ok(settings_view(DESCRIPTION_VIEW, account, &detail)
            .with("studyDescriptionForm", &form)
            .with_errors(&errors));
    }

    let study = studies::update_study_description(ctx.db, detail.study, &form).await?;
    Ok(Reply::redirect(settings_location(&study.path, "description"))
        .flash("Study description updated."))
}

pub async fn banner_form<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: &Account,
    path: &str,
) -> AppResult<Reply> {
    let detail = studies::get_study_to_update(ctx.db, account, path).await?;
    Ok(settings_view(BANNER_VIEW, account, &detail))
}

pub async fn update_banner<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: &Account,
    path: &str,
    fields: &FormFields,
) -> AppResult<Reply> {
    let detail = studies::get_study_to_update(ctx.db, account, path).await?;
    let study = studies::update_study_image(ctx.db, detail.study, fields.optional("image")).await?;
    Ok(Reply::redirect(settings_location(&study.path, "banner")).flash("Study image updated."))
}

pub async fn enable_banner<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: &Account,
    path: &str,
) -> AppResult<Reply> {
    let detail = studies::get_study_to_update(ctx.db, account, path).await?;
    let study = studies::enable_banner(ctx.db, detail.study).await?;
    Ok(Reply::redirect(settings_location(&study.path, "banner")))
}

pub async fn disable_banner<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: &Account,
    path: &str,
) -> AppResult<Reply> {
    let detail = studies::get_study_to_update(ctx.db, account, path).await?;
    let study = studies::disable_banner(ctx.db, detail.study).await?;
    Ok(Reply::redirect(settings_location(&study.path, "banner")))
}

pub async fn tags_form<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: &Account,
    path: &str,
) -> AppResult<Reply> {
    let detail = studies::get_study_to_update(ctx.db, account, path).await?;
    let whitelist = tags::all_titles(ctx.db).await?;
    Ok(settings_view(TAGS_VIEW, account, &detail)
        .with("tags", detail.tag_titles())
        .with("whitelist", whitelist))
}

pub async fn add_tag<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: &Account,
    path: &str,
    form: &TagForm,
) -> AppResult<Reply> {
    let detail = studies::get_study_to_update(ctx.db, account, path).await?;
    if form.tag_title.trim().is_empty() {
        return Ok(Reply::bad_request());
    }
    let tag = tags::find_or_create_new(ctx.db, &form.tag_title).await?;
    studies::add_tag(ctx.db, &detail.study, &tag).await?;
    Ok(Reply::ok())
}

pub async fn remove_tag<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: &Account,
    path: &str,
    form: &TagForm,
) -> AppResult<Reply> {
    let detail = studies::get_study_to_update(ctx.db, account, path).await?;
    let Some(tag) = tags::find_by_title(ctx.db, form.tag_title.trim()).await? else {
        return Ok(Reply::bad_request());
    };
    studies::remove_tag(ctx.db, &detail.study, &tag).await?;
    Ok(Reply::ok())
}

pub async fn zones_form<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: &Account,
    path: &str,
) -> AppResult<Reply> {
    let detail = studies::get_study_to_update(ctx.db, account, path).await?;
    let whitelist = zones::all_names(ctx.db).await?;
    Ok(settings_view(ZONES_VIEW, account, &detail)
        .with("zones", detail.zone_names())
        .with("whitelist", whitelist))
}

pub async fn add_zone<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: &Account,
    path: &str,
    form: &ZoneForm,
) -> AppResult<Reply> {
    let detail = studies::get_study_to_update(ctx.db, account, path).await?;
    let Some(zone) =
        zones::find_by_city_and_province(ctx.db, form.city_name(), form.province_name()).await?
    else {
        return Ok(Reply::bad_request());
    };
    studies::add_zone(ctx.db, &detail.study, &zone).await?;
    Ok(Reply::ok())
}

pub async fn remove_zone<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: &Account,
    path: &str,
    form: &ZoneForm,
) -> AppResult<Reply> {
    let detail = studies::get_study_to_update(ctx.db, account, path).await?;
    let Some(zone) =
        zones::find_by_city_and_province(ctx.db, form.city_name(), form.province_name()).await?
    else {
        return Ok(Reply::bad_request());
    };
    studies::remove_zone(ctx.db, &detail.study, &zone).await?;
    Ok(Reply::ok())
}

pub async fn study_form<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: &Account,
    path: &str,
) -> AppResult<Reply> {
    let detail = studies::get_study_to_update(ctx.db, account, path).await?;
    Ok(settings_view(STUDY_VIEW, account, &detail))
}

pub async fn publish<C: ConnectionTrait>(ctx: &Ctx<'_, C>, account: &Account, path: &str) -> AppResult<Reply> {
    let detail = studies::get_study_to_update(ctx.db, account, path).await?;
    let location = settings_location(&detail.study.path, "study");
    let result = studies::publish(ctx.db, detail.study)
        .await
        .map(|_| Reply::redirect(location.clone()).flash("The study has been published."));
    flash_refusal(result, location)
}

pub async fn close<C: ConnectionTrait>(ctx: &Ctx<'_, C>, account: &Account, path: &str) -> AppResult<Reply> {
    let detail = studies::get_study_to_update(ctx.db, account, path).await?;
    let location = settings_location(&detail.study.path, "study");
    let result = studies::close(ctx.db, detail.study)
        .await
        .map(|_| Reply::redirect(location.clone()).flash("The study has been closed."));
    flash_refusal(result, location)
}

pub async fn start_recruit<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: &Account,
    path: &str,
) -> AppResult<Reply> {
    let detail = studies::get_study_to_update(ctx.db, account, path).await?;
    let location = settings_location(&detail.study.path, "study");
    let result = studies::start_recruit(ctx.db, detail.study)
        .await
        .map(|_| Reply::redirect(location.clone()).flash("Recruiting has started."));
    flash_refusal(result, location)
}

pub async fn stop_recruit<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: &Account,
    path: &str,
) -> AppResult<Reply> {
    let detail = studies::get_study_to_update(ctx.db, account, path).await?;
    let location = settings_location(&detail.study.path, "study");
    let result = studies::stop_recruit(ctx.db, detail.study)
        .await
        .map(|_| Reply::redirect(location.clone()).flash("Recruiting has stopped."));
    flash_refusal(result, location)
}

pub async fn update_path<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: &Account,
    path: &str,
    fields: &FormFields,
) -> AppResult<Reply> {
    let detail = studies::get_study_to_update(ctx.db, account, path).await?;
    let new_path = fields.text("newPath");
    if !studies::is_valid_path(ctx.db, &new_path).await? {
        return Ok(settings_view(STUDY_VIEW, account, &detail)
            .with("studyPathError", "This study path cannot be used. Please enter another value."));
    }

    let study = studies::update_path(ctx.db, detail.study, &new_path).await?;
    Ok(Reply::redirect(settings_location(&study.path, "study")).flash("Study path updated."))
}

pub async fn update_title<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: &Account,
    path: &str,
    fields: &FormFields,
) -> AppResult<Reply> {
    let detail = studies::get_study_to_update(ctx.db, account, path).await?;
    let new_title = fields.text("newTitle");
    if !studies::is_valid_title(&new_title) {
        return Ok(settings_view(STUDY_VIEW, account, &detail)
            .with("studyTitleError", "Please enter a study title again."));
    }

    let study = studies::update_title(ctx.db, detail.study, &new_title).await?;
    Ok(Reply::redirect(settings_location(&study.path, "study")).flash("Study title updated."))
}

pub async fn remove<C: ConnectionTrait>(ctx: &Ctx<'_, C>, account: &Account, path: &str) -> AppResult<Reply> {
    let detail = studies::get_study_to_update(ctx.db, account, path).await?;
    let location = settings_location(&detail.study.path, "study");
    let result = studies::remove(ctx.db, detail.study)
        .await
        .map(|()| Reply::redirect("/"));
    flash_refusal(result, location)
}
