//! `/settings/*`: the signed-in account edits itself.

use sea_orm::ConnectionTrait;

use entity::account::Model as Account;

use crate::error::AppResult;
use crate::form::{
    FormFields, NicknameForm, Notifications, PasswordForm, Profile, TagForm, Validate, ZoneForm,
};
use crate::service::{account as accounts, tag as tags, zone as zones};
use crate::validator::{validate_nickname, validate_password, Errors};

use super::{Ctx, Reply};

pub const PROFILE_VIEW: &str = "settings/profile";
pub const PASSWORD_VIEW: &str = "settings/password";
pub const NOTIFICATIONS_VIEW: &str = "settings/notifications";
pub const ACCOUNT_VIEW: &str = "settings/account";
pub const TAGS_VIEW: &str = "settings/tags";
pub const ZONES_VIEW: &str = "settings/zones";

pub fn profile_form(account: &Account) -> Reply {
    Reply::view(PROFILE_VIEW)
        .with("account", account)
        .with("profile", Profile::of(account))
}

pub async fn update_profile<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: Account,
    fields: &FormFields,
) -> AppResult<Reply> {
    let profile = Profile::from_fields(fields);
    let mut errors = Errors::default();
    profile.validate(&mut errors);
    if errors.has_errors() {
        return Ok(Reply::view(PROFILE_VIEW)
            .with("account", &account)
            .with("profile", &profile)
            .with_errors(&errors));
    }

    accounts::update_profile(ctx.db, account, &profile).await?;
    Ok(Reply::redirect("/settings/profile").flash("Profile updated."))
}

pub fn password_form(account: &Account) -> Reply {
    Reply::view(PASSWORD_VIEW)
        .with("account", account)
        .with("passwordForm", PasswordForm::default())
}

pub async fn update_password<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: Account,
    fields: &FormFields,
) -> AppResult<Reply> {
    let form = PasswordForm::from_fields(fields);
    let errors = validate_password(&form);
    if errors.has_errors() {
        return Ok(password_form(&account).with_errors(&errors));
    }

    accounts::update_password(ctx.db, ctx.config, account, &form.new_password).await?;
    Ok(Reply::redirect("/settings/password").flash("Password updated."))
}

pub fn notifications_form(account: &Account) -> Reply {
    Reply::view(NOTIFICATIONS_VIEW)
        .with("account", account)
        .with("notifications", Notifications::of(account))
}

pub async fn update_notifications<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: Account,
    fields: &FormFields,
) -> AppResult<Reply> {
    let notifications = Notifications::from_fields(fields);
    accounts::update_notifications(ctx.db, account, &notifications).await?;
    Ok(Reply::redirect("/settings/notifications").flash("Notification settings updated."))
}

pub fn account_form(account: &Account) -> Reply {
    Reply::view(ACCOUNT_VIEW).with("account", account).with(
        "nicknameForm",
        NicknameForm {
            nickname: account.nickname.clone(),
        },
    )
}

/// The session is bound to the account id, so it survives the rename.
pub async fn update_nickname<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: Account,
    fields: &FormFields,
) -> AppResult<Reply> {
    let form = NicknameForm::from_fields(fields);
    let errors = validate_nickname(ctx.db, &account, &form).await?;
    if errors.has_errors() {
        return Ok(Reply::view(ACCOUNT_VIEW)
            .with("account", &account)
            .with("nicknameForm", &form)
            .with_errors(&errors));
    }

    let previous = account.nickname.clone();
    let updated = accounts::update_nickname(ctx.db, account, &form.nickname).await?;
    tracing::info!(from = %previous, to = %updated.nickname, "nickname changed");
    Ok(Reply::redirect("/settings/account").flash("Nickname updated."))
}

pub async fn tags_form<C: ConnectionTrait>(ctx: &Ctx<'_, C>, account: &Account) -> AppResult<Reply> {
    let titles: Vec<String> = accounts::get_tags(ctx.db, account)
        .await?
        .into_iter()
        .map(|t| t.title)
        .collect();
    let whitelist = tags::all_titles(ctx.db).await?;

    Ok(Reply::view(TAGS_VIEW)
        .with("account", account)
        .with("tags", titles)
        .with("whitelist", whitelist))
}

pub async fn add_tag<C: ConnectionTrait>(ctx: &Ctx<'_, C>, account: &Account, form: &TagForm) -> AppResult<Reply> {
    if form.tag_title.trim().is_empty() {
        return Ok(Reply::bad_request());
    }
    let tag = tags::find_or_create_new(ctx.db, &form.tag_title).await?;
    accounts::add_tag(ctx.db, account, &tag).await?;
    Ok(Reply::ok())
}

pub async fn remove_tag<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: &Account,
    form: &TagForm,
) -> AppResult<Reply> {
    let Some(tag) = tags::find_by_title(ctx.db, form.tag_title.trim()).await? else {
        return Ok(Reply::bad_request());
    };
    accounts::remove_tag(ctx.db, account, &tag).await?;
    Ok(Reply::ok())
}

pub async fn zones_form<C: ConnectionTrait>(ctx: &Ctx<'_, C>, account: &Account) -> AppResult<Reply> {
    let names: Vec<String> = accounts::get_zones(ctx.db, account)
        .await?
        .iter()
        .map(ToString::to_string)
        .collect();
    let whitelist = zones::all_names(ctx.db).await?;

    Ok(Reply::view(ZONES_VIEW)
        .with("account", account)
        .with("zones", names)
        .with("whitelist", whitelist))
}

pub async fn add_zone<C: ConnectionTrait>(ctx: &Ctx<'_, C>, account: &Account, form: &ZoneForm) -> AppResult<Reply> {
    let Some(zone) =
        zones::find_by_city_and_province(ctx.db, form.city_name(), form.province_name()).await?
    else {
        return Ok(Reply::bad_request());
    };
    accounts::add_zone(ctx.db, account, &zone).await?;
    Ok(Reply::ok())
}

pub async fn remove_zone<C: ConnectionTrait>(
    ctx: &Ctx<'_, C>,
    account: &Account,
    form: &ZoneForm,
) -> AppResult<Reply> {
    let Some(zone) =
        zones::find_by_city_and_province(ctx.db, form.city_name(), form.province_name()).await?
    else {
        return Ok(Reply::bad_request());
    };
    accounts::remove_zone(ctx.db, account, &zone).await?;
    Ok(Reply::ok())
}
