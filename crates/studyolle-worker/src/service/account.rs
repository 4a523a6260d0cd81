use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, Set,
};

use entity::{account, account_tag, account_zone, tag, zone};

use crate::config::AppConfig;
use crate::crypto::{encode_password, verify_password_hash};
use crate::error::AppResult;
use crate::form::{Notifications, Profile, SignUpForm};
use crate::mail::{EmailMessage, EmailSender};
use crate::service::link;
use crate::util::{generate_email_check_token, now_ts, uuid_v4};

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> AppResult<Option<account::Model>> {
    Ok(account::Entity::find()
        .filter(account::Column::Email.eq(email))
        .one(db)
        .await?)
}

pub async fn find_by_nickname<C: ConnectionTrait>(
    db: &C,
    nickname: &str,
) -> AppResult<Option<account::Model>> {
    Ok(account::Entity::find()
        .filter(account::Column::Nickname.eq(nickname))
        .one(db)
        .await?)
}

pub async fn count<C: ConnectionTrait>(db: &C) -> AppResult<u64> {
    Ok(account::Entity::find().count(db).await?)
}

/// Create an unverified account and mail its confirmation link.
pub async fn process_new_account<C: ConnectionTrait>(
    db: &C,
    config: &AppConfig,
    mailer: &dyn EmailSender,
    form: &SignUpForm,
) -> AppResult<account::Model> {
    let now = now_ts();
    let password = encode_password(&form.password, config.password_iterations);

    let created = account::ActiveModel {
        id: Set(uuid_v4()),
        email: Set(form.email.clone()),
        nickname: Set(form.nickname.clone()),
        password_hash: Set(password.hash),
        salt: Set(password.salt),
        password_iterations: Set(password.iterations),
        email_verified: Set(false),
        email_check_token: Set(None),
        email_check_token_generated_at: Set(None),
        joined_at: Set(None),
        bio: Set(None),
        url: Set(None),
        occupation: Set(None),
        location: Set(None),
        profile_image: Set(None),
        study_created_by_email: Set(false),
        study_created_by_web: Set(true),
        study_enrollment_result_by_email: Set(false),
        study_enrollment_result_by_web: Set(true),
        study_updated_by_email: Set(false),
        study_updated_by_web: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    tracing::info!(nickname = %created.nickname, "account created");
    send_sign_up_confirm_email(db, config, mailer, created).await
}

/// Issue a new email check token and mail it. Any earlier token stops working.
pub async fn send_sign_up_confirm_email<C: ConnectionTrait>(
    db: &C,
    config: &AppConfig,
    mailer: &dyn EmailSender,
    account: account::Model,
) -> AppResult<account::Model> {
    let now = now_ts();
    let token = generate_email_check_token();

    let mut active: account::ActiveModel = account.into();
    active.email_check_token = Set(Some(token.clone()));
    active.email_check_token_generated_at = Set(Some(now));
    active.updated_at = Set(now);
    let updated = active.update(db).await?;

    let link = format!(
        "{}/check-email-token?{}",
        config.app_host,
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("token", &token)
            .append_pair("email", &updated.email)
            .finish()
    );
    let message = EmailMessage {
        to: updated.email.clone(),
        subject: "Studyolle: complete your sign-up".to_string(),
        message: format!(
            "<p>Hello {},</p><p>Follow the link below to verify your email address.</p>\
             <p><a href=\"{link}\">{link}</a></p>",
            updated.nickname
        ),
    };

    if let Err(e) = mailer.send_email(&message).await {
        tracing::warn!(email = %updated.email, error = %e, "confirmation email failed");
        return Err(e);
    }

    Ok(updated)
}

/// Mark the email as verified and stamp the join time.
pub async fn complete_sign_up<C: ConnectionTrait>(
    db: &C,
    account: account::Model,
) -> AppResult<account::Model> {
    let now = now_ts();
    let mut active: account::ActiveModel = account.into();
    active.email_verified = Set(true);
    active.joined_at = Set(Some(now));
    active.updated_at = Set(now);
    let verified = active.update(db).await?;

    tracing::info!(nickname = %verified.nickname, "email verified");
    Ok(verified)
}

/// Form login by email or nickname.
pub async fn authenticate<C: ConnectionTrait>(
    db: &C,
    username: &str,
    password: &str,
) -> AppResult<Option<account::Model>> {
    let username = username.trim();
    let found = match find_by_email(db, username).await? {
        Some(a) => Some(a),
        None => find_by_nickname(db, username).await?,
    };

    Ok(found.filter(|a| {
        let iterations = u32::try_from(a.password_iterations).unwrap_or(1);
        verify_password_hash(password.as_bytes(), &a.salt, &a.password_hash, iterations)
    }))
}

pub async fn update_profile<C: ConnectionTrait>(
    db: &C,
    account: account::Model,
    profile: &Profile,
) -> AppResult<account::Model> {
    let mut active: account::ActiveModel = account.into();
    active.bio = Set(profile.bio.clone());
    active.url = Set(profile.url.clone());
    active.occupation = Set(profile.occupation.clone());
    active.location = Set(profile.location.clone());
    active.profile_image = Set(profile.profile_image.clone());
    active.updated_at = Set(now_ts());
    Ok(active.update(db).await?)
}

pub async fn update_password<C: ConnectionTrait>(
    db: &C,
    config: &AppConfig,
    account: account::Model,
    new_password: &str,
) -> AppResult<account::Model> {
    let password = encode_password(new_password, config.password_iterations);
    let mut active: account::ActiveModel = account.into();
    active.password_hash = Set(password.hash);
    active.salt = Set(password.salt);
    active.password_iterations = Set(password.iterations);
    active.updated_at = Set(now_ts());
    Ok(active.update(db).await?)
}

pub async fn update_notifications<C: ConnectionTrait>(
    db: &C,
    account: account::Model,
    notifications: &Notifications,
) -> AppResult<account::Model> {
    let mut active: account::ActiveModel = account.into();
    active.study_created_by_email = Set(notifications.study_created_by_email);
    active.study_created_by_web = Set(notifications.study_created_by_web);
    active.study_enrollment_result_by_email = Set(notifications.study_enrollment_result_by_email);
    active.study_enrollment_result_by_web = Set(notifications.study_enrollment_result_by_web);
    active.study_updated_by_email = Set(notifications.study_updated_by_email);
    active.study_updated_by_web = Set(notifications.study_updated_by_web);
    active.updated_at = Set(now_ts());
    Ok(active.update(db).await?)
}

pub async fn update_nickname<C: ConnectionTrait>(
    db: &C,
    account: account::Model,
    nickname: &str,
) -> AppResult<account::Model> {
    let mut active: account::ActiveModel = account.into();
    active.nickname = Set(nickname.to_string());
    active.updated_at = Set(now_ts());
    Ok(active.update(db).await?)
}

pub async fn get_tags<C: ConnectionTrait>(db: &C, account: &account::Model) -> AppResult<Vec<tag::Model>> {
    Ok(account.find_related(tag::Entity).all(db).await?)
}

pub async fn add_tag<C: ConnectionTrait>(db: &C, account: &account::Model, tag: &tag::Model) -> AppResult<()> {
    link(
        db,
        account_tag::ActiveModel {
            account_id: Set(account.id.clone()),
            tag_id: Set(tag.id.clone()),
        },
    )
    .await
}

pub async fn remove_tag<C: ConnectionTrait>(db: &C, account: &account::Model, tag: &tag::Model) -> AppResult<()> {
    account_tag::Entity::delete_many()
        .filter(account_tag::Column::AccountId.eq(account.id.as_str()))
        .filter(account_tag::Column::TagId.eq(tag.id.as_str()))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn get_zones<C: ConnectionTrait>(db: &C, account: &account::Model) -> AppResult<Vec<zone::Model>> {
    Ok(account.find_related(zone::Entity).all(db).await?)
}

pub async fn add_zone<C: ConnectionTrait>(db: &C, account: &account::Model, zone: &zone::Model) -> AppResult<()> {
    link(
        db,
        account_zone::ActiveModel {
            account_id: Set(account.id.clone()),
            zone_id: Set(zone.id.clone()),
        },
    )
    .await
}

pub async fn remove_zone<C: ConnectionTrait>(
    db: &C,
    account: &account::Model,
    zone: &zone::Model,
) -> AppResult<()> {
    account_zone::Entity::delete_many()
        .filter(account_zone::Column::AccountId.eq(account.id.as_str()))
        .filter(account_zone::Column::ZoneId.eq(zone.id.as_str()))
        .exec(db)
        .await?;
    Ok(())
}
