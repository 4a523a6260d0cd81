mod common;

use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;

use entity::study;
use studyolle_worker::error::AppError;
use studyolle_worker::form::{FormFields, TagForm};
use studyolle_worker::service::study as studies;
use studyolle_worker::util::now_ts;
use studyolle_worker::web::{study as pages, study_settings as manage, Ctx};

use common::{create_study, memory_db, sign_up, test_config, RecordingEmailSender};

async fn backdate_recruiting(db: &sea_orm::DatabaseConnection, path: &str) {
    let found = studies::get_study(db, path).await.expect("study");
    let mut active: study::ActiveModel = found.into();
    active.recruiting_updated_at = Set(Some(now_ts() - 3601));
    active.update(db).await.expect("backdate");
}

#[tokio::test]
async fn new_study_makes_the_creator_a_manager() {
    let db = memory_db().await;
    let config = test_config();
    let mailer = RecordingEmailSender::default();
    let ctx = Ctx::new(&db, &config, &mailer);
    let oomi = sign_up(&db, &mailer, "oomi").await;

    let fields: FormFields = [
        ("path", "스터디-1"),
        ("title", "Rust study"),
        ("shortDescription", "short"),
        ("fullDescription", "full"),
    ]
    .into_iter()
    .collect();
    let reply = pages::new_study_submit(&ctx, &oomi, &fields).await.expect("redirect");
    assert_eq!(
        reply.location(),
        Some("/study/%EC%8A%A4%ED%84%B0%EB%94%94-1")
    );

    let detail = studies::get_study_detail(&db, "스터디-1").await.expect("detail");
    assert!(detail.is_manager(&oomi.id));
    assert!(!detail.study.published);

    let again = pages::new_study_submit(&ctx, &oomi, &fields).await.expect("re-render");
    assert!(again.model("errors").and_then(|e| e.get("path")).is_some());
}

#[tokio::test]
async fn unknown_study_is_not_found_and_settings_are_manager_only() {
    let db = memory_db().await;
    let config = test_config();
    let mailer = RecordingEmailSender::default();
    let ctx = Ctx::new(&db, &config, &mailer);
    let manager = sign_up(&db, &mailer, "manager").await;
    let visitor = sign_up(&db, &mailer, "visitor").await;
    create_study(&db, &manager, "rust").await;

    let missing = pages::view_study(&ctx, None, "nope").await.expect_err("missing");
    assert!(matches!(missing, AppError::NotFound(_)));

    let denied = manage::description_form(&ctx, &visitor, "rust")
        .await
        .expect_err("not a manager");
    assert_eq!(denied.status(), 403);

    let allowed = manage::description_form(&ctx, &manager, "rust").await.expect("view");
    assert_eq!(allowed.view_name(), Some(manage::DESCRIPTION_VIEW));

    let public = pages::view_study(&ctx, Some(&visitor), "rust").await.expect("view");
    assert_eq!(public.model("isManager"), Some(&Value::from(false)));
}

#[tokio::test]
async fn publish_and_close_follow_the_lifecycle() {
    let db = memory_db().await;
    let config = test_config();
    let mailer = RecordingEmailSender::default();
    let ctx = Ctx::new(&db, &config, &mailer);
    let manager = sign_up(&db, &mailer, "manager").await;
    create_study(&db, &manager, "rust").await;

    let early_close = manage::close(&ctx, &manager, "rust").await.expect("flash");
    assert_eq!(early_close.location(), Some("/study/rust/settings/study"));
    assert!(early_close.flash.is_some());
    assert!(!studies::get_study(&db, "rust").await.expect("study").closed);

    manage::publish(&ctx, &manager, "rust").await.expect("publish");
    let published = studies::get_study(&db, "rust").await.expect("study");
    assert!(published.published);
    assert!(published.published_at.is_some());

    let twice = studies::publish(&db, published).await.expect_err("already published");
    assert!(matches!(twice, AppError::InvalidState(_)));

    manage::start_recruit(&ctx, &manager, "rust").await.expect("recruit");
    manage::close(&ctx, &manager, "rust").await.expect("close");
    let closed = studies::get_study(&db, "rust").await.expect("study");
    assert!(closed.closed);
    assert!(closed.closed_at.is_some());
    assert!(!closed.recruiting);

    let after_close = studies::publish(&db, closed).await.expect_err("closed");
    assert!(matches!(after_close, AppError::InvalidState(_)));
}

#[tokio::test]
async fn recruiting_cannot_toggle_twice_within_an_hour() {
    let db = memory_db().await;
    let config = test_config();
    let mailer = RecordingEmailSender::default();
    let ctx = Ctx::new(&db, &config, &mailer);
    let manager = sign_up(&db, &mailer, "manager").await;
    create_study(&db, &manager, "rust").await;

    let unpublished = studies::start_recruit(&db, studies::get_study(&db, "rust").await.expect("study"))
        .await
        .expect_err("not published");
    assert!(matches!(unpublished, AppError::InvalidState(_)));

    manage::publish(&ctx, &manager, "rust").await.expect("publish");
    let started = manage::start_recruit(&ctx, &manager, "rust").await.expect("start");
    assert_eq!(started.flash.as_deref(), Some("Recruiting has started."));
    assert!(studies::get_study(&db, "rust").await.expect("study").recruiting);

    let refused = manage::stop_recruit(&ctx, &manager, "rust").await.expect("flash");
    assert_ne!(refused.flash.as_deref(), Some("Recruiting has stopped."));
    assert!(studies::get_study(&db, "rust").await.expect("study").recruiting);

    backdate_recruiting(&db, "rust").await;
    let stopped = manage::stop_recruit(&ctx, &manager, "rust").await.expect("stop");
    assert_eq!(stopped.flash.as_deref(), Some("Recruiting has stopped."));
    assert!(!studies::get_study(&db, "rust").await.expect("study").recruiting);
}

#[tokio::test]
async fn members_join_only_while_joinable_and_leave_only_when_members() {
    let db = memory_db().await;
    let config = test_config();
    let mailer = RecordingEmailSender::default();
    let ctx = Ctx::new(&db, &config, &mailer);
    let manager = sign_up(&db, &mailer, "manager").await;
    let member = sign_up(&db, &mailer, "member").await;
    create_study(&db, &manager, "rust").await;

    let closed_door = pages::join(&ctx, &member, "rust").await.expect("redirect");
    assert!(closed_door.flash.is_some());
    let detail = studies::get_study_detail(&db, "rust").await.expect("detail");
    assert!(!detail.is_member(&member.id));

    manage::publish(&ctx, &manager, "rust").await.expect("publish");
    manage::start_recruit(&ctx, &manager, "rust").await.expect("recruit");

    let view = pages::view_study(&ctx, Some(&member), "rust").await.expect("view");
    assert_eq!(view.model("isJoinable"), Some(&Value::from(true)));
    let anonymous = pages::view_study(&ctx, None, "rust").await.expect("view");
    assert_eq!(anonymous.model("isJoinable"), Some(&Value::from(false)));

    let joined = pages::join(&ctx, &member, "rust").await.expect("redirect");
    assert_eq!(joined.location(), Some("/study/rust/members"));
    assert!(joined.flash.is_none());

    let detail = studies::get_study_detail(&db, "rust").await.expect("detail");
    assert!(detail.is_member(&member.id));
    assert!(!detail.is_joinable(&member.id));
    assert!(!detail.is_joinable(&manager.id));

    let manager_join = pages::join(&ctx, &manager, "rust").await.expect("redirect");
    assert!(manager_join.flash.is_some());

    pages::leave(&ctx, &member, "rust").await.expect("leave");
    let detail = studies::get_study_detail(&db, "rust").await.expect("detail");
    assert!(!detail.is_member(&member.id));

    let not_member = pages::leave(&ctx, &member, "rust").await.expect("redirect");
    assert!(not_member.flash.is_some());
}

#[tokio::test]
async fn path_and_title_updates_are_validated() {
    let db = memory_db().await;
    let config = test_config();
    let mailer = RecordingEmailSender::default();
    let ctx = Ctx::new(&db, &config, &mailer);
    let manager = sign_up(&db, &mailer, "manager").await;
    create_study(&db, &manager, "rust").await;
    create_study(&db, &manager, "taken").await;

    for bad in ["taken", "Upper", "a"] {
        let fields: FormFields = [("newPath", bad)].into_iter().collect();
        let reply = manage::update_path(&ctx, &manager, "rust", &fields).await.expect("view");
        assert!(reply.model("studyPathError").is_some(), "{bad} should be rejected");
    }

    let fields: FormFields = [("newPath", "rust-2")].into_iter().collect();
    let reply = manage::update_path(&ctx, &manager, "rust", &fields).await.expect("redirect");
    assert_eq!(reply.location(), Some("/study/rust-2/settings/study"));
    assert!(studies::get_study(&db, "rust").await.is_err());

    let long_title = "t".repeat(51);
    let fields: FormFields = [("newTitle", long_title.as_str())].into_iter().collect();
    let reply = manage::update_title(&ctx, &manager, "rust-2", &fields).await.expect("view");
    assert!(reply.model("studyTitleError").is_some());

    let fields: FormFields = [("newTitle", "Rust in Action")].into_iter().collect();
    manage::update_title(&ctx, &manager, "rust-2", &fields).await.expect("redirect");
    assert_eq!(
        studies::get_study(&db, "rust-2").await.expect("study").title,
        "Rust in Action"
    );
}

#[tokio::test]
async fn titles_are_stored_trimmed() {
    let db = memory_db().await;
    let config = test_config();
    let mailer = RecordingEmailSender::default();
    let ctx = Ctx::new(&db, &config, &mailer);
    let manager = sign_up(&db, &mailer, "manager").await;

    let fields: FormFields = [
        ("path", "padded"),
        ("title", "  Rust study  "),
        ("shortDescription", "short"),
        ("fullDescription", "full"),
    ]
    .into_iter()
    .collect();
    pages::new_study_submit(&ctx, &manager, &fields).await.expect("redirect");
    assert_eq!(
        studies::get_study(&db, "padded").await.expect("study").title,
        "Rust study"
    );

    let fields: FormFields = [("newTitle", "\tRust in Action \n")].into_iter().collect();
    manage::update_title(&ctx, &manager, "padded", &fields).await.expect("redirect");
    assert_eq!(
        studies::get_study(&db, "padded").await.expect("study").title,
        "Rust in Action"
    );
}

#[tokio::test]
async fn banner_and_description_settings_persist() {
    let db = memory_db().await;
    let config = test_config();
    let mailer = RecordingEmailSender::default();
    let ctx = Ctx::new(&db, &config, &mailer);
    let manager = sign_up(&db, &mailer, "manager").await;
    create_study(&db, &manager, "rust").await;

    let blank: FormFields = [("shortDescription", ""), ("fullDescription", "full")]
        .into_iter()
        .collect();
    let reply = manage::update_description(&ctx, &manager, "rust", &blank).await.expect("view");
    assert!(reply.has_errors());

    let fields: FormFields = [("shortDescription", "new short"), ("fullDescription", "new full")]
        .into_iter()
        .collect();
    manage::update_description(&ctx, &manager, "rust", &fields).await.expect("redirect");

    let image: FormFields = [("image", "data:image/png;base64,AAAA")].into_iter().collect();
    manage::update_banner(&ctx, &manager, "rust", &image).await.expect("redirect");
    manage::enable_banner(&ctx, &manager, "rust").await.expect("redirect");

    let saved = studies::get_study(&db, "rust").await.expect("study");
    assert_eq!(saved.short_description, "new short");
    assert_eq!(saved.image.as_deref(), Some("data:image/png;base64,AAAA"));
    assert!(saved.use_banner);

    manage::disable_banner(&ctx, &manager, "rust").await.expect("redirect");
    assert!(!studies::get_study(&db, "rust").await.expect("study").use_banner);
}

#[tokio::test]
async fn study_tags_use_the_study_not_the_account() {
    let db = memory_db().await;
    let config = test_config();
    let mailer = RecordingEmailSender::default();
    let ctx = Ctx::new(&db, &config, &mailer);
    let manager = sign_up(&db, &mailer, "manager").await;
    create_study(&db, &manager, "rust").await;
    let tag = |title: &str| TagForm {
        tag_title: title.to_string(),
    };

    manage::add_tag(&ctx, &manager, "rust", &tag("Rust")).await.expect("add");
    let view = manage::tags_form(&ctx, &manager, "rust").await.expect("view");
    assert_eq!(view.model("tags"), Some(&serde_json::json!(["Rust"])));

    let removed = manage::remove_tag(&ctx, &manager, "rust", &tag("Go")).await.expect("json");
    assert_eq!(removed.status, 400);
    manage::remove_tag(&ctx, &manager, "rust", &tag("Rust")).await.expect("json");
    assert!(studies::get_study_detail(&db, "rust").await.expect("detail").tags.is_empty());
}

#[tokio::test]
async fn only_unpublished_studies_can_be_removed() {
    let db = memory_db().await;
    let config = test_config();
    let mailer = RecordingEmailSender::default();
    let ctx = Ctx::new(&db, &config, &mailer);
    let manager = sign_up(&db, &mailer, "manager").await;
    create_study(&db, &manager, "draft").await;
    create_study(&db, &manager, "live").await;
    manage::publish(&ctx, &manager, "live").await.expect("publish");

    let refused = manage::remove(&ctx, &manager, "live").await.expect("flash");
    assert!(refused.flash.is_some());
    assert!(studies::get_study(&db, "live").await.is_ok());

    let removed = manage::remove(&ctx, &manager, "draft").await.expect("redirect");
    assert_eq!(removed.location(), Some("/"));
    assert!(matches!(
        studies::get_study(&db, "draft").await,
        Err(AppError::NotFound(_))
    ));
}
