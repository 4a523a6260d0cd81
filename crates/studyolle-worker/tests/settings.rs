mod common;

use serde_json::Value;

use studyolle_worker::form::{FormFields, TagForm, ZoneForm};
use studyolle_worker::service::{account as accounts, session, zone};
use studyolle_worker::web::{settings, Ctx};

use common::{memory_db, reload, sign_up, test_config, RecordingEmailSender, PASSWORD};

#[tokio::test]
async fn password_change_requires_matching_confirmation() {
    let db = memory_db().await;
    let config = test_config();
    let mailer = RecordingEmailSender::default();
    let ctx = Ctx::new(&db, &config, &mailer);
    let oomi = sign_up(&db, &mailer, "oomi").await;

    let mismatch: FormFields = [("newPassword", "new-password"), ("newPasswordConfirm", "new-passw0rd")]
        .into_iter()
        .collect();
    let reply = settings::update_password(&ctx, oomi.clone(), &mismatch)
        .await
        .expect("re-render");
    assert_eq!(reply.view_name(), Some(settings::PASSWORD_VIEW));
    assert!(reply.has_errors());
    assert!(accounts::authenticate(&db, "oomi", PASSWORD).await.expect("auth").is_some());

    let matching: FormFields = [("newPassword", "new-password"), ("newPasswordConfirm", "new-password")]
        .into_iter()
        .collect();
    let reply = settings::update_password(&ctx, oomi, &matching).await.expect("redirect");
    assert_eq!(reply.location(), Some("/settings/password"));
    assert!(reply.flash.is_some());

    assert!(accounts::authenticate(&db, "oomi", PASSWORD).await.expect("auth").is_none());
    assert!(accounts::authenticate(&db, "oomi", "new-password").await.expect("auth").is_some());
}

#[tokio::test]
async fn profile_limits_field_lengths() {
    let db = memory_db().await;
    let config = test_config();
    let mailer = RecordingEmailSender::default();
    let ctx = Ctx::new(&db, &config, &mailer);
    let oomi = sign_up(&db, &mailer, "oomi").await;

    let long_bio = "a".repeat(31);
    let fields: FormFields = [("bio", long_bio.as_str())].into_iter().collect();
    let reply = settings::update_profile(&ctx, oomi.clone(), &fields).await.expect("view");
    assert!(reply.has_errors());
    assert!(reload(&db, &oomi).await.bio.is_none());

    let fields: FormFields = [("bio", "hello"), ("occupation", "developer")].into_iter().collect();
    let reply = settings::update_profile(&ctx, oomi.clone(), &fields).await.expect("redirect");
    assert_eq!(reply.location(), Some("/settings/profile"));

    let oomi = reload(&db, &oomi).await;
    assert_eq!(oomi.bio.as_deref(), Some("hello"));
    assert_eq!(oomi.occupation.as_deref(), Some("developer"));

    let form = settings::profile_form(&oomi);
    assert_eq!(
        form.model("profile").and_then(|p| p.get("bio")),
        Some(&Value::from("hello"))
    );
}

#[tokio::test]
async fn notifications_bind_checkboxes() {
    let db = memory_db().await;
    let config = test_config();
    let mailer = RecordingEmailSender::default();
    let ctx = Ctx::new(&db, &config, &mailer);
    let oomi = sign_up(&db, &mailer, "oomi").await;
    assert!(oomi.study_created_by_web);

    let fields: FormFields = [("studyCreatedByEmail", "on")].into_iter().collect();
    settings::update_notifications(&ctx, oomi.clone(), &fields)
        .await
        .expect("redirect");

    let oomi = reload(&db, &oomi).await;
    assert!(oomi.study_created_by_email);
    assert!(!oomi.study_created_by_web);
}

#[tokio::test]
async fn nickname_change_checks_format_and_uniqueness_and_keeps_the_session() {
    let db = memory_db().await;
    let config = test_config();
    let mailer = RecordingEmailSender::default();
    let ctx = Ctx::new(&db, &config, &mailer);
    let oomi = sign_up(&db, &mailer, "oomi").await;
    sign_up(&db, &mailer, "taken").await;
    let token = session::login(&db, &config, &oomi).await.expect("login");

    for bad in ["taken", "No Spaces", "x"] {
        let fields: FormFields = [("nickname", bad)].into_iter().collect();
        let reply = settings::update_nickname(&ctx, oomi.clone(), &fields).await.expect("view");
        assert!(reply.has_errors(), "{bad} should be rejected");
    }

    let unchanged: FormFields = [("nickname", "oomi")].into_iter().collect();
    let reply = settings::update_nickname(&ctx, oomi.clone(), &unchanged).await.expect("redirect");
    assert!(!reply.has_errors());

    let fields: FormFields = [("nickname", "스터디올레")].into_iter().collect();
    let reply = settings::update_nickname(&ctx, oomi.clone(), &fields).await.expect("redirect");
    assert_eq!(reply.location(), Some("/settings/account"));

    let current = session::current_account(&db, &token)
        .await
        .expect("lookup")
        .expect("still logged in");
    assert_eq!(current.nickname, "스터디올레");
}

#[tokio::test]
async fn account_tags_are_found_or_created() {
    let db = memory_db().await;
    let config = test_config();
    let mailer = RecordingEmailSender::default();
    let ctx = Ctx::new(&db, &config, &mailer);
    let oomi = sign_up(&db, &mailer, "oomi").await;
    let tag = |title: &str| TagForm {
        tag_title: title.to_string(),
    };

    assert_eq!(settings::add_tag(&ctx, &oomi, &tag("Spring")).await.expect("add").status, 200);
    assert_eq!(settings::add_tag(&ctx, &oomi, &tag("Spring")).await.expect("add").status, 200);
    assert_eq!(settings::add_tag(&ctx, &oomi, &tag("JPA")).await.expect("add").status, 200);

    let titles: Vec<String> = accounts::get_tags(&db, &oomi)
        .await
        .expect("tags")
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles.len(), 2);
    assert!(titles.contains(&"Spring".to_string()));

    let view = settings::tags_form(&ctx, &oomi).await.expect("view");
    assert_eq!(view.model("whitelist").and_then(Value::as_array).map(Vec::len), Some(2));

    assert_eq!(settings::remove_tag(&ctx, &oomi, &tag("Unknown")).await.expect("remove").status, 400);
    assert_eq!(settings::remove_tag(&ctx, &oomi, &tag("JPA")).await.expect("remove").status, 200);
    assert_eq!(accounts::get_tags(&db, &oomi).await.expect("tags").len(), 1);
}

#[tokio::test]
async fn account_zones_resolve_display_names() {
    let db = memory_db().await;
    let config = test_config();
    let mailer = RecordingEmailSender::default();
    let ctx = Ctx::new(&db, &config, &mailer);
    let oomi = sign_up(&db, &mailer, "oomi").await;
    zone::init_zone_data(&db).await.expect("seed");

    let andong = ZoneForm {
        zone_name: "Andong(안동시)/North Gyeongsang".to_string(),
    };
    let nowhere = ZoneForm {
        zone_name: "Atlantis(아틀란티스)/Ocean".to_string(),
    };

    assert_eq!(settings::add_zone(&ctx, &oomi, &andong).await.expect("add").status, 200);
    assert_eq!(settings::add_zone(&ctx, &oomi, &nowhere).await.expect("add").status, 400);

    let view = settings::zones_form(&ctx, &oomi).await.expect("view");
    assert_eq!(
        view.model("zones"),
        Some(&serde_json::json!(["Andong(안동시)/North Gyeongsang"]))
    );

    assert_eq!(settings::remove_zone(&ctx, &oomi, &nowhere).await.expect("remove").status, 400);
    assert_eq!(settings::remove_zone(&ctx, &oomi, &andong).await.expect("remove").status, 200);
    assert!(accounts::get_zones(&db, &oomi).await.expect("zones").is_empty());
}
