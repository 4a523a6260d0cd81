#![allow(dead_code)]

use std::sync::Mutex;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait};

use entity::account;
use studyolle_worker::config::AppConfig;
use studyolle_worker::error::AppResult;
use studyolle_worker::form::{SignUpForm, StudyForm};
use studyolle_worker::mail::{EmailMessage, EmailSender};
use studyolle_worker::service::{account as accounts, study as studies};
use studyolle_worker::web::{Reply, SessionChange};

pub const PASSWORD: &str = "12345678";

pub async fn memory_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("migrate up");
    db
}

pub fn test_config() -> AppConfig {
    AppConfig {
        app_host: "http://studyolle.test".to_string(),
        password_iterations: 1,
        ..AppConfig::default()
    }
}

/// Keeps every message instead of delivering it.
#[derive(Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingEmailSender {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("mailbox").clone()
    }
}

#[async_trait::async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send_email(&self, message: &EmailMessage) -> AppResult<()> {
        self.sent.lock().expect("mailbox").push(message.clone());
        Ok(())
    }
}

pub async fn sign_up(
    db: &DatabaseConnection,
    mailer: &RecordingEmailSender,
    nickname: &str,
) -> account::Model {
    let form = SignUpForm {
        nickname: nickname.to_string(),
        email: format!("{nickname}@email.com"),
        password: PASSWORD.to_string(),
    };
    accounts::process_new_account(db, &test_config(), mailer, &form)
        .await
        .expect("sign up")
}

pub async fn reload(db: &DatabaseConnection, account: &account::Model) -> account::Model {
    account::Entity::find_by_id(account.id.clone())
        .one(db)
        .await
        .expect("query")
        .expect("account exists")
}

pub async fn create_study(
    db: &DatabaseConnection,
    manager: &account::Model,
    path: &str,
) -> entity::study::Model {
    let form = StudyForm {
        path: path.to_string(),
        title: "Rust study".to_string(),
        short_description: "Reading the book together".to_string(),
        full_description: "Every Tuesday evening.".to_string(),
    };
    studies::create_new_study(db, &form, manager)
        .await
        .expect("create study")
}

pub fn started_session(reply: &Reply) -> Option<&str> {
    match &reply.session {
        SessionChange::Start(token) => Some(token.as_str()),
        _ => None,
    }
}
