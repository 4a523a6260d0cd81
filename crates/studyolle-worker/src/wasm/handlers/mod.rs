pub mod account;
pub mod admin_auth;
pub mod migrations;
pub mod settings;
pub mod study;

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use worker::{Env, Error, Request, Response, Result};

use entity::account::Model as Account;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::mail::{ConsoleEmailSender, EmailSender};
use crate::service::session;
use crate::web::response::{decode_component, FLASH_COOKIE, SESSION_COOKIE};
use crate::web::{error_reply, Ctx, Reply};
use crate::worker_wasm::brevo::BrevoEmailSender;
use crate::worker_wasm::db::db_connect;
use crate::worker_wasm::env::load_config;
use crate::worker_wasm::http::{cookie, reply_response};

fn map_app_err(e: crate::error::AppError) -> Error {
    Error::RustError(e.to_string())
}

/// Everything a request handler needs, resolved once per request.
pub struct RequestState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub mailer: Box<dyn EmailSender>,
    pub session_token: Option<String>,
    pub account: Option<Account>,
    flash: Option<String>,
}

impl RequestState {
    pub async fn open(req: &Request, env: &Env) -> Result<Self> {
        let config = load_config(env)?;
        let db = db_connect(env).await?;

        let mailer: Box<dyn EmailSender> = match BrevoEmailSender::from_env(env, &config) {
            Some(brevo) => Box::new(brevo),
            None => Box::new(ConsoleEmailSender),
        };

        let session_token = cookie(req, SESSION_COOKIE)?;
        let account = match &session_token {
            Some(token) => session::current_account(&db, token).await.map_err(map_app_err)?,
            None => None,
        };
        let flash = cookie(req, FLASH_COOKIE)?.map(|v| decode_component(&v));

        Ok(Self {
            db,
            config,
            mailer,
            session_token,
            account,
            flash,
        })
    }

    pub async fn begin(&self) -> Result<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| Error::RustError(e.to_string()))
    }

    pub fn ctx<'a>(&'a self, txn: &'a DatabaseTransaction) -> Ctx<'a, DatabaseTransaction> {
        Ctx::new(txn, &self.config, self.mailer.as_ref())
    }

    /// Commit on success, roll back otherwise, then encode the reply.
    pub async fn finish(
        self,
        req: &Request,
        txn: DatabaseTransaction,
        result: AppResult<Reply>,
    ) -> Result<Response> {
        let reply = match result {
            Ok(reply) => {
                txn.commit().await.map_err(|e| Error::RustError(e.to_string()))?;
                reply
            }
            Err(err) => {
                if err.status() >= 500 {
                    tracing::error!("request failed: {err}");
                }
                txn.rollback().await.map_err(|e| Error::RustError(e.to_string()))?;
                error_reply(&err)
            }
        };

        reply_response(
            req,
            &self.config.app_host,
            reply,
            self.flash,
            self.config.session_ttl_secs,
        )
    }
}
