use std::sync::{Arc, Mutex};

use sea_orm::{
    Database, DatabaseConnection, DbBackend, DbErr, ProxyDatabaseTrait, ProxyExecResult, ProxyRow,
    Statement,
};
use worker::send::SendFuture;
use worker::{Env, Error, Fetch, Headers, Method, Request, RequestInit, Result};

use crate::libsql::{self, PipelineRequest, PipelineResponse, StmtResult};

use super::env::env_string;

fn map_db_err(e: DbErr) -> Error {
    Error::RustError(e.to_string())
}

/// libSQL over HTTP. The baton keeps `BEGIN` ... `COMMIT` on one server stream.
#[derive(Debug)]
struct LibsqlProxy {
    endpoint: String,
    auth_token: Option<String>,
    baton: Mutex<Option<String>>,
}

impl LibsqlProxy {
    fn current_baton(&self) -> Option<String> {
        self.baton.lock().ok().and_then(|baton| baton.clone())
    }

    async fn send(&self, request: PipelineRequest) -> std::result::Result<StmtResult, DbErr> {
        let body = serde_json::to_string(&request).map_err(|e| DbErr::Custom(e.to_string()))?;
        let endpoint = self.endpoint.clone();
        let auth_token = self.auth_token.clone();

        let (status, text) = SendFuture::new(async move {
            let headers = Headers::new();
            headers.set("Content-Type", "application/json")?;
            if let Some(token) = auth_token {
                headers.set("Authorization", &format!("Bearer {token}"))?;
            }

            let mut init = RequestInit::new();
            init.with_method(Method::Post);
            init.with_headers(headers);
            init.with_body(Some(body.into()));

            let req = Request::new_with_init(&endpoint, &init)?;
            let mut resp = Fetch::Request(req).send().await?;
            let status = resp.status_code();
            let text = resp.text().await?;
            Ok::<_, Error>((status, text))
        })
        .await
        .map_err(|e| DbErr::Conn(sea_orm::RuntimeErr::Internal(e.to_string())))?;

        if !(200..300).contains(&status) {
            return Err(DbErr::Conn(sea_orm::RuntimeErr::Internal(format!(
                "libsql returned HTTP {status}: {text}"
            ))));
        }

        let response: PipelineResponse =
            serde_json::from_str(&text).map_err(|e| DbErr::Custom(e.to_string()))?;
        if let Ok(mut baton) = self.baton.lock() {
            *baton = response.baton.clone();
        }
        response.into_statement_result()
    }

    /// Outside a transaction every statement closes its stream.
    fn in_transaction(&self) -> bool {
        self.current_baton().is_some()
    }

    async fn command(&self, sql: &str, close: bool) {
        let request = libsql::command_request(self.current_baton(), sql, close);
        if let Err(e) = self.send(request).await {
            tracing::error!(error = %e, "libsql {sql} failed");
        }
    }
}

#[async_trait::async_trait]
impl ProxyDatabaseTrait for LibsqlProxy {
    async fn query(&self, statement: Statement) -> std::result::Result<Vec<ProxyRow>, DbErr> {
        let close = !self.in_transaction();
        let request = libsql::execute_request(self.current_baton(), &statement, close)?;
        self.send(request).await?.into_rows()
    }

    async fn execute(&self, statement: Statement) -> std::result::Result<ProxyExecResult, DbErr> {
        let close = !self.in_transaction();
        let request = libsql::execute_request(self.current_baton(), &statement, close)?;
        Ok(self.send(request).await?.exec_result())
    }

    async fn begin(&self) {
        self.command("BEGIN", false).await;
    }

    async fn commit(&self) {
        self.command("COMMIT", true).await;
    }

    async fn rollback(&self) {
        self.command("ROLLBACK", true).await;
    }
}

pub async fn db_connect(env: &Env) -> Result<DatabaseConnection> {
    let url = env_string(env, "LIBSQL_URL")
        .or_else(|| env_string(env, "DATABASE_URL"))
        .ok_or_else(|| Error::RustError("LIBSQL_URL or DATABASE_URL is required".to_string()))?;

    let proxy = LibsqlProxy {
        endpoint: libsql::pipeline_url(&url),
        auth_token: env_string(env, "LIBSQL_AUTH_TOKEN"),
        baton: Mutex::new(None),
    };

    Database::connect_proxy(
        DbBackend::Sqlite,
        Arc::new(Box::new(proxy) as Box<dyn ProxyDatabaseTrait>),
    )
    .await
    .map_err(map_db_err)
}
