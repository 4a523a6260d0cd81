//! libSQL remote protocol (Hrana over HTTP, v2 pipeline) for SeaORM's proxy
//! connection.
//!
//! Statements go out as one `execute` request per pipeline. Rows come back as
//! untyped cells, so each cell is mapped to the `Value` variant the entity
//! field expects using the column's declared type.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sea_orm::{DbErr, ProxyExecResult, ProxyRow, Statement, Value};
use serde::{Deserialize, Serialize};

/// Turns `libsql://db.example.turso.io` into the pipeline endpoint.
pub fn pipeline_url(database_url: &str) -> String {
    let base = database_url.trim().trim_end_matches('/');
    let base = match base.strip_prefix("libsql://") {
        Some(host) => format!("https://{host}"),
        None => base.to_string(),
    };
    format!("{base}/v2/pipeline")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Cell {
    Null,
    Integer { value: String },
    Float { value: f64 },
    Text { value: String },
    Blob { base64: String },
}

#[derive(Debug, Serialize)]
pub struct PipelineRequest {
    pub baton: Option<String>,
    pub requests: Vec<StreamRequest>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamRequest {
    Execute { stmt: Stmt },
    Close,
}

#[derive(Debug, Serialize)]
pub struct Stmt {
    pub sql: String,
    pub args: Vec<Cell>,
    pub want_rows: bool,
}

#[derive(Debug, Deserialize)]
pub struct PipelineResponse {
    pub baton: Option<String>,
    #[serde(default)]
    pub results: Vec<StreamResult>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamResult {
    Ok { response: StreamResponse },
    Error { error: StreamError },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamResponse {
    Execute { result: StmtResult },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct StreamError {
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct StmtResult {
    #[serde(default)]
    pub cols: Vec<Col>,
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
    #[serde(default)]
    pub affected_row_count: u64,
    pub last_insert_rowid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Col {
    pub name: Option<String>,
    pub decltype: Option<String>,
}

/// Builds a pipeline running `statement`, optionally closing the stream after.
pub fn execute_request(
    baton: Option<String>,
    statement: &Statement,
    close: bool,
) -> Result<PipelineRequest, DbErr> {
    let args = match &statement.values {
        Some(values) => values.0.iter().map(encode_value).collect::<Result<_, _>>()?,
        None => Vec::new(),
    };
    Ok(pipeline(baton, statement.sql.clone(), args, close))
}

/// Builds a pipeline for a bare SQL command such as `BEGIN` or `COMMIT`.
pub fn command_request(baton: Option<String>, sql: &str, close: bool) -> PipelineRequest {
    pipeline(baton, sql.to_string(), Vec::new(), close)
}

fn pipeline(baton: Option<String>, sql: String, args: Vec<Cell>, close: bool) -> PipelineRequest {
    let mut requests = vec![StreamRequest::Execute {
        stmt: Stmt {
            sql,
            args,
            want_rows: true,
        },
    }];
    if close {
        requests.push(StreamRequest::Close);
    }
    PipelineRequest { baton, requests }
}

impl PipelineResponse {
    /// Result of the `execute` request; a stream error becomes `DbErr::Query`.
    pub fn into_statement_result(self) -> Result<StmtResult, DbErr> {
        for result in self.results {
            match result {
                StreamResult::Ok {
                    response: StreamResponse::Execute { result },
                } => return Ok(result),
                StreamResult::Ok { .. } => {}
                StreamResult::Error { error } => {
                    return Err(DbErr::Query(sea_orm::RuntimeErr::Internal(error.message)))
                }
            }
        }
        Err(DbErr::Custom("libsql pipeline returned no statement result".to_string()))
    }
}

impl StmtResult {
    pub fn exec_result(&self) -> ProxyExecResult {
        ProxyExecResult {
            last_insert_id: self
                .last_insert_rowid
                .as_deref()
                .and_then(|id| id.parse().ok())
                .unwrap_or(0),
            rows_affected: self.affected_row_count,
        }
    }

    pub fn into_rows(self) -> Result<Vec<ProxyRow>, DbErr> {
        let StmtResult { cols, rows, .. } = self;
        rows.into_iter()
            .map(|cells| {
                let mut values = BTreeMap::new();
                for (i, cell) in cells.into_iter().enumerate() {
                    let col = cols.get(i);
                    let name = col
                        .and_then(|c| c.name.clone())
                        .unwrap_or_else(|| i.to_string());
                    let decltype = col.and_then(|c| c.decltype.as_deref());
                    values.insert(name, decode_cell(cell, decltype)?);
                }
                Ok(ProxyRow { values })
            })
            .collect()
    }
}

pub fn encode_value(value: &Value) -> Result<Cell, DbErr> {
    fn int<T: ToString>(v: &Option<T>) -> Cell {
        match v {
            Some(v) => Cell::Integer {
                value: v.to_string(),
            },
            None => Cell::Null,
        }
    }

    Ok(match value {
        Value::Bool(v) => int(&v.map(i64::from)),
        Value::TinyInt(v) => int(v),
        Value::SmallInt(v) => int(v),
        Value::Int(v) => int(v),
        Value::BigInt(v) => int(v),
        Value::TinyUnsigned(v) => int(v),
        Value::SmallUnsigned(v) => int(v),
        Value::Unsigned(v) => int(v),
        Value::BigUnsigned(v) => int(v),
        Value::Float(v) => v.map_or(Cell::Null, |v| Cell::Float {
            value: f64::from(v),
        }),
        Value::Double(v) => v.map_or(Cell::Null, |value| Cell::Float { value }),
        Value::String(v) => v.as_ref().map_or(Cell::Null, |v| Cell::Text {
            value: v.to_string(),
        }),
        Value::Char(v) => v.map_or(Cell::Null, |c| Cell::Text {
            value: c.to_string(),
        }),
        Value::Bytes(v) => v.as_ref().map_or(Cell::Null, |v| Cell::Blob {
            base64: STANDARD.encode(v.as_slice()),
        }),
        Value::Json(v) => v.as_ref().map_or(Cell::Null, |v| Cell::Text {
            value: v.to_string(),
        }),
        #[allow(unreachable_patterns)]
        other => {
            return Err(DbErr::Custom(format!(
                "unsupported libsql parameter: {other:?}"
            )))
        }
    })
}

/// Maps a cell to the variant a `TryGetable` of the declared column type
/// accepts. `bigint` columns back `i64` fields, `integer` backs `i32`, and
/// expression columns (no decltype, e.g. `COUNT(*)`) read as `i32` when they fit.
pub fn decode_cell(cell: Cell, decltype: Option<&str>) -> Result<Value, DbErr> {
    let decl = decltype.unwrap_or_default().to_ascii_lowercase();
    let kind = ColumnKind::of(&decl);

    Ok(match cell {
        Cell::Null => kind.null(),
        Cell::Integer { value } => {
            let n: i64 = value
                .parse()
                .map_err(|_| DbErr::Custom(format!("bad libsql integer: {value}")))?;
            match kind {
                ColumnKind::Bool => Value::Bool(Some(n != 0)),
                ColumnKind::BigInt => Value::BigInt(Some(n)),
                ColumnKind::Double => Value::Double(Some(n as f64)),
                _ => match i32::try_from(n) {
                    Ok(small) => Value::Int(Some(small)),
                    Err(_) => Value::BigInt(Some(n)),
                },
            }
        }
        Cell::Float { value } => Value::Double(Some(value)),
        Cell::Text { value } => Value::String(Some(Box::new(value))),
        Cell::Blob { base64 } => {
            let bytes = STANDARD
                .decode(base64.as_bytes())
                .map_err(|e| DbErr::Custom(format!("bad libsql blob: {e}")))?;
            Value::Bytes(Some(Box::new(bytes)))
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Bool,
    BigInt,
    Int,
    Double,
    Bytes,
    Text,
}

impl ColumnKind {
    fn of(decl: &str) -> Self {
        if decl.contains("bool") {
            ColumnKind::Bool
        } else if decl.contains("bigint") {
            ColumnKind::BigInt
        } else if decl.is_empty() || decl.contains("int") {
            ColumnKind::Int
        } else if decl.contains("real") || decl.contains("double") || decl.contains("float") {
            ColumnKind::Double
        } else if decl.contains("blob") || decl.contains("binary") {
            ColumnKind::Bytes
        } else {
            ColumnKind::Text
        }
    }

    fn null(self) -> Value {
        match self {
            ColumnKind::Bool => Value::Bool(None),
            ColumnKind::BigInt => Value::BigInt(None),
            ColumnKind::Int => Value::Int(None),
            ColumnKind::Double => Value::Double(None),
            ColumnKind::Bytes => Value::Bytes(None),
            ColumnKind::Text => Value::String(None),
        }
    }
}
