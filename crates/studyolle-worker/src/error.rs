use thiserror::Error;

/// Failures a request can end with.
///
/// Form validation problems are not errors: controllers re-render the form
/// with field messages instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AccessDenied(String),

    #[error("login required")]
    Unauthenticated,

    #[error("{0}")]
    BadRequest(String),

    /// A study lifecycle rule refused the transition.
    #[error("{0}")]
    InvalidState(String),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("mail delivery failed: {0}")]
    Mail(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn status(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 404,
            AppError::AccessDenied(_) => 403,
            AppError::Unauthenticated => 302,
            AppError::BadRequest(_) | AppError::InvalidState(_) => 400,
            AppError::Database(_) | AppError::Mail(_) | AppError::Config(_) => 500,
        }
    }

    /// Code exposed to clients; internal causes stay in the logs.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::AccessDenied(_) => "forbidden",
            AppError::Unauthenticated => "unauthenticated",
            AppError::BadRequest(_) => "bad_request",
            AppError::InvalidState(_) => "invalid_state",
            AppError::Database(_) | AppError::Mail(_) | AppError::Config(_) => "internal_error",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
