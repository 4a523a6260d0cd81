//! Validators that need the account and study tables, plus the error
//! collection all form validation writes into.

use std::collections::BTreeMap;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;

use entity::{account, study};

use crate::error::AppResult;
use crate::form::{NicknameForm, PasswordForm, SignUpForm, StudyForm, Validate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub code: &'static str,
    pub message: String,
}

/// Rejected values keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Errors {
    fields: BTreeMap<&'static str, Vec<FieldError>>,
}

impl Errors {
    pub fn reject(&mut self, field: &'static str, code: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(FieldError {
            code,
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.fields.is_empty()
    }

    pub fn has_field_error(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn field(&self, field: &str) -> &[FieldError] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }
}

async fn email_taken<C: ConnectionTrait>(db: &C, email: &str) -> AppResult<bool> {
    Ok(account::Entity::find()
        .filter(account::Column::Email.eq(email))
        .count(db)
        .await?
        > 0)
}

async fn nickname_taken<C: ConnectionTrait>(db: &C, nickname: &str) -> AppResult<bool> {
    Ok(account::Entity::find()
        .filter(account::Column::Nickname.eq(nickname))
        .count(db)
        .await?
        > 0)
}

pub async fn path_taken<C: ConnectionTrait>(db: &C, path: &str) -> AppResult<bool> {
    Ok(study::Entity::find()
        .filter(study::Column::Path.eq(path))
        .count(db)
        .await?
        > 0)
}

/// Field constraints plus email/nickname uniqueness.
pub async fn validate_sign_up<C: ConnectionTrait>(db: &C, form: &SignUpForm) -> AppResult<Errors> {
    let mut errors = Errors::default();
    form.validate(&mut errors);

    if email_taken(db, &form.email).await? {
        errors.reject("email", "invalid.email", "This email is already in use.");
    }
    if nickname_taken(db, &form.nickname).await? {
        errors.reject("nickname", "invalid.nickname", "This nickname is already in use.");
    }

    Ok(errors)
}

/// Length constraints plus the confirmation match.
pub fn validate_password(form: &PasswordForm) -> Errors {
    let mut errors = Errors::default();
    form.validate(&mut errors);

    if form.new_password != form.new_password_confirm {
        errors.reject("newPassword", "wrong.value", "The new passwords do not match.");
    }

    errors
}

/// Format plus uniqueness. Keeping the current nickname is not a conflict.
pub async fn validate_nickname<C: ConnectionTrait>(
    db: &C,
    current: &account::Model,
    form: &NicknameForm,
) -> AppResult<Errors> {
    let mut errors = Errors::default();
    form.validate(&mut errors);

    if form.nickname != current.nickname && nickname_taken(db, &form.nickname).await? {
        errors.reject("nickname", "wrong.value", "This nickname is already in use.");
    }

    Ok(errors)
}

pub async fn validate_study<C: ConnectionTrait>(db: &C, form: &StudyForm) -> AppResult<Errors> {
    let mut errors = Errors::default();
    form.validate(&mut errors);

    if path_taken(db, &form.path).await? {
        errors.reject("path", "wrong.path", "This study path is already in use.");
    }

    Ok(errors)
}
