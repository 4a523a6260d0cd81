use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::COOLDOWN_SECS;

/// A registered member of the community.
///
/// Accounts start unverified; `email_verified` flips once the token mailed at
/// sign-up comes back through `/check-email-token`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub email: String,

    #[sea_orm(unique)]
    pub nickname: String,

    /// PBKDF2-SHA256 of the submitted password.
    #[serde(skip_serializing)]
    pub password_hash: Vec<u8>,
    #[serde(skip_serializing)]
    pub salt: Vec<u8>,
    #[serde(skip_serializing)]
    pub password_iterations: i32,

    pub email_verified: bool,

    #[serde(skip_serializing)]
    pub email_check_token: Option<String>,

    /// Unix timestamp (seconds).
    pub email_check_token_generated_at: Option<i64>,

    /// Unix timestamp (seconds) of a successful email verification.
    pub joined_at: Option<i64>,

    pub bio: Option<String>,
    pub url: Option<String>,
    pub occupation: Option<String>,
    pub location: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub profile_image: Option<String>,

    pub study_created_by_email: bool,
    pub study_created_by_web: bool,
    pub study_enrollment_result_by_email: bool,
    pub study_enrollment_result_by_web: bool,
    pub study_updated_by_email: bool,
    pub study_updated_by_web: bool,

    /// Unix timestamp (seconds).
    pub created_at: i64,

    /// Unix timestamp (seconds).
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::session::Entity")]
    Session,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::account_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::account_tag::Relation::Account.def().rev())
    }
}

impl Related<super::zone::Entity> for Entity {
    fn to() -> RelationDef {
        super::account_zone::Relation::Zone.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::account_zone::Relation::Account.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// A new confirmation email may go out once the previous token is older than an hour.
    pub fn can_send_confirm_email(&self, now: i64) -> bool {
        match self.email_check_token_generated_at {
            Some(generated_at) => generated_at < now - COOLDOWN_SECS,
            None => true,
        }
    }

    pub fn is_valid_token(&self, token: &str) -> bool {
        self.email_check_token.as_deref() == Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Model {
        Model {
            id: "a1".to_string(),
            email: "oomi@example.com".to_string(),
            nickname: "oomi".to_string(),
            password_hash: Vec::new(),
            salt: Vec::new(),
            password_iterations: 1,
            email_verified: false,
            email_check_token: None,
            email_check_token_generated_at: None,
            joined_at: None,
            bio: None,
            url: None,
            occupation: None,
            location: None,
            profile_image: None,
            study_created_by_email: false,
            study_created_by_web: true,
            study_enrollment_result_by_email: false,
            study_enrollment_result_by_web: true,
            study_updated_by_email: false,
            study_updated_by_web: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn token_must_match_exactly() {
        let mut a = account();
        assert!(!a.is_valid_token(""));

        a.email_check_token = Some("abc".to_string());
        assert!(a.is_valid_token("abc"));
        assert!(!a.is_valid_token("abcd"));
        assert!(!a.is_valid_token("ABC"));
    }

    #[test]
    fn confirm_email_resend_waits_an_hour() {
        let mut a = account();
        assert!(a.can_send_confirm_email(1_000));

        a.email_check_token_generated_at = Some(10_000);
        assert!(!a.can_send_confirm_email(10_000));
        assert!(!a.can_send_confirm_email(10_000 + COOLDOWN_SECS));
        assert!(a.can_send_confirm_email(10_000 + COOLDOWN_SECS + 1));
    }
}
