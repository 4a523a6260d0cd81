use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::COOLDOWN_SECS;

/// A study group.
///
/// `published`/`closed` and `recruiting` are independent flags; whether an
/// account may join is derived from them together with the membership tables.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "studies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// URL slug, unique across studies.
    #[sea_orm(unique)]
    pub path: String,

    pub title: String,
    pub short_description: String,

    #[sea_orm(column_type = "Text")]
    pub full_description: String,

    /// Banner image (data URL).
    #[sea_orm(column_type = "Text", nullable)]
    pub image: Option<String>,

    pub use_banner: bool,

    pub published: bool,
    /// Unix timestamp (seconds).
    pub published_at: Option<i64>,

    pub closed: bool,
    /// Unix timestamp (seconds).
    pub closed_at: Option<i64>,

    pub recruiting: bool,
    /// Unix timestamp (seconds) of the last recruiting toggle.
    pub recruiting_updated_at: Option<i64>,

    /// Unix timestamp (seconds).
    pub created_at: i64,

    /// Unix timestamp (seconds).
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::study_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::study_tag::Relation::Study.def().rev())
    }
}

impl Related<super::zone::Entity> for Entity {
    fn to() -> RelationDef {
        super::study_zone::Relation::Zone.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::study_zone::Relation::Study.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Study -> accounts managing it.
pub struct Managers;

impl Linked for Managers {
    type FromEntity = Entity;
    type ToEntity = super::account::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![
            super::study_manager::Relation::Study.def().rev(),
            super::study_manager::Relation::Account.def(),
        ]
    }
}

/// Study -> accounts that joined it.
pub struct Members;

impl Linked for Members {
    type FromEntity = Entity;
    type ToEntity = super::account::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![
            super::study_member::Relation::Study.def().rev(),
            super::study_member::Relation::Account.def(),
        ]
    }
}

impl Model {
    /// Recruiting may be toggled on a published, open study at most once per hour.
    pub fn can_update_recruiting(&self, now: i64) -> bool {
        if !self.published || self.closed {
            return false;
        }
        match self.recruiting_updated_at {
            Some(updated_at) => updated_at < now - COOLDOWN_SECS,
            None => true,
        }
    }

    /// Only studies that were never published can be deleted.
    pub fn is_removable(&self) -> bool {
        !self.published
    }
}
