use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use entity::tag;

use crate::error::AppResult;
use crate::util::uuid_v4;

pub async fn find_by_title<C: ConnectionTrait>(db: &C, title: &str) -> AppResult<Option<tag::Model>> {
    Ok(tag::Entity::find()
        .filter(tag::Column::Title.eq(title))
        .one(db)
        .await?)
}

pub async fn find_or_create_new<C: ConnectionTrait>(db: &C, title: &str) -> AppResult<tag::Model> {
    let title = title.trim();
    if let Some(existing) = find_by_title(db, title).await? {
        return Ok(existing);
    }

    let created = tag::ActiveModel {
        id: Set(uuid_v4()),
        title: Set(title.to_string()),
    }
    .insert(db)
    .await?;
    tracing::debug!(title = %created.title, "created tag");
    Ok(created)
}

/// Every known tag title, for the tag input whitelist.
pub async fn all_titles<C: ConnectionTrait>(db: &C) -> AppResult<Vec<String>> {
    Ok(tag::Entity::find()
        .order_by_asc(tag::Column::Title)
        .all(db)
        .await?
        .into_iter()
        .map(|t| t.title)
        .collect())
}
