use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use entity::{account, session};

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::util::{generate_session_token, now_ts};

/// Log the account in: issue a fresh session token.
pub async fn login<C: ConnectionTrait>(
    db: &C,
    config: &AppConfig,
    account: &account::Model,
) -> AppResult<String> {
    let now = now_ts();
    let token = generate_session_token();

    session::ActiveModel {
        id: Set(token.clone()),
        account_id: Set(account.id.clone()),
        created_at: Set(now),
        expires_at: Set(now + config.session_ttl_secs),
    }
    .insert(db)
    .await?;

    tracing::debug!(account = %account.nickname, "session started");
    Ok(token)
}

/// Resolve a session token to its account. Expired sessions are dropped.
pub async fn current_account<C: ConnectionTrait>(
    db: &C,
    token: &str,
) -> AppResult<Option<account::Model>> {
    let Some((found, owner)) = session::Entity::find_by_id(token.to_string())
        .find_also_related(account::Entity)
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    if found.expires_at <= now_ts() {
        session::Entity::delete_by_id(found.id).exec(db).await?;
        return Ok(None);
    }

    Ok(owner)
}

pub async fn logout<C: ConnectionTrait>(db: &C, token: &str) -> AppResult<()> {
    session::Entity::delete_many()
        .filter(session::Column::Id.eq(token))
        .exec(db)
        .await?;
    Ok(())
}
