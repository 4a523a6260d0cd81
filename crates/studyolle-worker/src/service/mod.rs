//! Persistence and mutation behind the controllers.
//!
//! Every function takes any `ConnectionTrait`, so a request can run them all
//! inside one transaction.

pub mod account;
pub mod session;
pub mod study;
pub mod tag;
pub mod zone;

use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel};

use crate::error::AppResult;

/// Insert a join-table row; an existing identical row is left alone.
pub(crate) async fn link<C, A>(db: &C, row: A) -> AppResult<()>
where
    C: ConnectionTrait,
    A: ActiveModelTrait + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    <A::Entity as EntityTrait>::insert(row)
        .on_conflict(OnConflict::new().do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    Ok(())
}
