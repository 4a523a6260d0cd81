use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, Statement};

async fn memory_db() -> sea_orm::DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    Database::connect(options).await.expect("connect sqlite")
}

#[tokio::test]
async fn applies_all_migrations_on_empty_database() {
    let db = memory_db().await;

    Migrator::up(&db, None).await.expect("migrate up");

    let pending = Migrator::get_pending_migrations(&db).await.expect("pending");
    assert!(pending.is_empty());

    for table in [
        "accounts",
        "sessions",
        "tags",
        "zones",
        "account_tags",
        "account_zones",
        "studies",
        "study_managers",
        "study_members",
        "study_tags",
        "study_zones",
    ] {
        let row = db
            .query_one(Statement::from_string(
                db.get_database_backend(),
                format!("SELECT count(*) AS n FROM sqlite_master WHERE type = 'table' AND name = '{table}'"),
            ))
            .await
            .expect("query")
            .expect("row");
        let n: i64 = row.try_get("", "n").expect("count");
        assert_eq!(n, 1, "missing table {table}");
    }
}

#[tokio::test]
async fn down_then_up_is_repeatable() {
    let db = memory_db().await;

    Migrator::up(&db, None).await.expect("migrate up");
    Migrator::down(&db, None).await.expect("migrate down");
    Migrator::up(&db, None).await.expect("migrate up again");

    assert!(Migrator::get_pending_migrations(&db).await.expect("pending").is_empty());
}
