//! Tests against a live PostgreSQL server.
//!
//! Ignored by default. Run with
//! `DATABASE_URL=postgres://postgres@localhost/postgres cargo test -- --ignored`.

use pgtable_sync::connection::{BatchStage, SqlConnection};
use pgtable_sync::prelude::*;
use sqlx::postgres::PgPool;

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost/postgres".to_string());
    PgPool::connect(&url).await.unwrap()
}

fn users(table: &str, columns: ColumnList) -> TableState {
    TableState::new(TableIdentity::new("public", table), columns)
}

#[tokio::test]
#[ignore = "needs a PostgreSQL server"]
async fn test_pool_lifecycle() {
    let pool = pool().await;
    pool.execute("DROP TABLE IF EXISTS public.\"pgtable_live\", public.\"pgtable_live2\"")
        .await
        .unwrap();

    let resource = TableResource::new(Reconciler::new(&pool));
    let record = resource
        .create(users("pgtable_live", ColumnList::new().column("id", "int")))
        .await
        .unwrap();
    assert_eq!(
        record.observed.as_ref().unwrap().columns,
        ColumnList::new().column("id", "int4")
    );

    let record = resource
        .update(
            record,
            users(
                "pgtable_live2",
                ColumnList::new().column("ident", "bigint").column("name", "text"),
            ),
        )
        .await
        .unwrap();
    assert_eq!(
        record.observed.unwrap().columns,
        ColumnList::new().column("ident", "int8").column("name", "text")
    );

    pool.execute("DROP TABLE public.\"pgtable_live2\"").await.unwrap();
}

#[tokio::test]
#[ignore = "needs a PostgreSQL server"]
async fn test_pool_transaction_rolls_back() {
    let pool = pool().await;
    pool.execute("DROP TABLE IF EXISTS public.\"pgtable_tx\"")
        .await
        .unwrap();

    let failure = pool
        .execute_in_transaction(&[
            "CREATE TABLE public.\"pgtable_tx\" (\"id\" int)".to_string(),
            "ALTER TABLE public.\"pgtable_tx\" ADD COLUMN \"id\" int".to_string(),
        ])
        .await
        .unwrap_err();
    assert_eq!(failure.stage, BatchStage::Statement(1));

    let observed = SchemaReader::new(&pool)
        .read(&TableIdentity::new("public", "pgtable_tx"))
        .await
        .unwrap();
    assert!(observed.columns.is_empty());
}
