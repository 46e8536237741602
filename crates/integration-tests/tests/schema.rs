//! Checks on the migrated schema that the repositories rely on.
//!
//! Run with `cargo test -p aoeyaeng-integration-tests -- --ignored` after
//! `ae-cli migrate`.

use aoeyaeng_core::MemberId;
use aoeyaeng_integration_tests::{pool, unique_email};
use aoeyaeng_storefront::db::MemberRepository;
use chrono::{DateTime, Utc};

#[tokio::test]
#[ignore = "requires a migrated database"]
async fn test_cart_item_timestamp_column() {
    let pool = pool().await;
    let columns: Vec<(String,)> = sqlx::query_as(
        r"
        SELECT column_name::text
        FROM information_schema.columns
        WHERE table_schema = 'storefront' AND table_name = 'cart_item'
        ",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    let columns: Vec<String> = columns.into_iter().map(|(name,)| name).collect();

    assert!(columns.contains(&"created_at".to_string()), "{columns:?}");
    assert!(!columns.contains(&"added_at".to_string()), "{columns:?}");
}

#[tokio::test]
#[ignore = "requires a migrated database"]
async fn test_password_update_touches_updated_at() {
    let pool = pool().await;
    let (id,): (MemberId,) = sqlx::query_as(
        r"
        INSERT INTO storefront.member (fullname, email, password_hash)
        VALUES ('Schema Check', $1, 'not-a-real-hash')
        RETURNING member_id
        ",
    )
    .bind(unique_email())
    .fetch_one(&pool)
    .await
    .unwrap();

    MemberRepository::new(&pool)
        .update_password(id, "another-hash")
        .await
        .unwrap();

    let (created_at, updated_at): (DateTime<Utc>, DateTime<Utc>) = sqlx::query_as(
        "SELECT created_at, updated_at FROM storefront.member WHERE member_id = $1",
    )
    .bind(id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(updated_at > created_at);
}
