//! Repository tests against a real `PostgreSQL`.
//!
//! Set `TEST_DATABASE_URL` and run with `--include-ignored`.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

use launchkit_core::ShopDomain;
use launchkit_server::db::{
    self, OAuthStateRepository, RunKind, RunRepository, ShopRepository,
};

async fn pool() -> PgPool {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL not set");
    let pool = db::create_pool(&SecretString::from(url))
        .await
        .expect("connect");
    db::migrate(&pool).await.expect("migrate");
    pool
}

fn unique_shop() -> ShopDomain {
    let handle = format!("it-{}", nanos_suffix());
    ShopDomain::parse(&format!("{handle}.myshopify.com")).expect("shop")
}

fn nanos_suffix() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos()
        .to_string()
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_shop_upsert_replaces_token() {
    let pool = pool().await;
    let repo = ShopRepository::new(&pool);
    let shop = unique_shop();

    repo.upsert(&shop, "shpat_first", "read_products")
        .await
        .expect("insert");
    repo.upsert(&shop, "shpat_second", "read_products,write_products")
        .await
        .expect("update");

    let record = repo.get(&shop).await.expect("get").expect("present");
    assert_eq!(record.access_token.expose_secret(), "shpat_second");
    assert_eq!(record.scope, "read_products,write_products");
    assert!(repo.exists(&shop).await.expect("exists"));

    assert!(repo.delete(&shop).await.expect("delete"));
    assert!(!repo.delete(&shop).await.expect("second delete"));
    assert!(repo.get(&shop).await.expect("get").is_none());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_oauth_state_consumed_once() {
    let pool = pool().await;
    let repo = OAuthStateRepository::new(&pool);
    let shop = unique_shop();

    let state = repo.issue(&shop).await.expect("issue");
    assert!(repo.consume(&state, &shop).await.expect("consume"));
    assert!(!repo.consume(&state, &shop).await.expect("replay"));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_oauth_state_burned_by_other_shop() {
    let pool = pool().await;
    let repo = OAuthStateRepository::new(&pool);
    let shop = unique_shop();
    let other = unique_shop();

    let state = repo.issue(&shop).await.expect("issue");
    assert!(!repo.consume(&state, &other).await.expect("wrong shop"));
    assert!(!repo.consume(&state, &shop).await.expect("burned"));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_runs_listed_newest_first() {
    let pool = pool().await;
    let repo = RunRepository::new(&pool);
    let shop = unique_shop();

    repo.record(&shop, Some(42), RunKind::Suggestion)
        .await
        .expect("first");
    let latest = repo
        .record(&shop, None, RunKind::Announcement)
        .await
        .expect("second");

    let runs = repo.list_recent(&shop, 10).await.expect("list");
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].id, latest);
    assert_eq!(runs[0].kind, RunKind::Announcement);
    assert_eq!(runs[1].product_id, Some(42));
}
