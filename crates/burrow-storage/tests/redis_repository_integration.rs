use std::sync::Arc;
use std::time::Duration;

use burrow_core::ShortCode;
use burrow_storage::{NewAlias, RedisRepository, Repository, StorageError};
use burrow_test_infra::redis::RedisServer;
use jiff::{SignedDuration, Timestamp};

/// Test fixture that manages a Redis container using test-infra.
struct Fixture {
    _redis: RedisServer,
    repo: RedisRepository,
}

impl Fixture {
    async fn start() -> Self {
        let redis = RedisServer::new().await.expect("start redis");
        let url = redis.url().await.expect("redis url");

        // Wait a moment to ensure Redis is fully ready
        tokio::time::sleep(Duration::from_millis(500)).await;

        let repo = RedisRepository::connect(&url).await.expect("connect redis");
        Self {
            _redis: redis,
            repo,
        }
    }
}

fn code(value: &str) -> ShortCode {
    ShortCode::new_unchecked(value)
}

fn alias(url: &str, expires_at: Timestamp) -> NewAlias {
    NewAlias {
        target: url.to_string(),
        created_at: Timestamp::now(),
        expires_at,
    }
}

fn in_an_hour() -> Timestamp {
    Timestamp::now() + SignedDuration::from_hours(1)
}

#[tokio::test]
async fn save_and_get_round_trips_every_field() {
    let fixture = Fixture::start().await;
    let short_code = code("abc123");
    let created_at = Timestamp::now();
    let expires_at = created_at + SignedDuration::from_hours(1);

    fixture
        .repo
        .save(
            &short_code,
            NewAlias {
                target: "https://example.com/page".to_string(),
                created_at,
                expires_at,
            },
        )
        .await
        .unwrap();

    let got = fixture.repo.get(&short_code).await.unwrap().unwrap();
    assert_eq!(got.target, "https://example.com/page");
    assert_eq!(got.created_at.as_millisecond(), created_at.as_millisecond());
    assert_eq!(got.expires_at.as_millisecond(), expires_at.as_millisecond());
    assert_eq!(got.usage_count, 0);
}

#[tokio::test]
async fn save_conflicts_when_code_already_exists() {
    let fixture = Fixture::start().await;
    let short_code = code("abc123");

    fixture
        .repo
        .save(&short_code, alias("https://one.example", in_an_hour()))
        .await
        .unwrap();

    let err = fixture
        .repo
        .save(&short_code, alias("https://two.example", in_an_hour()))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));

    let kept = fixture.repo.get(&short_code).await.unwrap().unwrap();
    assert_eq!(kept.target, "https://one.example");
}

#[tokio::test]
async fn get_nonexistent_returns_none() {
    let fixture = Fixture::start().await;

    assert!(fixture.repo.get(&code("nope00")).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_is_idempotent() {
    let fixture = Fixture::start().await;
    let short_code = code("delete");

    fixture
        .repo
        .save(&short_code, alias("https://example.com", in_an_hour()))
        .await
        .unwrap();

    assert!(fixture.repo.delete(&short_code).await.unwrap());
    assert!(fixture.repo.get(&short_code).await.unwrap().is_none());
    assert!(!fixture.repo.delete(&short_code).await.unwrap());
}

#[tokio::test]
async fn increment_does_not_resurrect_deleted_alias() {
    let fixture = Fixture::start().await;
    let short_code = code("ghost1");

    assert!(!fixture.repo.increment_usage(&short_code).await.unwrap());
    assert!(fixture.repo.get(&short_code).await.unwrap().is_none());
}

#[tokio::test]
async fn concurrent_increments_are_atomic() {
    let fixture = Fixture::start().await;
    let short_code = code("hot001");
    fixture
        .repo
        .save(&short_code, alias("https://example.com", in_an_hour()))
        .await
        .unwrap();

    let repo = Arc::new(fixture.repo.clone());
    let mut handles = vec![];
    for _ in 0..10 {
        let repo = Arc::clone(&repo);
        let short_code = short_code.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..10 {
                assert!(repo.increment_usage(&short_code).await.unwrap());
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let got = fixture.repo.get(&short_code).await.unwrap().unwrap();
    assert_eq!(got.usage_count, 100);
}

#[tokio::test]
async fn redis_evicts_records_at_their_deadline() {
    let fixture = Fixture::start().await;
    let short_code = code("short1");

    fixture
        .repo
        .save(
            &short_code,
            alias("https://example.com", Timestamp::now() + SignedDuration::from_millis(300)),
        )
        .await
        .unwrap();
    assert!(fixture.repo.get(&short_code).await.unwrap().is_some());

    tokio::time::sleep(Duration::from_millis(800)).await;
    assert!(fixture.repo.get(&short_code).await.unwrap().is_none());
}
