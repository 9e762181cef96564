//! Order admission against the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use loyalty_core::order::{OrderError, OrderService, OrderStatus, Submission};
use loyalty_testkit::{ManualClock, MemoryStore};

fn service() -> (Arc<MemoryStore>, Arc<ManualClock>, OrderService) {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::epoch());
    let service = OrderService::new(store.clone(), clock.clone());
    (store, clock, service)
}

#[tokio::test]
async fn test_submit_creates_new_order() {
    let (store, _, service) = service();
    let user = store.new_user();

    let submission = service.submit(user, "12345678903").await.unwrap();

    let Submission::Accepted(order) = submission else {
        panic!("expected Accepted, got {submission:?}");
    };
    assert_eq!(order.user_id, user);
    assert_eq!(order.status, OrderStatus::New);
    assert_eq!(order.accrual, None);
    assert_eq!(store.order_count(), 1);
}

#[tokio::test]
async fn test_submit_normalizes_whitespace() {
    let (store, _, service) = service();
    let user = store.new_user();

    service.submit(user, " 1234 5678 903\n").await.unwrap();

    assert!(store.order("12345678903").is_some());
}

#[tokio::test]
async fn test_same_user_resubmission_is_noop() {
    let (store, _, service) = service();
    let user = store.new_user();

    let first = service.submit(user, "12345678903").await.unwrap();
    let second = service.submit(user, "12345678903").await.unwrap();

    assert!(matches!(first, Submission::Accepted(_)));
    assert!(matches!(second, Submission::AlreadyUploadedBySelf(_)));
    assert_eq!(first.order(), second.order());
    assert_eq!(store.order_count(), 1);
}

#[tokio::test]
async fn test_other_user_resubmission_conflicts_and_owner_unchanged() {
    let (store, _, service) = service();
    let owner = store.new_user();
    let intruder = store.new_user();

    service.submit(owner, "9278923470").await.unwrap();
    let err = service.submit(intruder, "9278923470").await.unwrap_err();

    assert!(matches!(err, OrderError::AlreadyUploadedByOther(ref n) if n == "9278923470"));
    assert_eq!(store.order("9278923470").unwrap().user_id, owner);
    assert_eq!(store.order_count(), 1);
}

#[tokio::test]
async fn test_invalid_number_rejected_without_write() {
    let (store, _, service) = service();
    let user = store.new_user();

    for raw in ["1234567890", "", "abc123", "1"] {
        let err = service.submit(user, raw).await.unwrap_err();
        assert!(matches!(err, OrderError::InvalidOrderFormat(_)), "{raw:?}");
    }
    assert_eq!(store.order_count(), 0);
}

#[tokio::test]
async fn test_list_newest_first_and_scoped_to_user() {
    let (store, clock, service) = service();
    let user = store.new_user();
    let other = store.new_user();

    service.submit(user, "12345678903").await.unwrap();
    clock.advance(Duration::from_secs(60));
    service.submit(user, "9278923470").await.unwrap();
    clock.advance(Duration::from_secs(60));
    service.submit(other, "79927398713").await.unwrap();

    let orders = service.list(user).await.unwrap();
    let numbers: Vec<&str> = orders.iter().map(|o| o.number.as_str()).collect();
    assert_eq!(numbers, ["9278923470", "12345678903"]);
}

#[tokio::test]
async fn test_concurrent_claims_have_single_owner() {
    let (store, _, service) = service();
    let service = Arc::new(service);
    let users: Vec<_> = (0..8).map(|_| store.new_user()).collect();

    let handles: Vec<_> = users
        .iter()
        .map(|&user| {
            let service = service.clone();
            tokio::spawn(async move { service.submit(user, "4561261212345467").await })
        })
        .collect();

    let mut accepted = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(Submission::Accepted(_)) => accepted += 1,
            Err(OrderError::AlreadyUploadedByOther(_)) => conflicts += 1,
            other => panic!("unexpected result: {other:?}"),
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(store.order_count(), 1);
}
