use super::*;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_typed_id_creation() {
    let id = UserId::new();
    assert!(!id.to_string().is_empty());
}

#[test]
fn test_typed_ids_are_time_ordered() {
    let first = OrderId::new();
    let second = OrderId::new();
    assert!(first <= second);
}

#[test]
fn test_typed_id_uuid_conversions() {
    let uuid = Uuid::new_v4();
    let id = WithdrawalId::from(uuid);
    assert_eq!(Uuid::from(id), uuid);
    assert_eq!(UserId::from_uuid(uuid).into_inner(), uuid);
}

#[test]
fn test_typed_id_display_matches_uuid() {
    let uuid = Uuid::new_v4();
    assert_eq!(UserId::from_uuid(uuid).to_string(), uuid.to_string());
}

#[test]
fn test_typed_id_from_str() {
    let uuid = Uuid::new_v4();
    let id = UserId::from_str(&uuid.to_string()).unwrap();
    assert_eq!(id.into_inner(), uuid);
    assert!(UserId::from_str("not-a-uuid").is_err());
}
