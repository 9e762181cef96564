//! Register, submit, accrue and spend through the core services.

use std::sync::Arc;

use loyalty_core::ledger::{LedgerError, LedgerService};
use loyalty_core::order::{OrderService, OrderStatus, Submission};
use loyalty_core::reconcile::{EngineConfig, ReconciliationEngine};
use loyalty_testkit::{ManualClock, MemoryStore, ScriptedGateway};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_accrue_then_spend() {
    let store = Arc::new(MemoryStore::new());
    let gateway = Arc::new(ScriptedGateway::new());
    let clock = Arc::new(ManualClock::epoch());
    let orders = OrderService::new(store.clone(), clock.clone());
    let ledger = LedgerService::new(store.clone(), clock.clone());
    let engine = ReconciliationEngine::new(
        store.clone(),
        gateway.clone(),
        clock.clone(),
        EngineConfig::default(),
    );

    let user = store.new_user();

    let submission = orders.submit(user, "12345678903").await.unwrap();
    assert!(matches!(submission, Submission::Accepted(_)));

    gateway.processed("12345678903", dec!(500));
    engine.run_cycle().await.unwrap();

    let listed = orders.list(user).await.unwrap();
    assert_eq!(listed[0].status, OrderStatus::Processed);
    assert_eq!(listed[0].accrual, Some(dec!(500)));

    let balance = ledger.balance(user).await.unwrap();
    assert_eq!(balance.current, dec!(500));
    assert_eq!(balance.withdrawn, dec!(0));

    ledger.withdraw(user, "2377225624", dec!(400)).await.unwrap();
    let balance = ledger.balance(user).await.unwrap();
    assert_eq!(balance.current, dec!(100));
    assert_eq!(balance.withdrawn, dec!(400));

    let err = ledger.withdraw(user, "2377225624", dec!(200)).await.unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));

    let balance = ledger.balance(user).await.unwrap();
    assert_eq!(balance.current, dec!(100));
    assert_eq!(balance.withdrawn, dec!(400));
    assert_eq!(ledger.withdrawals(user).await.unwrap().len(), 1);
}
