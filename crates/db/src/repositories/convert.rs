//! Row to domain mapping.

use chrono::Utc;
use loyalty_core::StoreError;
use loyalty_core::ledger::{Balance, Withdrawal};
use loyalty_core::order::{Order, OrderNumber, OrderStatus};
use loyalty_shared::types::{OrderId, UserId, WithdrawalId};
use sea_orm::DbErr;

use crate::entities::{balances, orders, withdrawals};

pub(crate) fn db_err(err: DbErr) -> StoreError {
    StoreError::Database(err.to_string())
}

fn number(raw: &str) -> Result<OrderNumber, StoreError> {
    OrderNumber::parse(raw).map_err(|e| StoreError::Corrupt(e.to_string()))
}

pub(crate) fn order(model: orders::Model) -> Result<Order, StoreError> {
    Ok(Order {
        id: OrderId::from_uuid(model.id),
        user_id: UserId::from_uuid(model.user_id),
        number: number(&model.number)?,
        status: model
            .status
            .parse::<OrderStatus>()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?,
        accrual: model.accrual,
        uploaded_at: model.uploaded_at.with_timezone(&Utc),
    })
}

pub(crate) fn order_list(models: Vec<orders::Model>) -> Result<Vec<Order>, StoreError> {
    models.into_iter().map(order).collect()
}

pub(crate) fn balance(model: balances::Model) -> Balance {
    Balance {
        user_id: UserId::from_uuid(model.user_id),
        current: model.current,
        withdrawn: model.withdrawn,
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub(crate) fn withdrawal(model: withdrawals::Model) -> Result<Withdrawal, StoreError> {
    Ok(Withdrawal {
        id: WithdrawalId::from_uuid(model.id),
        user_id: UserId::from_uuid(model.user_id),
        order_number: number(&model.order_number)?,
        sum: model.sum,
        processed_at: model.processed_at.with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn row(number: &str, status: &str) -> orders::Model {
        let now = Utc::now().into();
        orders::Model {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            number: number.to_string(),
            status: status.to_string(),
            accrual: Some(dec!(500)),
            uploaded_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_order_row_maps() {
        let order = order(row("12345678903", "PROCESSED")).unwrap();
        assert_eq!(order.status, OrderStatus::Processed);
        assert_eq!(order.accrual, Some(dec!(500)));
        assert_eq!(order.number.as_str(), "12345678903");
    }

    #[test]
    fn test_unknown_status_is_corrupt() {
        assert!(matches!(
            order(row("12345678903", "LOST")),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_bad_number_is_corrupt() {
        assert!(matches!(
            order(row("1234567890", "NEW")),
            Err(StoreError::Corrupt(_))
        ));
    }
}
