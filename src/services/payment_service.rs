use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    entity::payments::{self, Column, Entity as Payments},
    error::{AppError, AppResult},
    models::Payment,
    services::{order_service, user_service},
    state::AppState,
};
use crate::dto::payments::{CreatePaymentRequest, UpdatePaymentRequest};

pub async fn create_payment(
    state: &AppState,
    payload: CreatePaymentRequest,
) -> AppResult<Payment> {
    let active = payments::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(payload.order),
        user_id: Set(payload.user),
        amount: Set(payload.amount),
        payment_method: Set(payload.payment_method.as_str().to_string()),
        payment_status: Set(payload
            .payment_status
            .unwrap_or_default()
            .as_str()
            .to_string()),
        transaction_id: Set(payload.transaction_id),
        paid_at: Set(payload.paid_at.map(Into::into)),
    };
    let payment = active.insert(&state.orm).await?;
    hydrate_one(state, payment).await
}

pub async fn get_all_payments(state: &AppState) -> AppResult<Vec<Payment>> {
    let rows = Payments::find().all(&state.orm).await?;
    hydrate_payments(state, rows).await
}

pub async fn get_payment_by_id(state: &AppState, id: Uuid) -> AppResult<Option<Payment>> {
    let row = Payments::find_by_id(id).one(&state.orm).await?;
    match row {
        Some(row) => Ok(Some(hydrate_one(state, row).await?)),
        None => Ok(None),
    }
}

/// Sum of `amount` over completed payments paid within the range.
/// Returns 0 when nothing matches.
pub async fn payments_total_by_date_range(
    state: &AppState,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> AppResult<f64> {
    let total: Option<Option<f64>> = Payments::find()
        .select_only()
        .column_as(Column::Amount.sum(), "total")
        .filter(Column::PaymentStatus.eq("completed"))
        .filter(Column::PaidAt.gte(start))
        .filter(Column::PaidAt.lte(end))
        .into_tuple()
        .one(&state.orm)
        .await?;
    Ok(total.flatten().unwrap_or(0.0))
}

pub async fn update_payment(
    state: &AppState,
    id: Uuid,
    payload: UpdatePaymentRequest,
) -> AppResult<Option<Payment>> {
    let existing = Payments::find_by_id(id).one(&state.orm).await?;
    let Some(existing) = existing else {
        return Ok(None);
    };

    // An already-assigned transaction identifier is immutable; re-sending
    // the same value is allowed.
    if let (Some(current), Some(incoming)) =
        (existing.transaction_id.as_ref(), payload.transaction_id.as_ref())
        && current != incoming
    {
        return Err(AppError::Conflict(
            "Cannot change existing transactionId".to_string(),
        ));
    }

    let mut active: payments::ActiveModel = existing.into();
    if let Some(order) = payload.order {
        active.order_id = Set(order);
    }
    if let Some(user) = payload.user {
        active.user_id = Set(user);
    }
    if let Some(amount) = payload.amount {
        active.amount = Set(amount);
    }
    if let Some(payment_method) = payload.payment_method {
        active.payment_method = Set(payment_method.as_str().to_string());
    }
    if let Some(payment_status) = payload.payment_status {
        active.payment_status = Set(payment_status.as_str().to_string());
    }
    if let Some(transaction_id) = payload.transaction_id {
        active.transaction_id = Set(Some(transaction_id));
    }
    if let Some(paid_at) = payload.paid_at {
        active.paid_at = Set(Some(paid_at.into()));
    }

    let payment = active.update(&state.orm).await?;
    Ok(Some(hydrate_one(state, payment).await?))
}

pub async fn delete_payment(state: &AppState, id: Uuid) -> AppResult<Option<Payment>> {
    let prior = get_payment_by_id(state, id).await?;
    let Some(prior) = prior else {
        return Ok(None);
    };
    Payments::delete_by_id(id).exec(&state.orm).await?;
    Ok(Some(prior))
}

async fn hydrate_one(state: &AppState, row: payments::Model) -> AppResult<Payment> {
    let mut payments = hydrate_payments(state, vec![row]).await?;
    Ok(payments.remove(0))
}

async fn hydrate_payments(
    state: &AppState,
    rows: Vec<payments::Model>,
) -> AppResult<Vec<Payment>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<Uuid> = rows.iter().map(|row| row.order_id).collect();
    let orders = order_service::orders_by_ids(state, order_ids).await?;
    let user_ids: Vec<Uuid> = rows.iter().map(|row| row.user_id).collect();
    let users = user_service::users_by_ids(state, user_ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| Payment {
            id: row.id,
            order: orders.get(&row.order_id).cloned(),
            user: users.get(&row.user_id).cloned(),
            amount: row.amount,
            payment_method: row.payment_method,
            payment_status: row.payment_status,
            transaction_id: row.transaction_id,
            paid_at: row.paid_at.map(|t| t.with_timezone(&Utc)),
        })
        .collect())
}
