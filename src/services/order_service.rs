use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    entity::order_items,
    entity::orders::{self, Column, Entity as Orders},
    entity::OrderItems,
    error::AppResult,
    models::{Order, OrderLine},
    services::{product_service, user_service},
    state::AppState,
};
use crate::dto::orders::{CreateOrderRequest, OrderLineInput, UpdateOrderRequest};

pub async fn create_order(state: &AppState, payload: CreateOrderRequest) -> AppResult<Order> {
    let order_id = Uuid::new_v4();
    let active = orders::ActiveModel {
        id: Set(order_id),
        user_id: Set(payload.user),
        total_amount: Set(payload.total_amount.unwrap_or(0.0)),
        payment_status: Set(payload
            .payment_status
            .unwrap_or_default()
            .as_str()
            .to_string()),
        delivery_status: Set(payload
            .delivery_status
            .unwrap_or_default()
            .as_str()
            .to_string()),
        ordered_at: Set(Utc::now().into()),
    };
    let order = active.insert(&state.orm).await?;
    insert_lines(state, order_id, payload.products.unwrap_or_default()).await?;
    hydrate_one(state, order).await
}

pub async fn get_all_orders(state: &AppState) -> AppResult<Vec<Order>> {
    let rows = Orders::find().all(&state.orm).await?;
    hydrate_orders(state, rows).await
}

pub async fn get_orders_by_user_id(state: &AppState, user_id: Uuid) -> AppResult<Vec<Order>> {
    let rows = Orders::find()
        .filter(Column::UserId.eq(user_id))
        .all(&state.orm)
        .await?;
    hydrate_orders(state, rows).await
}

pub async fn get_order_by_id(state: &AppState, id: Uuid) -> AppResult<Option<Order>> {
    let row = Orders::find_by_id(id).one(&state.orm).await?;
    match row {
        Some(row) => Ok(Some(hydrate_one(state, row).await?)),
        None => Ok(None),
    }
}

pub async fn update_order(
    state: &AppState,
    id: Uuid,
    payload: UpdateOrderRequest,
) -> AppResult<Option<Order>> {
    let existing = Orders::find_by_id(id).one(&state.orm).await?;
    let Some(existing) = existing else {
        return Ok(None);
    };

    let mut active: orders::ActiveModel = existing.into();
    if let Some(user) = payload.user {
        active.user_id = Set(user);
    }
    if let Some(total_amount) = payload.total_amount {
        active.total_amount = Set(total_amount);
    }
    if let Some(payment_status) = payload.payment_status {
        active.payment_status = Set(payment_status.as_str().to_string());
    }
    if let Some(delivery_status) = payload.delivery_status {
        active.delivery_status = Set(delivery_status.as_str().to_string());
    }
    let order = active.update(&state.orm).await?;

    // A products patch replaces the whole embedded line array.
    if let Some(lines) = payload.products {
        OrderItems::delete_many()
            .filter(order_items::Column::OrderId.eq(id))
            .exec(&state.orm)
            .await?;
        insert_lines(state, id, lines).await?;
    }

    Ok(Some(hydrate_one(state, order).await?))
}

pub async fn delete_order(state: &AppState, id: Uuid) -> AppResult<Option<Order>> {
    let prior = get_order_by_id(state, id).await?;
    let Some(prior) = prior else {
        return Ok(None);
    };
    Orders::delete_by_id(id).exec(&state.orm).await?;
    Ok(Some(prior))
}

async fn insert_lines(
    state: &AppState,
    order_id: Uuid,
    lines: Vec<OrderLineInput>,
) -> AppResult<()> {
    for line in lines {
        let active = order_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_id: Set(line.product),
            quantity: Set(line.quantity.unwrap_or(1)),
            price: Set(line.price.unwrap_or(0.0)),
        };
        active.insert(&state.orm).await?;
    }
    Ok(())
}

async fn hydrate_one(state: &AppState, row: orders::Model) -> AppResult<Order> {
    let mut orders = hydrate_orders(state, vec![row]).await?;
    // hydrate_orders returns exactly one record per input row
    Ok(orders.remove(0))
}

/// Attach the user and the populated line products to each order row.
pub(crate) async fn hydrate_orders(
    state: &AppState,
    rows: Vec<orders::Model>,
) -> AppResult<Vec<Order>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let items = OrderItems::find()
        .filter(order_items::Column::OrderId.is_in(order_ids))
        .all(&state.orm)
        .await?;

    let product_ids: Vec<Uuid> = items.iter().filter_map(|item| item.product_id).collect();
    let products = product_service::products_by_ids(state, product_ids).await?;

    let user_ids: Vec<Uuid> = rows.iter().map(|row| row.user_id).collect();
    let users = user_service::users_by_ids(state, user_ids).await?;

    let mut lines_by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
    for item in items {
        let product = item
            .product_id
            .and_then(|product_id| products.get(&product_id).cloned());
        lines_by_order.entry(item.order_id).or_default().push(OrderLine {
            product,
            quantity: item.quantity,
            price: item.price,
        });
    }

    Ok(rows
        .into_iter()
        .map(|row| Order {
            id: row.id,
            user: users.get(&row.user_id).cloned(),
            products: lines_by_order.remove(&row.id).unwrap_or_default(),
            total_amount: row.total_amount,
            payment_status: row.payment_status,
            delivery_status: row.delivery_status,
            ordered_at: row.ordered_at.with_timezone(&Utc),
        })
        .collect())
}

pub(crate) async fn orders_by_ids(
    state: &AppState,
    ids: Vec<Uuid>,
) -> AppResult<HashMap<Uuid, Order>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = Orders::find()
        .filter(Column::Id.is_in(ids))
        .all(&state.orm)
        .await?;
    let orders = hydrate_orders(state, rows).await?;
    Ok(orders.into_iter().map(|order| (order.id, order)).collect())
}
