use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    entity::Categories,
    entity::categories::Model as CategoryRow,
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductRow},
    error::AppResult,
    models::Product,
    services::category_service,
    state::AppState,
};
use crate::dto::products::{CreateProductRequest, UpdateProductRequest};

pub async fn create_product(
    state: &AppState,
    payload: CreateProductRequest,
) -> AppResult<Product> {
    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        category_id: Set(payload.category),
        stock: Set(payload.stock.unwrap_or(0)),
        created_at: Set(Utc::now().into()),
    };
    let product = active.insert(&state.orm).await?;
    let category = match product.category_id {
        Some(category_id) => category_service::get_category_by_id(state, category_id).await?,
        None => None,
    };
    Ok(Product {
        category,
        ..product_from_row(product, None)
    })
}

/// Read-all populates the category inline, as the source system does.
pub async fn get_all_products(state: &AppState) -> AppResult<Vec<Product>> {
    let rows = Products::find()
        .find_also_related(Categories)
        .all(&state.orm)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(product, category)| product_from_row(product, category))
        .collect())
}

pub async fn get_product_by_id(state: &AppState, id: Uuid) -> AppResult<Option<Product>> {
    let row = Products::find_by_id(id)
        .find_also_related(Categories)
        .one(&state.orm)
        .await?;
    Ok(row.map(|(product, category)| product_from_row(product, category)))
}

/// Case-insensitive substring match on the product name.
pub async fn search_products_by_name(state: &AppState, query: &str) -> AppResult<Vec<Product>> {
    let pattern = format!("%{query}%");
    let rows = Products::find()
        .filter(Expr::col((Products, Column::Name)).ilike(pattern))
        .find_also_related(Categories)
        .all(&state.orm)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(product, category)| product_from_row(product, category))
        .collect())
}

pub async fn update_product(
    state: &AppState,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<Option<Product>> {
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let Some(existing) = existing else {
        return Ok(None);
    };

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(category) = payload.category {
        active.category_id = Set(Some(category));
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }

    let product = active.update(&state.orm).await?;
    let category = match product.category_id {
        Some(category_id) => category_service::get_category_by_id(state, category_id).await?,
        None => None,
    };
    Ok(Some(Product {
        category,
        ..product_from_row(product, None)
    }))
}

pub async fn delete_product(state: &AppState, id: Uuid) -> AppResult<Option<Product>> {
    let prior = get_product_by_id(state, id).await?;
    let Some(prior) = prior else {
        return Ok(None);
    };
    Products::delete_by_id(id).exec(&state.orm).await?;
    Ok(Some(prior))
}

pub(crate) async fn products_by_ids(
    state: &AppState,
    ids: Vec<Uuid>,
) -> AppResult<HashMap<Uuid, Product>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = Products::find()
        .filter(Column::Id.is_in(ids))
        .find_also_related(Categories)
        .all(&state.orm)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(product, category)| (product.id, product_from_row(product, category)))
        .collect())
}

pub(crate) fn product_from_row(row: ProductRow, category: Option<CategoryRow>) -> Product {
    Product {
        id: row.id,
        name: row.name,
        description: row.description,
        price: row.price,
        category: category.map(category_service::category_from_row),
        stock: row.stock,
        created_at: row.created_at.with_timezone(&Utc),
    }
}
