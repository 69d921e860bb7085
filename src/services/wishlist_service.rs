use std::collections::HashMap;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    entity::wishlist_items,
    entity::wishlists::{self, Column, Entity as Wishlists},
    entity::WishlistItems,
    error::AppResult,
    models::{Product, Wishlist},
    services::{product_service, user_service},
    state::AppState,
};
use crate::dto::wishlists::{CreateWishlistRequest, UpdateWishlistRequest};

pub async fn create_wishlist(
    state: &AppState,
    payload: CreateWishlistRequest,
) -> AppResult<Wishlist> {
    let wishlist_id = Uuid::new_v4();
    let active = wishlists::ActiveModel {
        id: Set(wishlist_id),
        user_id: Set(payload.user),
    };
    let wishlist = active.insert(&state.orm).await?;
    insert_items(state, wishlist_id, payload.products.unwrap_or_default()).await?;
    hydrate_one(state, wishlist).await
}

pub async fn get_all_wishlists(state: &AppState) -> AppResult<Vec<Wishlist>> {
    let rows = Wishlists::find().all(&state.orm).await?;
    hydrate_wishlists(state, rows).await
}

pub async fn get_wishlist_by_user_id(
    state: &AppState,
    user_id: Uuid,
) -> AppResult<Option<Wishlist>> {
    let row = Wishlists::find()
        .filter(Column::UserId.eq(user_id))
        .one(&state.orm)
        .await?;
    match row {
        Some(row) => Ok(Some(hydrate_one(state, row).await?)),
        None => Ok(None),
    }
}

pub async fn get_wishlist_by_id(state: &AppState, id: Uuid) -> AppResult<Option<Wishlist>> {
    let row = Wishlists::find_by_id(id).one(&state.orm).await?;
    match row {
        Some(row) => Ok(Some(hydrate_one(state, row).await?)),
        None => Ok(None),
    }
}

pub async fn update_wishlist(
    state: &AppState,
    id: Uuid,
    payload: UpdateWishlistRequest,
) -> AppResult<Option<Wishlist>> {
    let existing = Wishlists::find_by_id(id).one(&state.orm).await?;
    let Some(existing) = existing else {
        return Ok(None);
    };

    let mut active: wishlists::ActiveModel = existing.into();
    if let Some(user) = payload.user {
        active.user_id = Set(user);
    }
    let wishlist = active.update(&state.orm).await?;

    if let Some(products) = payload.products {
        WishlistItems::delete_many()
            .filter(wishlist_items::Column::WishlistId.eq(id))
            .exec(&state.orm)
            .await?;
        insert_items(state, id, products).await?;
    }

    Ok(Some(hydrate_one(state, wishlist).await?))
}

pub async fn delete_wishlist(state: &AppState, id: Uuid) -> AppResult<Option<Wishlist>> {
    let prior = get_wishlist_by_id(state, id).await?;
    let Some(prior) = prior else {
        return Ok(None);
    };
    Wishlists::delete_by_id(id).exec(&state.orm).await?;
    Ok(Some(prior))
}

async fn insert_items(state: &AppState, wishlist_id: Uuid, products: Vec<Uuid>) -> AppResult<()> {
    for product_id in products {
        let active = wishlist_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            wishlist_id: Set(wishlist_id),
            product_id: Set(product_id),
        };
        active.insert(&state.orm).await?;
    }
    Ok(())
}

async fn hydrate_one(state: &AppState, row: wishlists::Model) -> AppResult<Wishlist> {
    let mut wishlists = hydrate_wishlists(state, vec![row]).await?;
    Ok(wishlists.remove(0))
}

async fn hydrate_wishlists(
    state: &AppState,
    rows: Vec<wishlists::Model>,
) -> AppResult<Vec<Wishlist>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let wishlist_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let items = WishlistItems::find()
        .filter(wishlist_items::Column::WishlistId.is_in(wishlist_ids))
        .all(&state.orm)
        .await?;

    let product_ids: Vec<Uuid> = items.iter().map(|item| item.product_id).collect();
    let products = product_service::products_by_ids(state, product_ids).await?;
    let user_ids: Vec<Uuid> = rows.iter().map(|row| row.user_id).collect();
    let users = user_service::users_by_ids(state, user_ids).await?;

    let mut products_by_wishlist: HashMap<Uuid, Vec<Product>> = HashMap::new();
    for item in items {
        if let Some(product) = products.get(&item.product_id) {
            products_by_wishlist
                .entry(item.wishlist_id)
                .or_default()
                .push(product.clone());
        }
    }

    Ok(rows
        .into_iter()
        .map(|row| Wishlist {
            id: row.id,
            user: users.get(&row.user_id).cloned(),
            products: products_by_wishlist.remove(&row.id).unwrap_or_default(),
        })
        .collect())
}
