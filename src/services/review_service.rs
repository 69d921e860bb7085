use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    entity::reviews::{self, Column, Entity as Reviews},
    error::{AppError, AppResult},
    models::Review,
    services::{product_service, user_service},
    state::AppState,
};
use crate::dto::reviews::{CreateReviewRequest, UpdateReviewRequest};

pub async fn create_review(state: &AppState, payload: CreateReviewRequest) -> AppResult<Review> {
    check_rating(payload.rating)?;
    let active = reviews::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(payload.product),
        user_id: Set(payload.user),
        rating: Set(payload.rating),
        comment: Set(payload.comment),
        created_at: Set(Utc::now().into()),
    };
    let review = active.insert(&state.orm).await?;
    hydrate_one(state, review).await
}

pub async fn get_all_reviews(state: &AppState) -> AppResult<Vec<Review>> {
    let rows = Reviews::find().all(&state.orm).await?;
    hydrate_reviews(state, rows).await
}

pub async fn get_reviews_by_product_id(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<Vec<Review>> {
    let rows = Reviews::find()
        .filter(Column::ProductId.eq(product_id))
        .all(&state.orm)
        .await?;
    hydrate_reviews(state, rows).await
}

pub async fn get_review_by_id(state: &AppState, id: Uuid) -> AppResult<Option<Review>> {
    let row = Reviews::find_by_id(id).one(&state.orm).await?;
    match row {
        Some(row) => Ok(Some(hydrate_one(state, row).await?)),
        None => Ok(None),
    }
}

pub async fn update_review(
    state: &AppState,
    id: Uuid,
    payload: UpdateReviewRequest,
) -> AppResult<Option<Review>> {
    let existing = Reviews::find_by_id(id).one(&state.orm).await?;
    let Some(existing) = existing else {
        return Ok(None);
    };

    let mut active: reviews::ActiveModel = existing.into();
    if let Some(product) = payload.product {
        active.product_id = Set(product);
    }
    if let Some(user) = payload.user {
        active.user_id = Set(user);
    }
    if let Some(rating) = payload.rating {
        check_rating(rating)?;
        active.rating = Set(rating);
    }
    if let Some(comment) = payload.comment {
        active.comment = Set(Some(comment));
    }

    let review = active.update(&state.orm).await?;
    Ok(Some(hydrate_one(state, review).await?))
}

pub async fn delete_review(state: &AppState, id: Uuid) -> AppResult<Option<Review>> {
    let prior = get_review_by_id(state, id).await?;
    let Some(prior) = prior else {
        return Ok(None);
    };
    Reviews::delete_by_id(id).exec(&state.orm).await?;
    Ok(Some(prior))
}

fn check_rating(rating: i32) -> AppResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::Validation(format!(
            "rating must be between 1 and 5, got {rating}"
        )));
    }
    Ok(())
}

async fn hydrate_one(state: &AppState, row: reviews::Model) -> AppResult<Review> {
    let mut reviews = hydrate_reviews(state, vec![row]).await?;
    Ok(reviews.remove(0))
}

async fn hydrate_reviews(
    state: &AppState,
    rows: Vec<reviews::Model>,
) -> AppResult<Vec<Review>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let product_ids: Vec<Uuid> = rows.iter().map(|row| row.product_id).collect();
    let products = product_service::products_by_ids(state, product_ids).await?;
    let user_ids: Vec<Uuid> = rows.iter().map(|row| row.user_id).collect();
    let users = user_service::users_by_ids(state, user_ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| Review {
            id: row.id,
            product: products.get(&row.product_id).cloned(),
            user: users.get(&row.user_id).cloned(),
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at.with_timezone(&Utc),
        })
        .collect())
}
