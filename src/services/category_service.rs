use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, Set};
use uuid::Uuid;

use crate::{
    entity::categories::{ActiveModel, Entity as Categories, Model as CategoryRow},
    error::AppResult,
    models::Category,
    state::AppState,
};
use crate::dto::categories::{CreateCategoryRequest, UpdateCategoryRequest};

pub async fn create_category(
    state: &AppState,
    payload: CreateCategoryRequest,
) -> AppResult<Category> {
    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        description: Set(payload.description),
    };
    let category = active.insert(&state.orm).await?;
    Ok(category_from_row(category))
}

pub async fn get_all_categories(state: &AppState) -> AppResult<Vec<Category>> {
    let rows = Categories::find().all(&state.orm).await?;
    Ok(rows.into_iter().map(category_from_row).collect())
}

pub async fn get_category_by_id(state: &AppState, id: Uuid) -> AppResult<Option<Category>> {
    let row = Categories::find_by_id(id).one(&state.orm).await?;
    Ok(row.map(category_from_row))
}

pub async fn update_category(
    state: &AppState,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<Option<Category>> {
    let existing = Categories::find_by_id(id).one(&state.orm).await?;
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

    let category = active.update(&state.orm).await?;
    Ok(Some(category_from_row(category)))
}

pub async fn delete_category(state: &AppState, id: Uuid) -> AppResult<Option<Category>> {
    let existing = Categories::find_by_id(id).one(&state.orm).await?;
    let Some(existing) = existing else {
        return Ok(None);
    };
    let prior = category_from_row(existing.clone());
    existing.delete(&state.orm).await?;
    Ok(Some(prior))
}

pub(crate) fn category_from_row(row: CategoryRow) -> Category {
    Category {
        id: row.id,
        name: row.name,
        description: row.description,
    }
}
