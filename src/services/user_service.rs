use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::{
    entity::users::{ActiveModel, Column, Entity as Users, Model as UserRow},
    error::AppResult,
    models::{Address, User},
    state::AppState,
};
use crate::dto::users::{CreateUserRequest, UpdateUserRequest};

pub async fn create_user(state: &AppState, payload: CreateUserRequest) -> AppResult<User> {
    let address = payload.address.unwrap_or_default();
    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(payload.username),
        email: Set(payload.email),
        password: Set(payload.password),
        role: Set(payload.role.unwrap_or_default().as_str().to_string()),
        address_street: Set(address.street),
        address_city: Set(address.city),
        address_postal_code: Set(address.postal_code),
        address_country: Set(address.country),
        created_at: Set(Utc::now().into()),
    };
    let user = active.insert(&state.orm).await?;
    Ok(user_from_row(user))
}

pub async fn get_all_users(state: &AppState) -> AppResult<Vec<User>> {
    let rows = Users::find().all(&state.orm).await?;
    Ok(rows.into_iter().map(user_from_row).collect())
}

pub async fn get_user_by_id(state: &AppState, id: Uuid) -> AppResult<Option<User>> {
    let row = Users::find_by_id(id).one(&state.orm).await?;
    Ok(row.map(user_from_row))
}

pub async fn get_user_by_email(state: &AppState, email: &str) -> AppResult<Option<User>> {
    let row = Users::find()
        .filter(Column::Email.eq(email))
        .one(&state.orm)
        .await?;
    Ok(row.map(user_from_row))
}

pub async fn get_user_by_username(state: &AppState, username: &str) -> AppResult<Option<User>> {
    let row = Users::find()
        .filter(Column::Username.eq(username))
        .one(&state.orm)
        .await?;
    Ok(row.map(user_from_row))
}

pub async fn update_user(
    state: &AppState,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<Option<User>> {
    let existing = Users::find_by_id(id).one(&state.orm).await?;
    let Some(existing) = existing else {
        return Ok(None);
    };

    let mut active: ActiveModel = existing.into();
    if let Some(username) = payload.username {
        active.username = Set(username);
    }
    if let Some(email) = payload.email {
        active.email = Set(email);
    }
    if let Some(password) = payload.password {
        active.password = Set(password);
    }
    if let Some(role) = payload.role {
        active.role = Set(role.as_str().to_string());
    }
    if let Some(address) = payload.address {
        active.address_street = Set(address.street);
        active.address_city = Set(address.city);
        active.address_postal_code = Set(address.postal_code);
        active.address_country = Set(address.country);
    }

    let user = active.update(&state.orm).await?;
    Ok(Some(user_from_row(user)))
}

/// Removes the user and returns its prior state. Dependent orders, reviews,
/// wishlists and payments are left orphaned, matching the source system.
pub async fn delete_user(state: &AppState, id: Uuid) -> AppResult<Option<User>> {
    let existing = Users::find_by_id(id).one(&state.orm).await?;
    let Some(existing) = existing else {
        return Ok(None);
    };
    let prior = user_from_row(existing.clone());
    existing.delete(&state.orm).await?;
    Ok(Some(prior))
}

pub(crate) async fn users_by_ids(
    state: &AppState,
    ids: Vec<Uuid>,
) -> AppResult<HashMap<Uuid, User>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = Users::find()
        .filter(Column::Id.is_in(ids))
        .all(&state.orm)
        .await?;
    Ok(rows
        .into_iter()
        .map(|row| (row.id, user_from_row(row)))
        .collect())
}

pub(crate) fn user_from_row(row: UserRow) -> User {
    User {
        id: row.id,
        username: row.username,
        email: row.email,
        password: row.password,
        role: row.role,
        address: Address {
            street: row.address_street,
            city: row.address_city,
            postal_code: row.address_postal_code,
            country: row.address_country,
        },
        created_at: row.created_at.with_timezone(&Utc),
    }
}
