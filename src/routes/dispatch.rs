use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    registry::{ListParams, Model},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{model}", get(list_records).post(create_record))
        .route("/{model}/{id}", axum::routing::put(update_record).delete(delete_record))
}

#[utoipa::path(
    get,
    path = "/api/{model}",
    params(
        ("model" = String, Path, description = "Entity name: user, product, order, review, wishlist or payment"),
        ListParams,
    ),
    responses(
        (status = 200, description = "All records of the entity, or the aggregated payment total when startDate/endDate are given"),
        (status = 404, description = "Unknown entity name"),
    ),
    tag = "Records"
)]
pub async fn list_records(
    State(state): State<AppState>,
    Path(model): Path<String>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Value>> {
    let model = Model::resolve(&model).ok_or(AppError::ModelNotFound)?;
    Ok(Json(model.list(&state, &params).await?))
}

#[utoipa::path(
    post,
    path = "/api/{model}",
    params(
        ("model" = String, Path, description = "Entity name"),
    ),
    responses(
        (status = 200, description = "Created record including generated id and defaults"),
        (status = 400, description = "Schema constraint violated"),
        (status = 404, description = "Unknown entity name"),
    ),
    tag = "Records"
)]
pub async fn create_record(
    State(state): State<AppState>,
    Path(model): Path<String>,
    Json(body): Json<Value>,
) -> AppResult<Json<Value>> {
    let model = Model::resolve(&model).ok_or(AppError::ModelNotFound)?;
    Ok(Json(model.create(&state, body).await?))
}

#[utoipa::path(
    put,
    path = "/api/{model}/{id}",
    params(
        ("model" = String, Path, description = "Entity name"),
        ("id" = Uuid, Path, description = "Record id"),
    ),
    responses(
        (status = 200, description = "Updated record, or null when the id is absent"),
        (status = 404, description = "Unknown entity name"),
        (status = 409, description = "Immutable field change rejected"),
    ),
    tag = "Records"
)]
pub async fn update_record(
    State(state): State<AppState>,
    Path((model, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> AppResult<Json<Value>> {
    let model = Model::resolve(&model).ok_or(AppError::ModelNotFound)?;
    let id = parse_id(&id)?;
    Ok(Json(model.update(&state, id, body).await?))
}

#[utoipa::path(
    delete,
    path = "/api/{model}/{id}",
    params(
        ("model" = String, Path, description = "Entity name"),
        ("id" = Uuid, Path, description = "Record id"),
    ),
    responses(
        (status = 200, description = "Deleted record's prior state, or null when the id is absent"),
        (status = 404, description = "Unknown entity name"),
    ),
    tag = "Records"
)]
pub async fn delete_record(
    State(state): State<AppState>,
    Path((model, id)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    let model = Model::resolve(&model).ok_or(AppError::ModelNotFound)?;
    let id = parse_id(&id)?;
    Ok(Json(model.delete(&state, id).await?))
}

fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("invalid record id: {raw}")))
}
