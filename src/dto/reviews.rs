use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub product: Uuid,
    pub user: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateReviewRequest {
    pub product: Option<Uuid>,
    pub user: Option<Uuid>,
    pub rating: Option<i32>,
    pub comment: Option<String>,
}
