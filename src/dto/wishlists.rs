use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateWishlistRequest {
    pub user: Uuid,
    pub products: Option<Vec<Uuid>>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateWishlistRequest {
    pub user: Option<Uuid>,
    pub products: Option<Vec<Uuid>>,
}
