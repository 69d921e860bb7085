use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderPaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

impl OrderPaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderPaymentStatus::Pending => "pending",
            OrderPaymentStatus::Paid => "paid",
            OrderPaymentStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    #[default]
    Processing,
    Shipped,
    Delivered,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Processing => "processing",
            DeliveryStatus::Shipped => "shipped",
            DeliveryStatus::Delivered => "delivered",
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderLineInput {
    pub product: Option<Uuid>,
    pub quantity: Option<i32>,
    pub price: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user: Uuid,
    pub products: Option<Vec<OrderLineInput>>,
    pub total_amount: Option<f64>,
    pub payment_status: Option<OrderPaymentStatus>,
    pub delivery_status: Option<DeliveryStatus>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub user: Option<Uuid>,
    pub products: Option<Vec<OrderLineInput>>,
    pub total_amount: Option<f64>,
    pub payment_status: Option<OrderPaymentStatus>,
    pub delivery_status: Option<DeliveryStatus>,
}
