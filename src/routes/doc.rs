use utoipa::OpenApi;
use utoipa::openapi::OpenApi as OpenApiSpec;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{categories, orders, payments, products, reviews, users, wishlists},
    models::{Address, Category, Order, OrderLine, Payment, Product, Review, User, Wishlist},
    registry::ListParams,
    routes::{dispatch, health},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        dispatch::list_records,
        dispatch::create_record,
        dispatch::update_record,
        dispatch::delete_record,
    ),
    components(
        schemas(
            Address,
            User,
            Category,
            Product,
            OrderLine,
            Order,
            Review,
            Wishlist,
            Payment,
            ListParams,
            users::Role,
            users::CreateUserRequest,
            users::UpdateUserRequest,
            categories::CreateCategoryRequest,
            categories::UpdateCategoryRequest,
            products::CreateProductRequest,
            products::UpdateProductRequest,
            orders::OrderPaymentStatus,
            orders::DeliveryStatus,
            orders::OrderLineInput,
            orders::CreateOrderRequest,
            orders::UpdateOrderRequest,
            reviews::CreateReviewRequest,
            reviews::UpdateReviewRequest,
            wishlists::CreateWishlistRequest,
            wishlists::UpdateWishlistRequest,
            payments::PaymentMethod,
            payments::PaymentStatus,
            payments::CreatePaymentRequest,
            payments::UpdatePaymentRequest,
            health::HealthData,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Records", description = "Generic record dispatch over the registered entities"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
