//! Registered-handler table mapping entity-name tokens to facade calls.
//!
//! The REST surface exposes exactly the six tokens below; anything else is
//! rejected at the boundary with a "Model not found" 404. Category records
//! are reachable through the admin UI only, so `resolve_admin` accepts one
//! extra token.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    services::{
        category_service, order_service, payment_service, product_service, review_service,
        user_service, wishlist_service,
    },
    state::AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    User,
    Product,
    Order,
    Review,
    Wishlist,
    Payment,
    Category,
}

pub static REST_MODELS: &[(&str, Model)] = &[
    ("user", Model::User),
    ("product", Model::Product),
    ("order", Model::Order),
    ("review", Model::Review),
    ("wishlist", Model::Wishlist),
    ("payment", Model::Payment),
];

/// Optional lookup parameters accepted by `GET /api/{model}`.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Exact email match (user).
    pub email: Option<String>,
    /// Exact username match (user).
    pub username: Option<String>,
    /// Case-insensitive name substring (product).
    pub name: Option<String>,
    /// Filter by referencing user id (order, wishlist).
    pub user: Option<Uuid>,
    /// Filter by referenced product id (review).
    pub product: Option<Uuid>,
    /// Range start for the payment total aggregation.
    pub start_date: Option<String>,
    /// Range end for the payment total aggregation.
    pub end_date: Option<String>,
}

impl Model {
    pub fn resolve(name: &str) -> Option<Model> {
        let token = name.to_ascii_lowercase();
        REST_MODELS
            .iter()
            .find(|(candidate, _)| *candidate == token)
            .map(|(_, model)| *model)
    }

    pub fn resolve_admin(name: &str) -> Option<Model> {
        if name.eq_ignore_ascii_case("category") {
            return Some(Model::Category);
        }
        Model::resolve(name)
    }

    pub async fn list(self, state: &AppState, params: &ListParams) -> AppResult<Value> {
        match self {
            Model::User => {
                if let Some(email) = params.email.as_deref() {
                    json(user_service::get_user_by_email(state, email).await?)
                } else if let Some(username) = params.username.as_deref() {
                    json(user_service::get_user_by_username(state, username).await?)
                } else {
                    json(user_service::get_all_users(state).await?)
                }
            }
            Model::Product => {
                if let Some(name) = params.name.as_deref() {
                    json(product_service::search_products_by_name(state, name).await?)
                } else {
                    json(product_service::get_all_products(state).await?)
                }
            }
            Model::Order => {
                if let Some(user) = params.user {
                    json(order_service::get_orders_by_user_id(state, user).await?)
                } else {
                    json(order_service::get_all_orders(state).await?)
                }
            }
            Model::Review => {
                if let Some(product) = params.product {
                    json(review_service::get_reviews_by_product_id(state, product).await?)
                } else {
                    json(review_service::get_all_reviews(state).await?)
                }
            }
            Model::Wishlist => {
                if let Some(user) = params.user {
                    json(wishlist_service::get_wishlist_by_user_id(state, user).await?)
                } else {
                    json(wishlist_service::get_all_wishlists(state).await?)
                }
            }
            Model::Payment => {
                if params.start_date.is_some() || params.end_date.is_some() {
                    let (start, end) = parse_date_range(params)?;
                    let total =
                        payment_service::payments_total_by_date_range(state, start, end).await?;
                    json(total)
                } else {
                    json(payment_service::get_all_payments(state).await?)
                }
            }
            Model::Category => json(category_service::get_all_categories(state).await?),
        }
    }

    pub async fn get(self, state: &AppState, id: Uuid) -> AppResult<Value> {
        match self {
            Model::User => json_opt(user_service::get_user_by_id(state, id).await?),
            Model::Product => json_opt(product_service::get_product_by_id(state, id).await?),
            Model::Order => json_opt(order_service::get_order_by_id(state, id).await?),
            Model::Review => json_opt(review_service::get_review_by_id(state, id).await?),
            Model::Wishlist => json_opt(wishlist_service::get_wishlist_by_id(state, id).await?),
            Model::Payment => json_opt(payment_service::get_payment_by_id(state, id).await?),
            Model::Category => json_opt(category_service::get_category_by_id(state, id).await?),
        }
    }

    pub async fn create(self, state: &AppState, body: Value) -> AppResult<Value> {
        match self {
            Model::User => json(user_service::create_user(state, parse_body(body)?).await?),
            Model::Product => {
                json(product_service::create_product(state, parse_body(body)?).await?)
            }
            Model::Order => json(order_service::create_order(state, parse_body(body)?).await?),
            Model::Review => json(review_service::create_review(state, parse_body(body)?).await?),
            Model::Wishlist => {
                json(wishlist_service::create_wishlist(state, parse_body(body)?).await?)
            }
            Model::Payment => {
                json(payment_service::create_payment(state, parse_body(body)?).await?)
            }
            Model::Category => {
                json(category_service::create_category(state, parse_body(body)?).await?)
            }
        }
    }

    pub async fn update(self, state: &AppState, id: Uuid, body: Value) -> AppResult<Value> {
        match self {
            Model::User => {
                json_opt(user_service::update_user(state, id, parse_body(body)?).await?)
            }
            Model::Product => {
                json_opt(product_service::update_product(state, id, parse_body(body)?).await?)
            }
            Model::Order => {
                json_opt(order_service::update_order(state, id, parse_body(body)?).await?)
            }
            Model::Review => {
                json_opt(review_service::update_review(state, id, parse_body(body)?).await?)
            }
            Model::Wishlist => {
                json_opt(wishlist_service::update_wishlist(state, id, parse_body(body)?).await?)
            }
            Model::Payment => {
                json_opt(payment_service::update_payment(state, id, parse_body(body)?).await?)
            }
            Model::Category => {
                json_opt(category_service::update_category(state, id, parse_body(body)?).await?)
            }
        }
    }

    pub async fn delete(self, state: &AppState, id: Uuid) -> AppResult<Value> {
        match self {
            Model::User => json_opt(user_service::delete_user(state, id).await?),
            Model::Product => json_opt(product_service::delete_product(state, id).await?),
            Model::Order => json_opt(order_service::delete_order(state, id).await?),
            Model::Review => json_opt(review_service::delete_review(state, id).await?),
            Model::Wishlist => json_opt(wishlist_service::delete_wishlist(state, id).await?),
            Model::Payment => json_opt(payment_service::delete_payment(state, id).await?),
            Model::Category => json_opt(category_service::delete_category(state, id).await?),
        }
    }
}

fn json<T: Serialize>(value: T) -> AppResult<Value> {
    serde_json::to_value(value).map_err(|err| AppError::Internal(err.into()))
}

fn json_opt<T: Serialize>(value: Option<T>) -> AppResult<Value> {
    match value {
        Some(value) => json(value),
        None => Ok(Value::Null),
    }
}

fn parse_body<T: DeserializeOwned>(body: Value) -> AppResult<T> {
    serde_json::from_value(body).map_err(|err| AppError::Validation(err.to_string()))
}

fn parse_date_range(params: &ListParams) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let (Some(start), Some(end)) = (params.start_date.as_deref(), params.end_date.as_deref())
    else {
        return Err(AppError::Validation(
            "startDate and endDate must be provided together".to_string(),
        ));
    };
    Ok((parse_date_bound(start, false)?, parse_date_bound(end, true)?))
}

/// Accepts RFC 3339 timestamps or bare dates; a bare end date covers the
/// whole day.
fn parse_date_bound(raw: &str, end_of_day: bool) -> AppResult<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    if let Ok(date) = raw.parse::<NaiveDate>() {
        let time = if end_of_day {
            date.and_hms_opt(23, 59, 59)
        } else {
            date.and_hms_opt(0, 0, 0)
        };
        // both times are valid for any calendar date
        if let Some(naive) = time {
            return Ok(naive.and_utc());
        }
    }
    Err(AppError::Validation(format!("invalid date: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_tokens_case_insensitively() {
        assert_eq!(Model::resolve("user"), Some(Model::User));
        assert_eq!(Model::resolve("Payment"), Some(Model::Payment));
        assert_eq!(Model::resolve("WISHLIST"), Some(Model::Wishlist));
    }

    #[test]
    fn rejects_unregistered_tokens() {
        assert_eq!(Model::resolve("widget"), None);
        assert_eq!(Model::resolve(""), None);
        // categories are admin-only
        assert_eq!(Model::resolve("category"), None);
        assert_eq!(Model::resolve_admin("category"), Some(Model::Category));
    }

    #[test]
    fn parses_bare_dates_as_day_bounds() {
        let start = parse_date_bound("2024-03-01", false).unwrap();
        let end = parse_date_bound("2024-03-01", true).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-03-01T23:59:59+00:00");
    }

    #[test]
    fn parses_rfc3339_timestamps() {
        let bound = parse_date_bound("2024-03-01T12:30:00Z", false).unwrap();
        assert_eq!(bound.to_rfc3339(), "2024-03-01T12:30:00+00:00");
    }

    #[test]
    fn range_requires_both_bounds() {
        let params = ListParams {
            start_date: Some("2024-01-01".to_string()),
            ..ListParams::default()
        };
        assert!(parse_date_range(&params).is_err());
    }
}
