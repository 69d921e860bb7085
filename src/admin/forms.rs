//! Bridges urlencoded form submissions and the JSON bodies the facade takes.

use serde_json::{Map, Number, Value};

use crate::admin::table::{cell_text, field_lookup};
use crate::admin::views::{EntityView, Field, FieldKind};
use crate::error::{AppError, AppResult};

/// Folds submitted form pairs into a JSON body, honoring each field's
/// declared kind. Empty inputs are skipped so edits stay partial merges.
pub fn form_to_json(view: &EntityView, pairs: &[(String, String)]) -> AppResult<Value> {
    let mut root = Map::new();
    for field in view.fields.iter().filter(|field| field.in_form) {
        match field.kind {
            FieldKind::ReferenceList(_) => {
                let values: Vec<Value> = pairs
                    .iter()
                    .filter(|(key, value)| key == field.name && !value.is_empty())
                    .map(|(_, value)| Value::String(value.clone()))
                    .collect();
                insert_path(&mut root, field.name, Value::Array(values));
            }
            _ => {
                let Some((_, raw)) = pairs.iter().find(|(key, _)| key == field.name) else {
                    continue;
                };
                let raw = raw.trim();
                if raw.is_empty() {
                    continue;
                }
                let value = coerce(field, raw)?;
                insert_path(&mut root, field.name, value);
            }
        }
    }
    Ok(Value::Object(root))
}

fn coerce(field: &Field, raw: &str) -> AppResult<Value> {
    match field.kind {
        FieldKind::Number => {
            // Integers stay integers so narrow numeric fields still accept them.
            if let Ok(int) = raw.parse::<i64>() {
                return Ok(Value::Number(Number::from(int)));
            }
            let float: f64 = raw
                .parse()
                .map_err(|_| AppError::Validation(format!("{} must be a number", field.label)))?;
            Number::from_f64(float)
                .map(Value::Number)
                .ok_or_else(|| AppError::Validation(format!("{} must be finite", field.label)))
        }
        FieldKind::Json => serde_json::from_str(raw)
            .map_err(|err| AppError::Validation(format!("{}: {err}", field.label))),
        _ => Ok(Value::String(raw.to_string())),
    }
}

/// Dotted names nest: `address.street` lands under the `address` object.
fn insert_path(root: &mut Map<String, Value>, name: &str, value: Value) {
    match name.split_once('.') {
        None => {
            root.insert(name.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = root
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(map) = entry {
                insert_path(map, rest, value);
            }
        }
    }
}

/// Initial form value for a field of an existing record.
pub fn display_value(field: &Field, record: &Value) -> String {
    let value = field_lookup(record, field.name).unwrap_or(&Value::Null);
    match field.kind {
        FieldKind::Reference(_) => match value {
            Value::Object(map) => map.get("_id").map(cell_text).unwrap_or_default(),
            other => cell_text(other),
        },
        FieldKind::Json => {
            if value.is_null() {
                String::new()
            } else {
                compact_refs(value).to_string()
            }
        }
        _ => cell_text(value),
    }
}

/// Selected ids for a multi-select over an array of populated records.
pub fn selected_ids(field: &Field, record: &Value) -> Vec<String> {
    let Some(Value::Array(items)) = field_lookup(record, field.name) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(map) => match map.get("_id") {
                Some(Value::String(id)) => Some(id.clone()),
                _ => None,
            },
            Value::String(id) => Some(id.clone()),
            _ => None,
        })
        .collect()
}

/// Collapses populated records back to their id so a round-tripped JSON
/// field submits reference ids, not embedded documents.
pub fn compact_refs(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(id)) = map.get("_id") {
                return Value::String(id.clone());
            }
            Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), compact_refs(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(compact_refs).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::views::EntityView;
    use serde_json::json;

    fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn dotted_names_nest_and_numbers_parse() {
        let view = EntityView::resolve("user").unwrap();
        let body = form_to_json(
            view,
            &pairs(&[
                ("username", "alice"),
                ("email", "alice@example.com"),
                ("password", "secret"),
                ("role", "customer"),
                ("address.street", "42 Garden Ave"),
                ("address.city", "Cape Town"),
            ]),
        )
        .unwrap();
        assert_eq!(body["username"], "alice");
        assert_eq!(body["address"]["street"], "42 Garden Ave");
        assert_eq!(body["address"]["city"], "Cape Town");
    }

    #[test]
    fn empty_inputs_are_skipped() {
        let view = EntityView::resolve("user").unwrap();
        let body = form_to_json(view, &pairs(&[("username", "bob"), ("email", "")])).unwrap();
        assert!(body.get("email").is_none());
    }

    #[test]
    fn number_fields_reject_garbage() {
        let view = EntityView::resolve("product").unwrap();
        let err = form_to_json(view, &pairs(&[("name", "Mug"), ("price", "cheap")]));
        assert!(err.is_err());
    }

    #[test]
    fn integers_survive_as_integers() {
        let view = EntityView::resolve("review").unwrap();
        let body = form_to_json(view, &pairs(&[("rating", "4")])).unwrap();
        assert_eq!(body["rating"], json!(4));
    }

    #[test]
    fn reference_list_collects_repeated_keys() {
        let view = EntityView::resolve("wishlist").unwrap();
        let body = form_to_json(
            view,
            &pairs(&[("user", "u1"), ("products", "p1"), ("products", "p2")]),
        )
        .unwrap();
        assert_eq!(body["products"], json!(["p1", "p2"]));
    }

    #[test]
    fn json_fields_parse_and_report_errors() {
        let view = EntityView::resolve("order").unwrap();
        let body = form_to_json(
            view,
            &pairs(&[
                ("user", "u1"),
                ("products", r#"[{"product":"p1","quantity":2,"price":5.0}]"#),
            ]),
        )
        .unwrap();
        assert_eq!(body["products"][0]["quantity"], json!(2));

        let err = form_to_json(view, &pairs(&[("user", "u1"), ("products", "not json")]));
        assert!(err.is_err());
    }

    #[test]
    fn compact_refs_collapses_populated_records() {
        let populated = json!([
            { "product": { "_id": "p1", "name": "Mug" }, "quantity": 2, "price": 5.0 }
        ]);
        let compact = compact_refs(&populated);
        assert_eq!(
            compact,
            json!([{ "product": "p1", "quantity": 2, "price": 5.0 }])
        );
    }

    #[test]
    fn edit_form_references_reach_the_update_payloads() {
        use crate::dto::{payments::UpdatePaymentRequest, reviews::UpdateReviewRequest};

        let view = EntityView::resolve("review").unwrap();
        let body = form_to_json(
            view,
            &pairs(&[
                ("product", "11111111-1111-1111-1111-111111111111"),
                ("user", "22222222-2222-2222-2222-222222222222"),
                ("rating", "3"),
            ]),
        )
        .unwrap();
        let payload: UpdateReviewRequest = serde_json::from_value(body).unwrap();
        assert!(payload.product.is_some());
        assert!(payload.user.is_some());

        let view = EntityView::resolve("payment").unwrap();
        let body = form_to_json(
            view,
            &pairs(&[
                ("order", "33333333-3333-3333-3333-333333333333"),
                ("user", "44444444-4444-4444-4444-444444444444"),
                ("amount", "12.5"),
            ]),
        )
        .unwrap();
        let payload: UpdatePaymentRequest = serde_json::from_value(body).unwrap();
        assert!(payload.order.is_some());
        assert!(payload.user.is_some());
    }

    #[test]
    fn display_value_shows_reference_ids() {
        let field = crate::admin::views::Field::reference("user", "User", "user");
        let record = json!({ "user": { "_id": "u9", "username": "dora" } });
        assert_eq!(display_value(&field, &record), "u9");
    }
}
