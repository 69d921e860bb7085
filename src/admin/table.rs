//! Search, sort and cell rendering over record JSON.

use std::cmp::Ordering;

use chrono::DateTime;
use serde_json::Value;

const NULL: Value = Value::Null;

/// Looks a (possibly dotted) field path up in a record.
pub fn field_lookup<'a>(record: &'a Value, name: &str) -> Option<&'a Value> {
    let mut current = record;
    for part in name.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

/// Stringifies a field value for display. Embedded records render their
/// human-readable label when they carry one, their id otherwise; arrays
/// comma-join their elements.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(cell_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => {
            if map.contains_key("_id") {
                for key in ["username", "name", "transactionId"] {
                    if let Some(Value::String(label)) = map.get(key) {
                        return label.clone();
                    }
                }
                if let Some(Value::String(id)) = map.get("_id") {
                    return id.clone();
                }
            }
            Value::Object(map.clone()).to_string()
        }
    }
}

/// Free-text search across every stringified field of the record.
pub fn matches_query(record: &Value, query: &str) -> bool {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return true;
    }
    match record {
        Value::Object(map) => map
            .values()
            .any(|value| cell_text(value).to_lowercase().contains(&needle)),
        other => cell_text(other).to_lowercase().contains(&needle),
    }
}

/// Number-aware, then date-aware comparison with a case-sensitive string
/// fallback.
pub fn compare_cells(a: &Value, b: &Value) -> Ordering {
    let (text_a, text_b) = (cell_text(a), cell_text(b));
    if let (Ok(num_a), Ok(num_b)) = (text_a.parse::<f64>(), text_b.parse::<f64>()) {
        return num_a.partial_cmp(&num_b).unwrap_or(Ordering::Equal);
    }
    if let (Ok(date_a), Ok(date_b)) = (
        DateTime::parse_from_rfc3339(&text_a),
        DateTime::parse_from_rfc3339(&text_b),
    ) {
        return date_a.cmp(&date_b);
    }
    text_a.cmp(&text_b)
}

pub fn sort_records(records: &mut [Value], key: &str, ascending: bool) {
    records.sort_by(|a, b| {
        let value_a = field_lookup(a, key).unwrap_or(&NULL);
        let value_b = field_lookup(b, key).unwrap_or(&NULL);
        let ordering = compare_cells(value_a, value_b);
        if ascending { ordering } else { ordering.reverse() }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cells_prefer_labels_over_ids() {
        let user = json!({ "_id": "u1", "username": "alice" });
        assert_eq!(cell_text(&user), "alice");
        let order = json!({ "_id": "o1" });
        assert_eq!(cell_text(&order), "o1");
        let address = json!({ "city": "Cape Town" });
        assert_eq!(cell_text(&address), r#"{"city":"Cape Town"}"#);
    }

    #[test]
    fn arrays_comma_join() {
        let products = json!([{ "_id": "p1", "name": "Mug" }, { "_id": "p2", "name": "Hoodie" }]);
        assert_eq!(cell_text(&products), "Mug, Hoodie");
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let record = json!({ "username": "Alice", "email": "alice@example.com" });
        assert!(matches_query(&record, "ALICE"));
        assert!(matches_query(&record, "example.com"));
        assert!(!matches_query(&record, "bob"));
        assert!(matches_query(&record, ""));
    }

    #[test]
    fn search_reaches_embedded_records() {
        let record = json!({ "user": { "_id": "u1", "username": "carol" }, "totalAmount": 15.0 });
        assert!(matches_query(&record, "carol"));
        assert!(matches_query(&record, "15"));
    }

    #[test]
    fn numeric_sort_beats_lexicographic() {
        let mut records = vec![
            json!({ "price": 100.0 }),
            json!({ "price": 20.0 }),
            json!({ "price": 3.0 }),
        ];
        sort_records(&mut records, "price", true);
        let prices: Vec<f64> = records
            .iter()
            .map(|r| r["price"].as_f64().unwrap())
            .collect();
        assert_eq!(prices, vec![3.0, 20.0, 100.0]);
    }

    #[test]
    fn date_sort_orders_chronologically() {
        let mut records = vec![
            json!({ "createdAt": "2024-02-01T00:00:00Z" }),
            json!({ "createdAt": "2023-12-31T23:59:59Z" }),
        ];
        sort_records(&mut records, "createdAt", true);
        assert_eq!(records[0]["createdAt"], "2023-12-31T23:59:59Z");
    }

    #[test]
    fn string_sort_is_case_sensitive() {
        assert_eq!(
            compare_cells(&json!("Zebra"), &json!("apple")),
            Ordering::Less
        );
    }

    #[test]
    fn descending_reverses_order() {
        let mut records = vec![json!({ "stock": 1 }), json!({ "stock": 9 })];
        sort_records(&mut records, "stock", false);
        assert_eq!(records[0]["stock"], 9);
    }

    #[test]
    fn dotted_paths_reach_nested_fields() {
        let record = json!({ "address": { "city": "Berlin" } });
        assert_eq!(
            field_lookup(&record, "address.city"),
            Some(&json!("Berlin"))
        );
        assert_eq!(field_lookup(&record, "address.zip"), None);
    }
}
