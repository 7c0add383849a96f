//! Tolerant normalization of tool arguments.
//!
//! The language model supplies a free-form JSON object per tool call. Keys
//! may be renamed, values may arrive as strings where numbers are expected,
//! and extra keys must be ignored. Each accessor takes an ordered synonym
//! list and resolves the first key present; coercion failures fall back to
//! the caller's default rather than erroring.

use serde_json::{Map, Value};

use parlance_store::LineItemRequest;

/// Accepted key synonyms for a product reference, in resolution order.
pub const PRODUCT_KEYS: [&str; 3] = ["product_id", "id", "product"];
/// Accepted key synonyms for a quantity.
pub const QUANTITY_KEYS: [&str; 2] = ["quantity", "qty"];
/// Accepted key synonyms for a search term.
pub const SEARCH_KEYS: [&str; 2] = ["search", "q"];
/// Accepted key synonyms for a list of order lines.
pub const ITEMS_KEYS: [&str; 2] = ["order_details", "items"];

/// A loosely-typed argument bag for one tool invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolArgs {
    map: Map<String, Value>,
}

impl ToolArgs {
    /// Wrap a JSON value. Anything other than an object becomes an empty bag.
    pub fn new(value: Value) -> Self {
        match value {
            Value::Object(map) => Self { map },
            _ => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// First string value found among the synonym keys.
    ///
    /// JSON numbers are accepted and rendered as strings, matching the
    /// model's habit of quoting ids inconsistently.
    pub fn string(&self, keys: &[&str]) -> Option<String> {
        for key in keys {
            match self.map.get(*key) {
                Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
                Some(Value::Number(n)) => return Some(n.to_string()),
                _ => {}
            }
        }
        None
    }

    /// First integer value found among the synonym keys.
    ///
    /// Accepts JSON numbers and numeric strings; anything unparseable is
    /// skipped.
    pub fn integer(&self, keys: &[&str]) -> Option<i64> {
        for key in keys {
            match self.map.get(*key) {
                Some(Value::Number(n)) => {
                    if let Some(i) = n.as_i64() {
                        return Some(i);
                    }
                    if let Some(f) = n.as_f64() {
                        return Some(f as i64);
                    }
                }
                Some(Value::String(s)) => {
                    if let Ok(i) = s.trim().parse::<i64>() {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Integer with a default for absent or unparseable values.
    pub fn integer_or(&self, keys: &[&str], default: i64) -> i64 {
        self.integer(keys).unwrap_or(default)
    }

    /// First boolean value found among the synonym keys.
    ///
    /// Accepts JSON booleans and the strings "true"/"false"/"yes"/"no".
    pub fn boolean(&self, keys: &[&str]) -> Option<bool> {
        for key in keys {
            match self.map.get(*key) {
                Some(Value::Bool(b)) => return Some(*b),
                Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
                    "true" | "yes" => return Some(true),
                    "false" | "no" => return Some(false),
                    _ => {}
                },
                _ => {}
            }
        }
        None
    }

    /// First array value found among the synonym keys.
    pub fn array(&self, keys: &[&str]) -> Option<&Vec<Value>> {
        for key in keys {
            if let Some(Value::Array(items)) = self.map.get(*key) {
                return Some(items);
            }
        }
        None
    }

    /// Extract order line requests from any of the accepted payload shapes.
    ///
    /// List payloads (`order_details` / `items`) are tried first; malformed
    /// entries are skipped. Otherwise the bag itself is read as a single-item
    /// payload. Quantity defaults to 1 on absence or parse failure.
    pub fn line_items(&self) -> Vec<LineItemRequest> {
        if let Some(entries) = self.array(&ITEMS_KEYS) {
            return entries
                .iter()
                .filter_map(|entry| {
                    let entry = ToolArgs::new(entry.clone());
                    let product_id = entry.string(&PRODUCT_KEYS)?;
                    let quantity = entry.integer_or(&QUANTITY_KEYS, 1).max(1) as u32;
                    Some(LineItemRequest {
                        product_id,
                        quantity,
                    })
                })
                .collect();
        }

        match self.string(&PRODUCT_KEYS) {
            Some(product_id) => vec![LineItemRequest {
                product_id,
                quantity: self.integer_or(&QUANTITY_KEYS, 1).max(1) as u32,
            }],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_object_payload_is_empty_bag() {
        assert!(ToolArgs::new(json!(null)).is_empty());
        assert!(ToolArgs::new(json!("just a string")).is_empty());
        assert!(ToolArgs::new(json!([1, 2, 3])).is_empty());
    }

    #[test]
    fn test_string_synonym_resolution_order() {
        // "product_id" wins over "id" even when both are present.
        let args = ToolArgs::new(json!({"id": "mug-002", "product_id": "mug-001"}));
        assert_eq!(args.string(&PRODUCT_KEYS).unwrap(), "mug-001");

        let args = ToolArgs::new(json!({"product": "mug-003"}));
        assert_eq!(args.string(&PRODUCT_KEYS).unwrap(), "mug-003");
    }

    #[test]
    fn test_string_accepts_numbers_and_trims() {
        let args = ToolArgs::new(json!({"id": 42}));
        assert_eq!(args.string(&PRODUCT_KEYS).unwrap(), "42");

        let args = ToolArgs::new(json!({"search": "  mugs  "}));
        assert_eq!(args.string(&SEARCH_KEYS).unwrap(), "mugs");
    }

    #[test]
    fn test_blank_string_is_absent() {
        let args = ToolArgs::new(json!({"search": "   "}));
        assert!(args.string(&SEARCH_KEYS).is_none());
    }

    #[test]
    fn test_integer_coercion_from_string() {
        let args = ToolArgs::new(json!({"quantity": "3"}));
        assert_eq!(args.integer(&QUANTITY_KEYS).unwrap(), 3);

        let args = ToolArgs::new(json!({"qty": 2}));
        assert_eq!(args.integer(&QUANTITY_KEYS).unwrap(), 2);
    }

    #[test]
    fn test_integer_unparseable_falls_back_to_default() {
        let args = ToolArgs::new(json!({"quantity": "a couple"}));
        assert_eq!(args.integer_or(&QUANTITY_KEYS, 1), 1);

        let args = ToolArgs::new(json!({}));
        assert_eq!(args.integer_or(&["limit"], 5), 5);
    }

    #[test]
    fn test_boolean_coercion() {
        assert_eq!(
            ToolArgs::new(json!({"confirm": true})).boolean(&["confirm"]),
            Some(true)
        );
        assert_eq!(
            ToolArgs::new(json!({"confirm": "yes"})).boolean(&["confirm"]),
            Some(true)
        );
        assert_eq!(
            ToolArgs::new(json!({"confirm": "no"})).boolean(&["confirm"]),
            Some(false)
        );
        assert_eq!(
            ToolArgs::new(json!({"confirm": "maybe"})).boolean(&["confirm"]),
            None
        );
    }

    #[test]
    fn test_unknown_extra_keys_are_ignored() {
        let args = ToolArgs::new(json!({
            "product_id": "mug-001",
            "unexpected": {"deeply": ["nested"]},
            "another": 7
        }));
        assert_eq!(args.string(&PRODUCT_KEYS).unwrap(), "mug-001");
    }

    #[test]
    fn test_line_items_single_payload() {
        let args = ToolArgs::new(json!({"product_id": "hoodie-002", "quantity": 2}));
        let items = args.line_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, "hoodie-002");
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn test_line_items_list_payload_skips_malformed_entries() {
        let args = ToolArgs::new(json!({
            "order_details": [
                {"product_id": "mug-001", "quantity": 2},
                {"qty": 1},
                {"id": "tshirt-001", "quantity": "not a number"}
            ]
        }));
        let items = args.line_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_id, "mug-001");
        assert_eq!(items[0].quantity, 2);
        // Parse failure falls back to 1.
        assert_eq!(items[1].product_id, "tshirt-001");
        assert_eq!(items[1].quantity, 1);
    }

    #[test]
    fn test_line_items_items_key_synonym() {
        let args = ToolArgs::new(json!({
            "items": [{"product": "mug-002"}]
        }));
        let items = args.line_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, "mug-002");
        assert_eq!(items[0].quantity, 1);
    }

    #[test]
    fn test_line_items_empty_when_unresolvable() {
        assert!(ToolArgs::new(json!({})).line_items().is_empty());
        assert!(ToolArgs::new(json!({"order_details": [{"quantity": 3}]}))
            .line_items()
            .is_empty());
    }

    #[test]
    fn test_line_items_zero_quantity_coerced_to_one() {
        let args = ToolArgs::new(json!({"product_id": "mug-001", "quantity": 0}));
        assert_eq!(args.line_items()[0].quantity, 1);

        let args = ToolArgs::new(json!({"product_id": "mug-001", "quantity": -4}));
        assert_eq!(args.line_items()[0].quantity, 1);
    }
}
