//! Offline keyword-rule language model.
//!
//! Stands in for a hosted model in tests and the console demo. Maps the most
//! recent user turn to a tool call through a small set of regex rules, with
//! a spoken fallback when nothing matches. Rules are checked in a fixed
//! precedence order so overlapping phrases ("order history" vs "order a
//! mug") resolve deterministically.

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Map, Value};

use parlance_core::types::Product;
use parlance_store::{Catalog, ProductFilter};

use crate::error::AgentError;
use crate::speech::{LanguageModel, ModelAction, Role, Turn};

pub struct KeywordModel {
    catalog: Arc<Catalog>,
    quantity: Regex,
    under_price: Regex,
    name: Regex,
    email: Regex,
    company: Regex,
    mood: Regex,
    energy: Regex,
}

impl KeywordModel {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        // Patterns are static and known-good; compile once here.
        Self {
            catalog,
            quantity: Regex::new(r"\b(\d+)\b").unwrap(),
            under_price: Regex::new(r"(?:under|below|less than)\s+(\d+)").unwrap(),
            name: Regex::new(r"(?i)(?:my name is|this is)\s+([A-Za-z]+(?: [A-Za-z]+)?)").unwrap(),
            email: Regex::new(r"[\w.+-]+@[\w-]+\.[\w.-]+").unwrap(),
            company: Regex::new(
                r"(?i)(?:i work (?:at|for)|my company is|calling from)\s+([A-Za-z][\w .&'-]*)",
            )
            .unwrap(),
            mood: Regex::new(r"(?:feeling|i feel)\s+([a-z]+)").unwrap(),
            energy: Regex::new(r"energy\s+(?:is\s+|at\s+)?(\d)").unwrap(),
        }
    }

    /// Best catalog match for a free-form transcript.
    ///
    /// Prefers a literal product id; otherwise scores products by how many
    /// of their name words appear in the transcript.
    fn resolve_product(&self, transcript: &str) -> Option<&Product> {
        let empty = ProductFilter::default();
        let products = self.catalog.list(&empty);

        if let Some(p) = products.iter().copied().find(|p| transcript.contains(&p.id)) {
            return Some(p);
        }

        let mut best: Option<(&Product, usize)> = None;
        for product in products {
            let score = product
                .name
                .to_lowercase()
                .split_whitespace()
                .filter(|word| word.len() >= 3 && transcript.contains(word))
                .count();
            let score = score
                + usize::from(transcript.contains(&product.category.to_lowercase()));
            if score > 0 && best.map_or(true, |(_, s)| score > s) {
                best = Some((product, score));
            }
        }
        best.map(|(p, _)| p)
    }

    fn lead_fields(&self, transcript: &str) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(caps) = self.name.captures(transcript) {
            fields.insert("name".to_string(), json!(caps[1].trim()));
        }
        if let Some(m) = self.email.find(transcript) {
            fields.insert("email".to_string(), json!(m.as_str()));
        }
        if let Some(caps) = self.company.captures(transcript) {
            fields.insert("company".to_string(), json!(caps[1].trim()));
        }
        fields
    }

    fn action_for(&self, transcript: &str) -> ModelAction {
        let text = transcript.to_lowercase();

        if text.contains("order history") || text.contains("past orders") {
            return ModelAction::CallTool {
                name: "get_order_history".to_string(),
                args: json!({}),
            };
        }
        if text.contains("last order") || text.contains("previous order") {
            return ModelAction::CallTool {
                name: "get_last_order".to_string(),
                args: json!({}),
            };
        }

        if text.contains("save the lead") || text.contains("save it") || text.contains("confirm")
        {
            return ModelAction::CallTool {
                name: "capture_lead".to_string(),
                args: json!({"confirm": true}),
            };
        }
        let fields = self.lead_fields(transcript);
        if !fields.is_empty() {
            return ModelAction::CallTool {
                name: "capture_lead".to_string(),
                args: Value::Object(fields),
            };
        }

        if let Some(caps) = self.mood.captures(&text) {
            let mut args = Map::new();
            args.insert("mood".to_string(), json!(&caps[1]));
            if let Some(e) = self.energy.captures(&text) {
                args.insert("energy".to_string(), json!(e[1].parse::<i64>().unwrap_or(3)));
            }
            return ModelAction::CallTool {
                name: "log_checkin".to_string(),
                args: Value::Object(args),
            };
        }

        let wants_buy =
            text.contains("buy") || text.contains("purchase") || text.contains("order");
        if wants_buy {
            match self.resolve_product(&text) {
                Some(product) => {
                    // Strip the id first so its digits are not read as a
                    // quantity.
                    let remainder = text.replace(&product.id, "");
                    let quantity = self
                        .quantity
                        .captures(&remainder)
                        .and_then(|c| c[1].parse::<i64>().ok())
                        .unwrap_or(1);
                    return ModelAction::CallTool {
                        name: "place_order".to_string(),
                        args: json!({"product_id": product.id, "quantity": quantity}),
                    };
                }
                None => {
                    return ModelAction::Say(
                        "Which product would you like to order?".to_string(),
                    )
                }
            }
        }

        let wants_browse = text.contains("show")
            || text.contains("browse")
            || text.contains("find")
            || text.contains("looking for")
            || text.contains("do you have");
        if wants_browse {
            let mut args = Map::new();
            for term in ["mug", "hoodie", "shirt", "clothing"] {
                if text.contains(term) {
                    args.insert("search".to_string(), json!(term));
                    break;
                }
            }
            if let Some(caps) = self.under_price.captures(&text) {
                if let Ok(price) = caps[1].parse::<i64>() {
                    args.insert("max_price".to_string(), json!(price));
                }
            }
            return ModelAction::CallTool {
                name: "browse_products".to_string(),
                args: Value::Object(args),
            };
        }

        ModelAction::Say(
            "I can browse products, place orders, check your order history, take your \
             contact details, or log a wellness check-in. What would you like to do?"
                .to_string(),
        )
    }
}

#[async_trait]
impl LanguageModel for KeywordModel {
    async fn next_action(&self, conversation: &[Turn]) -> Result<ModelAction, AgentError> {
        let last_user = conversation
            .iter()
            .rev()
            .find(|t| t.role == Role::User)
            .ok_or_else(|| AgentError::Model("conversation has no user turn".to_string()))?;
        Ok(self.action_for(&last_user.content))
    }
}
