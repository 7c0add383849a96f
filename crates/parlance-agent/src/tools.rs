//! Tool handlers and the dispatch registry.
//!
//! Each tool is a named operation the language model may invoke with a
//! loosely-typed argument bag. Handlers read or update session state and the
//! record stores and return a short reply. Every failure a handler can hit
//! is converted into an error-shaped reply at this boundary; nothing
//! reachable from a tool call panics or surfaces a raw error to the caller.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::debug;
use uuid::Uuid;

use parlance_store::{Catalog, CheckInRepository, LeadStore, OrderStore, ProductFilter};

use parlance_core::types::CheckIn;

use crate::args::{ToolArgs, SEARCH_KEYS};
use crate::session::{SessionManager, SessionState, REQUIRED_LEAD_FIELDS};

// =============================================================================
// Replies
// =============================================================================

/// Outcome of one tool invocation.
///
/// `message` is the human-facing sentence to speak; `data` carries the
/// structured payload embedded in the rendered reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolReply {
    pub success: bool,
    pub message: String,
    pub data: Map<String, Value>,
}

impl ToolReply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Map::new(),
        }
    }

    pub fn ok_with(message: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: Map::new(),
        }
    }

    /// Render as the JSON string returned to the model.
    pub fn render(&self) -> String {
        let mut object = Map::new();
        object.insert("success".to_string(), Value::Bool(self.success));
        object.insert("message".to_string(), Value::String(self.message.clone()));
        for (key, value) in &self.data {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object).to_string()
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// A named operation exposed to the language model.
pub trait ToolHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn call(&self, args: &ToolArgs, session: &mut SessionState) -> ToolReply;
}

/// Registry of tool handlers plus the session holder they share.
pub struct ToolRegistry {
    handlers: HashMap<&'static str, Arc<dyn ToolHandler>>,
    sessions: Arc<SessionManager>,
}

impl ToolRegistry {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self {
            handlers: HashMap::new(),
            sessions,
        }
    }

    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        self.handlers.insert(handler.name(), handler);
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Invoke a tool by name against the given session.
    ///
    /// Unknown tool names yield an error-shaped reply rather than an error.
    pub fn dispatch(&self, session_id: Uuid, name: &str, args: &ToolArgs) -> ToolReply {
        let handler = match self.handlers.get(name) {
            Some(h) => Arc::clone(h),
            None => {
                debug!(tool = name, "Unknown tool requested");
                return ToolReply::fail(format!("I don't have a tool named '{}'.", name));
            }
        };
        self.sessions
            .with_session(session_id, |state| handler.call(args, state))
    }
}

// =============================================================================
// Commerce tools
// =============================================================================

/// Browse the catalog with optional filters and a search term.
pub struct BrowseProducts {
    catalog: Arc<Catalog>,
}

impl BrowseProducts {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

impl ToolHandler for BrowseProducts {
    fn name(&self) -> &'static str {
        "browse_products"
    }

    fn call(&self, args: &ToolArgs, _session: &mut SessionState) -> ToolReply {
        let search = args.string(&SEARCH_KEYS);
        let filter = ProductFilter {
            category: args.string(&["category"]),
            max_price: args.integer(&["max_price"]),
            color: args.string(&["color"]).map(|c| c.to_lowercase()),
            in_stock: args.boolean(&["in_stock"]),
            search: search.clone(),
        };

        let products = self.catalog.list(&filter);
        if products.is_empty() {
            let message = match search {
                Some(term) => format!("No products found matching '{}'.", term),
                None => "No products found.".to_string(),
            };
            let mut data = Map::new();
            data.insert("products".to_string(), Value::Array(Vec::new()));
            return ToolReply::ok_with(message, data);
        }

        let summaries: Vec<Value> = products
            .iter()
            .map(|p| {
                let mut summary = Map::new();
                summary.insert("id".to_string(), json!(p.id));
                summary.insert("name".to_string(), json!(p.name));
                summary.insert("price".to_string(), json!(p.price));
                summary.insert("currency".to_string(), json!(p.currency));
                summary.insert("color".to_string(), json!(p.color));
                summary.insert("in_stock".to_string(), json!(p.in_stock));
                summary.insert("description".to_string(), json!(p.description));
                if let Some(ref size) = p.size {
                    summary.insert("size".to_string(), json!(size));
                }
                Value::Object(summary)
            })
            .collect();

        let mut data = Map::new();
        data.insert("products".to_string(), Value::Array(summaries));
        ToolReply::ok_with(format!("Found {} products.", products.len()), data)
    }
}

/// Place an order from a single-item or list-style payload.
pub struct PlaceOrder {
    catalog: Arc<Catalog>,
    orders: Arc<OrderStore>,
}

impl PlaceOrder {
    pub fn new(catalog: Arc<Catalog>, orders: Arc<OrderStore>) -> Self {
        Self { catalog, orders }
    }
}

impl ToolHandler for PlaceOrder {
    fn name(&self) -> &'static str {
        "place_order"
    }

    fn call(&self, args: &ToolArgs, session: &mut SessionState) -> ToolReply {
        let requests = args.line_items();
        if requests.is_empty() {
            return ToolReply::fail(
                "No valid product items found in payload. Provide 'product_id' or \
                 'order_details' list.",
            );
        }

        // Validate existence and stock up front so the reply can name every
        // problem at once.
        let mut bad = Vec::new();
        for request in &requests {
            match self.catalog.get(&request.product_id) {
                None => bad.push(format!("{} (not found)", request.product_id)),
                Some(p) if !p.in_stock => bad.push(format!("{} (out of stock)", p.name)),
                Some(_) => {}
            }
        }
        if !bad.is_empty() {
            return ToolReply::fail(format!(
                "Cannot place order due to invalid items: {}",
                bad.join("; ")
            ));
        }

        let order = match self.orders.create(&self.catalog, &requests) {
            Ok(order) => order,
            Err(e) => return ToolReply::fail(format!("Failed to create order: {}", e)),
        };

        session.current_subject = Some(order.id);

        let mut data = Map::new();
        data.insert("order_id".to_string(), json!(order.id));
        data.insert("total".to_string(), json!(order.total));
        data.insert("currency".to_string(), json!(order.currency));
        data.insert("status".to_string(), json!(order.status));
        ToolReply::ok_with(
            format!(
                "Order placed: {}. Total {} {}.",
                order.items_summary(),
                order.total,
                order.currency
            ),
            data,
        )
    }
}

/// Return the most recent order.
pub struct GetLastOrder {
    orders: Arc<OrderStore>,
}

impl GetLastOrder {
    pub fn new(orders: Arc<OrderStore>) -> Self {
        Self { orders }
    }
}

impl ToolHandler for GetLastOrder {
    fn name(&self) -> &'static str {
        "get_last_order"
    }

    fn call(&self, _args: &ToolArgs, _session: &mut SessionState) -> ToolReply {
        let order = match self.orders.last() {
            Ok(order) => order,
            Err(e) => return ToolReply::fail(format!("Failed to read order history: {}", e)),
        };
        let Some(order) = order else {
            return ToolReply::ok("No previous orders found.");
        };

        let mut data = Map::new();
        data.insert("order_id".to_string(), json!(order.id));
        data.insert("total".to_string(), json!(order.total));
        data.insert("currency".to_string(), json!(order.currency));
        data.insert("status".to_string(), json!(order.status));
        ToolReply::ok_with(
            format!(
                "Your last order was on {} for {} {}. Items: {}.",
                order.created_at.format("%Y-%m-%d"),
                order.total,
                order.currency,
                order.items_summary()
            ),
            data,
        )
    }
}

/// Return order history with an optional limit.
pub struct GetOrderHistory {
    orders: Arc<OrderStore>,
    default_limit: usize,
}

impl GetOrderHistory {
    pub fn new(orders: Arc<OrderStore>, default_limit: usize) -> Self {
        Self {
            orders,
            default_limit,
        }
    }
}

impl ToolHandler for GetOrderHistory {
    fn name(&self) -> &'static str {
        "get_order_history"
    }

    fn call(&self, args: &ToolArgs, _session: &mut SessionState) -> ToolReply {
        let limit = args
            .integer_or(&["limit"], self.default_limit as i64)
            .max(1) as usize;

        let orders = match self.orders.history(Some(limit)) {
            Ok(orders) => orders,
            Err(e) => return ToolReply::fail(format!("Failed to read order history: {}", e)),
        };
        if orders.is_empty() {
            return ToolReply::ok("No order history available.");
        }

        let total_spent: i64 = orders.iter().map(|o| o.total).sum();
        let history: Vec<Value> = orders
            .iter()
            .map(|o| {
                json!({
                    "date": o.created_at.format("%Y-%m-%d").to_string(),
                    "total": o.total,
                    "items": o.items_summary(),
                })
            })
            .collect();

        let mut data = Map::new();
        data.insert("orders".to_string(), Value::Array(history));
        data.insert("total_orders".to_string(), json!(orders.len()));
        data.insert("total_spent".to_string(), json!(total_spent));
        ToolReply::ok_with(format!("Found {} past orders.", orders.len()), data)
    }
}

// =============================================================================
// Lead capture tool
// =============================================================================

/// Multi-turn lead collection form.
///
/// Fields may arrive across any number of calls in any order; the session
/// accumulates them. Once name, company, and email are present the tool asks
/// for confirmation, and a call carrying `confirm: true` persists the lead.
pub struct CaptureLead {
    leads: Arc<LeadStore>,
}

impl CaptureLead {
    pub fn new(leads: Arc<LeadStore>) -> Self {
        Self { leads }
    }
}

impl ToolHandler for CaptureLead {
    fn name(&self) -> &'static str {
        "capture_lead"
    }

    fn call(&self, args: &ToolArgs, session: &mut SessionState) -> ToolReply {
        let field_synonyms: [(&str, &[&str]); 5] = [
            ("name", &["name", "full_name"]),
            ("company", &["company", "organization"]),
            ("email", &["email", "email_address"]),
            ("phone", &["phone", "phone_number"]),
            ("interest", &["interest", "notes"]),
        ];
        for (field, keys) in field_synonyms {
            if let Some(value) = args.string(keys) {
                session.set_field(field, value);
            }
        }

        let confirm = args.boolean(&["confirm", "save"]).unwrap_or(false);
        if confirm {
            let Some(draft) = session.lead_draft() else {
                return ToolReply::fail(format!(
                    "Cannot save the lead yet; still missing: {}.",
                    session.missing(&REQUIRED_LEAD_FIELDS).join(", ")
                ));
            };
            let lead = match self.leads.create(draft) {
                Ok(lead) => lead,
                Err(e) => return ToolReply::fail(format!("Failed to save lead: {}", e)),
            };
            session.confirm();
            session.current_subject = Some(lead.id);

            let mut data = Map::new();
            data.insert("lead_id".to_string(), json!(lead.id));
            data.insert("status".to_string(), json!(lead.status));
            return ToolReply::ok_with(
                format!("Lead saved for {} at {}.", lead.name, lead.company),
                data,
            );
        }

        let collected = session.collected();
        let missing = session.missing(&REQUIRED_LEAD_FIELDS);
        let mut data = Map::new();
        data.insert("collected".to_string(), json!(collected));
        data.insert("missing".to_string(), json!(missing));

        if missing.is_empty() {
            let name = session.field("name").unwrap_or_default().to_string();
            let company = session.field("company").unwrap_or_default().to_string();
            ToolReply::ok_with(
                format!(
                    "I have everything I need for {} at {}. Shall I save this lead?",
                    name, company
                ),
                data,
            )
        } else {
            ToolReply::ok_with(format!("Got it. I still need: {}.", missing.join(", ")), data)
        }
    }
}

// =============================================================================
// Wellness check-in tool
// =============================================================================

/// Log a wellness check-in entry.
pub struct LogCheckIn {
    checkins: Arc<CheckInRepository>,
}

impl LogCheckIn {
    pub fn new(checkins: Arc<CheckInRepository>) -> Self {
        Self { checkins }
    }
}

impl ToolHandler for LogCheckIn {
    fn name(&self) -> &'static str {
        "log_checkin"
    }

    fn call(&self, args: &ToolArgs, _session: &mut SessionState) -> ToolReply {
        let Some(mood) = args.string(&["mood", "feeling"]) else {
            return ToolReply::fail("I need to know how you're feeling to log a check-in.");
        };
        let energy = args.integer_or(&["energy", "energy_level"], 3).clamp(1, 5) as u8;
        let note = args.string(&["note", "notes"]).unwrap_or_default();

        let checkin = CheckIn::new(mood, energy, note);
        if let Err(e) = self.checkins.save(&checkin) {
            return ToolReply::fail(format!("Failed to log check-in: {}", e));
        }

        let mut data = Map::new();
        data.insert("checkin_id".to_string(), json!(checkin.id));
        ToolReply::ok_with(
            format!(
                "Check-in logged: feeling {}, energy {}/5.",
                checkin.mood, checkin.energy
            ),
            data,
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parlance_store::{default_catalog, Database};
    use serde_json::json;

    struct Fixture {
        _dir: tempfile::TempDir,
        registry: ToolRegistry,
        orders: Arc<OrderStore>,
        leads: Arc<LeadStore>,
        checkins: Arc<CheckInRepository>,
        session_id: Uuid,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Arc::new(default_catalog());
        let orders = Arc::new(OrderStore::new(dir.path().join("orders.json")));
        let leads = Arc::new(LeadStore::new(dir.path().join("leads.json")));
        let checkins = Arc::new(CheckInRepository::new(Arc::new(
            Database::in_memory().unwrap(),
        )));

        let sessions = Arc::new(SessionManager::new());
        let mut registry = ToolRegistry::new(sessions);
        registry.register(Arc::new(BrowseProducts::new(Arc::clone(&catalog))));
        registry.register(Arc::new(PlaceOrder::new(
            Arc::clone(&catalog),
            Arc::clone(&orders),
        )));
        registry.register(Arc::new(GetLastOrder::new(Arc::clone(&orders))));
        registry.register(Arc::new(GetOrderHistory::new(Arc::clone(&orders), 5)));
        registry.register(Arc::new(CaptureLead::new(Arc::clone(&leads))));
        registry.register(Arc::new(LogCheckIn::new(Arc::clone(&checkins))));

        Fixture {
            _dir: dir,
            registry,
            orders,
            leads,
            checkins,
            session_id: Uuid::new_v4(),
        }
    }

    fn dispatch(f: &Fixture, tool: &str, args: Value) -> ToolReply {
        f.registry.dispatch(f.session_id, tool, &ToolArgs::new(args))
    }

    #[test]
    fn test_unknown_tool_is_error_shaped_reply() {
        let f = fixture();
        let reply = dispatch(&f, "cancel_subscription", json!({}));
        assert!(!reply.success);
        assert!(reply.message.contains("cancel_subscription"));
    }

    #[test]
    fn test_registry_tool_names_sorted() {
        let f = fixture();
        assert_eq!(
            f.registry.tool_names(),
            vec![
                "browse_products",
                "capture_lead",
                "get_last_order",
                "get_order_history",
                "log_checkin",
                "place_order",
            ]
        );
    }

    #[test]
    fn test_browse_products_with_search() {
        let f = fixture();
        let reply = dispatch(&f, "browse_products", json!({"search": "coffee mug"}));
        assert!(reply.success);
        // Phrase search hits mug-001 and mug-003 by name.
        assert!(reply.message.starts_with("Found"));
        let products = reply.data.get("products").unwrap().as_array().unwrap();
        assert_eq!(products.len(), 2);
    }

    #[test]
    fn test_browse_products_no_match_message_names_term() {
        let f = fixture();
        let reply = dispatch(&f, "browse_products", json!({"q": "submarine"}));
        assert!(reply.success);
        assert_eq!(reply.message, "No products found matching 'submarine'.");
        assert!(reply.data.get("products").unwrap().as_array().unwrap().is_empty());
    }

    #[test]
    fn test_browse_products_filters() {
        let f = fixture();
        let reply = dispatch(
            &f,
            "browse_products",
            json!({"category": "clothing", "max_price": "900"}),
        );
        let products = reply.data.get("products").unwrap().as_array().unwrap();
        assert_eq!(products.len(), 2);
    }

    #[test]
    fn test_place_order_single_item_payload() {
        let f = fixture();
        let reply = dispatch(&f, "place_order", json!({"product_id": "mug-001", "quantity": 2}));
        assert!(reply.success, "{}", reply.message);
        assert!(reply.message.contains("Total 1600 INR"));
        assert_eq!(reply.data.get("total").unwrap(), &json!(1600));

        // The session now references the created order.
        let state = f.registry.sessions().snapshot(f.session_id).unwrap();
        assert!(state.current_subject.is_some());
    }

    #[test]
    fn test_place_order_list_payload_with_synonyms() {
        let f = fixture();
        let reply = dispatch(
            &f,
            "place_order",
            json!({"order_details": [
                {"id": "hoodie-002", "qty": "2"},
                {"product": "mug-002"}
            ]}),
        );
        assert!(reply.success, "{}", reply.message);
        // 2 x 1800 + 1 x 650.
        assert_eq!(reply.data.get("total").unwrap(), &json!(4250));
    }

    #[test]
    fn test_place_order_empty_payload_cannot_proceed() {
        let f = fixture();
        let reply = dispatch(&f, "place_order", json!({}));
        assert!(!reply.success);
        assert!(reply.message.contains("No valid product items"));
        assert!(f.orders.list().unwrap().is_empty());
    }

    #[test]
    fn test_place_order_invalid_items_named_in_reply() {
        let f = fixture();
        let reply = dispatch(
            &f,
            "place_order",
            json!({"items": [
                {"product_id": "mug-001"},
                {"product_id": "missing-1"}
            ]}),
        );
        assert!(!reply.success);
        assert!(reply.message.contains("missing-1 (not found)"));
        // Nothing was written.
        assert!(f.orders.list().unwrap().is_empty());
    }

    #[test]
    fn test_get_last_order_empty_then_populated() {
        let f = fixture();
        let reply = dispatch(&f, "get_last_order", json!({}));
        assert!(reply.success);
        assert_eq!(reply.message, "No previous orders found.");

        dispatch(&f, "place_order", json!({"product_id": "tshirt-001"}));
        let reply = dispatch(&f, "get_last_order", json!({}));
        assert!(reply.message.contains("450 INR"));
        assert!(reply.message.contains("1 x Cotton Crew Neck T-Shirt"));
    }

    #[test]
    fn test_order_history_aggregates_total_spent() {
        let f = fixture();
        dispatch(&f, "place_order", json!({"product_id": "mug-001"}));
        dispatch(&f, "place_order", json!({"product_id": "mug-002", "quantity": 2}));

        let reply = dispatch(&f, "get_order_history", json!({"limit": "10"}));
        assert!(reply.success);
        assert_eq!(reply.data.get("total_orders").unwrap(), &json!(2));
        assert_eq!(reply.data.get("total_spent").unwrap(), &json!(800 + 1300));
    }

    #[test]
    fn test_order_history_empty() {
        let f = fixture();
        let reply = dispatch(&f, "get_order_history", json!({"limit": "not a number"}));
        assert!(reply.success);
        assert_eq!(reply.message, "No order history available.");
    }

    #[test]
    fn test_capture_lead_multi_turn_flow() {
        let f = fixture();

        let reply = dispatch(&f, "capture_lead", json!({"name": "Asha Rao"}));
        assert!(reply.success);
        assert!(reply.message.contains("company, email"));

        let reply = dispatch(
            &f,
            "capture_lead",
            json!({"organization": "Acme Tooling", "email_address": "asha@acme.example"}),
        );
        assert!(reply.message.contains("Shall I save this lead?"));
        assert!(reply.data.get("missing").unwrap().as_array().unwrap().is_empty());

        let reply = dispatch(&f, "capture_lead", json!({"confirm": true}));
        assert!(reply.success, "{}", reply.message);
        assert!(reply.message.contains("Asha Rao"));
        assert_eq!(f.leads.list().unwrap().len(), 1);
        assert_eq!(f.leads.list().unwrap()[0].company, "Acme Tooling");
    }

    #[test]
    fn test_capture_lead_confirm_too_early_fails_without_write() {
        let f = fixture();
        dispatch(&f, "capture_lead", json!({"name": "Asha"}));

        let reply = dispatch(&f, "capture_lead", json!({"confirm": "yes"}));
        assert!(!reply.success);
        assert!(reply.message.contains("company"));
        assert!(reply.message.contains("email"));
        assert!(f.leads.list().unwrap().is_empty());
    }

    #[test]
    fn test_capture_lead_fields_in_one_call() {
        let f = fixture();
        let reply = dispatch(
            &f,
            "capture_lead",
            json!({
                "name": "Ravi",
                "company": "Solo",
                "email": "ravi@solo.example",
                "confirm": true
            }),
        );
        assert!(reply.success, "{}", reply.message);
        assert_eq!(f.leads.list().unwrap().len(), 1);
    }

    #[test]
    fn test_log_checkin() {
        let f = fixture();
        let reply = dispatch(
            &f,
            "log_checkin",
            json!({"feeling": "calm", "energy": "4", "note": "slept well"}),
        );
        assert!(reply.success, "{}", reply.message);
        assert!(reply.message.contains("energy 4/5"));
        assert_eq!(f.checkins.count().unwrap(), 1);
    }

    #[test]
    fn test_log_checkin_without_mood_cannot_proceed() {
        let f = fixture();
        let reply = dispatch(&f, "log_checkin", json!({"energy": 5}));
        assert!(!reply.success);
        assert_eq!(f.checkins.count().unwrap(), 0);
    }

    #[test]
    fn test_log_checkin_energy_out_of_range_clamped() {
        let f = fixture();
        let reply = dispatch(&f, "log_checkin", json!({"mood": "wired", "energy": 12}));
        assert!(reply.success);
        assert!(reply.message.contains("energy 5/5"));
    }

    #[test]
    fn test_reply_render_embeds_structured_json() {
        let mut data = Map::new();
        data.insert("order_id".to_string(), json!("abc"));
        let reply = ToolReply::ok_with("Order placed.", data);

        let rendered: Value = serde_json::from_str(&reply.render()).unwrap();
        assert_eq!(rendered.get("success").unwrap(), &json!(true));
        assert_eq!(rendered.get("message").unwrap(), &json!("Order placed."));
        assert_eq!(rendered.get("order_id").unwrap(), &json!("abc"));
    }
}
