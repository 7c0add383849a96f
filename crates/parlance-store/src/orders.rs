//! JSON-file-backed order store.
//!
//! Every mutation loads the full array, applies the change, and rewrites the
//! file. The read-modify-write cycle is guarded by a per-store mutex so two
//! concurrent creates cannot discard each other's append; the scripts this
//! replaces left that cycle unguarded.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use parlance_core::error::{ParlanceError, Result};
use parlance_core::types::{LineItem, Order};

use crate::catalog::Catalog;
use crate::sink::{read_records, write_records};

/// A requested order line before catalog resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

/// File-backed store for orders.
pub struct OrderStore {
    path: PathBuf,
    // Held across the whole load-mutate-rewrite cycle.
    lock: Mutex<()>,
}

impl OrderStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Create an order from line-item requests.
    ///
    /// Resolves each product id against the catalog; fails with `NotFound`
    /// for an unknown id and `BusinessRule` for an out-of-stock product. On
    /// any failure nothing is written. Totals are derived from catalog
    /// prices, never from caller input.
    pub fn create(&self, catalog: &Catalog, requests: &[LineItemRequest]) -> Result<Order> {
        if requests.is_empty() {
            return Err(ParlanceError::Validation(
                "order has no line items".to_string(),
            ));
        }

        let mut items = Vec::with_capacity(requests.len());
        let mut currency = "INR".to_string();
        for request in requests {
            let product = catalog.get(&request.product_id).ok_or_else(|| {
                ParlanceError::NotFound(format!("product {}", request.product_id))
            })?;
            if !product.in_stock {
                return Err(ParlanceError::BusinessRule(format!(
                    "{} is out of stock",
                    product.name
                )));
            }
            let quantity = request.quantity.max(1);
            currency = product.currency.clone();
            items.push(LineItem::from_product(product, quantity));
        }

        let order = Order::new(items, currency, "Voice Customer".to_string());

        let _guard = self
            .lock
            .lock()
            .map_err(|e| ParlanceError::Storage(format!("order store lock poisoned: {}", e)))?;
        let mut orders: Vec<Order> = read_records(&self.path);
        orders.push(order.clone());
        write_records(&self.path, &orders)?;

        info!(order_id = %order.id, total = order.total, "Order created");
        Ok(order)
    }

    /// All orders in insertion order.
    pub fn list(&self) -> Result<Vec<Order>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| ParlanceError::Storage(format!("order store lock poisoned: {}", e)))?;
        Ok(read_records(&self.path))
    }

    /// Order history, newest first, truncated to `limit` when given.
    pub fn history(&self, limit: Option<usize>) -> Result<Vec<Order>> {
        let mut orders = self.list()?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            orders.truncate(limit);
        }
        Ok(orders)
    }

    /// The most recent order, if any.
    pub fn last(&self) -> Result<Option<Order>> {
        Ok(self.history(Some(1))?.into_iter().next())
    }

    /// Apply a mutation to the order with the given id and persist.
    ///
    /// Stamps `last_updated` after the mutator runs. Fails with `NotFound`
    /// if no order matches.
    pub fn update<F>(&self, id: Uuid, mutator: F) -> Result<Order>
    where
        F: FnOnce(&mut Order),
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| ParlanceError::Storage(format!("order store lock poisoned: {}", e)))?;
        let mut orders: Vec<Order> = read_records(&self.path);
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| ParlanceError::NotFound(format!("order {}", id)))?;

        mutator(order);
        order.last_updated = Some(Utc::now());
        let updated = order.clone();

        write_records(&self.path, &orders)?;
        Ok(updated)
    }
}
