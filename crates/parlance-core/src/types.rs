use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Order lifecycle states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order accepted and persisted.
    #[default]
    Confirmed,
    /// Order handed off for fulfilment.
    Fulfilled,
    /// Order cancelled after creation.
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Confirmed => write!(f, "confirmed"),
            OrderStatus::Fulfilled => write!(f, "fulfilled"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(OrderStatus::Confirmed),
            "fulfilled" => Ok(OrderStatus::Fulfilled),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(format!("Unknown order status: {}", s)),
        }
    }
}

/// Lead qualification states for the SDR flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeadStatus::New => write!(f, "new"),
            LeadStatus::Contacted => write!(f, "contacted"),
            LeadStatus::Qualified => write!(f, "qualified"),
        }
    }
}

impl std::str::FromStr for LeadStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(LeadStatus::New),
            "contacted" => Ok(LeadStatus::Contacted),
            "qualified" => Ok(LeadStatus::Qualified),
            _ => Err(format!("Unknown lead status: {}", s)),
        }
    }
}

// =============================================================================
// Catalog records
// =============================================================================

/// A product in the immutable catalog.
///
/// Prices are stored in minor currency units (whole rupees/cents) to keep
/// line-item arithmetic exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub currency: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub in_stock: bool,
}

// =============================================================================
// Order records
// =============================================================================

/// A single line of an order. `item_total` is derived, never user-supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: i64,
    pub currency: String,
    pub item_total: i64,
}

impl LineItem {
    /// Build a line item from a catalog product, computing the derived total.
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            quantity,
            unit_price: product.price,
            currency: product.currency.clone(),
            item_total: product.price * quantity as i64,
        }
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub items: Vec<LineItem>,
    pub total: i64,
    pub currency: String,
    pub buyer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Order {
    /// Assemble an order from line items, deriving the total.
    pub fn new(items: Vec<LineItem>, currency: String, buyer: String) -> Self {
        let total = items.iter().map(|i| i.item_total).sum();
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            status: OrderStatus::Confirmed,
            items,
            total,
            currency,
            buyer,
            last_updated: None,
        }
    }

    /// Short human summary of the order items, e.g. "2 x Classic Fleece Hoodie".
    pub fn items_summary(&self) -> String {
        self.items
            .iter()
            .map(|i| format!("{} x {}", i.quantity, i.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// =============================================================================
// Lead and check-in records
// =============================================================================

/// A sales lead captured through the multi-turn collection flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub company: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest: Option<String>,
    pub status: LeadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// A wellness check-in entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub mood: String,
    /// Self-reported energy level, clamped to 1..=5.
    pub energy: u8,
    pub note: String,
}

impl CheckIn {
    pub fn new(mood: String, energy: u8, note: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            mood,
            energy: energy.clamp(1, 5),
            note,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
