//! Immutable product catalog with conjunctive filtering.
//!
//! The catalog is loaded once at startup and passed to tool handlers as an
//! explicit dependency. Filters combine with AND semantics; an empty filter
//! returns every product in insertion order.

use std::path::Path;

use parlance_core::error::Result;
use parlance_core::types::Product;

/// Filter predicates for catalog queries. All supplied predicates must hold.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Price ceiling (inclusive).
    pub max_price: Option<i64>,
    /// Exact color match (case-insensitive).
    pub color: Option<String>,
    /// Stock availability match.
    pub in_stock: Option<bool>,
    /// Case-insensitive substring match over name, description, and category.
    pub search: Option<String>,
}

impl ProductFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.max_price.is_none()
            && self.color.is_none()
            && self.in_stock.is_none()
            && self.search.is_none()
    }
}

/// The immutable product table.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Load a catalog from a JSON array file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let products: Vec<Product> = serde_json::from_str(&content)?;
        Ok(Self { products })
    }

    /// Look up a product by id.
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Return products matching every supplied predicate, in insertion order.
    pub fn list(&self, filter: &ProductFilter) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| {
                if let Some(ref category) = filter.category {
                    if &p.category != category {
                        return false;
                    }
                }
                if let Some(max_price) = filter.max_price {
                    if p.price > max_price {
                        return false;
                    }
                }
                if let Some(ref color) = filter.color {
                    match p.color {
                        Some(ref c) if c.eq_ignore_ascii_case(color) => {}
                        _ => return false,
                    }
                }
                if let Some(in_stock) = filter.in_stock {
                    if p.in_stock != in_stock {
                        return false;
                    }
                }
                if let Some(ref term) = filter.search {
                    let term = term.to_lowercase();
                    let hit = p.name.to_lowercase().contains(&term)
                        || p.description.to_lowercase().contains(&term)
                        || p.category.to_lowercase().contains(&term);
                    if !hit {
                        return false;
                    }
                }
                true
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// The built-in demo catalog.
pub fn default_catalog() -> Catalog {
    fn product(
        id: &str,
        name: &str,
        description: &str,
        price: i64,
        category: &str,
        color: Option<&str>,
        size: Option<&str>,
    ) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            price,
            currency: "INR".to_string(),
            category: category.to_string(),
            color: color.map(str::to_string),
            size: size.map(str::to_string),
            in_stock: true,
        }
    }

    Catalog::new(vec![
        product(
            "mug-001",
            "Stoneware Coffee Mug",
            "Handcrafted ceramic mug perfect for your morning coffee",
            800,
            "mug",
            Some("white"),
            None,
        ),
        product(
            "mug-002",
            "Blue Enamel Camping Mug",
            "Durable enamel mug for outdoor adventures",
            650,
            "mug",
            Some("blue"),
            None,
        ),
        product(
            "mug-003",
            "Premium Coffee Mug Set",
            "Set of 4 elegant coffee mugs with saucers",
            1200,
            "mug",
            Some("brown"),
            None,
        ),
        product(
            "tshirt-001",
            "Cotton Crew Neck T-Shirt",
            "Soft 100% cotton t-shirt for everyday wear",
            450,
            "clothing",
            Some("black"),
            Some("M"),
        ),
        product(
            "tshirt-002",
            "Premium Organic T-Shirt",
            "Eco-friendly organic cotton t-shirt",
            850,
            "clothing",
            Some("white"),
            Some("L"),
        ),
        product(
            "hoodie-001",
            "Classic Fleece Hoodie",
            "Warm and comfortable fleece hoodie",
            1200,
            "clothing",
            Some("black"),
            Some("M"),
        ),
        product(
            "hoodie-002",
            "Sport Tech Hoodie",
            "Lightweight technical hoodie for active wear",
            1800,
            "clothing",
            Some("navy"),
            Some("L"),
        ),
    ])
}
