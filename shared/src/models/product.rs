//! Product Model

use serde::{Deserialize, Serialize};

/// Stock-derived product status
///
/// Always a pure function of `(stock, min_stock)` — never independently
/// settable. Every write path recomputes it from the resulting record
/// before persisting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StockStatus {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

impl StockStatus {
    /// Derive status from the stock level and reorder threshold.
    ///
    /// - `stock == 0` → Out of Stock
    /// - `0 < stock <= min_stock` → Low Stock
    /// - otherwise → In Stock
    pub fn derive(stock: i32, min_stock: i32) -> Self {
        if stock == 0 {
            Self::OutOfStock
        } else if stock <= min_stock {
            Self::LowStock
        } else {
            Self::InStock
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InStock => "In Stock",
            Self::LowStock => "Low Stock",
            Self::OutOfStock => "Out of Stock",
        }
    }

    /// Parse the persisted label back into a status
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "In Stock" => Some(Self::InStock),
            "Low Stock" => Some(Self::LowStock),
            "Out of Stock" => Some(Self::OutOfStock),
            _ => None,
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Branch key identifying the location this product belongs to
    pub branch: String,
    /// Unit price in currency unit
    pub price: f64,
    /// Current on-hand quantity
    pub stock: i32,
    /// Reorder threshold
    pub min_stock: i32,
    /// Derived from `(stock, min_stock)`, persisted for display/query
    pub status: StockStatus,
    /// Millis since epoch
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    pub branch: String,
    pub price: f64,
    pub stock: i32,
    #[serde(default)]
    pub min_stock: i32,
}

/// Update product payload (partial; absent fields keep their value)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub branch: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    pub min_stock: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_partitions_every_input() {
        // Exhaustive over a generous grid: exactly one of the three labels,
        // following the three-way rule.
        for stock in 0..50 {
            for min_stock in 0..50 {
                let status = StockStatus::derive(stock, min_stock);
                let expected = if stock == 0 {
                    StockStatus::OutOfStock
                } else if stock <= min_stock {
                    StockStatus::LowStock
                } else {
                    StockStatus::InStock
                };
                assert_eq!(status, expected, "stock={stock} min_stock={min_stock}");
            }
        }
    }

    #[test]
    fn derive_is_deterministic() {
        assert_eq!(StockStatus::derive(10, 2), StockStatus::derive(10, 2));
        assert_eq!(StockStatus::derive(0, 0), StockStatus::OutOfStock);
        // Boundary: stock == min_stock and both positive is Low Stock
        assert_eq!(StockStatus::derive(5, 5), StockStatus::LowStock);
        assert_eq!(StockStatus::derive(6, 5), StockStatus::InStock);
    }

    #[test]
    fn status_label_roundtrip() {
        for status in [
            StockStatus::InStock,
            StockStatus::LowStock,
            StockStatus::OutOfStock,
        ] {
            assert_eq!(StockStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(StockStatus::parse("Discontinued"), None);
    }

    #[test]
    fn serde_uses_display_labels() {
        let json = serde_json::to_string(&StockStatus::LowStock).unwrap();
        assert_eq!(json, "\"Low Stock\"");
    }
}
