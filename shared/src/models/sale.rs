//! Sale Model
//!
//! Secondary ledger, loosely coupled to [`super::Order`]. The order-creation
//! flow does not populate it — the schema and read-side aggregation exist,
//! the write path is a planned integration.

use serde::{Deserialize, Serialize};

/// Sale channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaleType {
    Instore,
    Online,
    Wholesale,
}

impl SaleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instore => "instore",
            Self::Online => "online",
            Self::Wholesale => "wholesale",
        }
    }
}

/// Payment method on the sale ledger (distinct enum from the order's)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SalePaymentMethod {
    Cash,
    Card,
    Mobile,
    Other,
}

/// Payment settlement state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SalePaymentStatus {
    Paid,
    Pending,
    Refunded,
}

/// Sale ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: i64,
    /// Generated code (`SALE-<millis>-<4 digits>`)
    pub sale_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
    /// Snapshot of products/quantities/prices at sale time
    pub items: serde_json::Value,
    pub customer: String,
    pub branch: String,
    pub total_amount: f64,
    pub payment_method: SalePaymentMethod,
    pub payment_status: SalePaymentStatus,
    pub sale_type: SaleType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_by: Option<String>,
    pub created_at: i64,
}
