//! BranchSync domain models
//!
//! Wire format is camelCase JSON (the SPA contract); database column names
//! stay snake_case and are mapped in the server's db layer.

pub mod notification;
pub mod order;
pub mod product;
pub mod sale;

pub use notification::{Notification, Severity};
pub use order::{Order, OrderCreate, OrderItem, OrderItemInput, OrderStatus, PaymentMethod};
pub use product::{Product, ProductCreate, ProductUpdate, StockStatus};
pub use sale::{Sale, SalePaymentMethod, SalePaymentStatus, SaleType};
