//! BranchSync shared types
//!
//! Common foundation used by the server (and any future clients):
//!
//! - **error**: unified error codes, `AppError`, `ApiResponse`
//! - **models**: Product / Order / Sale / Notification entities and payloads
//! - **live**: real-time event catalog and client commands
//! - **util**: timestamps, snowflake IDs, order/sale code generation

pub mod error;
pub mod live;
pub mod models;
pub mod util;

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use live::{ClientCommand, LiveEvent, StockAlertType};
