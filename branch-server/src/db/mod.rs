//! Database access layer
//!
//! Runtime-checked sqlx queries against PostgreSQL. Write paths receive
//! records already validated and derived by `catalog`; read paths map row
//! structs back into the shared models.

pub mod order;
pub mod product;
pub mod sale;
