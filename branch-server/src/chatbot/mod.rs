//! Rule-based query façade
//!
//! Answers a fixed set of analytical questions about inventory, orders and
//! sales. Not a language model: lower-cased trimmed input runs through an
//! ordered `(predicate, handler)` list, first match wins, anything else
//! falls through to a help response. Every answer is a human-readable
//! summary string plus an optional structured payload.

use chrono::Utc;
use serde_json::{Value, json};
use shared::models::StockStatus;
use shared::util;

use crate::db;
use crate::db::sale::Granularity;
use crate::error::ServiceResult;
use crate::state::AppState;

/// Façade answer; `data` is `None` on no-result paths
#[derive(Debug, Clone)]
pub struct Answer {
    pub response: String,
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Inventory,
    Orders,
    Sales,
}

/// Ordered rule list; priority is inventory → orders → sales
const RULES: &[(fn(&str) -> bool, Category)] = &[
    (is_inventory_query, Category::Inventory),
    (is_order_query, Category::Orders),
    (is_sales_query, Category::Sales),
];

fn is_inventory_query(q: &str) -> bool {
    ["inventory", "stock", "product", "item"]
        .iter()
        .any(|k| q.contains(k))
}

fn is_order_query(q: &str) -> bool {
    ["order", "purchase"].iter().any(|k| q.contains(k))
}

fn is_sales_query(q: &str) -> bool {
    ["sale", "revenue", "earning"].iter().any(|k| q.contains(k))
}

/// First matching category, or `None` for the help fallback
pub fn match_category(query: &str) -> Option<Category> {
    let q = query.trim().to_lowercase();
    RULES
        .iter()
        .find(|(predicate, _)| predicate(&q))
        .map(|(_, category)| *category)
}

/// Trailing time window for order queries, in days
pub fn parse_window_days(query: &str) -> (i64, &'static str) {
    let q = query.to_lowercase();
    if q.contains("year") {
        (365, "year")
    } else if q.contains("week") {
        (7, "week")
    } else {
        // "month" and the default share the 30-day window
        (30, "month")
    }
}

/// Aggregation granularity for sales queries
pub fn parse_granularity(query: &str) -> Granularity {
    let q = query.to_lowercase();
    if q.contains("day") || q.contains("daily") {
        Granularity::Day
    } else if q.contains("month") {
        Granularity::Month
    } else {
        Granularity::Week
    }
}

fn branch_label(branch: Option<&str>) -> &str {
    branch.unwrap_or("all branches")
}

/// Answer a query. Errors propagate to the route boundary, which converts
/// them into the apology response; nothing here panics past it.
pub async fn answer(state: &AppState, query: &str, branch: Option<&str>) -> ServiceResult<Answer> {
    match match_category(query) {
        Some(Category::Inventory) => inventory_answer(state, branch).await,
        Some(Category::Orders) => orders_answer(state, query, branch).await,
        Some(Category::Sales) => sales_answer(state, query, branch).await,
        None => Ok(help_answer()),
    }
}

async fn inventory_answer(state: &AppState, branch: Option<&str>) -> ServiceResult<Answer> {
    let products = db::product::list_products(&state.pool, branch).await?;
    let label = branch_label(branch);

    if products.is_empty() {
        return Ok(Answer {
            response: format!("No products found for {label}."),
            data: None,
        });
    }

    let mut in_stock = 0;
    let mut low_stock = 0;
    let mut out_of_stock = 0;
    let mut total_value = 0.0;
    for p in &products {
        match p.status {
            StockStatus::InStock => in_stock += 1,
            StockStatus::LowStock => low_stock += 1,
            StockStatus::OutOfStock => out_of_stock += 1,
        }
        total_value += p.price * p.stock as f64;
    }

    let mut by_value = products.clone();
    by_value.sort_by(|a, b| {
        let va = a.price * a.stock as f64;
        let vb = b.price * b.stock as f64;
        vb.partial_cmp(&va).unwrap_or(std::cmp::Ordering::Equal)
    });
    let top_products: Vec<Value> = by_value
        .iter()
        .take(5)
        .map(|p| {
            json!({
                "name": p.name,
                "stock": p.stock,
                "value": p.price * p.stock as f64,
            })
        })
        .collect();

    Ok(Answer {
        response: format!(
            "Inventory for {label}: {} products. In stock: {in_stock}, low stock: {low_stock}, \
             out of stock: {out_of_stock}. Total inventory value: ${total_value:.2}.",
            products.len()
        ),
        data: Some(json!({
            "totalProducts": products.len(),
            "inStock": in_stock,
            "lowStock": low_stock,
            "outOfStock": out_of_stock,
            "totalValue": total_value,
            "topProducts": top_products,
        })),
    })
}

pub fn no_orders_ever_message(label: &str) -> String {
    format!("No order records found for {label}.")
}

pub fn no_orders_in_window_message(label: &str, window: &str) -> String {
    format!("No completed orders for {label} in the last {window}.")
}

async fn orders_answer(
    state: &AppState,
    query: &str,
    branch: Option<&str>,
) -> ServiceResult<Answer> {
    let label = branch_label(branch).to_string();

    if !db::order::has_any_orders(&state.pool, branch).await? {
        return Ok(Answer {
            response: no_orders_ever_message(&label),
            data: None,
        });
    }

    let (days, window) = parse_window_days(query);
    let since = util::now_millis() - days * 86_400_000;

    let stats = db::order::completed_order_stats(&state.pool, branch, since).await?;
    if stats.count == 0 {
        return Ok(Answer {
            response: no_orders_in_window_message(&label, window),
            data: None,
        });
    }

    let average = stats.revenue / stats.count as f64;
    let recent = db::order::recent_completed_orders(&state.pool, branch, since, 5).await?;

    Ok(Answer {
        response: format!(
            "{} completed orders in the last {window} for {label}. \
             Revenue: ${:.2}, average order: ${average:.2}.",
            stats.count, stats.revenue
        ),
        data: Some(json!({
            "count": stats.count,
            "revenue": stats.revenue,
            "average": average,
            "recentOrders": recent,
        })),
    })
}

async fn sales_answer(
    state: &AppState,
    query: &str,
    branch: Option<&str>,
) -> ServiceResult<Answer> {
    let label = branch_label(branch).to_string();
    let granularity = parse_granularity(query);
    let since = util::now_millis() - granularity.window_millis();

    let records = db::sale::fetch_sales_since(&state.pool, branch, since).await?;
    if records.is_empty() {
        return Ok(Answer {
            response: format!("No sales data found for {label}."),
            data: None,
        });
    }

    let buckets = db::sale::period_buckets(&records, granularity, Utc::now());
    let total: f64 = buckets.iter().map(|b| b.total).sum();
    let average = total / buckets.len() as f64;
    let unit = match granularity {
        Granularity::Day => "day",
        Granularity::Week => "week",
        Granularity::Month => "month",
    };

    Ok(Answer {
        response: format!(
            "Sales for {label} over the last 7 {unit}s: ${total:.2} total, \
             ${average:.2} per {unit}."
        ),
        data: Some(json!({
            "granularity": unit,
            "buckets": buckets,
            "total": total,
            "average": average,
        })),
    })
}

fn help_answer() -> Answer {
    Answer {
        response: "I can answer questions about inventory, orders, and sales. Try: \
                   \"How is our inventory?\", \"Show orders from the last week\", or \
                   \"Sales by month\"."
            .to_string(),
        data: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_priority_first_match_wins() {
        assert_eq!(
            match_category("How is our inventory?"),
            Some(Category::Inventory)
        );
        assert_eq!(
            match_category("show ORDERS from last week"),
            Some(Category::Orders)
        );
        assert_eq!(match_category("sales by month"), Some(Category::Sales));
        // inventory outranks sales when both keywords appear
        assert_eq!(
            match_category("sales of low stock products"),
            Some(Category::Inventory)
        );
        // orders outrank sales
        assert_eq!(
            match_category("order revenue this month"),
            Some(Category::Orders)
        );
        assert_eq!(match_category("what is the weather"), None);
    }

    #[test]
    fn window_parsing() {
        assert_eq!(parse_window_days("orders this week"), (7, "week"));
        assert_eq!(parse_window_days("orders this month"), (30, "month"));
        assert_eq!(parse_window_days("orders this year"), (365, "year"));
        assert_eq!(parse_window_days("orders"), (30, "month"));
    }

    #[test]
    fn granularity_parsing() {
        assert_eq!(parse_granularity("sales per day"), Granularity::Day);
        assert_eq!(parse_granularity("daily sales"), Granularity::Day);
        assert_eq!(parse_granularity("monthly sales"), Granularity::Month);
        assert_eq!(parse_granularity("sales"), Granularity::Week);
    }

    #[test]
    fn no_data_messages_are_distinct() {
        let ever = no_orders_ever_message("Downtown");
        let window = no_orders_in_window_message("Downtown", "week");
        assert_eq!(ever, "No order records found for Downtown.");
        assert_ne!(ever, window);
        assert!(window.contains("week"));
    }

    #[test]
    fn help_fallback_names_supported_shapes() {
        let help = help_answer();
        assert!(help.data.is_none());
        for topic in ["inventory", "orders", "sales"] {
            assert!(help.response.contains(topic));
        }
    }
}
