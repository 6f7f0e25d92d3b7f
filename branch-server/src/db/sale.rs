//! Sales ledger reads and aggregation
//!
//! The ledger has no write path from order creation; this module is
//! read-side only. Rows are fetched raw and bucketed in process so the
//! aggregation logic stays unit-testable.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc, Weekday};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::ServiceResult;

/// Minimal sale projection used by the aggregations
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SaleRecord {
    pub created_at: i64,
    pub total_amount: f64,
    pub sale_type: String,
}

pub async fn fetch_sales_since(
    pool: &PgPool,
    branch: Option<&str>,
    since: i64,
) -> ServiceResult<Vec<SaleRecord>> {
    let rows: Vec<SaleRecord> = match branch {
        Some(branch) => {
            sqlx::query_as(
                r#"
                SELECT created_at, total_amount, sale_type
                FROM sales WHERE branch = $1 AND created_at >= $2
                ORDER BY created_at
                "#,
            )
            .bind(branch)
            .bind(since)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as(
                r#"
                SELECT created_at, total_amount, sale_type
                FROM sales WHERE created_at >= $1
                ORDER BY created_at
                "#,
            )
            .bind(since)
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows)
}

// ── Weekly report (GET /sales?period=weekly) ──

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeekdaySales {
    pub name: String,
    #[serde(rename = "Total")]
    pub total: f64,
    #[serde(rename = "OnlineOrders")]
    pub online_orders: i64,
    #[serde(rename = "InStoreOrders")]
    pub in_store_orders: i64,
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Bucket sale records by weekday, Monday first. All seven buckets are
/// present even when empty.
pub fn weekday_buckets(records: &[SaleRecord]) -> Vec<WeekdaySales> {
    let days = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];
    let mut buckets: Vec<WeekdaySales> = days
        .iter()
        .map(|d| WeekdaySales {
            name: weekday_name(*d).to_string(),
            total: 0.0,
            online_orders: 0,
            in_store_orders: 0,
        })
        .collect();

    for record in records {
        let Some(ts) = Utc.timestamp_millis_opt(record.created_at).single() else {
            continue;
        };
        let idx = ts.weekday().num_days_from_monday() as usize;
        buckets[idx].total += record.total_amount;
        match record.sale_type.as_str() {
            "online" => buckets[idx].online_orders += 1,
            "instore" => buckets[idx].in_store_orders += 1,
            _ => {}
        }
    }

    buckets
}

// ── Chatbot period aggregation ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Granularity {
    /// Lookback window covering the 7 most recent buckets
    pub fn window_millis(&self) -> i64 {
        let day = 86_400_000;
        match self {
            Self::Day => 7 * day,
            Self::Week => 7 * 7 * day,
            // months vary; 7 × 31 days over-fetches slightly, bucketing trims
            Self::Month => 7 * 31 * day,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PeriodBucket {
    pub label: String,
    pub total: f64,
    pub count: i64,
}

fn bucket_label(ts: DateTime<Utc>, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day => ts.format("%Y-%m-%d").to_string(),
        Granularity::Week => {
            let iso = ts.iso_week();
            format!("{}-W{:02}", iso.year(), iso.week())
        }
        Granularity::Month => ts.format("%Y-%m").to_string(),
    }
}

fn period_start(now: DateTime<Utc>, granularity: Granularity, back: u32) -> DateTime<Utc> {
    match granularity {
        Granularity::Day => now - Duration::days(back as i64),
        Granularity::Week => now - Duration::weeks(back as i64),
        Granularity::Month => {
            let months = now.year() * 12 + now.month0() as i32 - back as i32;
            let (year, month0) = (months.div_euclid(12), months.rem_euclid(12));
            Utc.with_ymd_and_hms(year, month0 as u32 + 1, 1, 0, 0, 0)
                .single()
                .unwrap_or(now)
        }
    }
}

/// Aggregate sale records into the 7 most recent period buckets, oldest
/// first. Empty periods appear with zero totals so the series has no gaps.
pub fn period_buckets(
    records: &[SaleRecord],
    granularity: Granularity,
    now: DateTime<Utc>,
) -> Vec<PeriodBucket> {
    let mut buckets: Vec<PeriodBucket> = (0..7)
        .rev()
        .map(|back| PeriodBucket {
            label: bucket_label(period_start(now, granularity, back), granularity),
            total: 0.0,
            count: 0,
        })
        .collect();

    for record in records {
        let Some(ts) = Utc.timestamp_millis_opt(record.created_at).single() else {
            continue;
        };
        let label = bucket_label(ts, granularity);
        if let Some(bucket) = buckets.iter_mut().find(|b| b.label == label) {
            bucket.total += record.total_amount;
            bucket.count += 1;
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32) -> i64 {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    fn sale(created_at: i64, total: f64, sale_type: &str) -> SaleRecord {
        SaleRecord {
            created_at,
            total_amount: total,
            sale_type: sale_type.into(),
        }
    }

    #[test]
    fn weekday_buckets_cover_all_days() {
        let buckets = weekday_buckets(&[]);
        let names: Vec<&str> = buckets.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
        assert!(buckets.iter().all(|b| b.total == 0.0));
    }

    #[test]
    fn weekday_buckets_split_by_channel() {
        // 2026-08-24 is a Monday
        let records = vec![
            sale(at(2026, 8, 24, 10), 100.0, "instore"),
            sale(at(2026, 8, 24, 15), 50.0, "online"),
            sale(at(2026, 8, 26, 9), 30.0, "instore"),
        ];
        let buckets = weekday_buckets(&records);
        assert_eq!(buckets[0].total, 150.0);
        assert_eq!(buckets[0].online_orders, 1);
        assert_eq!(buckets[0].in_store_orders, 1);
        assert_eq!(buckets[2].total, 30.0);
        assert_eq!(buckets[1].total, 0.0);
    }

    #[test]
    fn weekday_serialization_keys() {
        let json = serde_json::to_value(&weekday_buckets(&[])[0]).unwrap();
        assert!(json.get("Total").is_some());
        assert!(json.get("OnlineOrders").is_some());
        assert!(json.get("InStoreOrders").is_some());
        assert_eq!(json["name"], "Mon");
    }

    #[test]
    fn day_buckets_oldest_first_with_gaps_filled() {
        let now = Utc.with_ymd_and_hms(2026, 8, 26, 12, 0, 0).unwrap();
        let records = vec![
            sale(at(2026, 8, 26, 9), 20.0, "instore"),
            sale(at(2026, 8, 24, 9), 10.0, "instore"),
            sale(at(2026, 8, 24, 18), 5.0, "online"),
        ];
        let buckets = period_buckets(&records, Granularity::Day, now);
        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[0].label, "2026-08-20");
        assert_eq!(buckets[6].label, "2026-08-26");
        assert_eq!(buckets[6].total, 20.0);
        let monday = buckets.iter().find(|b| b.label == "2026-08-24").unwrap();
        assert_eq!(monday.total, 15.0);
        assert_eq!(monday.count, 2);
        // a day with no sales is present and empty
        assert_eq!(buckets[1].total, 0.0);
    }

    #[test]
    fn week_and_month_labels() {
        let now = Utc.with_ymd_and_hms(2026, 8, 26, 0, 0, 0).unwrap();
        let weeks = period_buckets(&[], Granularity::Week, now);
        assert_eq!(weeks.len(), 7);
        assert_eq!(weeks[6].label, "2026-W35");

        let months = period_buckets(&[], Granularity::Month, now);
        assert_eq!(months[6].label, "2026-08");
        assert_eq!(months[0].label, "2026-02");
    }

    #[test]
    fn out_of_window_records_are_ignored() {
        let now = Utc.with_ymd_and_hms(2026, 8, 26, 12, 0, 0).unwrap();
        let records = vec![sale(at(2026, 1, 1, 0), 999.0, "instore")];
        let buckets = period_buckets(&records, Granularity::Day, now);
        assert!(buckets.iter().all(|b| b.total == 0.0));
    }
}
