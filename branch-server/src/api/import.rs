//! Bulk catalog endpoints: CSV import and test-data seeding

use axum::Json;
use axum::extract::{Multipart, State};
use http::StatusCode;
use shared::error::{AppError, ErrorCode};
use shared::live::LiveEvent;
use shared::models::{Product, ProductCreate};

use crate::error::ServiceError;
use crate::state::AppState;
use crate::{catalog, db};

/// POST /products/import
///
/// Multipart upload of a CSV with columns Product,Branch,Price,Quantity,Minimum.
pub async fn import_products(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<Product>>), ServiceError> {
    let mut csv_text: Option<String> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_request(format!("Malformed upload: {e}")))?
    {
        let is_file = field.name() == Some("file") || field.file_name().is_some();
        if is_file && csv_text.is_none() {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::invalid_request(format!("Unreadable upload: {e}")))?;
            csv_text = Some(text);
        }
    }

    let text = csv_text.ok_or_else(|| AppError::new(ErrorCode::ImportFileMissing))?;
    let inputs = parse_csv(&text)?;
    if inputs.is_empty() {
        return Err(AppError::validation("Import file contains no rows").into());
    }

    let products: Vec<Product> = inputs
        .into_iter()
        .map(catalog::build_product)
        .collect::<Result<_, _>>()?;
    let count = db::product::insert_products_bulk(&state.pool, &products).await?;

    tracing::info!(count, "Products imported");
    state.hub.broadcast(LiveEvent::ProductsImported { count });

    Ok((StatusCode::CREATED, Json(products)))
}

/// Parse CSV rows into creation inputs. A header row is skipped when the
/// first cell reads "Product"; blank lines are ignored; the Minimum column
/// is optional and defaults to 0.
fn parse_csv(text: &str) -> Result<Vec<ProductCreate>, AppError> {
    let mut rows = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        if line_no == 0 && cells[0].eq_ignore_ascii_case("product") {
            continue;
        }
        if cells.len() < 4 {
            return Err(AppError::validation(format!(
                "Line {}: expected Product,Branch,Price,Quantity[,Minimum]",
                line_no + 1
            )));
        }

        let price: f64 = cells[2].parse().map_err(|_| {
            AppError::validation(format!("Line {}: invalid price {:?}", line_no + 1, cells[2]))
        })?;
        let stock: i32 = cells[3].parse().map_err(|_| {
            AppError::validation(format!(
                "Line {}: invalid quantity {:?}",
                line_no + 1,
                cells[3]
            ))
        })?;
        let min_stock: i32 = match cells.get(4) {
            Some(cell) if !cell.is_empty() => cell.parse().map_err(|_| {
                AppError::validation(format!("Line {}: invalid minimum {:?}", line_no + 1, cell))
            })?,
            _ => 0,
        };

        rows.push(ProductCreate {
            name: cells[0].to_string(),
            branch: cells[1].to_string(),
            price,
            stock,
            min_stock,
        });
    }
    Ok(rows)
}

/// POST /products/test-data
///
/// Seeds a small sample catalog across three branches.
pub async fn load_test_data(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<Product>>), ServiceError> {
    let products: Vec<Product> = sample_catalog()
        .into_iter()
        .map(catalog::build_product)
        .collect::<Result<_, _>>()?;
    let count = db::product::insert_products_bulk(&state.pool, &products).await?;

    tracing::info!(count, "Test data loaded");
    state.hub.broadcast(LiveEvent::TestDataLoaded { count });

    Ok((StatusCode::CREATED, Json(products)))
}

fn sample_catalog() -> Vec<ProductCreate> {
    let entries: [(&str, &str, f64, i32, i32); 9] = [
        ("Espresso Beans 1kg", "Downtown", 18.50, 40, 10),
        ("Oat Milk 1L", "Downtown", 3.20, 60, 15),
        ("Ceramic Mug", "Downtown", 9.99, 25, 5),
        ("Espresso Beans 1kg", "Airport", 19.50, 30, 10),
        ("Travel Tumbler", "Airport", 14.75, 18, 4),
        ("Croissant Box", "Airport", 12.00, 12, 6),
        ("Espresso Beans 1kg", "Mall", 18.50, 35, 10),
        ("Cold Brew Bottle", "Mall", 4.80, 48, 12),
        ("Gift Card Sleeve", "Mall", 1.50, 200, 20),
    ];
    entries
        .into_iter()
        .map(|(name, branch, price, stock, min_stock)| ProductCreate {
            name: name.to_string(),
            branch: branch.to_string(),
            price,
            stock,
            min_stock,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_and_skips_header() {
        let csv = "Product,Branch,Price,Quantity,Minimum\n\
                   Espresso Beans,Downtown,18.50,40,10\n\
                   \n\
                   Oat Milk,Airport,3.20,60,\n";
        let rows = parse_csv(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Espresso Beans");
        assert_eq!(rows[0].branch, "Downtown");
        assert_eq!(rows[0].stock, 40);
        assert_eq!(rows[0].min_stock, 10);
        // empty Minimum defaults to 0
        assert_eq!(rows[1].min_stock, 0);
    }

    #[test]
    fn parses_headerless_file() {
        let rows = parse_csv("Mug,Mall,9.99,25,5\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Mug");
    }

    #[test]
    fn rejects_malformed_rows() {
        assert!(parse_csv("Mug,Mall\n").is_err());
        assert!(parse_csv("Mug,Mall,cheap,25,5\n").is_err());
        assert!(parse_csv("Mug,Mall,9.99,lots,5\n").is_err());
    }

    #[test]
    fn sample_catalog_is_valid() {
        for entry in sample_catalog() {
            assert!(crate::catalog::build_product(entry).is_ok());
        }
    }
}
