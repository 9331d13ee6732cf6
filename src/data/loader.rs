//! CSV Data Loader Module
//! Reads the delivery dataset with Polars and pulls every schema column out as text.

use polars::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Normalized header names of the delivery dataset.
pub mod columns {
    pub const ORDER_ID: &str = "order_id";
    pub const CUSTOMER_ID: &str = "customer_id";
    pub const PLATFORM: &str = "platform";
    pub const ORDER_DATETIME: &str = "order_date_&_time";
    pub const DELIVERY_TIME: &str = "delivery_time_(minutes)";
    pub const PRODUCT_CATEGORY: &str = "product_category";
    pub const ORDER_VALUE: &str = "order_value_(inr)";
    pub const FEEDBACK: &str = "customer_feedback";
    pub const RATING: &str = "service_rating";
    pub const DELIVERY_DELAY: &str = "delivery_delay";
    pub const REFUND_REQUESTED: &str = "refund_requested";

    /// Columns without which the dashboard has nothing to show.
    pub const REQUIRED: [&str; 3] = [PLATFORM, DELIVERY_TIME, RATING];
}

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Dataset file not found: {0}")]
    NotFound(String),
    #[error("Required column missing: {0}")]
    MissingColumn(&'static str),
}

/// One CSV row, untyped. Every cell is trimmed text or `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOrder {
    pub order_id: Option<String>,
    pub customer_id: Option<String>,
    pub platform: Option<String>,
    pub order_datetime: Option<String>,
    pub delivery_time: Option<String>,
    pub product_category: Option<String>,
    pub order_value: Option<String>,
    pub feedback: Option<String>,
    pub rating: Option<String>,
    pub delivery_delay: Option<String>,
    pub refund_requested: Option<String>,
}

/// Standardize a header: trim, lowercase, spaces to underscores.
pub fn normalize_header(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Handles CSV file loading with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file. All columns are read as strings so that typing and
    /// defaulting happen in one place, row by row.
    pub fn load_csv(path: &Path) -> Result<Vec<RawOrder>, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::NotFound(path.display().to_string()));
        }

        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(0))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "dataset read"
        );

        Self::rows_from_frame(&df)
    }

    /// Convert a DataFrame into raw rows, resolving columns by normalized header.
    pub fn rows_from_frame(df: &DataFrame) -> Result<Vec<RawOrder>, LoaderError> {
        let headers: Vec<(String, String)> = df
            .get_column_names()
            .iter()
            .map(|s| {
                let original = s.to_string();
                (normalize_header(&original), original)
            })
            .collect();

        for required in columns::REQUIRED {
            if !headers.iter().any(|(norm, _)| norm == required) {
                return Err(LoaderError::MissingColumn(required));
            }
        }

        let height = df.height();
        let text_column = |name: &str| -> Result<Vec<Option<String>>, LoaderError> {
            let Some((_, original)) = headers.iter().find(|(norm, _)| norm == name) else {
                debug!(column = name, "optional column absent, defaults apply");
                return Ok(vec![None; height]);
            };
            let as_text = df.column(original)?.cast(&DataType::String)?;
            let values = as_text
                .str()?
                .into_iter()
                .map(|v| {
                    v.map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                })
                .collect();
            Ok(values)
        };

        let mut order_id = text_column(columns::ORDER_ID)?.into_iter();
        let mut customer_id = text_column(columns::CUSTOMER_ID)?.into_iter();
        let mut platform = text_column(columns::PLATFORM)?.into_iter();
        let mut order_datetime = text_column(columns::ORDER_DATETIME)?.into_iter();
        let mut delivery_time = text_column(columns::DELIVERY_TIME)?.into_iter();
        let mut product_category = text_column(columns::PRODUCT_CATEGORY)?.into_iter();
        let mut order_value = text_column(columns::ORDER_VALUE)?.into_iter();
        let mut feedback = text_column(columns::FEEDBACK)?.into_iter();
        let mut rating = text_column(columns::RATING)?.into_iter();
        let mut delivery_delay = text_column(columns::DELIVERY_DELAY)?.into_iter();
        let mut refund_requested = text_column(columns::REFUND_REQUESTED)?.into_iter();

        let rows = (0..height)
            .map(|_| RawOrder {
                order_id: order_id.next().flatten(),
                customer_id: customer_id.next().flatten(),
                platform: platform.next().flatten(),
                order_datetime: order_datetime.next().flatten(),
                delivery_time: delivery_time.next().flatten(),
                product_category: product_category.next().flatten(),
                order_value: order_value.next().flatten(),
                feedback: feedback.next().flatten(),
                rating: rating.next().flatten(),
                delivery_delay: delivery_delay.next().flatten(),
                refund_requested: refund_requested.next().flatten(),
            })
            .collect();

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("orders.csv");
        let mut file = std::fs::File::create(&path).expect("create csv");
        file.write_all(body.as_bytes()).expect("write csv");
        path
    }

    #[test]
    fn headers_are_trimmed_lowercased_and_underscored() {
        assert_eq!(normalize_header(" Delivery Time (Minutes) "), "delivery_time_(minutes)");
        assert_eq!(normalize_header("Order Date & Time"), "order_date_&_time");
    }

    #[test]
    fn loads_rows_with_original_headers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(
            &dir,
            "Order ID,Platform,Delivery Time (Minutes),Service Rating,Customer Feedback,Delivery Delay\n\
             ORD1,Blinkit,35,2,\"Late, and cold food\",Yes\n\
             ORD2,JioMart,abc,,,No\n",
        );

        let rows = DataLoader::load_csv(&path).expect("load");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].order_id.as_deref(), Some("ORD1"));
        assert_eq!(rows[0].delivery_time.as_deref(), Some("35"));
        assert_eq!(rows[0].feedback.as_deref(), Some("Late, and cold food"));
        assert_eq!(rows[1].delivery_time.as_deref(), Some("abc"));
        assert_eq!(rows[1].rating, None);
        assert_eq!(rows[1].product_category, None);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(&dir, "Platform,Service Rating\nBlinkit,4\n");

        let err = DataLoader::load_csv(&path).expect_err("must fail");
        assert!(matches!(err, LoaderError::MissingColumn(columns::DELIVERY_TIME)));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = DataLoader::load_csv(Path::new("/nonexistent/orders.csv")).expect_err("must fail");
        assert!(matches!(err, LoaderError::NotFound(_)));
    }
}
