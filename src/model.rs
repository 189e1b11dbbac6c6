//! Data structures describing sales records and the reports built from them.
//!
//! The types in this module are plain values: the reader produces them, the aggregator and the
//! renderer consume them, and the HTTP layer serializes the metadata types as JSON. None of them
//! reference `genpdf` so they stay cheap to construct in tests.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Prefix of every route serving reports.
pub const DOWNLOAD_ROUTE_PREFIX: &str = "/api/v1/reports/download/";

/// One parsed sales row.
///
/// Records are immutable once the reader creates them; the derived [`line_total`] is computed on
/// demand so it can never drift from the quantity and price it is based on.
///
/// [`line_total`]: SaleRecord::line_total
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SaleRecord {
    product: String,
    quantity: u32,
    unit_price: Decimal,
}

impl SaleRecord {
    /// Creates a record, trimming surrounding whitespace from the product name.
    pub fn new(product: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        let product = product.into();
        Self {
            product: product.trim().to_owned(),
            quantity,
            unit_price,
        }
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Quantity multiplied by the unit price.
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

/// A data row the reader dropped, with the 1-based line number it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

/// Output of the CSV reader: the valid records in file order plus the rows it skipped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SalesData {
    pub records: Vec<SaleRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// Totals for a single generation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Number of records in the report.
    pub items_count: usize,
    /// Sum of all quantities.
    pub units_sold: u64,
    pub total_revenue: Decimal,
    pub generated_at: DateTime<Utc>,
}

/// A rendered document that has been written to the report store.
#[derive(Clone, Debug)]
pub struct GeneratedReport {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub summary: ReportSummary,
    pub skipped_rows: usize,
}

impl GeneratedReport {
    /// Builds the JSON payload returned to API clients.
    pub fn metadata(&self) -> ReportMetadata {
        ReportMetadata {
            filename: self.filename.clone(),
            generated_at: self.summary.generated_at,
            items_count: self.summary.items_count,
            units_sold: self.summary.units_sold,
            total_revenue: self.summary.total_revenue,
            skipped_rows: self.skipped_rows,
            download_url: download_url(&self.filename),
        }
    }
}

/// Response body of the generate endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportMetadata {
    pub filename: String,
    pub generated_at: DateTime<Utc>,
    pub items_count: usize,
    pub units_sold: u64,
    pub total_revenue: Decimal,
    pub skipped_rows: usize,
    pub download_url: String,
}

/// A report file found in the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StoredReport {
    pub filename: String,
    pub size: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub download_url: String,
}

/// Relative URL under which `filename` can be downloaded.
pub fn download_url(filename: &str) -> String {
    format!("{DOWNLOAD_ROUTE_PREFIX}{filename}")
}
