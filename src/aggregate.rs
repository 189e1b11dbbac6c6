//! Summary statistics over parsed sales records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::model::{ReportSummary, SaleRecord};

/// Computes the totals shown in the report summary block.
pub fn summarize(records: &[SaleRecord], generated_at: DateTime<Utc>) -> ReportSummary {
    let units_sold = records
        .iter()
        .map(|record| u64::from(record.quantity()))
        .sum();
    let total_revenue = records
        .iter()
        .map(SaleRecord::line_total)
        .sum::<Decimal>();

    ReportSummary {
        items_count: records.len(),
        units_sold,
        total_revenue,
        generated_at,
    }
}
