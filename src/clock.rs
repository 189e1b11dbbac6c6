//! Time source used to stamp reports and derive their filenames.

use chrono::{DateTime, Utc};

const FILENAME_PREFIX: &str = "sales_report_";
const FILENAME_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Filename for a report generated at `timestamp`.
///
/// Resolution is one second; two reports generated within the same second share a name.
pub fn report_filename(timestamp: DateTime<Utc>) -> String {
    format!(
        "{FILENAME_PREFIX}{}.pdf",
        timestamp.format(FILENAME_TIMESTAMP_FORMAT)
    )
}
