//! The report pipeline: read, aggregate, render, store.

use std::sync::Arc;

use log::info;

use crate::aggregate::summarize;
use crate::clock::{report_filename, Clock, SystemClock};
use crate::config::Settings;
use crate::error::Result;
use crate::model::{GeneratedReport, StoredReport};
use crate::reader::read_sales_file;
use crate::render::ReportRenderer;
use crate::store::ReportStore;

/// Entry point shared by the HTTP handlers and the command line.
///
/// Every call is synchronous and independent; the service holds no mutable state.
#[derive(Clone)]
pub struct ReportService {
    settings: Arc<Settings>,
    renderer: ReportRenderer,
    store: ReportStore,
    clock: Arc<dyn Clock>,
}

impl ReportService {
    /// Builds a service using the wall clock.
    pub fn new(settings: Settings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: Settings, clock: Arc<dyn Clock>) -> Self {
        let renderer = ReportRenderer::from_settings(&settings);
        let store = ReportStore::new(settings.reports_dir.clone());
        Self {
            settings: Arc::new(settings),
            renderer,
            store,
            clock,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn renderer(&self) -> &ReportRenderer {
        &self.renderer
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    /// Runs the whole pipeline against the configured input file and stores the result.
    ///
    /// Any failing stage aborts the run; nothing is written unless rendering succeeded.
    pub fn generate(&self) -> Result<GeneratedReport> {
        let input = self.settings.input_path();
        let data = read_sales_file(&input, self.settings.max_file_size)?;

        let generated_at = self.clock.now();
        let summary = summarize(&data.records, generated_at);
        let bytes = self.renderer.render(&summary, &data.records)?;

        let filename = report_filename(generated_at);
        self.store.save(&filename, &bytes)?;

        info!(
            "Generated {} from {}: {} items, revenue {}, {} rows skipped",
            filename,
            input.display(),
            summary.items_count,
            summary.total_revenue,
            data.skipped.len()
        );

        Ok(GeneratedReport {
            filename,
            bytes,
            summary,
            skipped_rows: data.skipped.len(),
        })
    }

    pub fn list(&self) -> Result<Vec<StoredReport>> {
        self.store.list()
    }

    pub fn load(&self, filename: &str) -> Result<Vec<u8>> {
        self.store.load(filename)
    }
}
