//! Sales report service: reads CSV sales data, aggregates it, renders a PDF report with genpdf
//! and serves the stored reports over HTTP.
//!
//! [`service::ReportService`] runs the pipeline; [`api::router`] exposes it.

pub mod aggregate;
pub mod api;
pub mod builder;
pub mod clock;
pub mod config;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod model;
pub mod reader;
pub mod render;
pub mod service;
pub mod store;

pub use config::Settings;
pub use error::{ConfigError, InputError, ReportError, Result};
pub use service::ReportService;
