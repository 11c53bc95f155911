pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod stores;

pub use services::{ProximityMatcher, ReportService};
pub use stores::{InMemoryReportStore, PgReportStore, ReportStore};

