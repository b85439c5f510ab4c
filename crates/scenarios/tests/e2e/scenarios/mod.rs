//! E2E test scenarios.

mod catalog_flows;
mod data_files;
mod failure_reporting;
