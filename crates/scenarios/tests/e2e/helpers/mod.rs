//! Shared E2E test helpers.

pub mod config;
pub mod fake_sidecar;
pub mod fake_vault;
pub mod provider;
pub mod vault_settings;
