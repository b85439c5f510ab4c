//! E2E tests for the certification catalog.
//!
//! The flows run unchanged against in-memory stand-ins for the Vault server and
//! the sidecar. The stand-ins read the repository's real compose files, seed
//! scripts and component manifests, so a broken manifest or a catalog entry
//! that drifts from the data files fails here without Docker or `daprd`.
//!
//! # Test Structure
//!
//! - `helpers/` -- fake store server, fake sidecar, fake fault injector, provider
//! - `scenarios/` -- catalog runs and failure reporting
//!
//! # Running
//!
//! ```bash
//! cargo test -p vaultcert-scenarios --test e2e
//! ```

mod helpers;
mod scenarios;
