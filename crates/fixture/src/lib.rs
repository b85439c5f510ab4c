#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Adapter error type (`FixtureAdapterError`)
//! - [`docker`]: Docker API abstraction (`ContainerRuntime` trait, `BollardContainerRuntime`)
//! - [`fault`]: Network fault injection by pausing containers (`DockerPauseInjector`)
//! - [`http`]: Sidecar HTTP API client (`SidecarHttpClient`)
//! - [`compose`]: docker compose store server (`ComposeStoreServer`)
//! - [`sidecar`]: daprd process host (`SidecarProcess`, `SidecarPorts`)
//! - [`ports`]: Free local port allocation
//! - [`manifest`]: Component manifests
//! - [`steps`]: Fixture steps (`StartStoreServer`, `InterruptNetwork`, ...)

pub mod compose;
pub mod docker;
pub mod error;
pub mod fault;
pub mod http;
pub mod manifest;
pub mod ports;
pub mod sidecar;
pub mod steps;

// --- Public API Re-exports ---

pub use compose::ComposeStoreServer;
pub use docker::{BollardContainerRuntime, ContainerRuntime, PublishedPort, RunningContainer};
pub use error::FixtureAdapterError;
pub use fault::DockerPauseInjector;
pub use http::SidecarHttpClient;
pub use manifest::ComponentManifest;
pub use ports::allocate_free_ports;
pub use sidecar::{SidecarPorts, SidecarProcess};
pub use steps::{InterruptNetwork, StartRuntime, StartStoreServer, StopRuntime, StopStoreServer};
