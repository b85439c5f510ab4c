#![doc = include_str!("../README.md")]

pub mod client;
pub mod config;
pub mod error;
pub mod fault;
pub mod fixture;
pub mod metrics;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// --- 주요 타입 re-export ---

// 에러
pub use error::{
    AssertionError, CaptureError, CertError, ClientError, ConfigError, FaultError, FixtureError,
    StepError, StepFailure,
};

// 설정
pub use config::HarnessConfig;

// 어댑터 계약
pub use client::{DynMetadataClient, DynSecretClient, MetadataClient, SecretClient};
pub use fault::{DynFaultInjector, FaultInjector};
pub use fixture::{DynRuntimeHost, DynStoreServer, RuntimeHost, StoreServer};

// 도메인 타입
pub use types::{
    BoxFuture, BulkSecrets, Capability, ComponentRecord, ComponentSnapshot, FaultWindow,
    RequestOptions, SecretMap,
};
