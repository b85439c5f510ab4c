#![doc = include_str!("../README.md")]

pub mod checks;
pub mod diagnostics;
pub mod metadata;
pub mod secret;

pub use checks::{
    check_capability, check_component_presence, check_init_failure, check_no_init_failure,
    check_secret_contains,
};
pub use diagnostics::{ExpectInitFailureLogged, ExpectNoInitFailureLogged};
pub use metadata::{ExpectCapability, ExpectComponentAbsent, ExpectComponentPresent};
pub use secret::{ExpectBulkContains, ExpectSecretAbsent, ExpectSecretEquals, ExpectSecretStable};
