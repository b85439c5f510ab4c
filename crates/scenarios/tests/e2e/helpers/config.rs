//! Harness configuration pointing at the repository's data files.

use std::path::PathBuf;

use vaultcert_core::config::HarnessConfig;

/// Workspace root (two levels above this crate).
pub fn repo_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .map(PathBuf::from)
        .unwrap_or(manifest_dir)
}

/// Default configuration with absolute data paths.
///
/// Timings keep their defaults; tests run with a paused clock.
pub fn test_config() -> HarnessConfig {
    let root = repo_root();
    let mut config = HarnessConfig::default();
    config.runtime.resources_root = root.join("components").display().to_string();
    config.store.compose_file = root
        .join("infrastructure/docker-compose-hashicorp-vault.yml")
        .display()
        .to_string();
    config
}
