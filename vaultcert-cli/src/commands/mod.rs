//! Command handlers -- one module per subcommand

pub mod config;
pub mod list;
pub mod run;

use std::path::Path;

use vaultcert_core::config::HarnessConfig;

use crate::error::CliError;

/// Effective configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: HarnessConfig,
    /// `false` when the file was missing and defaults were used.
    pub from_file: bool,
}

/// Load `path`, or fall back to defaults (with env overrides) when it does not exist.
pub async fn load_config(path: &Path) -> Result<LoadedConfig, CliError> {
    if tokio::fs::try_exists(path).await? {
        let config = HarnessConfig::load(path).await?;
        return Ok(LoadedConfig {
            config,
            from_file: true,
        });
    }

    let mut config = HarnessConfig::default();
    config.apply_env_overrides();
    config.validate()?;
    Ok(LoadedConfig {
        config,
        from_file: false,
    })
}
