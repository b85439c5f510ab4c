//! `vaultcert config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use vaultcert_core::config::HarnessConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::commands::load_config;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

const SECTIONS: [&str; 5] = ["general", "store", "runtime", "timing", "docker"];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Load and validate the file itself; a missing file is invalid here.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = ConfigValidationReport::from_result(
        config_path,
        HarnessConfig::load(config_path).await.map(|_| ()),
    );
    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }
    Ok(())
}

/// Show the effective configuration (file or defaults, plus env overrides).
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let loaded = load_config(config_path).await?;
    let source = if loaded.from_file {
        config_path.display().to_string()
    } else {
        "(defaults)".to_owned()
    };
    let report = ConfigReport::new(source, &loaded.config, section)?;
    writer.render(&report)
}

/// Configuration display report.
///
/// `config_toml` is only used for text rendering.
#[derive(Serialize)]
pub struct ConfigReport {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip)]
    pub config_toml: String,
}

impl ConfigReport {
    pub fn new(
        source: String,
        config: &HarnessConfig,
        section: Option<String>,
    ) -> Result<Self, CliError> {
        let rendered = match section.as_deref() {
            None => toml::to_string_pretty(config),
            Some("general") => toml::to_string_pretty(&config.general),
            Some("store") => toml::to_string_pretty(&config.store),
            Some("runtime") => toml::to_string_pretty(&config.runtime),
            Some("timing") => toml::to_string_pretty(&config.timing),
            Some("docker") => toml::to_string_pretty(&config.docker),
            Some(other) => {
                return Err(CliError::Command(format!(
                    "unknown section: {other} (expected: {})",
                    SECTIONS.join(", ")
                )));
            }
        };
        Ok(Self {
            source,
            section,
            config_toml: rendered.unwrap_or_else(|e| format!("(serialization error: {e})")),
        })
    }
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        match &self.section {
            Some(section) => writeln!(
                w,
                "Configuration {} (source: {})",
                format!("[{section}]").bold(),
                self.source
            )?,
            None => writeln!(w, "Configuration (source: {})", self.source.bold())?,
        }
        writeln!(w)?;
        write!(w, "{}", self.config_toml)
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    /// Empty when valid.
    pub errors: Vec<String>,
}

impl ConfigValidationReport {
    pub fn from_result<E: std::fmt::Display>(source: &Path, result: Result<(), E>) -> Self {
        let errors = result.err().map(|e| vec![e.to_string()]).unwrap_or_default();
        Self {
            source: source.display().to_string(),
            valid: errors.is_empty(),
            errors,
        }
    }
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;
        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }
        Ok(())
    }
}
