//! How the fake sidecar reads a Vault component's metadata.
//!
//! Defaults and init rules follow what the real component does when the
//! runtime loads it, so the fake can produce the same initialization failures.

use std::path::Path;

use vaultcert_core::types::Capability;
use vaultcert_fixture::ComponentManifest;

pub const DEFAULT_VAULT_ADDR: &str = "https://127.0.0.1:8200";
pub const DEFAULT_KV_PREFIX: &str = "dapr";
pub const DEFAULT_ENGINE_PATH: &str = "secret";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Several key/values per secret.
    Map,
    /// The whole secret as one string value.
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VaultInitError {
    #[error("token mount path and token both set")]
    TokenAndMountPathBothSet,

    #[error("token mount path and token not set")]
    TokenAndMountPathNotSet,

    #[error("couldn't read vault token from mount path {path} err: {reason}")]
    UnreadableTokenFile { path: String, reason: String },

    #[error("invalid {field}: {value}")]
    InvalidValue { field: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultSettings {
    pub addr: String,
    pub token: Option<String>,
    pub token_mount_path: Option<String>,
    pub kv_prefix: String,
    pub kv_use_prefix: bool,
    pub value_type: ValueType,
    pub engine_path: String,
    pub skip_verify: bool,
    raw_use_prefix: Option<String>,
    raw_value_type: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn check_choice(field: &str, raw: Option<&str>, allowed: &[&str]) -> Result<(), VaultInitError> {
    match raw {
        Some(value) if !allowed.iter().any(|a| value.eq_ignore_ascii_case(a)) => {
            Err(VaultInitError::InvalidValue {
                field: field.to_owned(),
                value: value.to_owned(),
            })
        }
        _ => Ok(()),
    }
}

impl VaultSettings {
    pub fn from_manifest(manifest: &ComponentManifest) -> Self {
        let raw_use_prefix = non_empty(manifest.get("vaultKVUsePrefix"));
        let raw_value_type = non_empty(manifest.get("vaultValueType"));

        let kv_use_prefix = raw_use_prefix
            .as_deref()
            .map(|v| !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);
        let value_type = match raw_value_type.as_deref() {
            Some(v) if v.eq_ignore_ascii_case("text") => ValueType::Text,
            _ => ValueType::Map,
        };

        Self {
            addr: non_empty(manifest.get("vaultAddr")).unwrap_or_else(|| DEFAULT_VAULT_ADDR.to_owned()),
            token: non_empty(manifest.get("vaultToken")),
            token_mount_path: non_empty(manifest.get("vaultTokenMountPath")),
            kv_prefix: non_empty(manifest.get("vaultKVPrefix"))
                .unwrap_or_else(|| DEFAULT_KV_PREFIX.to_owned()),
            kv_use_prefix,
            value_type,
            engine_path: non_empty(manifest.get("enginePath"))
                .unwrap_or_else(|| DEFAULT_ENGINE_PATH.to_owned()),
            skip_verify: manifest
                .get("skipVerify")
                .is_some_and(|v| v.eq_ignore_ascii_case("true")),
            raw_use_prefix,
            raw_value_type,
        }
    }

    /// Token the component would authenticate with.
    pub fn resolve_token(&self) -> Result<String, VaultInitError> {
        match (&self.token, &self.token_mount_path) {
            (Some(_), Some(_)) => Err(VaultInitError::TokenAndMountPathBothSet),
            (None, None) => Err(VaultInitError::TokenAndMountPathNotSet),
            (Some(token), None) => Ok(token.clone()),
            (None, Some(path)) => std::fs::read_to_string(path)
                .map(|t| t.trim().to_owned())
                .map_err(|e| VaultInitError::UnreadableTokenFile {
                    path: path.clone(),
                    reason: e.to_string(),
                }),
        }
    }

    pub fn validate(&self) -> Result<(), VaultInitError> {
        check_choice("vaultKVUsePrefix", self.raw_use_prefix.as_deref(), &["true", "false"])?;
        check_choice("vaultValueType", self.raw_value_type.as_deref(), &["map", "text"])?;
        self.resolve_token().map(|_| ())
    }

    /// Resolves a relative `vaultTokenMountPath` against `base`, the runtime's
    /// working directory.
    pub fn relative_to(mut self, base: &Path) -> Self {
        let resolved = self
            .token_mount_path
            .as_deref()
            .filter(|p| Path::new(p).is_relative())
            .map(|p| base.join(p).display().to_string());
        if resolved.is_some() {
            self.token_mount_path = resolved;
        }
        self
    }

    pub fn key_path(&self, name: &str) -> String {
        if self.kv_use_prefix {
            format!("{}/{}", self.kv_prefix.trim_end_matches('/'), name)
        } else {
            name.to_owned()
        }
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        match self.value_type {
            ValueType::Map => vec![Capability::MultipleKeyValuesPerSecret],
            ValueType::Text => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_with(items: &str) -> ComponentManifest {
        let yaml = format!(
            "apiVersion: dapr.io/v1alpha1\nkind: Component\nmetadata:\n  name: c\nspec:\n  type: secretstores.hashicorp.vault\n  version: v1\n  metadata:\n{items}"
        );
        ComponentManifest::parse(&yaml).unwrap()
    }

    #[test]
    fn defaults_apply_when_fields_missing() {
        let settings = VaultSettings::from_manifest(&manifest_with("  - name: vaultToken\n    value: t\n"));
        assert_eq!(settings.addr, DEFAULT_VAULT_ADDR);
        assert_eq!(settings.engine_path, DEFAULT_ENGINE_PATH);
        assert_eq!(settings.key_path("secondsecret"), "dapr/secondsecret");
        assert_eq!(settings.capabilities(), vec![Capability::MultipleKeyValuesPerSecret]);
        assert!(!settings.skip_verify);
    }

    #[test]
    fn use_prefix_false_ignores_prefix() {
        let settings = VaultSettings::from_manifest(&manifest_with(
            "  - name: vaultToken\n    value: t\n  - name: vaultKVUsePrefix\n    value: \"false\"\n",
        ));
        assert_eq!(settings.key_path("secretWithNoPrefix"), "secretWithNoPrefix");
    }

    #[test]
    fn text_value_type_drops_capability() {
        let settings = VaultSettings::from_manifest(&manifest_with(
            "  - name: vaultToken\n    value: t\n  - name: vaultValueType\n    value: text\n",
        ));
        assert_eq!(settings.value_type, ValueType::Text);
        assert!(settings.capabilities().is_empty());
    }

    #[test]
    fn token_settings_fail_as_the_component_does() {
        let both = VaultSettings::from_manifest(&manifest_with(
            "  - name: vaultToken\n    value: t\n  - name: vaultTokenMountPath\n    value: /tmp/token\n",
        ));
        assert_eq!(
            both.validate().unwrap_err().to_string(),
            "token mount path and token both set"
        );

        let neither = VaultSettings::from_manifest(&manifest_with("  - name: vaultAddr\n    value: x\n"));
        assert_eq!(
            neither.validate().unwrap_err().to_string(),
            "token mount path and token not set"
        );

        let broken = VaultSettings::from_manifest(&manifest_with(
            "  - name: vaultTokenMountPath\n    value: /definitely/not/here\n",
        ));
        assert!(
            broken
                .validate()
                .unwrap_err()
                .to_string()
                .starts_with("couldn't read vault token from mount path")
        );
    }

    #[test]
    fn invalid_use_prefix_value_fails() {
        let settings = VaultSettings::from_manifest(&manifest_with(
            "  - name: vaultToken\n    value: t\n  - name: vaultKVUsePrefix\n    value: maybe\n",
        ));
        assert!(matches!(
            settings.validate().unwrap_err(),
            VaultInitError::InvalidValue { .. }
        ));
    }

    #[test]
    fn relative_mount_path_resolves_against_base() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("tokens")).unwrap();
        std::fs::write(dir.path().join("tokens/token"), "root\n").unwrap();
        let settings = VaultSettings::from_manifest(&manifest_with(
            "  - name: vaultTokenMountPath\n    value: tokens/token\n",
        ))
        .relative_to(dir.path());
        assert_eq!(settings.resolve_token().unwrap(), "root");

        let absolute = VaultSettings::from_manifest(&manifest_with(
            "  - name: vaultTokenMountPath\n    value: /etc/vault/token\n",
        ))
        .relative_to(dir.path());
        assert_eq!(absolute.token_mount_path.as_deref(), Some("/etc/vault/token"));
    }
}
