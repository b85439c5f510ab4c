//! In-memory sidecar hosting the real component manifests.
//!
//! Components are loaded with the fixture crate's `ComponentManifest` and
//! interpreted through [`VaultSettings`]. Initialization failures are written to the diagnostic sink
//! in the runtime's log format and, like the real runtime, the failed
//! component still shows up in the metadata listing.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use vaultcert_core::client::{MetadataClient, SecretClient};
use vaultcert_core::error::{ClientError, FixtureError};
use vaultcert_core::fixture::RuntimeHost;
use vaultcert_core::types::{
    BulkSecrets, ComponentRecord, ComponentSnapshot, RequestOptions, SecretMap,
};
use vaultcert_fixture::ComponentManifest;
use vaultcert_flow::{DiagnosticSink, INIT_FAILURE_MARKER};

use super::fake_vault::SharedVault;
use super::vault_settings::{ValueType, VaultSettings};

struct Hosted {
    name: String,
    component_type: String,
    version: String,
    settings: VaultSettings,
    /// Resolved token, or the initialization error.
    init: Result<String, String>,
}

pub struct FakeSidecar {
    vault: SharedVault,
    repo_root: PathBuf,
    sink: DiagnosticSink,
    log_init_failures: bool,
    hosted: Mutex<Option<Vec<Hosted>>>,
}

impl FakeSidecar {
    pub fn new(vault: SharedVault, repo_root: impl Into<PathBuf>, sink: DiagnosticSink) -> Self {
        Self {
            vault,
            repo_root: repo_root.into(),
            sink,
            log_init_failures: true,
            hosted: Mutex::new(None),
        }
    }

    /// Swallow initialization failures instead of logging them.
    pub fn silent(mut self) -> Self {
        self.log_init_failures = false;
        self
    }

    fn load(&self, manifest: &ComponentManifest) -> Result<Hosted, FixtureError> {
        let settings = VaultSettings::from_manifest(manifest).relative_to(&self.repo_root);
        let init = settings
            .validate()
            .and_then(|()| settings.resolve_token())
            .map_err(|e| e.to_string());
        let name = manifest.name().to_owned();
        let kind = format!("{}/{}", manifest.spec.component_type, manifest.spec.version);

        match &init {
            Ok(_) => self.sink.record_line(&format!(
                "level=info msg=\"Component loaded: {name} ({kind})\" scope=dapr.runtime"
            )),
            Err(reason) => {
                let message = format!(
                    "process component {name} error: [{INIT_FAILURE_MARKER}]: initialization error occurred for {name} ({kind}): {reason}"
                );
                if !manifest.spec.ignore_errors {
                    if self.log_init_failures {
                        self.sink
                            .record_line(&format!("level=fatal msg=\"{message}\" scope=dapr.runtime"));
                    }
                    return Err(FixtureError::Spawn {
                        program: "daprd".to_owned(),
                        reason: format!("runtime exited: {message}"),
                    });
                }
                if self.log_init_failures {
                    self.sink.record_line(&format!(
                        "level=warn msg=\"Ignoring error processing component: {message}\" scope=dapr.runtime"
                    ));
                }
            }
        }

        Ok(Hosted {
            name,
            component_type: manifest.spec.component_type.clone(),
            version: manifest.spec.version.clone(),
            settings,
            init,
        })
    }

    fn with_component<T>(
        &self,
        endpoint: &str,
        store: &str,
        f: impl FnOnce(&Hosted) -> Result<T, String>,
    ) -> Result<T, ClientError> {
        let hosted = self.hosted.lock().unwrap();
        let Some(components) = hosted.as_ref() else {
            return Err(ClientError::Transport("connection refused".to_owned()));
        };
        let status = |status: u16, body: String| ClientError::Status {
            endpoint: endpoint.to_owned(),
            status,
            body,
        };
        let component = components
            .iter()
            .find(|c| c.name == store)
            .ok_or_else(|| status(400, format!("secret store {store} not found")))?;
        f(component).map_err(|body| status(500, body))
    }
}

impl RuntimeHost for FakeSidecar {
    async fn start(&self, components_path: &Path) -> Result<(), FixtureError> {
        let manifests = ComponentManifest::load_dir(components_path)?;
        let mut components = Vec::new();
        for manifest in manifests.iter().filter(|m| m.is_vault()) {
            components.push(self.load(manifest)?);
        }
        *self.hosted.lock().unwrap() = Some(components);
        Ok(())
    }

    async fn stop(&self) -> Result<(), FixtureError> {
        match self.hosted.lock().unwrap().take() {
            Some(_) => Ok(()),
            None => Err(FixtureError::NotRunning("sidecar".to_owned())),
        }
    }
}

impl MetadataClient for FakeSidecar {
    async fn list_components(&self) -> Result<ComponentSnapshot, ClientError> {
        let hosted = self.hosted.lock().unwrap();
        let components = hosted
            .as_ref()
            .ok_or_else(|| ClientError::Transport("connection refused".to_owned()))?;
        let records = components
            .iter()
            .map(|c| {
                let mut record = ComponentRecord::new(&c.name).with_type(&c.component_type);
                record.version = c.version.clone();
                c.settings
                    .capabilities()
                    .into_iter()
                    .fold(record, |r, cap| r.with_capability(cap.as_str()))
            })
            .collect();
        Ok(ComponentSnapshot::new(records))
    }
}

impl SecretClient for FakeSidecar {
    async fn get_secret(
        &self,
        store: &str,
        key: &str,
        _options: &RequestOptions,
    ) -> Result<SecretMap, ClientError> {
        let endpoint = format!("/v1.0/secrets/{store}/{key}");
        self.with_component(&endpoint, store, |component| {
            let token = component.init.as_ref()?;
            let vault = self.vault.lock();
            connect(&component.settings, token, &vault)?;

            let path = component.settings.key_path(key);
            let values = vault
                .secret(&component.settings.engine_path, &path)
                .ok_or_else(|| format!("failed getting secret with key {key}: secret not found"))?;
            Ok(shape(&component.settings, key, values))
        })
    }

    async fn get_bulk_secret(
        &self,
        store: &str,
        _options: &RequestOptions,
    ) -> Result<BulkSecrets, ClientError> {
        let endpoint = format!("/v1.0/secrets/{store}/bulk");
        self.with_component(&endpoint, store, |component| {
            let token = component.init.as_ref()?;
            let vault = self.vault.lock();
            connect(&component.settings, token, &vault)?;

            let settings = &component.settings;
            let prefix = settings.key_path("");
            let mount = vault
                .mounts
                .get(&settings.engine_path)
                .ok_or_else(|| format!("no handler for route {}", settings.engine_path))?;
            Ok(mount
                .iter()
                .filter_map(|(path, values)| {
                    let name = path.strip_prefix(prefix.as_str())?;
                    (!name.contains('/')).then(|| (name.to_owned(), shape(settings, name, values)))
                })
                .collect())
        })
    }
}

/// Replays what the component's Vault client would run into on the wire.
fn connect(
    settings: &VaultSettings,
    token: &str,
    vault: &super::fake_vault::VaultState,
) -> Result<(), String> {
    let (scheme, host, port) = split_addr(&settings.addr)
        .ok_or_else(|| format!("invalid vault address {}", settings.addr))?;
    let local = host == "127.0.0.1" || host == "localhost";
    if !vault.running || !vault.reachable || !local || port != vault.host_port {
        return Err(format!("dial tcp {host}:{port}: connect: connection refused"));
    }
    match (scheme, vault.tls) {
        ("http", true) => return Err("Client sent an HTTP request to an HTTPS server".to_owned()),
        ("https", false) => {
            return Err("http: server gave HTTP response to HTTPS client".to_owned());
        }
        ("https", true) if !settings.skip_verify => {
            return Err("x509: certificate signed by unknown authority".to_owned());
        }
        _ => {}
    }
    if token != vault.root_token {
        return Err("permission denied".to_owned());
    }
    Ok(())
}

fn split_addr(addr: &str) -> Option<(&str, &str, u16)> {
    let (scheme, rest) = addr.split_once("://")?;
    let authority = rest.trim_end_matches('/');
    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => (host, port.parse().ok()?),
        None if scheme == "https" => (authority, 443),
        None => (authority, 80),
    };
    Some((scheme, host, port))
}

fn shape(settings: &VaultSettings, key: &str, values: &SecretMap) -> SecretMap {
    match settings.value_type {
        ValueType::Map => values.clone(),
        ValueType::Text => {
            let text = serde_json::to_string(values).unwrap_or_default();
            SecretMap::from([(key.to_owned(), text)])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_addr_handles_default_ports() {
        assert_eq!(
            split_addr("https://127.0.0.1:8200"),
            Some(("https", "127.0.0.1", 8200))
        );
        assert_eq!(split_addr("http://localhost/"), Some(("http", "localhost", 80)));
        assert_eq!(split_addr("127.0.0.1:8200"), None);
    }
}
