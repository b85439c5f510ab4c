//! In-memory Vault dev server driven by the real compose files.
//!
//! `start()` reads the compose file a flow would hand to `docker compose`:
//! the published host port, `-dev-tls`, the dev root token, and every mounted
//! `*.sh` seed script. Seed scripts are interpreted line by line
//! (`vault secrets enable -path=..` and `vault kv put -mount=.. path k=v..`).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_yaml::Value;

use vaultcert_core::error::FixtureError;
use vaultcert_core::fixture::StoreServer;
use vaultcert_core::types::SecretMap;

/// Mount every dev server starts with.
const DEFAULT_MOUNT: &str = "secret";

/// Observable server state shared with the fake sidecar and fault injector.
#[derive(Debug, Default)]
pub struct VaultState {
    pub running: bool,
    pub reachable: bool,
    pub host_port: u16,
    pub container_port: u16,
    pub tls: bool,
    pub root_token: String,
    /// mount -> path -> key/values
    pub mounts: BTreeMap<String, BTreeMap<String, SecretMap>>,
    pub starts: usize,
    pub stops: usize,
}

impl VaultState {
    pub fn secret(&self, mount: &str, path: &str) -> Option<&SecretMap> {
        self.mounts.get(mount).and_then(|m| m.get(path))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SharedVault(Arc<Mutex<VaultState>>);

impl SharedVault {
    pub fn lock(&self) -> MutexGuard<'_, VaultState> {
        self.0.lock().unwrap()
    }
}

/// What a compose file describes.
#[derive(Debug, Default, PartialEq)]
struct ServerSetup {
    host_port: u16,
    container_port: u16,
    tls: bool,
    root_token: String,
    seed_scripts: Vec<PathBuf>,
}

pub struct FakeVault {
    compose_file: PathBuf,
    state: SharedVault,
    skip_seeding: bool,
}

impl FakeVault {
    pub fn new(compose_file: impl Into<PathBuf>, state: SharedVault) -> Self {
        Self {
            compose_file: compose_file.into(),
            state,
            skip_seeding: false,
        }
    }

    /// Start the server without running any seed script.
    pub fn without_seeding(mut self) -> Self {
        self.skip_seeding = true;
        self
    }
}

impl StoreServer for FakeVault {
    async fn start(&self) -> Result<(), FixtureError> {
        let setup = parse_compose(&self.compose_file).map_err(|reason| FixtureError::Command {
            command: format!("docker compose -f {} up -d", self.compose_file.display()),
            code: Some(1),
            stderr: reason,
        })?;

        let mut mounts = BTreeMap::new();
        mounts.insert(DEFAULT_MOUNT.to_owned(), BTreeMap::new());
        if !self.skip_seeding {
            for script in &setup.seed_scripts {
                let text = std::fs::read_to_string(script).map_err(|e| FixtureError::Command {
                    command: format!("seed {}", script.display()),
                    code: Some(1),
                    stderr: e.to_string(),
                })?;
                apply_seed(&text, &mut mounts);
            }
        }

        let mut state = self.state.lock();
        state.running = true;
        state.reachable = true;
        state.host_port = setup.host_port;
        state.container_port = setup.container_port;
        state.tls = setup.tls;
        state.root_token = setup.root_token;
        state.mounts = mounts;
        state.starts += 1;
        Ok(())
    }

    async fn stop(&self) -> Result<(), FixtureError> {
        let mut state = self.state.lock();
        state.running = false;
        state.mounts.clear();
        state.stops += 1;
        Ok(())
    }
}

fn parse_compose(path: &Path) -> Result<ServerSetup, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let doc: Value = serde_yaml::from_str(&text).map_err(|e| e.to_string())?;
    let base = path.parent().unwrap_or(Path::new("."));
    let services = doc
        .get("services")
        .and_then(Value::as_mapping)
        .ok_or("compose file has no services")?;

    let mut setup = ServerSetup::default();
    let mut found_server = false;
    for service in services.values() {
        if let Some(token) = service
            .get("environment")
            .and_then(|env| env.get("VAULT_DEV_ROOT_TOKEN_ID"))
            .and_then(Value::as_str)
        {
            found_server = true;
            setup.root_token = token.to_owned();
            let (host, container) = first_port(service).ok_or("vault service publishes no port")?;
            setup.host_port = host;
            setup.container_port = container;
            setup.tls = command_words(service).iter().any(|w| w == "-dev-tls");
        }

        let volumes = service.get("volumes").and_then(Value::as_sequence);
        for volume in volumes.into_iter().flatten().filter_map(Value::as_str) {
            let source = volume.split(':').next().unwrap_or_default();
            if source.ends_with(".sh") {
                setup.seed_scripts.push(base.join(source));
            }
        }
    }

    if !found_server {
        return Err("no service sets VAULT_DEV_ROOT_TOKEN_ID".to_owned());
    }
    Ok(setup)
}

fn first_port(service: &Value) -> Option<(u16, u16)> {
    let mapping = service.get("ports")?.as_sequence()?.first()?.as_str()?;
    let (host, container) = mapping.split_once(':')?;
    Some((host.parse().ok()?, container.parse().ok()?))
}

fn command_words(service: &Value) -> Vec<String> {
    match service.get("command") {
        Some(Value::Sequence(words)) => words
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
        Some(Value::String(line)) => line.split_whitespace().map(str::to_owned).collect(),
        _ => Vec::new(),
    }
}

fn apply_seed(script: &str, mounts: &mut BTreeMap<String, BTreeMap<String, SecretMap>>) {
    for line in script.lines().map(str::trim) {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            ["vault", "secrets", "enable", args @ ..] => {
                if let Some(path) = flag(args, "-path=") {
                    mounts.entry(path.to_owned()).or_default();
                }
            }
            ["vault", "kv", "put", args @ ..] => {
                let mount = flag(args, "-mount=").unwrap_or(DEFAULT_MOUNT);
                let mut rest = args.iter().filter(|a| !a.starts_with('-'));
                let Some(path) = rest.next() else { continue };
                let values: SecretMap = rest
                    .filter_map(|pair| pair.split_once('='))
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect();
                mounts
                    .entry(mount.to_owned())
                    .or_default()
                    .insert((*path).to_owned(), values);
            }
            _ => {}
        }
    }
}

fn flag<'a>(args: &[&'a str], prefix: &str) -> Option<&'a str> {
    args.iter().find_map(|a| a.strip_prefix(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::config::repo_root;

    #[test]
    fn default_compose_describes_plain_dev_server() {
        let setup =
            parse_compose(&repo_root().join("infrastructure/docker-compose-hashicorp-vault.yml"))
                .unwrap();
        assert_eq!(setup.host_port, 8200);
        assert_eq!(setup.container_port, 8200);
        assert!(!setup.tls);
        assert_eq!(setup.root_token, "vault-dev-root-token-id");
        assert_eq!(setup.seed_scripts.len(), 1);
    }

    #[test]
    fn tls_and_custom_port_composes_are_recognised() {
        let root = repo_root().join("components/vaultAddr");
        let tls = parse_compose(&root.join("missing/docker-compose-hashicorp-vault.yml")).unwrap();
        assert!(tls.tls);

        let custom =
            parse_compose(&root.join("nonStdPort/docker-compose-hashicorp-vault.yml")).unwrap();
        assert_eq!((custom.host_port, custom.container_port), (11200, 8200));
    }

    #[test]
    fn seed_script_populates_mounts() {
        let mut mounts = BTreeMap::new();
        apply_seed(
            "set -e\nvault secrets enable -path=custom kv-v2\nvault kv put -mount=custom dapr/s a=1 b=2\n",
            &mut mounts,
        );
        let secret = &mounts["custom"]["dapr/s"];
        assert_eq!(secret.get("a").map(String::as_str), Some("1"));
        assert_eq!(secret.len(), 2);
    }
}
