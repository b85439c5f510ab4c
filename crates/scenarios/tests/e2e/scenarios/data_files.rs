//! Catalog entries agree with the manifests shipped under `components/`.

use std::path::Path;

use vaultcert_fixture::ComponentManifest;
use vaultcert_scenarios::{Check, ComposeSource, catalog};

use crate::helpers::config::{repo_root, test_config};
use crate::helpers::vault_settings::VaultSettings;

fn checked_components(checks: &[vaultcert_scenarios::PlannedCheck]) -> Vec<&str> {
    checks
        .iter()
        .filter_map(|c| match &c.check {
            Check::Registered { component }
            | Check::Capability { component, .. }
            | Check::InitFailureLogged { component, .. }
            | Check::NoInitFailureLogged { component } => Some(component.as_str()),
            Check::SecretContains { store, .. }
            | Check::SecretAbsent { store, .. }
            | Check::SecretStable { store, .. }
            | Check::BulkContains { store, .. } => Some(store.as_str()),
            Check::InterruptStore | Check::WaitForRecovery => None,
        })
        .collect()
}

#[test]
fn test_e2e_every_flow_names_the_component_its_manifest_declares() {
    let config = test_config();
    for scenario in catalog() {
        for plan in &scenario.flows {
            // Given: the manifest directory the flow loads
            let fixture_plan = plan.fixture_plan(&config);
            let manifests = ComponentManifest::load_dir(&fixture_plan.components_path)
                .unwrap_or_else(|e| panic!("{}: {e}", plan.description));

            // Then: exactly one Vault component, named as the checks expect
            assert_eq!(manifests.len(), 1, "{}", plan.description);
            let name = manifests[0].name();
            for component in checked_components(&plan.checks) {
                assert_eq!(component, name, "{}", plan.description);
            }

            if plan.compose == ComposeSource::ComponentDir {
                assert!(
                    fixture_plan.compose_file.is_file(),
                    "{} is missing",
                    fixture_plan.compose_file.display()
                );
            }
        }
    }
}

#[test]
fn test_e2e_token_manifests_fail_initialization_as_labelled() {
    let dir = repo_root().join("components/vaultTokenAndTokenMountPath");
    let init = |suffix: &str| {
        let manifest = ComponentManifest::load(&dir.join(suffix).join("vault.yaml")).unwrap();
        VaultSettings::from_manifest(&manifest)
            .relative_to(&repo_root())
            .validate()
    };

    assert!(init("both").is_err());
    assert!(init("neither").is_err());
    assert!(init("tokenMountPathPointsToBrokenPath").is_err());
    assert!(init("badVaultToken").is_ok());
    assert!(init("tokenMountPathHappyCase").is_ok());
}

#[test]
fn test_e2e_negative_manifests_keep_the_runtime_alive() {
    let dir = repo_root().join("components/vaultTokenAndTokenMountPath");
    for suffix in ["both", "neither", "tokenMountPathPointsToBrokenPath"] {
        let manifest = ComponentManifest::load(&dir.join(suffix).join("vault.yaml")).unwrap();
        assert!(manifest.spec.ignore_errors, "{suffix} must set ignoreErrors");
    }
    assert!(Path::new(&test_config().store.compose_file).is_file());
}
