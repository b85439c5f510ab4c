//! Broken environments are reported at the step that catches them.

use std::sync::Arc;

use vaultcert_scenarios::{FlowOutcome, PROVISION_STEP, ScenarioDriver, find};

use crate::helpers::config::test_config;
use crate::helpers::provider::FakeProvider;

fn failed_step(outcome: &FlowOutcome) -> (&str, usize, &str) {
    match outcome {
        FlowOutcome::Failed {
            step,
            index,
            message,
            ..
        } => (step.as_str(), *index, message.as_str()),
        other => panic!("expected a failed flow, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_e2e_unseeded_store_fails_first_retrieval() {
    // Given: a store that comes up without the certification secrets
    let provider = Arc::new(FakeProvider::new().unseeded());
    let driver = ScenarioDriver::new(provider.clone(), test_config());

    // When
    let report = driver.run(&find("basic-secret-retrieval").unwrap()).await;

    // Then: registration passes, the first read fails, teardown never runs
    let (step, index, message) = failed_step(&report.outcomes[0]);
    assert_eq!(step, "Run basic secret retrieval test");
    assert_eq!(index, 6);
    assert!(message.contains("secondsecret"), "{message}");
    assert!(provider.provisioned()[0].vault.lock().running);
}

#[tokio::test(start_paused = true)]
async fn test_e2e_missing_init_failure_log_is_detected() {
    // Given: a runtime that swallows initialization errors
    let provider = Arc::new(FakeProvider::new().silent_init_failures());
    let driver = ScenarioDriver::new(provider, test_config());

    // When
    let report = driver
        .run(&find("token-and-token-mount-path").unwrap())
        .await;

    // Then: the three negative flows fail at the log check, the rest pass
    assert_eq!(report.failed_count(), 3);
    for outcome in &report.outcomes[..3] {
        let (step, index, _) = failed_step(outcome);
        assert_eq!(step, "Verify initialization error reported for component");
        assert_eq!(index, 6);
    }
    assert!(report.outcomes[3..].iter().all(FlowOutcome::is_passed));
}

#[tokio::test(start_paused = true)]
async fn test_e2e_missing_compose_file_fails_store_start() {
    // Given: a configuration pointing at a compose file that does not exist
    let mut config = test_config();
    config.store.compose_file = "/nonexistent/docker-compose.yml".to_owned();
    let driver = ScenarioDriver::new(Arc::new(FakeProvider::new()), config);

    // When
    let report = driver.run(&find("multiple-kv-retrieval").unwrap()).await;

    // Then
    let (step, index, _) = failed_step(&report.outcomes[0]);
    assert_eq!((step, index), ("Start HashiCorp Vault server", 1));
}

struct FailingProvider;

impl vaultcert_scenarios::FixtureProvider for FailingProvider {
    fn provision(
        &self,
        _plan: &vaultcert_scenarios::FixturePlan,
    ) -> Result<vaultcert_scenarios::Fixture, vaultcert_core::error::CertError> {
        Err(vaultcert_core::error::FixtureError::Ports("exhausted".to_owned()).into())
    }
}

#[tokio::test]
async fn test_e2e_provision_failure_does_not_stop_remaining_flows() {
    // Given
    let driver = ScenarioDriver::new(Arc::new(FailingProvider), test_config());

    // When
    let report = driver.run(&find("vault-addr").unwrap()).await;

    // Then: every flow is reported, none ran a step
    assert_eq!(report.outcomes.len(), 4);
    for outcome in &report.outcomes {
        let (step, index, message) = failed_step(outcome);
        assert_eq!((step, index), (PROVISION_STEP, 0));
        assert!(message.contains("exhausted"));
    }
}
