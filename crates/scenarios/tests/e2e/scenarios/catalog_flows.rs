//! The shipped catalog passes end to end against the fakes.

use std::sync::Arc;

use vaultcert_scenarios::{FlowOutcome, ScenarioDriver, ScenarioReport, catalog, find};

use crate::helpers::config::test_config;
use crate::helpers::provider::FakeProvider;

fn describe_failures(report: &ScenarioReport) -> Vec<String> {
    report
        .outcomes
        .iter()
        .filter_map(|o| match o {
            FlowOutcome::Failed {
                flow,
                step,
                index,
                message,
            } => Some(format!("{flow} #{index} '{step}': {message}")),
            FlowOutcome::Passed { .. } => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_e2e_full_catalog_passes() {
    // Given: every catalog scenario driven against the fakes
    let provider = Arc::new(FakeProvider::new());
    let driver = ScenarioDriver::new(provider.clone(), test_config());

    // When
    let reports = driver.run_all(&catalog()).await;

    // Then: each flow passed and got its own fixture
    assert_eq!(reports.len(), 9);
    for report in &reports {
        assert!(
            report.passed(),
            "scenario {} failed: {:#?}",
            report.scenario,
            describe_failures(report)
        );
    }
    let flows: usize = reports.iter().map(|r| r.outcomes.len()).sum();
    assert_eq!(provider.provisioned().len(), flows);
}

#[tokio::test(start_paused = true)]
async fn test_e2e_basic_retrieval_interrupts_store_port() {
    // Given
    let provider = Arc::new(FakeProvider::new());
    let driver = ScenarioDriver::new(provider.clone(), test_config());
    let scenario = find("basic-secret-retrieval").unwrap();

    // When
    let started = tokio::time::Instant::now();
    let report = driver.run(&scenario).await;

    // Then: the store port was cut and restored, and the flow waited the full window
    assert!(report.passed(), "{:#?}", describe_failures(&report));
    let provisioned = provider.provisioned();
    assert_eq!(
        provisioned[0].faults.calls(),
        vec!["cut 8200".to_owned(), "restore 8200".to_owned()]
    );
    let config = test_config();
    assert!(
        started.elapsed()
            >= config.timing.network_instability()
                + config.timing.recovery_wait()
                + config.timing.startup_wait()
                + config.timing.load_wait()
    );
}

#[tokio::test(start_paused = true)]
async fn test_e2e_flows_tear_down_store_after_success() {
    // Given
    let provider = Arc::new(FakeProvider::new());
    let driver = ScenarioDriver::new(provider.clone(), test_config());

    // When
    let report = driver.run(&find("vault-addr").unwrap()).await;

    // Then: each of the four flows started and stopped its own store
    assert!(report.passed(), "{:#?}", describe_failures(&report));
    let provisioned = provider.provisioned();
    assert_eq!(provisioned.len(), 4);
    for p in &provisioned {
        let vault = p.vault.lock();
        assert_eq!((vault.starts, vault.stops), (1, 1));
        assert!(!vault.running);
    }
}

#[tokio::test(start_paused = true)]
async fn test_e2e_custom_compose_files_are_used_where_declared() {
    // Given
    let provider = Arc::new(FakeProvider::new());
    let driver = ScenarioDriver::new(provider.clone(), test_config());

    // When
    driver.run(&find("vault-addr").unwrap()).await;

    // Then: wrongAddress uses the shared compose file, the rest their own
    let composes: Vec<bool> = provider
        .provisioned()
        .iter()
        .map(|p| p.plan.compose_file.starts_with(&p.plan.components_path))
        .collect();
    assert_eq!(composes, vec![false, true, true, true]);
}
