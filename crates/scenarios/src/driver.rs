//! 시나리오 드라이버
//!
//! 플로우마다 새 픽스처를 준비하고 [`FlowRunner`]로 실행합니다. 실패한 플로우가
//! 있어도 나머지 플로우는 계속 실행하며, 결과는 [`ScenarioReport`]로 모읍니다.
//!
//! 진단 로그 싱크는 프로세스 전역이므로 드라이버는 시나리오 전체 동안
//! 전역 비동기 락을 잡습니다. 같은 프로세스에서 두 시나리오가 겹치지 않습니다.

use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use vaultcert_core::config::HarnessConfig;
use vaultcert_core::metrics as m;
use vaultcert_flow::FlowRunner;

use crate::catalog::Scenario;
use crate::fixture::FixtureProvider;
use crate::plan::FlowPlan;

/// 픽스처 준비 실패 시 보고되는 스텝 레이블
pub const PROVISION_STEP: &str = "provision fixture";

static SCENARIO_LOCK: Mutex<()> = Mutex::const_new(());

/// 플로우 하나의 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FlowOutcome {
    Passed {
        flow: String,
        steps: usize,
    },
    Failed {
        flow: String,
        step: String,
        index: usize,
        message: String,
    },
}

impl FlowOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, FlowOutcome::Passed { .. })
    }

    pub fn flow(&self) -> &str {
        match self {
            FlowOutcome::Passed { flow, .. } | FlowOutcome::Failed { flow, .. } => flow,
        }
    }
}

/// 시나리오 실행 결과
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub outcomes: Vec<FlowOutcome>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(FlowOutcome::is_passed)
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_passed()).count()
    }
}

/// 카탈로그 시나리오를 실행합니다.
pub struct ScenarioDriver {
    provider: Arc<dyn FixtureProvider>,
    config: HarnessConfig,
    runner: FlowRunner,
    cancellation: Option<CancellationToken>,
}

impl ScenarioDriver {
    pub fn new(provider: Arc<dyn FixtureProvider>, config: HarnessConfig) -> Self {
        Self {
            provider,
            config,
            runner: FlowRunner::new(),
            cancellation: None,
        }
    }

    /// 취소되면 진행 중인 플로우는 다음 스텝 경계에서 멈추고 남은 플로우는 실패로 보고됩니다.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub async fn run(&self, scenario: &Scenario) -> ScenarioReport {
        let _guard = SCENARIO_LOCK.lock().await;
        tracing::info!(scenario = scenario.name, flows = scenario.flows.len(), "running scenario");

        let mut outcomes = Vec::with_capacity(scenario.flows.len());
        for plan in &scenario.flows {
            let outcome = self.run_flow(plan).await;
            let result = if outcome.is_passed() { "passed" } else { "failed" };
            counter!(
                m::SCENARIO_FLOWS_TOTAL,
                m::LABEL_SCENARIO => scenario.name,
                m::LABEL_RESULT => result
            )
            .increment(1);
            outcomes.push(outcome);
        }

        let report = ScenarioReport {
            scenario: scenario.name.to_owned(),
            outcomes,
        };
        if report.passed() {
            tracing::info!(scenario = scenario.name, "scenario passed");
        } else {
            tracing::warn!(
                scenario = scenario.name,
                failed = report.failed_count(),
                "scenario failed"
            );
        }
        report
    }

    pub async fn run_all(&self, scenarios: &[Scenario]) -> Vec<ScenarioReport> {
        let mut reports = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            reports.push(self.run(scenario).await);
        }
        reports
    }

    async fn run_flow(&self, plan: &FlowPlan) -> FlowOutcome {
        let fixture = match self.provider.provision(&plan.fixture_plan(&self.config)) {
            Ok(fixture) => fixture,
            Err(e) => {
                tracing::error!(flow = %plan.description, error = %e, "failed to provision fixture");
                return FlowOutcome::Failed {
                    flow: plan.description.clone(),
                    step: PROVISION_STEP.to_owned(),
                    index: 0,
                    message: e.to_string(),
                };
            }
        };

        let mut flow = plan.build(&fixture, &self.config);
        if let Some(token) = &self.cancellation {
            flow = flow.cancellation(token.clone());
        }

        match self.runner.run(flow).await {
            Ok(report) => FlowOutcome::Passed {
                flow: report.description,
                steps: report.steps_run,
            },
            Err(failure) => FlowOutcome::Failed {
                flow: failure.flow,
                step: failure.step,
                index: failure.index,
                message: failure.error.to_string(),
            },
        }
    }
}
