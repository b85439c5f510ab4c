//! vaultcert-scenarios: HashiCorp Vault 인증 시나리오
//!
//! # Module Structure
//!
//! - [`plan`]: 선언적 플로우 플랜과 체크
//! - [`catalog`]: 인증 시나리오 카탈로그
//! - [`fixture`]: 플로우별 픽스처와 프로바이더
//! - [`driver`]: 시나리오 드라이버와 결과 보고

pub mod catalog;
pub mod driver;
pub mod fixture;
pub mod plan;

pub use catalog::{DEFAULT_SECRET, DEFAULT_STORE, Scenario, catalog, find, names};
pub use driver::{FlowOutcome, PROVISION_STEP, ScenarioDriver, ScenarioReport};
pub use fixture::{Fixture, FixturePlan, FixtureProvider, LocalFixtureProvider};
pub use plan::{COMPONENT_COMPOSE_FILE, Check, ComposeSource, FRAME_STEPS, FlowPlan, PlannedCheck};
