//! 메트릭 상수 및 설명 등록
//!
//! 하네스는 레코더나 익스포터를 설치하지 않습니다. 카운터는 `metrics` 파사드로만
//! 증가시키며, 레코더를 설치한 임베더만 값을 관찰할 수 있습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `vaultcert_`
//! - 접미어: `_total` (counter)
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(vaultcert_core::metrics::FLOWS_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (passed, failed)
pub const LABEL_RESULT: &str = "result";

/// 시나리오 레이블 키
pub const LABEL_SCENARIO: &str = "scenario";

// ─── 플로우 메트릭 ──────────────────────────────────────────────────

/// 실행된 플로우 수 (counter)
pub const FLOWS_TOTAL: &str = "vaultcert_flows_total";

/// 실패한 플로우 수 (counter)
pub const FLOW_FAILURES_TOTAL: &str = "vaultcert_flow_failures_total";

/// 실행된 스텝 수 (counter)
pub const STEPS_TOTAL: &str = "vaultcert_steps_total";

/// 주입된 네트워크 장애 구간 수 (counter)
pub const FAULT_WINDOWS_TOTAL: &str = "vaultcert_fault_windows_total";

// ─── 시나리오 메트릭 ────────────────────────────────────────────────

/// 시나리오별 플로우 결과 (counter, labels: scenario, result)
pub const SCENARIO_FLOWS_TOTAL: &str = "vaultcert_scenario_flows_total";

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 임베더가 전역 레코더를 설치한 뒤 한 번 호출합니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(FLOWS_TOTAL, "Total number of certification flows executed");
    describe_counter!(
        FLOW_FAILURES_TOTAL,
        "Total number of certification flows that stopped at a failing step"
    );
    describe_counter!(STEPS_TOTAL, "Total number of flow steps started");
    describe_counter!(
        FAULT_WINDOWS_TOTAL,
        "Total number of network interruption windows injected"
    );
    describe_counter!(
        SCENARIO_FLOWS_TOTAL,
        "Total number of scenario flows by scenario and result"
    );
}
