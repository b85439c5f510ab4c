//! 순수 검증 함수
//!
//! 어댑터 결과만 입력으로 받으며 부수 효과가 없습니다. 실패 시 사람이 읽을 수 있는
//! 진단 메시지를 담은 [`AssertionError`]를 반환합니다.

use vaultcert_core::error::AssertionError;
use vaultcert_core::types::{ComponentSnapshot, SecretMap};

/// `actual`이 `expected`의 모든 key-value 쌍을 정확히 포함하는지 검사합니다.
///
/// 부분집합 포함 검사이므로 `actual`의 추가 키는 허용됩니다.
pub fn check_secret_contains(actual: &SecretMap, expected: &SecretMap) -> Result<(), AssertionError> {
    let mut problems = Vec::new();
    for (key, want) in expected {
        match actual.get(key) {
            None => problems.push(format!("missing key '{key}'")),
            Some(got) if got != want => {
                problems.push(format!("key '{key}': expected '{want}', got '{got}'"))
            }
            Some(_) => {}
        }
    }

    if problems.is_empty() {
        return Ok(());
    }
    Err(AssertionError::new(format!(
        "secret mismatch: {} (actual keys: {:?})",
        problems.join("; "),
        actual.keys().collect::<Vec<_>>()
    )))
}

/// 컴포넌트 등록 여부가 `expected`와 같은지 검사합니다.
pub fn check_component_presence(
    snapshot: &ComponentSnapshot,
    name: &str,
    expected: bool,
) -> Result<(), AssertionError> {
    match (snapshot.is_registered(name), expected) {
        (true, true) | (false, false) => Ok(()),
        (false, true) => Err(AssertionError::new(format!(
            "component '{name}' is not registered (registered: {:?})",
            snapshot.names()
        ))),
        (true, false) => Err(AssertionError::new(format!(
            "component '{name}' is registered but was expected to be absent"
        ))),
    }
}

/// 컴포넌트가 `capability`를 광고하는지가 `expected`와 같은지 검사합니다.
///
/// `expected`가 true이면 컴포넌트가 최소 하나의 기능을 광고해야 합니다.
pub fn check_capability(
    snapshot: &ComponentSnapshot,
    name: &str,
    capability: &str,
    expected: bool,
) -> Result<(), AssertionError> {
    let has = snapshot.has_capability(name, capability);
    if has == expected {
        return Ok(());
    }

    let Some(record) = snapshot.find(name) else {
        return Err(AssertionError::new(format!(
            "component '{name}' is not registered, cannot find capability '{capability}'"
        )));
    };
    if expected && record.capabilities.is_empty() {
        return Err(AssertionError::new(format!(
            "component '{name}' advertises no capabilities, expected '{capability}'"
        )));
    }
    let advertised: Vec<&str> = record.capabilities.iter().map(String::as_str).collect();
    if expected {
        Err(AssertionError::new(format!(
            "component '{name}' does not advertise '{capability}' (advertised: {advertised:?})"
        )))
    } else {
        Err(AssertionError::new(format!(
            "component '{name}' advertises '{capability}' but should not"
        )))
    }
}

/// 처음 캡처된 초기화 실패 마커 줄이 `component`와 `required`를 모두 포함하는지 검사합니다.
///
/// `marker_lines`는 이미 마커로 걸러진 줄들입니다. 두 번째 이후의 마커 줄은 보지 않습니다.
pub fn check_init_failure(
    marker_lines: &[String],
    component: &str,
    required: &[String],
) -> Result<(), AssertionError> {
    let Some(line) = marker_lines.first() else {
        return Err(AssertionError::new(format!(
            "no initialization failure was logged, expected one for component '{component}'"
        )));
    };
    if !line.contains(component) {
        return Err(AssertionError::new(format!(
            "first initialization failure line does not mention component '{component}': {line}"
        )));
    }
    let missing: Vec<&str> = required
        .iter()
        .map(String::as_str)
        .filter(|needle| !line.contains(needle))
        .collect();
    if !missing.is_empty() {
        return Err(AssertionError::new(format!(
            "initialization failure line for '{component}' is missing {missing:?}: {line}"
        )));
    }
    Ok(())
}

/// 어떤 초기화 실패 마커 줄도 `component`를 언급하지 않는지 검사합니다.
pub fn check_no_init_failure(marker_lines: &[String], component: &str) -> Result<(), AssertionError> {
    match marker_lines.iter().find(|line| line.contains(component)) {
        None => Ok(()),
        Some(line) => Err(AssertionError::new(format!(
            "unexpected initialization failure for component '{component}': {line}"
        ))),
    }
}
