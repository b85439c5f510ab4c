#![no_main]

use std::io::Write;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tracing_subscriber::fmt::MakeWriter;

use vaultcert_assertions::checks::{check_init_failure, check_no_init_failure};
use vaultcert_core::error::CaptureError;
use vaultcert_flow::{DiagnosticSink, INIT_FAILURE_MARKER};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 싱크에 그대로 쓰이는 바이트 조각 (줄 경계와 무관)
    chunks: Vec<Vec<u8>>,
    /// 줄 단위로 기록되는 로그
    lines: Vec<String>,
    component: String,
    fragments: Vec<String>,
}

fuzz_target!(|input: FuzzInput| {
    let sink = DiagnosticSink::new();
    let Ok(handle) = sink.begin() else {
        return;
    };
    assert!(matches!(sink.begin(), Err(CaptureError::AlreadyActive)));

    for chunk in input.chunks.iter().take(64) {
        let _ = sink.make_writer().write_all(chunk);
    }
    for line in input.lines.iter().take(64) {
        sink.record_line(line);
    }

    let marked = handle.marker_lines(INIT_FAILURE_MARKER);
    assert!(marked.iter().all(|l| l.contains(INIT_FAILURE_MARKER)));
    assert_eq!(handle.check_for_marker(INIT_FAILURE_MARKER), marked.first().cloned());

    let failure = check_init_failure(&marked, &input.component, &input.fragments);
    let absent = check_no_init_failure(&marked, &input.component);
    // 컴포넌트를 언급하는 마커 줄이 없으면 실패 검사는 통과할 수 없음
    if absent.is_ok() {
        assert!(failure.is_err());
    }
    // 실패 검사는 첫 마커 줄만 봄
    if failure.is_ok() {
        assert!(marked.first().is_some_and(|l| l.contains(&input.component)));
    }

    handle.end();
    assert!(!sink.is_capturing());
    assert!(sink.begin().is_ok());
});
