//! 진단 로그 싱크와 캡처 핸들
//!
//! [`DiagnosticSink`]는 테스트 대상 컴포넌트의 진단 스트림이 흘러드는 단일 writer 슬롯입니다.
//! 모든 쓰기는 (echo가 켜져 있으면) 표준 출력으로 그대로 전달되고, 활성 캡처가 있으면
//! 그 버퍼에도 추가됩니다.
//!
//! # 캡처 규칙
//! - [`DiagnosticSink::begin`]은 이미 활성 캡처가 있으면 [`CaptureError::AlreadyActive`]로
//!   즉시 실패합니다. 공유 상태를 덮어쓰지 않습니다.
//! - [`CaptureHandle`]을 `end()` 하거나 drop하면 버퍼가 버려지고 슬롯이 해제됩니다.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing_subscriber::fmt::MakeWriter;

use vaultcert_core::error::CaptureError;

/// 컴포넌트 초기화 실패를 뜻하는 진단 로그 마커
pub const INIT_FAILURE_MARKER: &str = "INIT_COMPONENT_FAILURE";

/// 진단 싱크로 라우팅되는 tracing target
pub const DIAGNOSTIC_TARGET: &str = "vaultcert::diagnostic";

static GLOBAL_SINK: OnceLock<DiagnosticSink> = OnceLock::new();

/// 진단 로그 싱크 (clone 가능한 핸들)
#[derive(Clone)]
pub struct DiagnosticSink {
    inner: Arc<SinkInner>,
}

struct SinkInner {
    /// 활성 캡처 버퍼 (최대 하나)
    slot: Mutex<Option<CaptureBuffer>>,
    /// 표준 출력 echo 여부
    echo: AtomicBool,
    next_id: AtomicU64,
}

struct CaptureBuffer {
    id: u64,
    bytes: Vec<u8>,
}

impl DiagnosticSink {
    /// 격리된 새 싱크를 생성합니다. echo는 꺼져 있습니다.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SinkInner {
                slot: Mutex::new(None),
                echo: AtomicBool::new(false),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// 프로세스 전역 싱크. echo가 켜진 상태로 처음 호출 시 생성됩니다.
    pub fn global() -> Self {
        GLOBAL_SINK
            .get_or_init(|| Self::new().with_echo(true))
            .clone()
    }

    pub fn with_echo(self, echo: bool) -> Self {
        self.inner.echo.store(echo, Ordering::Relaxed);
        self
    }

    /// 같은 싱크를 가리키는 핸들인지
    pub fn same_as(&self, other: &DiagnosticSink) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// 캡처를 시작합니다.
    pub fn begin(&self) -> Result<CaptureHandle, CaptureError> {
        let mut slot = self.lock_slot();
        if slot.is_some() {
            return Err(CaptureError::AlreadyActive);
        }
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        *slot = Some(CaptureBuffer {
            id,
            bytes: Vec::new(),
        });
        tracing::debug!(capture = id, "diagnostic capture started");
        Ok(CaptureHandle {
            sink: self.clone(),
            id,
        })
    }

    /// 캡처가 진행 중인지
    pub fn is_capturing(&self) -> bool {
        self.lock_slot().is_some()
    }

    /// 한 줄을 기록합니다. 줄바꿈은 자동으로 붙습니다.
    pub fn record_line(&self, line: &str) {
        let mut bytes = Vec::with_capacity(line.len() + 1);
        bytes.extend_from_slice(line.trim_end_matches(['\r', '\n']).as_bytes());
        bytes.push(b'\n');
        self.write_bytes(&bytes);
    }

    fn write_bytes(&self, buf: &[u8]) {
        if self.inner.echo.load(Ordering::Relaxed) {
            let _ = io::stdout().lock().write_all(buf);
        }
        if let Some(capture) = self.lock_slot().as_mut() {
            capture.bytes.extend_from_slice(buf);
        }
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<CaptureBuffer>> {
        // 버퍼 조작 중 패닉이 나도 슬롯 자체는 계속 쓸 수 있어야 함
        self.inner
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn release(&self, id: u64) {
        let mut slot = self.lock_slot();
        if slot.as_ref().is_some_and(|c| c.id == id) {
            *slot = None;
            tracing::debug!(capture = id, "diagnostic capture released");
        }
    }

    fn lines_of(&self, id: u64) -> Vec<String> {
        let slot = self.lock_slot();
        match slot.as_ref() {
            Some(capture) if capture.id == id => String::from_utf8_lossy(&capture.bytes)
                .lines()
                .map(str::to_owned)
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DiagnosticSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticSink")
            .field("echo", &self.inner.echo.load(Ordering::Relaxed))
            .field("capturing", &self.is_capturing())
            .finish()
    }
}

/// `tracing_subscriber::fmt` 레이어용 writer
pub struct SinkWriter {
    sink: DiagnosticSink,
}

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink.write_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for DiagnosticSink {
    type Writer = SinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter { sink: self.clone() }
    }
}

/// 활성 캡처 핸들
///
/// 한 플로우가 소유하며, drop 시 캡처가 해제됩니다.
#[derive(Debug)]
pub struct CaptureHandle {
    sink: DiagnosticSink,
    id: u64,
}

impl CaptureHandle {
    /// 마커를 포함하는 첫 번째 줄 전체
    pub fn check_for_marker(&self, marker: &str) -> Option<String> {
        self.sink
            .lines_of(self.id)
            .into_iter()
            .find(|line| line.contains(marker))
    }

    /// 마커를 포함하는 모든 줄
    pub fn marker_lines(&self, marker: &str) -> Vec<String> {
        self.sink
            .lines_of(self.id)
            .into_iter()
            .filter(|line| line.contains(marker))
            .collect()
    }

    /// 지금까지 캡처된 모든 줄
    pub fn lines(&self) -> Vec<String> {
        self.sink.lines_of(self.id)
    }

    /// 캡처를 명시적으로 종료합니다.
    pub fn end(self) {
        drop(self);
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        self.sink.release(self.id);
    }
}
