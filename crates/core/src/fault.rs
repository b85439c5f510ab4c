//! 네트워크 장애 주입 계약
//!
//! 차단(`cut`)과 복구(`restore`)를 독립된 호출로 두고, 기존의 블로킹 방식은
//! 제공 메서드 [`FaultInjector::interrupt`]로 남겨 둡니다. 장애 구간 도중에
//! 검증이 필요한 플로우는 `cut`과 `restore` 사이에 스텝을 끼워 넣을 수 있습니다.

use std::future::Future;

use metrics::counter;
use tracing::{info, warn};

use crate::error::FaultError;
use crate::metrics as m;
use crate::types::{BoxFuture, FaultWindow};

/// 서비스 포트 도달성 차단/복구
pub trait FaultInjector: Send + Sync {
    /// 대상 포트로의 연결을 차단합니다.
    fn cut(&self, port: &str) -> impl Future<Output = Result<(), FaultError>> + Send;

    /// 차단된 포트를 복구합니다.
    fn restore(&self, port: &str) -> impl Future<Output = Result<(), FaultError>> + Send;

    /// 차단 → `duration` 대기 → 복구.
    ///
    /// 전체 구간이 지나고 복구가 끝나야 반환됩니다. 차단에 실패하면 대기 없이
    /// 즉시 에러를 반환하고, 복구 실패는 그대로 보고합니다.
    fn interrupt(&self, window: &FaultWindow) -> impl Future<Output = Result<(), FaultError>> + Send {
        async move {
            counter!(m::FAULT_WINDOWS_TOTAL).increment(1);
            info!(
                port = %window.target_port,
                duration_secs = window.duration.as_secs_f64(),
                "interrupting network"
            );
            self.cut(&window.target_port).await?;
            tokio::time::sleep(window.duration).await;
            if let Err(e) = self.restore(&window.target_port).await {
                warn!(port = %window.target_port, error = %e, "failed to restore network");
                return Err(e);
            }
            info!(port = %window.target_port, "network restored");
            Ok(())
        }
    }
}

/// dyn-compatible 장애 주입기
pub trait DynFaultInjector: Send + Sync {
    fn cut<'a>(&'a self, port: &'a str) -> BoxFuture<'a, Result<(), FaultError>>;

    fn restore<'a>(&'a self, port: &'a str) -> BoxFuture<'a, Result<(), FaultError>>;

    fn interrupt<'a>(&'a self, window: &'a FaultWindow) -> BoxFuture<'a, Result<(), FaultError>>;
}

impl<T: FaultInjector> DynFaultInjector for T {
    fn cut<'a>(&'a self, port: &'a str) -> BoxFuture<'a, Result<(), FaultError>> {
        Box::pin(FaultInjector::cut(self, port))
    }

    fn restore<'a>(&'a self, port: &'a str) -> BoxFuture<'a, Result<(), FaultError>> {
        Box::pin(FaultInjector::restore(self, port))
    }

    fn interrupt<'a>(&'a self, window: &'a FaultWindow) -> BoxFuture<'a, Result<(), FaultError>> {
        Box::pin(FaultInjector::interrupt(self, window))
    }
}
