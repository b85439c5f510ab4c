//! 픽스처 스텝 — 스토어 서버/런타임 기동·정지와 네트워크 장애 구간
//!
//! 셋업과 정리를 플로우의 명시적인 스텝으로 표현하기 위한 얇은 래퍼입니다.

use std::path::PathBuf;
use std::sync::Arc;

use vaultcert_core::fault::DynFaultInjector;
use vaultcert_core::fixture::{DynRuntimeHost, DynStoreServer};
use vaultcert_core::error::StepError;
use vaultcert_core::types::{BoxFuture, FaultWindow};
use vaultcert_flow::{FlowContext, Step};

/// 시크릿 스토어 서버 시작
pub struct StartStoreServer(pub Arc<dyn DynStoreServer>);

impl Step for StartStoreServer {
    fn execute<'a>(&'a self, _ctx: &'a FlowContext) -> BoxFuture<'a, Result<(), StepError>> {
        Box::pin(async move {
            self.0.start().await?;
            Ok(())
        })
    }
}

/// 시크릿 스토어 서버 정지
pub struct StopStoreServer(pub Arc<dyn DynStoreServer>);

impl Step for StopStoreServer {
    fn execute<'a>(&'a self, _ctx: &'a FlowContext) -> BoxFuture<'a, Result<(), StepError>> {
        Box::pin(async move {
            self.0.stop().await?;
            Ok(())
        })
    }
}

/// 컴포넌트 디렉토리를 로드하여 런타임 시작
pub struct StartRuntime {
    host: Arc<dyn DynRuntimeHost>,
    components_path: PathBuf,
}

impl StartRuntime {
    pub fn new(host: Arc<dyn DynRuntimeHost>, components_path: impl Into<PathBuf>) -> Self {
        Self {
            host,
            components_path: components_path.into(),
        }
    }
}

impl Step for StartRuntime {
    fn execute<'a>(&'a self, ctx: &'a FlowContext) -> BoxFuture<'a, Result<(), StepError>> {
        Box::pin(async move {
            tracing::debug!(
                flow = ctx.description(),
                components = %self.components_path.display(),
                "starting runtime"
            );
            self.host.start(&self.components_path).await?;
            Ok(())
        })
    }
}

/// 런타임 정지
pub struct StopRuntime(pub Arc<dyn DynRuntimeHost>);

impl Step for StopRuntime {
    fn execute<'a>(&'a self, _ctx: &'a FlowContext) -> BoxFuture<'a, Result<(), StepError>> {
        Box::pin(async move {
            self.0.stop().await?;
            Ok(())
        })
    }
}

/// 장애 구간 동안 대상 포트 차단 후 복구
///
/// 구간 전체가 지나고 복구가 끝나야 다음 스텝으로 넘어갑니다.
pub struct InterruptNetwork {
    injector: Arc<dyn DynFaultInjector>,
    window: FaultWindow,
}

impl InterruptNetwork {
    pub fn new(injector: Arc<dyn DynFaultInjector>, window: FaultWindow) -> Self {
        Self { injector, window }
    }

    pub fn window(&self) -> &FaultWindow {
        &self.window
    }
}

impl Step for InterruptNetwork {
    fn execute<'a>(&'a self, _ctx: &'a FlowContext) -> BoxFuture<'a, Result<(), StepError>> {
        Box::pin(async move {
            self.injector.interrupt(&self.window).await?;
            Ok(())
        })
    }
}
