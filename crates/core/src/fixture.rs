//! 픽스처 협력자 계약 — 시크릿 스토어 서버와 호스팅 런타임
//!
//! 두 계약 모두 `&self`로 호출되므로 구현체는 내부 가변성으로 상태를 관리합니다.

use std::future::Future;
use std::path::Path;

use crate::error::FixtureError;
use crate::types::BoxFuture;

/// 시크릿 스토어 서버 기동/정지
pub trait StoreServer: Send + Sync {
    fn start(&self) -> impl Future<Output = Result<(), FixtureError>> + Send;

    fn stop(&self) -> impl Future<Output = Result<(), FixtureError>> + Send;
}

/// 컴포넌트를 로드하는 호스팅 런타임 기동/정지
pub trait RuntimeHost: Send + Sync {
    /// `components_path` 디렉토리의 매니페스트를 로드하여 런타임을 시작합니다.
    ///
    /// 컴포넌트 초기화 실패는 반환값으로 드러나지 않고 진단 로그에만 남습니다.
    fn start(&self, components_path: &Path)
    -> impl Future<Output = Result<(), FixtureError>> + Send;

    fn stop(&self) -> impl Future<Output = Result<(), FixtureError>> + Send;
}

/// dyn-compatible 스토어 서버
pub trait DynStoreServer: Send + Sync {
    fn start(&self) -> BoxFuture<'_, Result<(), FixtureError>>;

    fn stop(&self) -> BoxFuture<'_, Result<(), FixtureError>>;
}

impl<T: StoreServer> DynStoreServer for T {
    fn start(&self) -> BoxFuture<'_, Result<(), FixtureError>> {
        Box::pin(StoreServer::start(self))
    }

    fn stop(&self) -> BoxFuture<'_, Result<(), FixtureError>> {
        Box::pin(StoreServer::stop(self))
    }
}

/// dyn-compatible 런타임 호스트
pub trait DynRuntimeHost: Send + Sync {
    fn start<'a>(&'a self, components_path: &'a Path) -> BoxFuture<'a, Result<(), FixtureError>>;

    fn stop(&self) -> BoxFuture<'_, Result<(), FixtureError>>;
}

impl<T: RuntimeHost> DynRuntimeHost for T {
    fn start<'a>(&'a self, components_path: &'a Path) -> BoxFuture<'a, Result<(), FixtureError>> {
        Box::pin(RuntimeHost::start(self, components_path))
    }

    fn stop(&self) -> BoxFuture<'_, Result<(), FixtureError>> {
        Box::pin(RuntimeHost::stop(self))
    }
}
