//! 호스팅 런타임 클라이언트 계약 — 메타데이터 조회와 시크릿 조회
//!
//! [`MetadataClient`]와 [`SecretClient`]는 RPITIT를 사용하므로 `dyn`으로 쓸 수 없습니다.
//! 스텝은 dyn-compatible 쌍둥이인 [`DynMetadataClient`] / [`DynSecretClient`]를
//! `Arc`로 보관하며, 두 trait 모두 blanket impl로 자동 구현됩니다.
//!
//! 두 계약 모두 하네스가 재시도나 타임아웃을 덧씌우지 않는 단일 왕복 호출입니다.

use std::future::Future;

use crate::error::ClientError;
use crate::types::{BoxFuture, BulkSecrets, ComponentSnapshot, RequestOptions, SecretMap};

/// 등록된 컴포넌트 목록 조회
pub trait MetadataClient: Send + Sync {
    /// 현재 등록된 컴포넌트와 각 컴포넌트의 기능 문자열을 반환합니다.
    ///
    /// 실패는 호출한 스텝에 치명적입니다 (재시도 없음).
    fn list_components(&self)
    -> impl Future<Output = Result<ComponentSnapshot, ClientError>> + Send;
}

/// 시크릿 조회
pub trait SecretClient: Send + Sync {
    /// 단일 시크릿을 조회합니다.
    ///
    /// 스토어가 노출하지 않는 키(잘못된 prefix, 잘못된 엔진 경로, 존재하지 않는 키)는
    /// 반드시 에러여야 하며, 비어 있는 성공 응답을 돌려주면 안 됩니다.
    fn get_secret(
        &self,
        store: &str,
        key: &str,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<SecretMap, ClientError>> + Send;

    /// 스토어의 모든 시크릿을 조회합니다.
    fn get_bulk_secret(
        &self,
        store: &str,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<BulkSecrets, ClientError>> + Send;
}

/// dyn-compatible 메타데이터 클라이언트
pub trait DynMetadataClient: Send + Sync {
    fn list_components(&self) -> BoxFuture<'_, Result<ComponentSnapshot, ClientError>>;
}

impl<T: MetadataClient> DynMetadataClient for T {
    fn list_components(&self) -> BoxFuture<'_, Result<ComponentSnapshot, ClientError>> {
        Box::pin(MetadataClient::list_components(self))
    }
}

/// dyn-compatible 시크릿 클라이언트
pub trait DynSecretClient: Send + Sync {
    fn get_secret<'a>(
        &'a self,
        store: &'a str,
        key: &'a str,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, Result<SecretMap, ClientError>>;

    fn get_bulk_secret<'a>(
        &'a self,
        store: &'a str,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, Result<BulkSecrets, ClientError>>;
}

impl<T: SecretClient> DynSecretClient for T {
    fn get_secret<'a>(
        &'a self,
        store: &'a str,
        key: &'a str,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, Result<SecretMap, ClientError>> {
        Box::pin(SecretClient::get_secret(self, store, key, options))
    }

    fn get_bulk_secret<'a>(
        &'a self,
        store: &'a str,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, Result<BulkSecrets, ClientError>> {
        Box::pin(SecretClient::get_bulk_secret(self, store, options))
    }
}
