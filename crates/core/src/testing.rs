//! 테스트용 Mock 어댑터
//!
//! 설정 가능한 응답을 반환하여 런타임이나 Docker 없이 스텝과 플로우를 테스트합니다.
//! `testing` feature 또는 이 크레이트의 테스트에서만 컴파일됩니다.

use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::client::{MetadataClient, SecretClient};
use crate::error::{ClientError, FaultError, FixtureError};
use crate::fault::FaultInjector;
use crate::fixture::{RuntimeHost, StoreServer};
use crate::types::{BulkSecrets, ComponentRecord, ComponentSnapshot, RequestOptions, SecretMap};

/// Mock 메타데이터 클라이언트
#[derive(Default)]
pub struct MockMetadataClient {
    /// list_components 호출 시 반환할 컴포넌트 목록
    pub components: Vec<ComponentRecord>,
    /// 호출 실패를 시뮬레이션할지 여부
    pub fail: bool,
}

impl MockMetadataClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_components(mut self, components: Vec<ComponentRecord>) -> Self {
        self.components = components;
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl MetadataClient for MockMetadataClient {
    async fn list_components(&self) -> Result<ComponentSnapshot, ClientError> {
        if self.fail {
            return Err(ClientError::Transport("mock metadata failure".to_owned()));
        }
        Ok(ComponentSnapshot::new(self.components.clone()))
    }
}

/// Mock 시크릿 클라이언트
///
/// `(store, key)`로 시드된 값을 돌려주고, 없는 키는 에러입니다.
/// `with_sequence`로 같은 키에 대해 호출마다 다른 응답을 줄 수 있습니다.
#[derive(Default)]
pub struct MockSecretClient {
    secrets: BTreeMap<(String, String), SecretMap>,
    sequences: Mutex<BTreeMap<(String, String), VecDeque<SecretMap>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockSecretClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret<I, K, V>(mut self, store: &str, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.secrets.insert((store.to_owned(), key.to_owned()), map);
        self
    }

    /// 호출 순서대로 소비되는 응답을 등록합니다. 소진되면 `with_secret` 값으로 돌아갑니다.
    pub fn with_sequence(self, store: &str, key: &str, responses: Vec<SecretMap>) -> Self {
        if let Ok(mut sequences) = self.sequences.lock() {
            sequences.insert((store.to_owned(), key.to_owned()), responses.into());
        }
        self
    }

    /// 지금까지 받은 `(store, key)` 호출 목록
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl SecretClient for MockSecretClient {
    async fn get_secret(
        &self,
        store: &str,
        key: &str,
        _options: &RequestOptions,
    ) -> Result<SecretMap, ClientError> {
        let id = (store.to_owned(), key.to_owned());
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(id.clone());
        }
        let sequenced = self
            .sequences
            .lock()
            .ok()
            .and_then(|mut s| s.get_mut(&id).and_then(VecDeque::pop_front));
        if let Some(values) = sequenced {
            return Ok(values);
        }
        self.secrets
            .get(&id)
            .cloned()
            .ok_or_else(|| ClientError::Status {
                endpoint: format!("/v1.0/secrets/{store}/{key}"),
                status: 500,
                body: "secret not found".to_owned(),
            })
    }

    async fn get_bulk_secret(
        &self,
        store: &str,
        _options: &RequestOptions,
    ) -> Result<BulkSecrets, ClientError> {
        Ok(self
            .secrets
            .iter()
            .filter(|((s, _), _)| s == store)
            .map(|((_, key), values)| (key.clone(), values.clone()))
            .collect())
    }
}

/// Mock 장애 주입기 — 호출 기록만 남깁니다.
#[derive(Default)]
pub struct MockFaultInjector {
    calls: Mutex<Vec<String>>,
    /// cut 호출 시 실패를 시뮬레이션할지 여부
    pub fail_cut: bool,
}

impl MockFaultInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failing_cut(mut self) -> Self {
        self.fail_cut = true;
        self
    }

    /// `"cut 8200"`, `"restore 8200"` 형식의 호출 기록
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl FaultInjector for MockFaultInjector {
    async fn cut(&self, port: &str) -> Result<(), FaultError> {
        self.record(format!("cut {port}"));
        if self.fail_cut {
            return Err(FaultError::TargetNotFound {
                port: port.to_owned(),
            });
        }
        Ok(())
    }

    async fn restore(&self, port: &str) -> Result<(), FaultError> {
        self.record(format!("restore {port}"));
        Ok(())
    }
}

/// Mock 픽스처 — 스토어 서버와 런타임 호스트 역할을 모두 합니다.
#[derive(Default)]
pub struct MockFixture {
    events: Mutex<Vec<String>>,
    loaded: Mutex<Option<PathBuf>>,
    /// start 호출 시 실패를 시뮬레이션할지 여부
    pub fail_start: bool,
}

impl MockFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// `"store start"`, `"runtime start <path>"` 형식의 이벤트 기록
    pub fn events(&self) -> Vec<String> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// 마지막으로 로드한 컴포넌트 경로
    pub fn loaded_path(&self) -> Option<PathBuf> {
        self.loaded.lock().ok().and_then(|p| p.clone())
    }

    fn record(&self, event: String) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    fn start_result(&self, what: &str) -> Result<(), FixtureError> {
        if self.fail_start {
            return Err(FixtureError::Spawn {
                program: what.to_owned(),
                reason: "mock failure".to_owned(),
            });
        }
        Ok(())
    }
}

impl StoreServer for MockFixture {
    async fn start(&self) -> Result<(), FixtureError> {
        self.record("store start".to_owned());
        self.start_result("store")
    }

    async fn stop(&self) -> Result<(), FixtureError> {
        self.record("store stop".to_owned());
        Ok(())
    }
}

impl RuntimeHost for MockFixture {
    async fn start(&self, components_path: &Path) -> Result<(), FixtureError> {
        self.record(format!("runtime start {}", components_path.display()));
        if let Ok(mut loaded) = self.loaded.lock() {
            *loaded = Some(components_path.to_path_buf());
        }
        self.start_result("runtime")
    }

    async fn stop(&self) -> Result<(), FixtureError> {
        self.record("runtime stop".to_owned());
        Ok(())
    }
}
