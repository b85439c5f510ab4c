//! 도메인 타입 — 하네스 전역에서 사용되는 공통 타입
//!
//! 메타데이터 조회 결과([`ComponentSnapshot`]), 시크릿 조회 결과([`SecretMap`]),
//! 장애 구간([`FaultWindow`]) 등 어댑터와 검증 계층이 주고받는 데이터 구조입니다.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 박싱된 Future 타입 별칭
///
/// dyn-compatible trait에서 비동기 메서드를 제공하기 위해 사용합니다.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// 단일 시크릿 조회 결과 (key → value)
pub type SecretMap = BTreeMap<String, String>;

/// 벌크 시크릿 조회 결과 (시크릿 이름 → key → value)
pub type BulkSecrets = BTreeMap<String, SecretMap>;

/// 조회 요청 옵션 (대부분 비어 있음)
pub type RequestOptions = BTreeMap<String, String>;

/// 컴포넌트가 광고하는 기능
///
/// 고정된 어휘에서 가져온 문자열이며, 메타데이터 응답에는 wire 문자열로 나타납니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// 하나의 시크릿에 여러 key-value 쌍
    #[serde(rename = "MULTIPLE_KEY_VALUES_PER_SECRET")]
    MultipleKeyValuesPerSecret,
}

impl Capability {
    /// 메타데이터 응답에 쓰이는 wire 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultipleKeyValuesPerSecret => "MULTIPLE_KEY_VALUES_PER_SECRET",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MULTIPLE_KEY_VALUES_PER_SECRET" => Ok(Self::MultipleKeyValuesPerSecret),
            other => Err(format!("unknown capability '{other}'")),
        }
    }
}

/// 등록된 컴포넌트 한 건
///
/// 메타데이터 조회마다 새로 만들어지며 하네스가 캐시하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// 컴포넌트 이름 (매니페스트의 metadata.name)
    pub name: String,
    /// 컴포넌트 유형 (예: `secretstores.hashicorp.vault`)
    #[serde(rename = "type", default)]
    pub component_type: String,
    /// 컴포넌트 버전
    #[serde(default)]
    pub version: String,
    /// 광고된 기능 문자열
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
}

impl ComponentRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            component_type: String::new(),
            version: String::new(),
            capabilities: BTreeSet::new(),
        }
    }

    pub fn with_type(mut self, component_type: impl Into<String>) -> Self {
        self.component_type = component_type.into();
        self
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }
}

/// 한 번의 메타데이터 조회로 얻은 컴포넌트 목록
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSnapshot(pub Vec<ComponentRecord>);

impl ComponentSnapshot {
    pub fn new(records: Vec<ComponentRecord>) -> Self {
        Self(records)
    }

    /// 이름이 정확히 일치하는 레코드 (접두어 매칭 아님)
    pub fn find(&self, name: &str) -> Option<&ComponentRecord> {
        self.0.iter().find(|record| record.name == name)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// 이름이 일치하는 레코드가 있고 그 기능 집합에 `capability`가 포함되는지
    pub fn has_capability(&self, name: &str, capability: &str) -> bool {
        self.find(name)
            .is_some_and(|record| record.capabilities.contains(capability))
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|record| record.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<ComponentRecord>> for ComponentSnapshot {
    fn from(records: Vec<ComponentRecord>) -> Self {
        Self(records)
    }
}

/// 네트워크 장애 구간
///
/// "interrupt" 스텝에서 만들어지고 `duration`이 지나면 암묵적으로 닫힙니다.
/// 하네스는 복구를 폴링하지 않고 경과 시간을 신뢰합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultWindow {
    /// 차단할 서비스 포트
    pub target_port: String,
    /// 차단 유지 시간
    pub duration: Duration,
}

impl FaultWindow {
    pub fn new(target_port: impl Into<String>, duration: Duration) -> Self {
        Self {
            target_port: target_port.into(),
            duration,
        }
    }
}

impl fmt::Display for FaultWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "port {} for {:?}", self.target_port, self.duration)
    }
}
