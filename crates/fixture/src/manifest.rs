//! 컴포넌트 매니페스트 (Dapr component YAML)
//!
//! [`ComponentManifest`]는 YAML 구조를 그대로 옮긴 것입니다. 메타데이터 값의 해석과
//! 초기화 검증은 런타임 안의 컴포넌트가 담당합니다.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::FixtureAdapterError;

/// HashiCorp Vault 시크릿 스토어 컴포넌트 유형
pub const VAULT_COMPONENT_TYPE: &str = "secretstores.hashicorp.vault";

/// 런타임이 컴포넌트로 로드하는 문서의 `kind`
pub const COMPONENT_KIND: &str = "Component";

/// 컴포넌트 매니페스트 한 건
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentManifest {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    pub metadata: ManifestMetadata,
    pub spec: ComponentSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub version: String,
    /// 초기화 실패 시에도 런타임을 계속 실행할지 여부
    #[serde(default)]
    pub ignore_errors: bool,
    #[serde(default)]
    pub metadata: Vec<MetadataItem>,
}

/// `spec.metadata[]` 항목. 값은 문자열이 아닐 수도 있습니다 (`true`, `8200`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataItem {
    pub name: String,
    #[serde(default)]
    pub value: Option<serde_yaml::Value>,
}

impl MetadataItem {
    /// 값을 문자열로 반환합니다. 스칼라가 아니면 `None`.
    pub fn value_str(&self) -> Option<String> {
        match self.value.as_ref()? {
            serde_yaml::Value::String(s) => Some(s.clone()),
            serde_yaml::Value::Bool(b) => Some(b.to_string()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl ComponentManifest {
    pub fn parse(yaml: &str) -> Result<Self, FixtureAdapterError> {
        Self::parse_at(yaml, Path::new("<inline>"))
    }

    fn parse_at(yaml: &str, path: &Path) -> Result<Self, FixtureAdapterError> {
        let manifest: Self = serde_yaml::from_str(yaml).map_err(|e| FixtureAdapterError::Manifest {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        if manifest.metadata.name.trim().is_empty() {
            return Err(FixtureAdapterError::Manifest {
                path: path.display().to_string(),
                reason: "metadata.name must not be empty".to_owned(),
            });
        }
        Ok(manifest)
    }

    pub fn load(path: &Path) -> Result<Self, FixtureAdapterError> {
        let yaml = std::fs::read_to_string(path).map_err(|e| FixtureAdapterError::Manifest {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse_at(&yaml, path)
    }

    /// 디렉토리의 `*.yaml` / `*.yml` 파일을 이름순으로 로드합니다.
    ///
    /// 런타임과 마찬가지로 `kind: Component`가 아닌 문서(compose 파일 등)는 건너뜁니다.
    pub fn load_dir(dir: &Path) -> Result<Vec<Self>, FixtureAdapterError> {
        let entries = std::fs::read_dir(dir).map_err(|e| FixtureAdapterError::Manifest {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext == "yaml" || ext == "yml")
            })
            .collect();
        paths.sort();

        let mut manifests = Vec::with_capacity(paths.len());
        for path in &paths {
            let yaml = std::fs::read_to_string(path).map_err(|e| FixtureAdapterError::Manifest {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            if !declares_component(&yaml) {
                tracing::debug!(path = %path.display(), "skipping non-component yaml");
                continue;
            }
            manifests.push(Self::parse_at(&yaml, path)?);
        }
        Ok(manifests)
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn is_vault(&self) -> bool {
        self.spec.component_type == VAULT_COMPONENT_TYPE
    }

    /// 이름으로 메타데이터 값을 찾습니다.
    pub fn get(&self, name: &str) -> Option<String> {
        self.spec
            .metadata
            .iter()
            .find(|item| item.name == name)
            .and_then(MetadataItem::value_str)
    }
}

fn declares_component(yaml: &str) -> bool {
    serde_yaml::from_str::<serde_yaml::Value>(yaml)
        .ok()
        .and_then(|doc| doc.get("kind").and_then(|k| k.as_str()).map(|k| k == COMPONENT_KIND))
        .unwrap_or(false)
}
