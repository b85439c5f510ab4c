//! 사이드카 HTTP API 클라이언트 — 메타데이터 조회와 시크릿 조회
//!
//! 엔드포인트:
//! - `GET /v1.0/metadata` → `components[]`
//! - `GET /v1.0/secrets/{store}/{key}`
//! - `GET /v1.0/secrets/{store}/bulk`
//!
//! 요청 옵션은 `metadata.<k>=<v>` 쿼리 파라미터로 전달됩니다.
//! 재시도, 캐싱, 클라이언트 측 타임아웃은 없습니다. 호출마다 한 번의 왕복이며
//! 사이드카가 응답할 때까지 기다립니다.

use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use vaultcert_core::client::{MetadataClient, SecretClient};
use vaultcert_core::error::ClientError;
use vaultcert_core::types::{
    BulkSecrets, ComponentRecord, ComponentSnapshot, RequestOptions, SecretMap,
};

use crate::error::FixtureAdapterError;

/// 메타데이터 응답 본문 (필요한 필드만)
#[derive(Debug, Deserialize)]
struct MetadataResponse {
    #[serde(default, alias = "registeredComponents")]
    components: Vec<ComponentRecord>,
}

/// 사이드카 HTTP API 클라이언트
#[derive(Debug, Clone)]
pub struct SidecarHttpClient {
    base: Url,
    client: Client,
}

impl SidecarHttpClient {
    /// `http://127.0.0.1:{port}` 사이드카에 연결하는 클라이언트를 만듭니다.
    pub fn for_port(http_port: u16) -> Result<Self, FixtureAdapterError> {
        Self::new(&format!("http://127.0.0.1:{http_port}"))
    }

    pub fn new(base_url: &str) -> Result<Self, FixtureAdapterError> {
        let base = Url::parse(base_url)
            .map_err(|e| FixtureAdapterError::Http(format!("invalid base url '{base_url}': {e}")))?;
        let client = Client::builder().build()?;
        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Transport(format!("base url {} cannot be a base", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T>(&self, url: Url, options: &RequestOptions) -> Result<T, ClientError>
    where
        T: serde::de::DeserializeOwned,
    {
        let endpoint = url.path().to_owned();
        let query: Vec<(String, &String)> = options
            .iter()
            .map(|(k, v)| (format!("metadata.{k}"), v))
            .collect();

        debug!(endpoint = %endpoint, "sidecar request");
        let response = self
            .client
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ClientError::Decode {
            endpoint,
            reason: format!("{e}; body={body}"),
        })
    }
}

impl MetadataClient for SidecarHttpClient {
    async fn list_components(&self) -> Result<ComponentSnapshot, ClientError> {
        let url = self.endpoint(&["v1.0", "metadata"])?;
        let response: MetadataResponse = self.get_json(url, &RequestOptions::new()).await?;
        Ok(ComponentSnapshot::new(response.components))
    }
}

impl SecretClient for SidecarHttpClient {
    async fn get_secret(
        &self,
        store: &str,
        key: &str,
        options: &RequestOptions,
    ) -> Result<SecretMap, ClientError> {
        let url = self.endpoint(&["v1.0", "secrets", store, key])?;
        let secret: SecretMap = self.get_json(url, options).await?;
        if secret.is_empty() {
            return Err(ClientError::EmptySecret {
                store: store.to_owned(),
                key: key.to_owned(),
            });
        }
        Ok(secret)
    }

    async fn get_bulk_secret(
        &self,
        store: &str,
        options: &RequestOptions,
    ) -> Result<BulkSecrets, ClientError> {
        let url = self.endpoint(&["v1.0", "secrets", store, "bulk"])?;
        self.get_json(url, options).await
    }
}
