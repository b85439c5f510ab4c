//! 메타데이터 기반 검증 스텝 — 컴포넌트 등록 여부와 기능 광고

use std::sync::Arc;

use vaultcert_core::client::DynMetadataClient;
use vaultcert_core::error::StepError;
use vaultcert_core::types::{BoxFuture, Capability};
use vaultcert_flow::{FlowContext, Step};

use crate::checks::{check_capability, check_component_presence};

async fn check_presence(
    client: &dyn DynMetadataClient,
    name: &str,
    expected: bool,
) -> Result<(), StepError> {
    let snapshot = client.list_components().await?;
    check_component_presence(&snapshot, name, expected)?;
    Ok(())
}

/// 컴포넌트가 등록되어 있어야 함
pub struct ExpectComponentPresent {
    client: Arc<dyn DynMetadataClient>,
    name: String,
}

impl ExpectComponentPresent {
    pub fn new(client: Arc<dyn DynMetadataClient>, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }
}

impl Step for ExpectComponentPresent {
    fn execute<'a>(&'a self, _ctx: &'a FlowContext) -> BoxFuture<'a, Result<(), StepError>> {
        Box::pin(check_presence(self.client.as_ref(), &self.name, true))
    }
}

/// 컴포넌트가 등록되어 있지 않아야 함
pub struct ExpectComponentAbsent {
    client: Arc<dyn DynMetadataClient>,
    name: String,
}

impl ExpectComponentAbsent {
    pub fn new(client: Arc<dyn DynMetadataClient>, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }
}

impl Step for ExpectComponentAbsent {
    fn execute<'a>(&'a self, _ctx: &'a FlowContext) -> BoxFuture<'a, Result<(), StepError>> {
        Box::pin(check_presence(self.client.as_ref(), &self.name, false))
    }
}

/// 컴포넌트의 기능 광고 여부 확인
pub struct ExpectCapability {
    client: Arc<dyn DynMetadataClient>,
    name: String,
    capability: String,
    expected: bool,
}

impl ExpectCapability {
    pub fn new(
        client: Arc<dyn DynMetadataClient>,
        name: impl Into<String>,
        capability: Capability,
        expected: bool,
    ) -> Self {
        Self {
            client,
            name: name.into(),
            capability: capability.as_str().to_owned(),
            expected,
        }
    }
}

impl Step for ExpectCapability {
    fn execute<'a>(&'a self, _ctx: &'a FlowContext) -> BoxFuture<'a, Result<(), StepError>> {
        Box::pin(async move {
            let snapshot = self.client.list_components().await?;
            if let Some(record) = snapshot.find(&self.name) {
                tracing::debug!(
                    component = %self.name,
                    capabilities = ?record.capabilities,
                    "component capabilities"
                );
            }
            check_capability(&snapshot, &self.name, &self.capability, self.expected)?;
            Ok(())
        })
    }
}
