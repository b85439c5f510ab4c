//! 시크릿 조회 검증 스텝

use std::sync::Arc;

use tracing::{debug, info};

use vaultcert_core::client::DynSecretClient;
use vaultcert_core::error::{AssertionError, StepError};
use vaultcert_core::types::{BoxFuture, RequestOptions, SecretMap};
use vaultcert_flow::{FlowContext, Step};

use crate::checks::check_secret_contains;

fn to_map<I, K, V>(pairs: I) -> SecretMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// 시크릿을 조회해 기대한 key-value 쌍을 모두 포함하는지 확인합니다.
pub struct ExpectSecretEquals {
    client: Arc<dyn DynSecretClient>,
    store: String,
    key: String,
    expected: SecretMap,
    options: RequestOptions,
}

impl ExpectSecretEquals {
    pub fn new<I, K, V>(
        client: Arc<dyn DynSecretClient>,
        store: impl Into<String>,
        key: impl Into<String>,
        expected: I,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            client,
            store: store.into(),
            key: key.into(),
            expected: to_map(expected),
            options: RequestOptions::new(),
        }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

impl Step for ExpectSecretEquals {
    fn execute<'a>(&'a self, _ctx: &'a FlowContext) -> BoxFuture<'a, Result<(), StepError>> {
        Box::pin(async move {
            let actual = self
                .client
                .get_secret(&self.store, &self.key, &self.options)
                .await?;
            check_secret_contains(&actual, &self.expected)?;
            debug!(store = %self.store, key = %self.key, "secret matches");
            Ok(())
        })
    }
}

/// 시크릿 조회가 실패하는지 확인합니다.
pub struct ExpectSecretAbsent {
    client: Arc<dyn DynSecretClient>,
    store: String,
    key: String,
}

impl ExpectSecretAbsent {
    pub fn new(
        client: Arc<dyn DynSecretClient>,
        store: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            store: store.into(),
            key: key.into(),
        }
    }
}

impl Step for ExpectSecretAbsent {
    fn execute<'a>(&'a self, _ctx: &'a FlowContext) -> BoxFuture<'a, Result<(), StepError>> {
        Box::pin(async move {
            match self
                .client
                .get_secret(&self.store, &self.key, &RequestOptions::new())
                .await
            {
                Err(e) => {
                    debug!(store = %self.store, key = %self.key, error = %e, "retrieval failed as expected");
                    Ok(())
                }
                Ok(values) => Err(AssertionError::new(format!(
                    "expected retrieval of '{}' from '{}' to fail, got keys {:?}",
                    self.key,
                    self.store,
                    values.keys().collect::<Vec<_>>()
                ))
                .into()),
            }
        })
    }
}

/// 벌크 조회 결과가 비어 있지 않은지, 지정한 시크릿이 있는지 확인합니다.
pub struct ExpectBulkContains {
    client: Arc<dyn DynSecretClient>,
    store: String,
    secret: Option<String>,
}

impl ExpectBulkContains {
    pub fn new(client: Arc<dyn DynSecretClient>, store: impl Into<String>) -> Self {
        Self {
            client,
            store: store.into(),
            secret: None,
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }
}

impl Step for ExpectBulkContains {
    fn execute<'a>(&'a self, _ctx: &'a FlowContext) -> BoxFuture<'a, Result<(), StepError>> {
        Box::pin(async move {
            let bulk = self
                .client
                .get_bulk_secret(&self.store, &RequestOptions::new())
                .await?;
            if bulk.is_empty() {
                return Err(AssertionError::new(format!(
                    "bulk retrieval from '{}' returned no secrets",
                    self.store
                ))
                .into());
            }
            for (name, values) in &bulk {
                info!(store = %self.store, secret = %name, keys = ?values.keys().collect::<Vec<_>>(), "bulk entry");
            }
            match &self.secret {
                Some(secret) if !bulk.contains_key(secret) => Err(AssertionError::new(format!(
                    "bulk retrieval from '{}' does not contain '{secret}' (found: {:?})",
                    self.store,
                    bulk.keys().collect::<Vec<_>>()
                ))
                .into()),
                _ => Ok(()),
            }
        })
    }
}

/// 같은 시크릿을 연속으로 두 번 조회해 결과가 동일한지 확인합니다.
pub struct ExpectSecretStable {
    client: Arc<dyn DynSecretClient>,
    store: String,
    key: String,
}

impl ExpectSecretStable {
    pub fn new(
        client: Arc<dyn DynSecretClient>,
        store: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            store: store.into(),
            key: key.into(),
        }
    }
}

impl Step for ExpectSecretStable {
    fn execute<'a>(&'a self, _ctx: &'a FlowContext) -> BoxFuture<'a, Result<(), StepError>> {
        Box::pin(async move {
            let options = RequestOptions::new();
            let first = self.client.get_secret(&self.store, &self.key, &options).await?;
            let second = self.client.get_secret(&self.store, &self.key, &options).await?;
            if first != second {
                return Err(AssertionError::new(format!(
                    "consecutive reads of '{}' differ: {first:?} then {second:?}",
                    self.key
                ))
                .into());
            }
            Ok(())
        })
    }
}
