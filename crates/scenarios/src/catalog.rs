//! 인증 시나리오 카탈로그
//!
//! 각 시나리오는 하나 이상의 [`FlowPlan`]으로 구성됩니다. 컴포넌트 이름은
//! `components/` 아래 매니페스트의 `metadata.name`과 정확히 일치해야 합니다.

use serde::Serialize;

use vaultcert_core::types::SecretMap;

use crate::plan::{Check, FlowPlan};

/// 기본 컴포넌트(및 시크릿 스토어) 이름
pub const DEFAULT_STORE: &str = "my-hashicorp-vault";

/// 모든 컴포넌트 설정에서 조회 가능해야 하는 기본 시크릿
pub const DEFAULT_SECRET: &str = "multiplekeyvaluessecret";

const TOKEN_PREFIX: &str = "my-hashicorp-vault-TestTokenAndTokenMountPath-";
const ADDR_PREFIX: &str = "my-hashicorp-vault-TestVaultAddr-";
const ENGINE_PREFIX: &str = "my-hashicorp-vault-TestEnginePath-";

/// 이름이 붙은 플로우 묶음
#[derive(Debug, Clone, Serialize)]
pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    pub flows: Vec<FlowPlan>,
}

fn secret(pairs: &[(&str, &str)]) -> SecretMap {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

fn default_secret_values() -> SecretMap {
    secret(&[("first", "1"), ("second", "2"), ("third", "3")])
}

// ─── 공통 체크 빌더 ─────────────────────────────────────────────────

fn registered(component: &str) -> Check {
    Check::Registered {
        component: component.to_owned(),
    }
}

fn contains(store: &str, key: &str, expected: SecretMap) -> Check {
    Check::SecretContains {
        store: store.to_owned(),
        key: key.to_owned(),
        expected,
    }
}

fn absent(store: &str, key: &str) -> Check {
    Check::SecretAbsent {
        store: store.to_owned(),
        key: key.to_owned(),
    }
}

fn capability(component: &str, expected: bool) -> Check {
    Check::Capability {
        component: component.to_owned(),
        expected,
    }
}

fn no_init_failure(component: &str) -> Check {
    Check::NoInitFailureLogged {
        component: component.to_owned(),
    }
}

// ─── 플로우 템플릿 ──────────────────────────────────────────────────

/// 초기화가 실패해야 하는 설정
///
/// 실패한 컴포넌트가 메타데이터에 여전히 등록되어 보이는 런타임 동작도 함께 확인합니다.
fn negative_flow(description: &str, dir: &str, component: &str, fragments: &[&str]) -> FlowPlan {
    FlowPlan::new(description, dir)
        .check("Verify component does not work", absent(component, DEFAULT_SECRET))
        .check(
            "Verify initialization error reported for component",
            Check::InitFailureLogged {
                component: component.to_owned(),
                fragments: fragments.iter().map(|f| (*f).to_owned()).collect(),
            },
        )
        .check(
            "Verify failed component is still listed by the runtime",
            registered(component),
        )
}

/// 초기화는 성공하지만 사용 시 실패해야 하는 설정
fn init_ok_use_fails_flow(description: &str, dir: &str, component: &str) -> FlowPlan {
    FlowPlan::new(description, dir)
        .check("Verify component is registered", registered(component))
        .check(
            "Verify no errors regarding component initialization",
            no_init_failure(component),
        )
        .check("Verify component does not work", absent(component, DEFAULT_SECRET))
}

/// 정상 동작해야 하는 설정
fn positive_flow(description: &str, dir: &str, component: &str) -> FlowPlan {
    FlowPlan::new(description, dir)
        .check("Verify component is registered", registered(component))
        .check(
            "Verify no errors regarding component initialization",
            no_init_failure(component),
        )
        .check(
            "Test that the default secret is found",
            contains(component, DEFAULT_SECRET, default_secret_values()),
        )
}

// ─── 시나리오 ───────────────────────────────────────────────────────

fn basic_secret_retrieval() -> Scenario {
    let flow = FlowPlan::new(
        "Test component is up and we can retrieve some secrets",
        "default",
    )
    .check("Verify component is registered", registered(DEFAULT_STORE))
    .check(
        "Run basic secret retrieval test",
        contains(DEFAULT_STORE, "secondsecret", secret(&[("secondsecret", "efgh")])),
    )
    .check(
        "Test retrieval of secret that does not exist",
        absent(DEFAULT_STORE, "this_secret_is_not_there"),
    )
    .check("Interrupt network for 1 minute", Check::InterruptStore)
    .check("Wait for component to recover", Check::WaitForRecovery)
    .check(
        "Run basic test again to verify reconnection occurred",
        contains(DEFAULT_STORE, "secondsecret", secret(&[("secondsecret", "efgh")])),
    )
    .check(
        "Verify repeated reads return the same secret",
        Check::SecretStable {
            store: DEFAULT_STORE.to_owned(),
            key: "secondsecret".to_owned(),
        },
    );

    Scenario {
        name: "basic-secret-retrieval",
        description: "Component loads, serves a known secret and reconnects after a network interruption",
        flows: vec![flow],
    }
}

fn multiple_kv_retrieval() -> Scenario {
    let flow = FlowPlan::new("Test retrieving multiple key values from a secret", "default")
        .check("Verify component is registered", registered(DEFAULT_STORE))
        .check(
            "Verify component has support for multiple key-values under the same secret",
            capability(DEFAULT_STORE, true),
        )
        .check(
            "Test retrieval of a secret with multiple key-values",
            contains(DEFAULT_STORE, DEFAULT_SECRET, default_secret_values()),
        )
        .check(
            "Test secret registered under a non-default vaultKVPrefix cannot be found",
            absent(DEFAULT_STORE, "secretUnderAlternativePrefix"),
        )
        .check(
            "Test secret registered with no prefix cannot be found",
            absent(DEFAULT_STORE, "secretWithNoPrefix"),
        );

    Scenario {
        name: "multiple-kv-retrieval",
        description: "A secret with several key-value pairs is returned whole",
        flows: vec![flow],
    }
}

fn vault_kv_prefix() -> Scenario {
    let flow = FlowPlan::new("Test setting a non-default vaultKVPrefix value", "vaultKVPrefix")
        .check("Verify component is registered", registered(DEFAULT_STORE))
        .check(
            "Verify component has support for multiple key-values under the same secret",
            capability(DEFAULT_STORE, true),
        )
        .check(
            "Test retrieval of a secret under a non-default vaultKVPrefix",
            contains(
                DEFAULT_STORE,
                "secretUnderAlternativePrefix",
                secret(&[("altPrefixKey", "altPrefixValue")]),
            ),
        )
        .check(
            "Test secret registered with no prefix cannot be found",
            absent(DEFAULT_STORE, "secretWithNoPrefix"),
        )
        .check(
            "Test secret registered under the default vaultKVPrefix cannot be found",
            absent(DEFAULT_STORE, DEFAULT_SECRET),
        );

    Scenario {
        name: "vault-kv-prefix",
        description: "vaultKVPrefix selects a non-default key prefix",
        flows: vec![flow],
    }
}

fn vault_kv_use_prefix_false() -> Scenario {
    let flow = FlowPlan::new("Test using an empty vaultKVPrefix value", "vaultKVUsePrefixFalse")
        .check("Verify component is registered", registered(DEFAULT_STORE))
        .check(
            "Verify component has support for multiple key-values under the same secret",
            capability(DEFAULT_STORE, true),
        )
        .check(
            "Test retrieval of a secret registered with no prefix and assuming vaultKVUsePrefix=false",
            contains(
                DEFAULT_STORE,
                "secretWithNoPrefix",
                secret(&[("noPrefixKey", "noProblem")]),
            ),
        )
        .check(
            "Test secret registered under the default vaultKVPrefix cannot be found",
            absent(DEFAULT_STORE, DEFAULT_SECRET),
        )
        .check(
            "Test secret registered under a non-default vaultKVPrefix cannot be found",
            absent(DEFAULT_STORE, "secretUnderAlternativePrefix"),
        );

    Scenario {
        name: "vault-kv-use-prefix-false",
        description: "vaultKVUsePrefix=false reads keys without any prefix",
        flows: vec![flow],
    }
}

fn vault_value_type_text() -> Scenario {
    let flow = FlowPlan::new(
        "Test setting vaultValueType=text should cause it to behave with single-value semantics",
        "vaultValueTypeText",
    )
    .check("Verify component is registered", registered(DEFAULT_STORE))
    .check(
        "Verify component DOES NOT support multiple key-values under the same secret",
        capability(DEFAULT_STORE, false),
    )
    .check(
        "Test secret store presents name/value semantics for secrets",
        contains(
            DEFAULT_STORE,
            "secondsecret",
            secret(&[("secondsecret", r#"{"secondsecret":"efgh"}"#)]),
        ),
    )
    .check(
        "Test secret registered under a non-default vaultKVPrefix cannot be found",
        absent(DEFAULT_STORE, "secretUnderAlternativePrefix"),
    )
    .check(
        "Test secret registered with no prefix cannot be found",
        absent(DEFAULT_STORE, "secretWithNoPrefix"),
    );

    Scenario {
        name: "vault-value-type-text",
        description: "vaultValueType=text exposes each secret as a single JSON value",
        flows: vec![flow],
    }
}

fn token_and_token_mount_path() -> Scenario {
    let dir = |suffix: &str| format!("vaultTokenAndTokenMountPath/{suffix}");
    let name = |suffix: &str| format!("{TOKEN_PREFIX}{suffix}");

    let flows = vec![
        negative_flow(
            "Verify component initialization failure when BOTH vaultToken and vaultTokenMountPath are present",
            &dir("both"),
            &name("both"),
            &["token mount path and token both set"],
        ),
        negative_flow(
            "Verify component initialization failure when NEITHER vaultToken nor vaultTokenMountPath are present",
            &dir("neither"),
            &name("neither"),
            &[],
        ),
        negative_flow(
            "Verify component initialization failure when vaultTokenPath points to a non-existing file",
            &dir("tokenMountPathPointsToBrokenPath"),
            &name("tokenMountPathPointsToBrokenPath"),
            &[],
        ),
        init_ok_use_fails_flow(
            "Verify failure when vaultToken value does not match our servers's value",
            &dir("badVaultToken"),
            &name("badVaultToken"),
        ),
        positive_flow(
            "Verify success when vaultTokenPath points to an existing file matching the configured secret we have for our secret seeder",
            &dir("tokenMountPathHappyCase"),
            &name("tokenMountPathHappyCase"),
        ),
    ];

    Scenario {
        name: "token-and-token-mount-path",
        description: "vaultToken and vaultTokenMountPath are mutually exclusive and validated at init",
        flows,
    }
}

fn vault_addr() -> Scenario {
    let dir = |suffix: &str| format!("vaultAddr/{suffix}");
    let name = |suffix: &str| format!("{ADDR_PREFIX}{suffix}");

    let flows = vec![
        init_ok_use_fails_flow(
            "Verify initialization success but use failure when vaultAddr does not point to a valid vault server address",
            &dir("wrongAddress"),
            &name("wrongAddress"),
        ),
        positive_flow(
            "Verify success when vaultAddr is missing and skipVerify is true and vault is using a self-signed certificate",
            &dir("missing"),
            &name("missing"),
        )
        .with_component_compose(),
        positive_flow(
            "Verify success when vaultAddr points to a non-standard port",
            &dir("nonStdPort"),
            &name("nonStdPort"),
        )
        .with_component_compose(),
        init_ok_use_fails_flow(
            "Verify initialization success but use failure when vaultAddr is missing and skipVerify is false and vault is using a self-signed certificate",
            &dir("missingSkipVerifyFalse"),
            &name("missingSkipVerifyFalse"),
        )
        .with_component_compose(),
    ];

    Scenario {
        name: "vault-addr",
        description: "vaultAddr defaults, non-standard ports and TLS verification",
        flows,
    }
}

fn engine_path_custom_secrets_path() -> Scenario {
    let component = format!("{ENGINE_PREFIX}customSecretsPath");
    let flow = FlowPlan::new(
        "Verify success when we set enginePath to a non-std value",
        "enginePath/customSecretsPath",
    )
    .with_component_compose()
    .check("Verify component is registered", registered(&component))
    .check(
        "Verify no errors regarding component initialization",
        no_init_failure(&component),
    )
    .check(
        "Verify that the custom path has secrets under it",
        Check::BulkContains {
            store: component.clone(),
            secret: None,
        },
    )
    .check(
        "Verify that the custom path-specific secret is found",
        contains(
            &component,
            "secretUnderCustomPath",
            secret(&[("the", "trick"), ("was", "the"), ("path", "parameter")]),
        ),
    );

    Scenario {
        name: "engine-path-custom-secrets-path",
        description: "vaultEnginePath points at a non-default KV mount",
        flows: vec![flow],
    }
}

fn engine_path_secrets() -> Scenario {
    let flow = positive_flow(
        "Verify success when vaultEngine explicitly uses the secrets engine",
        "enginePath/secret",
        &format!("{ENGINE_PREFIX}secret"),
    );

    Scenario {
        name: "engine-path-secrets",
        description: "vaultEnginePath set explicitly to the default mount",
        flows: vec![flow],
    }
}

/// 전체 카탈로그 (실행 순서대로)
pub fn catalog() -> Vec<Scenario> {
    vec![
        basic_secret_retrieval(),
        multiple_kv_retrieval(),
        vault_kv_prefix(),
        vault_kv_use_prefix_false(),
        vault_value_type_text(),
        token_and_token_mount_path(),
        vault_addr(),
        engine_path_custom_secrets_path(),
        engine_path_secrets(),
    ]
}

/// 이름으로 시나리오 조회
pub fn find(name: &str) -> Option<Scenario> {
    catalog().into_iter().find(|s| s.name == name)
}

pub fn names() -> Vec<&'static str> {
    catalog().iter().map(|s| s.name).collect()
}
