#![no_main]

use libfuzzer_sys::fuzz_target;
use vaultcert_fixture::ComponentManifest;

fuzz_target!(|data: &[u8]| {
    // YAML 파서는 &str을 받으므로 UTF-8 변환 필요
    let Ok(yaml) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(manifest) = ComponentManifest::parse(yaml) else {
        return;
    };

    // 파싱된 매니페스트는 이름이 비어 있지 않고, 조회는 같은 이름의 첫 항목을 따름
    assert!(!manifest.name().trim().is_empty());
    let _ = manifest.is_vault();
    for item in &manifest.spec.metadata {
        let first = manifest.spec.metadata.iter().find(|i| i.name == item.name);
        assert_eq!(manifest.get(&item.name), first.and_then(|i| i.value_str()));
    }
});
