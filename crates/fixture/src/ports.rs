//! 빈 로컬 포트 할당

use std::collections::BTreeSet;
use std::net::TcpListener;

use vaultcert_core::error::FixtureError;

/// `127.0.0.1:0`에 n번 바인딩하여 서로 다른 빈 포트 n개를 반환합니다.
///
/// 모든 리스너를 잡고 있다가 마지막에 한꺼번에 닫으므로 같은 포트가 두 번 나오지 않습니다.
/// 닫힌 뒤 다른 프로세스가 먼저 잡아갈 수 있는 경쟁은 남아 있습니다.
pub fn allocate_free_ports(count: usize) -> Result<Vec<u16>, FixtureError> {
    let mut listeners = Vec::with_capacity(count);
    let mut seen = BTreeSet::new();
    let mut ports = Vec::with_capacity(count);

    while ports.len() < count {
        let listener = TcpListener::bind("127.0.0.1:0")
            .map_err(|e| FixtureError::Ports(format!("bind failed: {e}")))?;
        let port = listener
            .local_addr()
            .map_err(|e| FixtureError::Ports(format!("local_addr failed: {e}")))?
            .port();
        if seen.insert(port) {
            ports.push(port);
        }
        listeners.push(listener);
    }

    drop(listeners);
    Ok(ports)
}
