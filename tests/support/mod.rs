//! Shared helpers for integration tests: stub executables standing in for
//! the external orchestrator and load generators, and a minimal JSON-RPC
//! endpoint answering health probes.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use url::Url;

/// A chain-id response the readiness probe accepts.
pub const HEALTHY_BODY: &str = r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#;
/// A well-formed JSON response with no `result` key.
pub const UNHEALTHY_BODY: &str = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601}}"#;

/// Writes an executable shell script into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

/// An orchestrator stub whose `remove` subcommand deletes the data
/// directory, mirroring the real tool, and whose `setup` always succeeds.
pub fn orchestrator_script() -> &'static str {
    r#"#!/bin/sh
prev=""
datadir=""
for a in "$@"; do
  [ "$prev" = "--data-dir" ] && datadir="$a"
  prev="$a"
done
case "$*" in
  *" remove "*) [ -n "$datadir" ] && rm -rf "$datadir"; exit 0 ;;
  *) exit 0 ;;
esac
"#
}

/// An orchestrator stub that fails every invocation.
pub fn failing_orchestrator_script() -> &'static str {
    "#!/bin/sh\necho induced failure >&2\nexit 1\n"
}

/// Spawns a one-endpoint HTTP server answering every POST with `body`.
pub async fn spawn_rpc_stub(body: &'static str) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else { break };
            tokio::spawn(async move {
                read_request(&mut socket).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    Url::parse(&format!("http://{addr}/")).unwrap()
}

/// Reads one HTTP request (headers plus declared body) off the socket.
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut buf = vec![0u8; 8192];
    let mut read = 0;

    loop {
        match socket.read(&mut buf[read..]).await {
            Ok(0) => return,
            Ok(n) => read += n,
            Err(_) => return,
        }

        if let Some(end) = find(&buf[..read], b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..end]);
            let mut content_length = 0usize;
            for line in headers.lines() {
                if let Some((key, value)) = line.split_once(':') {
                    if key.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap_or(0);
                    }
                }
            }
            if read >= end + 4 + content_length {
                return;
            }
        }

        if read == buf.len() {
            return;
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}
