//! Integration tests for whoisrelay.
//!
//! These tests verify end-to-end functionality without relying on external
//! network services. Mock WHOIS servers on loopback stand in for the real
//! registries, and the HTTP service is driven over a raw TCP connection.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::process::{Child, Command};
use std::str;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

/// Helper to get the path to the compiled binary
fn get_binary_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test binary name
    if path.ends_with("deps") {
        path.pop(); // Remove "deps" directory
    }
    path.push("whoisrelay");
    path
}

/// Spawn a mock WHOIS server that answers every connection with `response`.
fn spawn_whois_mock(response: String) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let mut buf = [0u8; 512];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(response.as_bytes());
            // Drop closes the connection: the WHOIS end-of-response signal.
        }
    });
    addr
}

/// Grab a loopback port that nothing is listening on.
fn dead_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

#[test]
fn test_help_output() {
    let output = Command::new(get_binary_path())
        .arg("--help")
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());

    let stdout = str::from_utf8(&output.stdout).unwrap();
    assert!(stdout.contains("Usage:"), "Help should show usage");
    assert!(stdout.contains("--serve"), "Help should mention serve mode");
    assert!(
        stdout.contains("--no-referral"),
        "Help should mention the referral switch"
    );
}

#[test]
fn test_version_output() {
    let output = Command::new(get_binary_path())
        .arg("--version")
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    let stdout = str::from_utf8(&output.stdout).unwrap();
    assert!(
        stdout.contains("whoisrelay"),
        "Version should mention the program name"
    );
}

#[test]
fn test_schema_generation() {
    let output = Command::new(get_binary_path())
        .arg("--generate-schema")
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    let stdout = str::from_utf8(&output.stdout).unwrap();
    let schema: serde_json::Value = serde_json::from_str(stdout).expect("schema must be JSON");
    assert!(schema.get("$schema").is_some() || schema.get("title").is_some());
}

#[test]
fn test_missing_arguments() {
    let output = Command::new(get_binary_path())
        .output()
        .expect("Failed to execute binary");

    assert!(!output.status.success());
    let stderr = str::from_utf8(&output.stderr).unwrap();
    assert!(
        stderr.contains("required") || stderr.contains("Usage"),
        "Should mention required arguments: {stderr}"
    );
}

#[test]
fn test_invalid_query_rejected_before_any_network_io() {
    // An embedded control character must fail validation; the mock would
    // otherwise be hit, so route to one and assert the process fails anyway.
    let mock = spawn_whois_mock("should never be sent\r\n".to_string());

    let output = Command::new(get_binary_path())
        .arg("exa..mple.com")
        .arg("--server")
        .arg(mock.to_string())
        .output()
        .expect("Failed to execute binary");

    assert!(!output.status.success());
    let stderr = str::from_utf8(&output.stderr).unwrap();
    assert!(
        stderr.contains("Invalid query"),
        "Should report validation failure: {stderr}"
    );
}

#[test]
fn test_one_shot_lookup_plain() {
    let mock = spawn_whois_mock("Domain Name: EXAMPLE.COM\r\nRegistrar: Example\r\n".to_string());

    let output = Command::new(get_binary_path())
        .arg("example.com")
        .arg("--server")
        .arg(mock.to_string())
        .arg("--no-color")
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    let stdout = str::from_utf8(&output.stdout).unwrap();
    assert!(stdout.contains("example.com"), "stdout: {stdout}");
    assert!(stdout.contains("Registrar: Example"), "stdout: {stdout}");
    assert!(stdout.contains(&mock.to_string()), "stdout: {stdout}");
}

#[test]
fn test_referral_chain_is_followed_once() {
    let registrar = spawn_whois_mock("Registrar-level record\r\n".to_string());
    let registry = spawn_whois_mock(format!("Whois Server: {registrar}\r\n"));

    let output = Command::new(get_binary_path())
        .arg("example.com")
        .arg("--server")
        .arg(registry.to_string())
        .arg("--format")
        .arg("json")
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    let stdout = str::from_utf8(&output.stdout).unwrap();
    let doc: serde_json::Value = serde_json::from_str(stdout).unwrap();
    assert_eq!(doc["resolution"]["server"], registrar.to_string());
    assert_eq!(doc["resolution"]["referral_followed"], true);
    assert!(
        doc["result"]["response"]
            .as_str()
            .unwrap()
            .contains("Registrar-level record")
    );
}

#[test]
fn test_no_referral_switch_stops_at_the_registry() {
    let registrar = spawn_whois_mock("Registrar-level record\r\n".to_string());
    let registry = spawn_whois_mock(format!("Whois Server: {registrar}\r\n"));

    let output = Command::new(get_binary_path())
        .arg("example.com")
        .arg("--server")
        .arg(registry.to_string())
        .arg("--no-referral")
        .arg("--format")
        .arg("json")
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    let doc: serde_json::Value =
        serde_json::from_str(str::from_utf8(&output.stdout).unwrap()).unwrap();
    assert_eq!(doc["resolution"]["server"], registry.to_string());
    assert_eq!(doc["resolution"]["referral_followed"], false);
    // The referral was still detected and reported.
    assert_eq!(doc["resolution"]["referral"], registrar.to_string());
}

#[test]
fn test_empty_secondary_falls_back_to_primary() {
    let registrar = spawn_whois_mock(String::new());
    let registry = spawn_whois_mock(format!("Primary record\r\nWhois Server: {registrar}\r\n"));

    let output = Command::new(get_binary_path())
        .arg("example.com")
        .arg("--server")
        .arg(registry.to_string())
        .arg("--format")
        .arg("json")
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    let doc: serde_json::Value =
        serde_json::from_str(str::from_utf8(&output.stdout).unwrap()).unwrap();
    assert_eq!(doc["resolution"]["server"], registry.to_string());
    assert_eq!(doc["resolution"]["referral_followed"], false);
    assert!(
        doc["result"]["response"]
            .as_str()
            .unwrap()
            .contains("Primary record")
    );
}

#[test]
fn test_unreachable_server_yields_empty_result_not_failure() {
    let dead = dead_port();

    let output = Command::new(get_binary_path())
        .arg("example.com")
        .arg("--server")
        .arg(dead.to_string())
        .arg("--timeout")
        .arg("2")
        .arg("--format")
        .arg("json")
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    let doc: serde_json::Value =
        serde_json::from_str(str::from_utf8(&output.stdout).unwrap()).unwrap();
    assert_eq!(doc["resolution"]["upstream_unreachable"], true);
    assert_eq!(doc["result"]["response"], "");
}

#[test]
fn test_servers_file_overrides_routing() {
    let mock = spawn_whois_mock("Record for the override TLD\r\n".to_string());

    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"loopbacktest": "{mock}"}}"#).unwrap();
    file.flush().unwrap();

    let output = Command::new(get_binary_path())
        .arg("foo.loopbacktest")
        .arg("--servers-file")
        .arg(file.path())
        .arg("--no-color")
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    let stdout = str::from_utf8(&output.stdout).unwrap();
    assert!(
        stdout.contains("Record for the override TLD"),
        "stdout: {stdout}"
    );
}

#[test]
fn test_yaml_format() {
    let mock = spawn_whois_mock("Domain Name: EXAMPLE.COM\r\n".to_string());

    let output = Command::new(get_binary_path())
        .arg("example.com")
        .arg("--server")
        .arg(mock.to_string())
        .arg("--format")
        .arg("yaml")
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    let stdout = str::from_utf8(&output.stdout).unwrap();
    assert!(stdout.contains("query: example.com"), "stdout: {stdout}");
    assert!(stdout.contains("query_kind: domain"), "stdout: {stdout}");
}

// ---------------------------------------------------------------------------
// Service mode
// ---------------------------------------------------------------------------

/// A running --serve instance, killed on drop.
struct Service {
    child: Child,
    addr: SocketAddr,
}

impl Service {
    /// Start the binary in service mode with the given rate interval and a
    /// servers file routing `.loopbacktest` to `mock`. Waits until the
    /// listener accepts connections.
    fn start(mock: SocketAddr, rate_interval_secs: u64) -> (Self, NamedTempFile) {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"loopbacktest": "{mock}"}}"#).unwrap();
        file.flush().unwrap();

        let addr = dead_port();
        let child = Command::new(get_binary_path())
            .arg("--serve")
            .arg("--bind")
            .arg(addr.to_string())
            .arg("--rate-interval")
            .arg(rate_interval_secs.to_string())
            .arg("--servers-file")
            .arg(file.path())
            .spawn()
            .expect("Failed to start service");

        let service = Service { child, addr };
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if TcpStream::connect(service.addr).is_ok() {
                break;
            }
            assert!(Instant::now() < deadline, "service did not come up");
            thread::sleep(Duration::from_millis(50));
        }
        (service, file)
    }

    /// Issue one HTTP request and return (status line, headers, body).
    fn request(&self, path_and_query: &str, extra_headers: &str) -> (String, String, String) {
        let mut stream = TcpStream::connect(self.addr).unwrap();
        write!(
            stream,
            "GET {path_and_query} HTTP/1.1\r\nHost: {}\r\n{extra_headers}Connection: close\r\n\r\n",
            self.addr
        )
        .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();

        let (head, body) = response.split_once("\r\n\r\n").unwrap();
        let (status_line, headers) = head.split_once("\r\n").unwrap_or((head, ""));
        (
            status_line.to_string(),
            headers.to_string(),
            body.to_string(),
        )
    }
}

impl Drop for Service {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[test]
fn test_serve_lookup_and_no_cache_headers() {
    let mock = spawn_whois_mock("Domain Name: FOO.LOOPBACK-TEST\r\n".to_string());
    let (service, _file) = Service::start(mock, 0);

    let (status, headers, body) = service.request("/?q=foo.loopbacktest&json=1", "");
    assert!(status.contains("200"), "status: {status}");

    let headers_lower = headers.to_ascii_lowercase();
    assert!(headers_lower.contains("cache-control: no-store"), "{headers}");
    assert!(headers_lower.contains("pragma: no-cache"), "{headers}");
    assert!(headers_lower.contains("expires: 0"), "{headers}");
    assert!(headers_lower.contains("content-type: application/json"));

    let doc: serde_json::Value = serde_json::from_str(body.trim()).unwrap();
    assert_eq!(doc["query"], "foo.loopbacktest");
    assert_eq!(doc["server"], mock.to_string());
    assert!(doc["result"].as_str().unwrap().contains("FOO.LOOPBACK-TEST"));
}

#[test]
fn test_serve_missing_query_returns_banner() {
    let mock = spawn_whois_mock("unused\r\n".to_string());
    let (service, _file) = Service::start(mock, 0);

    let (status, _headers, body) = service.request("/", "");
    assert!(status.contains("200"), "status: {status}");
    assert!(body.contains("?q="), "body: {body}");
}

#[test]
fn test_serve_invalid_query_is_400() {
    let mock = spawn_whois_mock("unused\r\n".to_string());
    let (service, _file) = Service::start(mock, 0);

    let (status, _headers, body) = service.request("/?q=bad..name&json=1", "");
    assert!(status.contains("400"), "status: {status}");
    let doc: serde_json::Value = serde_json::from_str(body.trim()).unwrap();
    assert_eq!(doc["error"], "invalid_query");
}

#[test]
fn test_serve_rate_limits_second_request() {
    let mock = spawn_whois_mock("Record\r\n".to_string());
    let (service, _file) = Service::start(mock, 60);

    let (first, _, _) = service.request("/?q=foo.loopbacktest&json=1", "");
    assert!(first.contains("200"), "first: {first}");

    let (second, _, body) = service.request("/?q=foo.loopbacktest&json=1", "");
    assert!(second.contains("429"), "second: {second}");
    let doc: serde_json::Value = serde_json::from_str(body.trim()).unwrap();
    assert_eq!(doc["error"], "rate_limited");
}

#[test]
fn test_serve_ajax_header_selects_json() {
    let mock = spawn_whois_mock("Record\r\n".to_string());
    let (service, _file) = Service::start(mock, 0);

    let (status, headers, _body) = service.request(
        "/?q=foo.loopbacktest",
        "X-Requested-With: XMLHttpRequest\r\n",
    );
    assert!(status.contains("200"), "status: {status}");
    assert!(
        headers
            .to_ascii_lowercase()
            .contains("content-type: application/json"),
        "{headers}"
    );
}
