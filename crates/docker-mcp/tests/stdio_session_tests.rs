//! End-to-end tests that drive the compiled `docker-mcp` binary over stdio.
//!
//! A stub script replaces the docker client via `--docker`.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

fn docker_mcp() -> Command {
    Command::new(env!("CARGO_BIN_EXE_docker-mcp"))
}

#[cfg(unix)]
fn write_stub(temp: &TempDir) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = temp.path().join("docker");
    fs::write(
        &path,
        "#!/bin/sh\n\
         case \"$1\" in\n\
           ps) printf 'CONTAINER ID\\tNAMES\\nabc123\\tweb\\n' ;;\n\
           port) ;;\n\
           *) echo \"unsupported: $1\" >&2; exit 1 ;;\n\
         esac\n",
    )
    .unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn session_input(requests: &[Value]) -> String {
    requests
        .iter()
        .map(|r| format!("{}\n", r))
        .collect::<String>()
}

#[test]
fn test_help_describes_server() {
    docker_mcp()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Docker container management"))
        .stdout(predicate::str::contains("--docker"));
}

#[test]
fn test_zero_timeout_is_rejected() {
    docker_mcp()
        .args(["--timeout", "0"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than zero"));
}

#[test]
fn test_missing_config_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    docker_mcp()
        .arg("--config")
        .arg(temp.path().join("nope.toml"))
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.toml"));
}

#[test]
fn test_protocol_only_on_stdout() {
    let input = session_input(&[
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "e2e", "version": "0.0.1"}
        }}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
    ]);

    let output = docker_mcp().write_stdin(input).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let responses: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout must only carry JSON-RPC"))
        .collect();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 8);
}

#[cfg(unix)]
#[test]
fn test_session_against_stub_runtime() {
    let temp = TempDir::new().unwrap();
    let stub = write_stub(&temp);

    let input = session_input(&[
        json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call",
               "params": {"name": "docker_ps", "arguments": {}}}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call",
               "params": {"name": "docker_port", "arguments": {"container": "web"}}}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
               "params": {"name": "docker_images"}}),
        json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call",
               "params": {"name": "docker_logs", "arguments": {"container": "web; id"}}}),
    ]);

    let output = docker_mcp()
        .arg("--docker")
        .arg(&stub)
        .write_stdin(input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let responses: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(responses.len(), 4);

    assert!(
        responses[0]["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("abc123")
    );
    assert_eq!(
        responses[1]["result"]["content"][0]["text"],
        "No ports mapped"
    );
    assert_eq!(responses[2]["error"]["data"]["category"], "execution_failure");
    assert!(
        responses[2]["error"]["message"]
            .as_str()
            .unwrap()
            .contains("unsupported: images")
    );
    assert_eq!(responses[3]["error"]["data"]["category"], "invalid_parameters");
}
