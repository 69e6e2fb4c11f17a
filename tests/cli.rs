use arith::thread_pool::{SharedQueueThreadPool, ThreadPool};
use arith::{logging, ArithServer, ServerConfig};
use assert_cmd::prelude::*;
use predicates::str::contains;
use std::fs;
use std::net::{SocketAddr, TcpListener};
use std::process::Command;
use tempfile::TempDir;

fn start_server() -> SocketAddr {
    let logger = logging::discard();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let pool = SharedQueueThreadPool::new(2, &logger).unwrap();
    let config = ServerConfig {
        addr,
        ..ServerConfig::default()
    };

    std::thread::spawn(move || ArithServer::new(config, pool, &logger).serve(listener));
    addr
}

// `arith-server -V` 应当打印版本号
#[test]
fn server_version() {
    Command::cargo_bin("arith-server")
        .unwrap()
        .args(&["-V"])
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn server_help_lists_options() {
    Command::cargo_bin("arith-server")
        .unwrap()
        .args(&["--help"])
        .assert()
        .success()
        .stdout(contains("--messages-per-child"))
        .stdout(contains("--no-validate"));
}

#[test]
fn server_rejects_invalid_addr() {
    Command::cargo_bin("arith-server")
        .unwrap()
        .args(&["--addr", "not-an-addr"])
        .assert()
        .failure();
}

// 缺少必需参数时客户端应当失败
#[test]
fn client_requires_files() {
    Command::cargo_bin("arith-client")
        .unwrap()
        .assert()
        .failure();
}

#[test]
fn client_fails_on_missing_input() {
    let temp_dir = TempDir::new().unwrap();
    Command::cargo_bin("arith-client")
        .unwrap()
        .args(&["--input-file", "missing.txt", "--output-file", "out.txt"])
        .current_dir(&temp_dir)
        .assert()
        .failure();
    assert!(!temp_dir.path().join("out.txt").exists());
}

#[test]
fn client_fails_when_server_is_down() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().to_string()
    };
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("in.txt"), "1 + 1\n").unwrap();

    Command::cargo_bin("arith-client")
        .unwrap()
        .args(&[
            "--addr",
            addr.as_str(),
            "--attempts",
            "1",
            "--input-file",
            "in.txt",
            "--output-file",
            "out.txt",
        ])
        .current_dir(&temp_dir)
        .assert()
        .failure();
}

#[test]
fn client_writes_results_to_output_file() {
    let addr = start_server().to_string();
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("in.txt"), "3 + 4 * 2\n12 / 4 * 2\n").unwrap();

    Command::cargo_bin("arith-client")
        .unwrap()
        .args(&[
            "--addr",
            addr.as_str(),
            "--input-file",
            "in.txt",
            "--output-file",
            "out.txt",
        ])
        .current_dir(&temp_dir)
        .assert()
        .success();

    let output = fs::read_to_string(temp_dir.path().join("out.txt")).unwrap();
    let mut lines: Vec<&str> = output.split('\n').collect();
    lines.sort();
    assert_eq!(
        lines,
        vec![
            "process[0] response, input_line[0]: 3 + 4 * 2 = 11.0 ",
            "process[0] response, input_line[1]: 12 / 4 * 2 = 6.0 ",
        ]
    );
}
