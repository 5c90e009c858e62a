#![cfg(feature = "cli")]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn telemframe(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_telemframe"))
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("telemframe should run")
}

fn unique_temp_file(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "telemframe-{tag}-{}-{}.bin",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ))
}

#[test]
fn encode_start_command_matches_wire_bytes() {
    let output = telemframe(&[
        "--format",
        "pretty",
        "encode",
        "--identifier",
        "control",
        "--text",
        "start",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "02 c0 05 73 74 61 72 74 2f 0c");
}

#[test]
fn encode_json_reports_identifier() {
    let output = telemframe(&[
        "--format",
        "json",
        "encode",
        "--identifier",
        "0xA2",
        "--hex",
        "e8 03",
        "--data-prefix",
    ]);

    assert!(output.status.success());
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("encode should emit json");
    assert_eq!(payload["prefix"], 1);
    assert_eq!(payload["identifier_name"], "RPS");
    assert_eq!(payload["hex"], "01 a2 02 e8 03 5b 7b");
}

#[test]
fn encode_oversized_payload_returns_60() {
    let hex = "00".repeat(256);
    let output = telemframe(&["encode", "--identifier", "control", "--hex", &hex]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn encode_bad_hex_returns_64() {
    let output = telemframe(&["encode", "--identifier", "control", "--hex", "0g"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn decode_skips_noise_and_reports_stats() {
    let output = telemframe(&[
        "--format",
        "json",
        "decode",
        "--hex",
        "ff 00 01 a2 02 e8 03 5b 7b 01 c0 04 64 6f 6e 65 c6 4e",
        "--chunk",
        "1",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("each message is one json line"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["kind"], "RPS");
    assert_eq!(lines[0]["telemetry"], "RPS=1000.0000");
    assert_eq!(lines[1]["kind"], "CONTROL");
    assert_eq!(lines[1]["payload"], "done");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("messages=2"));
    assert!(stderr.contains("discarded_bytes=2"));
}

#[test]
fn decode_drops_corrupted_frame() {
    // Last checksum byte of the RPS frame flipped.
    let output = telemframe(&[
        "--format",
        "pretty",
        "decode",
        "--hex",
        "01 a2 02 e8 03 5b 7a 01 c0 04 64 6f 6e 65 c6 4e",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("RPS"));
    assert!(stdout.contains("CONTROL=done"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("checksum_failures=1"));
}

#[test]
fn decode_reads_legacy_capture_from_file() {
    let path = unique_temp_file("legacy");
    std::fs::write(&path, "[RPS] 1.5[42]\r\nColeta de dados iniciada...\n")
        .expect("capture should be writable");

    let output = telemframe(&[
        "--format",
        "pretty",
        "decode",
        "--protocol",
        "legacy",
        "--file",
        path.to_str().expect("temp path is utf-8"),
    ]);
    let _ = std::fs::remove_file(&path);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("RPS=1.5000"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("malformed_lines=1"));
}

#[test]
fn decode_reads_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_telemframe"))
        .args(["--log-level", "error", "--format", "raw", "decode"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("decode should start");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(&[0x01, 0xc0, 0x04, b'd', b'o', b'n', b'e', 0xc6, 0x4e])
        .expect("stdin should accept the capture");

    let output = child.wait_with_output().expect("decode should finish");
    assert!(output.status.success());
    assert_eq!(output.stdout, b"done");
}

#[test]
fn decode_missing_file_fails() {
    let path = unique_temp_file("missing");
    let output = telemframe(&["decode", "--file", path.to_str().expect("temp path is utf-8")]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn version_reports_package_version() {
    let output = telemframe(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("telemframe {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn send_to_missing_port_is_transport_error() {
    let output = telemframe(&["send", "/dev/telemframe-does-not-exist", "start"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("open failed"));
}

#[test]
fn unknown_protocol_is_usage_error() {
    let output = telemframe(&["decode", "--hex", "00", "--protocol", "morse"]);
    assert_eq!(output.status.code(), Some(2));
}
