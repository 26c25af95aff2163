#![cfg(feature = "cli")]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "sdawire-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn sdawire(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sdawire"))
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("sdawire should run")
}

fn sdawire_with_stdin(args: &[&str], stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sdawire"))
        .args(["--log-level", "error"])
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("sdawire should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin)
        .expect("stdin should accept payload");
    child.wait_with_output().expect("sdawire should exit")
}

#[test]
fn encode_hex_matches_reference_frame() {
    let output = sdawire(&["--format", "hex", "encode", "--hex", "010203"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        "6d6265646462617000000003010203\
         039058c6f2c0cb492c533b0a4d14ef77cc0f78abccced5287d84a1a2011cfb81"
    );
}

#[test]
fn encode_raw_from_stdin_writes_frame_bytes() {
    let output = sdawire_with_stdin(&["--format", "raw", "encode"], b"");

    assert!(output.status.success());
    assert_eq!(output.stdout.len(), 44);
    assert_eq!(&output.stdout[..8], b"mbeddbap");
    assert_eq!(&output.stdout[8..12], &[0, 0, 0, 0]);
}

#[test]
fn encode_to_file_then_decode_json() {
    let dir = unique_temp_dir("roundtrip");
    let frame_path = dir.join("frame.bin");

    let encoded = sdawire(&[
        "--format",
        "json",
        "encode",
        "--data",
        "operation",
        "--out",
        frame_path.to_str().expect("utf-8 path"),
    ]);
    assert!(encoded.status.success());
    let summary = String::from_utf8_lossy(&encoded.stdout);
    assert!(summary.contains("\"frame_size\":53"));

    let decoded = sdawire(&[
        "--format",
        "json",
        "decode",
        frame_path.to_str().expect("utf-8 path"),
    ]);
    assert!(decoded.status.success());
    let stdout = String::from_utf8_lossy(&decoded.stdout);
    assert!(stdout.contains("\"payload\":\"operation\""));
    assert!(stdout.contains("frame-decoded"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn decode_rejects_tampered_frame_with_data_invalid() {
    let dir = unique_temp_dir("tamper");
    let frame_path = dir.join("frame.bin");

    let encoded = sdawire(&[
        "encode",
        "--data",
        "payload",
        "--out",
        frame_path.to_str().expect("utf-8 path"),
        "--format",
        "raw",
    ]);
    assert!(encoded.status.success());

    let mut bytes = std::fs::read(&frame_path).expect("frame should exist");
    bytes[12] ^= 0x01;
    std::fs::write(&frame_path, &bytes).expect("frame should be writable");

    let decoded = sdawire(&["decode", frame_path.to_str().expect("utf-8 path")]);
    assert_eq!(decoded.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&decoded.stderr);
    assert!(stderr.contains("digest mismatch"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn decode_stdin_with_resync_skips_noise() {
    let mut wire = b"noise\r\n".to_vec();
    wire.extend_from_slice(&sdawire::encode(b"after").expect("encode should succeed"));

    let strict = sdawire_with_stdin(&["--format", "hex", "decode"], &wire);
    assert_eq!(strict.status.code(), Some(60));

    let lenient = sdawire_with_stdin(&["--format", "hex", "decode", "--resync"], &wire);
    assert!(lenient.status.success());
    assert_eq!(String::from_utf8_lossy(&lenient.stdout).trim(), hex::encode(b"after"));
}

#[test]
fn decode_enforces_max_payload() {
    let wire = sdawire::encode(&[0u8; 64]).expect("encode should succeed");
    let output = sdawire_with_stdin(&["decode", "--max-payload", "16"], &wire);

    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("payload too large"));
}

#[test]
#[cfg(target_os = "linux")]
fn raw_encode_to_full_device_fails() {
    let full = std::fs::OpenOptions::new()
        .write(true)
        .open("/dev/full")
        .expect("/dev/full should be writable");
    let output = Command::new(env!("CARGO_BIN_EXE_sdawire"))
        .args(["--log-level", "error", "--format", "raw", "encode", "--data", "op"])
        .stdout(Stdio::from(full))
        .stderr(Stdio::piped())
        .output()
        .expect("sdawire should run");

    assert_eq!(output.status.code(), Some(125));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed writing stdout"));
}

#[test]
fn digest_prints_sha256() {
    let output = sdawire(&["--format", "pretty", "digest", "--data", ""]);

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn bad_hex_is_usage_error() {
    let output = sdawire(&["encode", "--hex", "not-hex"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_reports_package_version() {
    let output = sdawire(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("sdawire {}", env!("CARGO_PKG_VERSION"))
    );
}
