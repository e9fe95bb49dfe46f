use std::path::PathBuf;
use std::process::{Command, Output};

fn tmp_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name)
}

fn run_tonelink(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tonelink"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute tonelink")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

// Short tones keep the WAV files small; block size matches one tone
const FAST: [&str; 4] = ["--symbol-duration", "0.1", "--block-size", "800"];

#[test]
fn test_encode_writes_one_tone_per_symbol() {
    let output = tmp_path("encode_hi.wav");
    let mut args = vec!["encode", "hi", output.to_str().unwrap()];
    args.extend_from_slice(&FAST);

    let result = run_tonelink(&args);
    assert!(result.status.success(), "encode failed: {:?}", result);

    // (3 header + 2 payload) octets x 16 tones x 800 samples
    let text = stdout(&result);
    assert!(text.contains("Encoded 2 octets to 64000 samples"), "got: {}", text);

    let reader = hound::WavReader::open(&output).expect("Output WAV not readable");
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, 8000);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 8);
    assert_eq!(reader.duration(), 64000);
}

#[test]
fn test_classify_encoded_file() {
    let output = tmp_path("classify_a.wav");
    let mut encode_args = vec!["encode", "A", output.to_str().unwrap()];
    encode_args.extend_from_slice(&FAST);
    assert!(run_tonelink(&encode_args).status.success());

    let mut classify_args = vec!["classify", output.to_str().unwrap()];
    classify_args.extend_from_slice(&FAST);
    let result = run_tonelink(&classify_args);
    assert!(result.status.success(), "classify failed: {:?}", result);

    let text = stdout(&result);
    let signals: Vec<&str> = text.lines().filter(|l| l.starts_with("SIGNAL")).collect();
    assert_eq!(signals.len(), 4 * 16);
    // first octet is the 0x55 preamble: SYNC then ONE for bit 0
    assert_eq!(signals[0], "SIGNAL: SYNC");
    assert_eq!(signals[1], "SIGNAL: ONE");
    assert_eq!(signals[3], "SIGNAL: ZERO");
    assert!(text.contains("Classified 64 blocks"));
    assert!(!text.contains("FRAME:"));
}

#[test]
fn test_classify_with_reassembly_recovers_message() {
    let output = tmp_path("reassemble_hi.wav");
    let mut encode_args = vec!["encode", "hi", output.to_str().unwrap()];
    encode_args.extend_from_slice(&FAST);
    assert!(run_tonelink(&encode_args).status.success());

    let mut classify_args = vec!["classify", "--reassemble", output.to_str().unwrap()];
    classify_args.extend_from_slice(&FAST);
    let result = run_tonelink(&classify_args);
    assert!(result.status.success(), "classify failed: {:?}", result);
    assert!(stdout(&result).contains("FRAME: 2 octets \"hi\""));
}

#[test]
fn test_oversized_message_is_rejected() {
    let output = tmp_path("too_long.wav");
    let message = "x".repeat(256);
    let result = run_tonelink(&["encode", &message, output.to_str().unwrap()]);
    assert_eq!(result.status.code(), Some(1));
}

#[test]
fn test_invalid_block_size_is_rejected() {
    let output = tmp_path("bad_block.wav");
    let result = run_tonelink(&["encode", "x", output.to_str().unwrap(), "--block-size", "0"]);
    assert_eq!(result.status.code(), Some(1));
}

#[test]
fn test_huge_symbol_duration_is_rejected() {
    let output = tmp_path("huge_symbol.wav");
    let result = run_tonelink(&["encode", "x", output.to_str().unwrap(), "--symbol-duration", "1e30"]);
    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("exceeds"));
}

#[test]
fn test_classify_missing_file_fails() {
    let result = run_tonelink(&["classify", tmp_path("does_not_exist.wav").to_str().unwrap()]);
    assert!(!result.status.success());
}
