// tests/cli_test.rs
//
// Decoding WAV fixtures and running the keyfinder binary over them.

mod test_utils;

use keyfinder::cli::collect_audio_files;
use keyfinder::core::decode_audio;
use keyfinder::{Key, KeyFinder};
use test_utils::{binary, temp_dir, triad, write_wav};

const RATE: u32 = 44100;

fn c_major_wav(dir: &std::path::Path, name: &str, channels: u16) -> std::path::PathBuf {
    let path = dir.join(name);
    let signal = triad(0, false, 3 * RATE as usize, RATE as f64);
    write_wav(&path, &signal, channels, RATE);
    path
}

#[test]
fn test_decode_stereo_wav() {
    let dir = temp_dir();
    let path = c_major_wav(&dir, "stereo.wav", 2);

    let decoded = decode_audio(&path).unwrap();
    assert_eq!(decoded.sample_rate, RATE);
    assert_eq!(decoded.audio.channels(), 2);
    assert_eq!(decoded.audio.frame_count(), 3 * RATE as usize);
    assert!((decoded.duration_secs() - 3.0).abs() < 1e-6);

    let key = KeyFinder::new().key_of_audio(&decoded.audio).unwrap();
    assert_eq!(key, Key::CMajor);

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_decode_rejects_non_audio() {
    let dir = temp_dir();
    let path = dir.join("not_audio.wav");
    std::fs::write(&path, b"definitely not a RIFF header").unwrap();
    assert!(decode_audio(&path).is_err());
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_collect_audio_files_walks_directories() {
    let dir = temp_dir();
    let nested = dir.join("album");
    std::fs::create_dir_all(&nested).unwrap();
    c_major_wav(&nested, "b.wav", 1);
    c_major_wav(&dir, "a.wav", 1);
    std::fs::write(dir.join("cover.txt"), b"liner notes").unwrap();

    let files = collect_audio_files(&[dir.clone(), dir.join("missing.wav")]);
    assert_eq!(files, vec![dir.join("a.wav"), nested.join("b.wav")]);

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_binary_json_output() {
    let dir = temp_dir();
    let path = c_major_wav(&dir, "track.wav", 2);

    let output = binary()
        .arg("--json")
        .arg("--no-progress")
        .arg(&path)
        .output()
        .expect("failed to run keyfinder");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let report = &reports[0];
    assert_eq!(report["key_name"], "C major");
    assert_eq!(report["short_name"], "C");
    assert_eq!(report["sample_rate"], RATE);
    assert_eq!(report["channels"], 2);

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_binary_chunked_matches_whole() {
    let dir = temp_dir();
    let path = c_major_wav(&dir, "track.wav", 1);

    let run = |extra: &[&str]| {
        let output = binary()
            .arg("--json")
            .args(extra)
            .arg(&path)
            .output()
            .expect("failed to run keyfinder");
        assert!(output.status.success());
        let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        reports[0]["key_name"].as_str().unwrap().to_string()
    };

    assert_eq!(run(&[]), run(&["--chunk-frames", "4096"]));

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_binary_rejects_invalid_config() {
    let dir = temp_dir();
    let path = c_major_wav(&dir, "track.wav", 1);
    let config = dir.join("bad.json");
    std::fs::write(&config, r#"{ "hop_size": 0 }"#).unwrap();

    let output = binary()
        .arg("--config")
        .arg(&config)
        .arg(&path)
        .output()
        .expect("failed to run keyfinder");
    assert!(!output.status.success());

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_binary_fails_when_no_file_decodes() {
    let dir = temp_dir();
    let broken = dir.join("broken.wav");
    std::fs::write(&broken, b"definitely not a RIFF header").unwrap();

    let output = binary()
        .arg("--no-progress")
        .arg(&broken)
        .output()
        .expect("failed to run keyfinder");
    assert!(!output.status.success());

    // One good file is enough to succeed
    let good = c_major_wav(&dir, "track.wav", 1);
    let output = binary()
        .arg("--no-progress")
        .arg(&broken)
        .arg(&good)
        .output()
        .expect("failed to run keyfinder");
    assert!(output.status.success());

    std::fs::remove_dir_all(dir).ok();
}
