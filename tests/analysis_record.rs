mod support;

use std::process::Command;

use serde_json::Value;
use support::wav::{sine, write_test_wav};
use tempfile::tempdir;
use timbrekit::config::EmbeddingSettings;
use timbrekit::{Analyzer, ErrorKind};

fn missing_model_settings(dir: &std::path::Path) -> EmbeddingSettings {
    EmbeddingSettings {
        model_dir: dir.join("no-model-here"),
        ..EmbeddingSettings::default()
    }
}

#[test]
fn missing_model_still_returns_features() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    write_test_wav(&path, 44_100, 1, &sine(440.0, 44_100, 2.0, 1.0));

    let mut analyzer = Analyzer::from_settings(&missing_model_settings(dir.path()));
    assert!(analyzer.embedding_error().is_some());
    let report = analyzer.analyze_file(&path).unwrap();

    assert!(report.embedding.is_none());
    assert!(report.embedding_dim.is_none());
    let message = report.model_error.as_deref().unwrap();
    assert!(message.contains("ONNX model not found"));
    assert!(message.contains("CLAP_ONNX_DIR"));

    let features = &report.features;
    assert_eq!(features.sample_rate, 44_100);
    assert!((features.duration_sec - 2.0).abs() < 1e-6);
    assert!((features.loudness.rms_db + 3.01).abs() < 0.02);
    assert!(features.loudness.peak_db >= features.loudness.rms_db);
    assert!((features.spectral.centroid_hz - 440.0).abs() < 25.0);
    assert!(features.transients.is_empty());
    assert_eq!(
        std::path::PathBuf::from(&report.path),
        path.canonicalize().unwrap()
    );
}

#[test]
fn stereo_file_is_analyzed_as_mono_average() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stereo.wav");
    let left = sine(1_000.0, 22_050, 1.0, 0.8);
    let interleaved: Vec<f32> = left.iter().flat_map(|&s| [s, 0.0]).collect();
    write_test_wav(&path, 22_050, 2, &interleaved);

    let mut analyzer = Analyzer::from_settings(&missing_model_settings(dir.path()));
    let report = analyzer.analyze_file(&path).unwrap();
    let expected_peak = 20.0 * (0.4_f64).log10();
    assert!((report.features.loudness.peak_db - expected_peak).abs() < 0.05);
}

#[test]
fn clip_shorter_than_window_aborts_analysis() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("blip.wav");
    write_test_wav(&path, 44_100, 1, &[0.5; 1_000]);
    let mut analyzer = Analyzer::from_settings(&missing_model_settings(dir.path()));
    let err = analyzer.analyze_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Computation);
}

#[test]
fn zero_frame_file_is_a_computation_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.wav");
    write_test_wav(&path, 44_100, 1, &[]);
    let mut analyzer = Analyzer::from_settings(&missing_model_settings(dir.path()));
    let err = analyzer.analyze_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Computation);
}

#[test]
fn cli_prints_one_json_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    write_test_wav(&path, 16_000, 1, &sine(440.0, 16_000, 1.0, 0.5));

    let output = Command::new(env!("CARGO_BIN_EXE_timbrekit-analyze"))
        .arg(&path)
        .arg("--model-dir")
        .arg(dir.path().join("absent"))
        .env("TIMBREKIT_CONFIG_HOME", dir.path().join("home"))
        .env_remove("CLAP_ONNX_DIR")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);
    let record: Value = serde_json::from_str(lines[0]).unwrap();
    for key in ["path", "features", "embedding_dim", "embedding", "model_error"] {
        assert!(record.get(key).is_some(), "missing {key}");
    }
    assert!(record["embedding"].is_null());
    assert!(record["model_error"].as_str().unwrap().contains("absent"));
    assert_eq!(record["features"]["sample_rate"], 16_000);
    assert!(record["features"]["transients"].is_array());
}

#[test]
fn cli_reports_missing_input_on_stderr() {
    let dir = tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_timbrekit-analyze"))
        .arg(dir.path().join("absent.wav"))
        .env("TIMBREKIT_CONFIG_HOME", dir.path().join("home"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: "));
}
