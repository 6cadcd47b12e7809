//! Integration tests for CLI config structs and util helpers.

use mlvis_cli::activations::input::{FiltersConfig, TrainCnnConfig, DEFAULT_MODEL_FILE};
use mlvis_cli::classifiers::input::{DigitsConfig, IrisConfig};
use mlvis_cli::util::{load_config, validate_file_exists};

// ---------------------------------------------------------------------------
// validate_file_exists
// ---------------------------------------------------------------------------

#[test]
fn validate_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weights.safetensors");
    std::fs::File::create(&path).unwrap();
    assert!(validate_file_exists(path.to_str().unwrap()).is_ok());
}

#[test]
fn validate_directory_is_not_a_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(validate_file_exists(dir.path().to_str().unwrap()).is_err());
}

#[test]
fn validate_nonexistent_file_errors() {
    assert!(validate_file_exists("/nonexistent/path/model.safetensors").is_err());
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[test]
fn digits_config_defaults() {
    let cfg = DigitsConfig::default();
    assert!((cfg.test_size - 0.25).abs() < 1e-12);
    assert_eq!(cfg.seed, 0);
    assert!(cfg.data.ends_with("optdigits.tes"));
    assert_eq!(cfg.fetch.timeout_secs, 30);
}

#[test]
fn iris_config_defaults() {
    let cfg = IrisConfig::default();
    assert_eq!(cfg.n_components, 2);
    assert!(cfg.data.ends_with("iris.data"));
}

#[test]
fn filters_config_defaults() {
    let cfg = FiltersConfig::default();
    assert_eq!(cfg.model_path, DEFAULT_MODEL_FILE);
    assert_eq!(cfg.image_path, "images/face_grayscale_small.jpg");
    assert_eq!(cfg.layer, "conv2d_2");
    assert_eq!(cfg.ascent.steps, 20);
    assert!((cfg.ascent.step_size - 5.0).abs() < 1e-12);
    assert!(cfg.png_file.is_none());
}

#[test]
fn train_config_writes_where_filters_reads() {
    assert_eq!(TrainCnnConfig::default().output_file, FiltersConfig::default().model_path);
}

// ---------------------------------------------------------------------------
// JSON loading
// ---------------------------------------------------------------------------

#[test]
fn partial_json_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filters.json");
    std::fs::write(&path, r#"{"layer": "conv2d_1", "ascent": {"steps": 5}}"#).unwrap();

    let cfg: FiltersConfig = load_config(Some(&path)).unwrap();
    assert_eq!(cfg.layer, "conv2d_1");
    assert_eq!(cfg.ascent.steps, 5);
    assert!((cfg.ascent.step_size - 5.0).abs() < 1e-12);
    assert_eq!(cfg.device, "cpu");
}

#[test]
fn digits_config_round_trips_json() {
    let cfg = DigitsConfig {
        seed: 9,
        ..Default::default()
    };
    let json = serde_json::to_string(&cfg).unwrap();
    let back: DigitsConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.seed, 9);
    assert_eq!(back.model.model_type, cfg.model.model_type);
}

#[test]
fn missing_config_file_errors() {
    let path = std::path::PathBuf::from("/nonexistent/config.json");
    assert!(load_config::<IrisConfig>(Some(&path)).is_err());
}
