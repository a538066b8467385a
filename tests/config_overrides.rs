use std::env;
use std::fs;

use serial_test::serial;
use tapmend::{load_config, ConfigError, StructuralPathMode};

const VARS: [&str; 3] = [
    "TAPMEND__MIN_CONFIDENCE",
    "TAPMEND__DISCOVERY__STRUCTURAL_PATH",
    "TAPMEND__DISCOVERY__MAX_NODES",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn defaults_without_file_or_env() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(Some(dir.path().join("missing.yaml").as_path())).unwrap();
    assert_eq!(config.min_confidence, 0.7);
    assert_eq!(config.workers, 4);
    assert_eq!(config.discovery.structural_path, StructuralPathMode::Ancestry);
}

#[test]
#[serial]
fn env_overrides_file() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tapmend.yaml");
    fs::write(
        &path,
        "min_confidence: 0.75\nworkers: 2\ncommit:\n  branch: selector-heal\n  author_name: ci-bot\n",
    )
    .unwrap();
    env::set_var("TAPMEND__MIN_CONFIDENCE", "0.85");
    env::set_var("TAPMEND__DISCOVERY__STRUCTURAL_PATH", "flat");

    let config = load_config(Some(path.as_path()));
    clear_env();
    let config = config.unwrap();

    assert_eq!(config.min_confidence, 0.85);
    assert_eq!(config.workers, 2);
    assert_eq!(config.discovery.structural_path, StructuralPathMode::Flat);
    assert_eq!(config.commit.branch.as_deref(), Some("selector-heal"));
    assert_eq!(config.commit.author_name, "ci-bot");
    assert_eq!(config.commit.author_email, "tapmend@localhost");
}

#[test]
#[serial]
fn unknown_env_key_is_rejected() {
    clear_env();
    env::set_var("TAPMEND__DISCOVERY__MAX_NODES", "10");
    let result = load_config(None);
    clear_env();
    assert!(matches!(result, Err(ConfigError::UnsupportedPath(_))));
}

#[test]
#[serial]
fn out_of_range_threshold_is_rejected() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tapmend.yaml");
    fs::write(&path, "min_confidence: 1.2\n").unwrap();
    assert!(matches!(
        load_config(Some(path.as_path())),
        Err(ConfigError::InvalidValue { .. })
    ));
}
