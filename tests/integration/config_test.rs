use hostscope::core::config::Config;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.bind_address(), "0.0.0.0:5000");
    assert_eq!(config.log_level, "info");
    assert_eq!(config.request_timeout(), Duration::from_secs(5));
    assert_eq!(config.max_retries, 2);
}

#[test]
fn test_config_load_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(
        &path,
        r#"{ "host": "127.0.0.1", "port": 9100, "cache_duration_secs": 60 }"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.bind_address(), "127.0.0.1:9100");
    assert_eq!(config.cache_duration(), Duration::from_secs(60));
    assert_eq!(config.thermal_root, Config::default().thermal_root);
}

#[test]
fn test_config_empty_file_is_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, "  \n").unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
}

#[test]
fn test_config_path_is_under_hostscope_dir() {
    if let Ok(path) = Config::get_config_path() {
        assert!(path.ends_with("hostscope/config.json"));
    }
}
