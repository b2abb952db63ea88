use std::env;
use std::fs;
use tempfile::TempDir;

/// Test loading configuration from YAML file
#[test]
fn test_load_yaml_config() {
    let yaml = r#"
profiles:
  test:
    access_key: AKIATEST
    secret_key: secrettest
    region: ap-south-1
    api_version: "2006-03-01"
    endpoint: http://127.0.0.1:9000
    request_timeout: 45

default_profile: test
"#;

    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, yaml).unwrap();

    let config = s3facade::config::load_from_yaml(&config_path).unwrap();

    assert_eq!(config.profiles.len(), 1);
    assert_eq!(config.default_profile, Some("test".to_string()));

    let profile = config.active_profile().unwrap();
    assert_eq!(profile.access_key, "AKIATEST");
    assert_eq!(profile.secret_key, "secrettest");
    assert_eq!(profile.region, "ap-south-1");
    assert_eq!(profile.endpoint_url(), "http://127.0.0.1:9000");
    assert_eq!(profile.timeout(), std::time::Duration::from_secs(45));
}

/// Test loading configuration from environment variables
#[test]
fn test_load_env_config() {
    let vars = [
        "AWS_ACCESS_KEY_ID",
        "AWS_SECRET_ACCESS_KEY",
        "AWS_REGION",
        "AWS_API_VERSION",
        "S3_ENDPOINT",
        "S3_REQUEST_TIMEOUT",
    ];
    let originals: Vec<_> = vars.iter().map(|v| env::var(v).ok()).collect();

    env::set_var("AWS_ACCESS_KEY_ID", "test_key");
    env::set_var("AWS_SECRET_ACCESS_KEY", "test_secret");
    env::set_var("AWS_REGION", "eu-west-1");
    env::remove_var("AWS_API_VERSION");
    env::remove_var("S3_ENDPOINT");
    env::set_var("S3_REQUEST_TIMEOUT", "30");

    let config = s3facade::config::load_from_env().unwrap();

    let profile = config.profiles.get("default").unwrap();
    assert_eq!(profile.access_key, "test_key");
    assert_eq!(profile.secret_key, "test_secret");
    assert_eq!(profile.region, "eu-west-1");
    assert_eq!(profile.api_version, "2006-03-01");
    assert_eq!(profile.endpoint_url(), "https://s3.eu-west-1.amazonaws.com");
    assert_eq!(profile.request_timeout, 30);
    assert_eq!(config.default_profile, Some("default".to_string()));

    // A malformed timeout is reported rather than ignored
    env::set_var("S3_REQUEST_TIMEOUT", "soon");
    assert!(s3facade::config::load_from_env().is_err());

    for (var, original) in vars.iter().zip(originals) {
        cleanup_env(var, original);
    }
}

/// Test load_config with a named profile
#[test]
fn test_load_config_profile_selection() {
    let yaml = r#"
profiles:
  prod:
    access_key: prod_key
    secret_key: prod_secret
  dev:
    access_key: dev_key
    secret_key: dev_secret
    endpoint: http://localhost:9000

default_profile: prod
"#;

    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, yaml).unwrap();
    let path = config_path.to_str().unwrap();

    let config = s3facade::config::load_config(Some(path), None).unwrap();
    assert_eq!(config.get_profile(None).unwrap().access_key, "prod_key");

    let config = s3facade::config::load_config(Some(path), Some("dev")).unwrap();
    assert_eq!(config.get_profile(None).unwrap().access_key, "dev_key");

    assert!(s3facade::config::load_config(Some(path), Some("nonexistent")).is_err());
}

/// An unsupported API version is refused when the profile is activated
#[test]
fn test_active_profile_validation() {
    let yaml = r#"
profiles:
  old:
    access_key: key
    secret_key: secret
    api_version: "2001-01-01"
"#;

    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, yaml).unwrap();

    let config = s3facade::config::load_from_yaml(&config_path).unwrap();
    assert!(config.active_profile().is_err());
    assert!(s3facade::StorageFacade::from_config(&config).is_err());
}

#[test]
fn test_missing_config_file() {
    assert!(s3facade::config::load_from_yaml("/nonexistent/config.yaml").is_err());
}

/// Helper function to cleanup environment variables
fn cleanup_env(key: &str, orig_val: Option<String>) {
    match orig_val {
        Some(val) => env::set_var(key, val),
        None => env::remove_var(key),
    }
}
