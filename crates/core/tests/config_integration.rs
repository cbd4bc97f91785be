//! logwarden.toml 통합 설정 테스트
//!
//! - logwarden.toml.example 파싱 테스트
//! - 파일 로딩 / 기본값 대체 테스트
//! - 환경변수 우선순위 테스트
//! - 잘못된 형식 에러 테스트

use logwarden_core::config::LogwardenConfig;
use logwarden_core::error::{ConfigError, LogwardenError};
use tempfile::TempDir;

// =============================================================================
// logwarden.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../logwarden.toml.example");
    let config = LogwardenConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "warn");
    assert_eq!(config.general.log_file, "/var/log/logwarden/logwarden.log");
    assert_eq!(config.elasticsearch.user, "monitoring");
    assert_eq!(config.check.action_file, "/etc/logwarden/actions.yaml");
}

#[test]
fn example_config_passes_validation() {
    let content = include_str!("../../../logwarden.toml.example");
    let config = LogwardenConfig::parse(content).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

// =============================================================================
// 파일 로딩 테스트
// =============================================================================

#[tokio::test]
async fn load_reads_file_from_disk() {
    let dir = TempDir::new().expect("should create temp dir");
    let path = dir.path().join("logwarden.toml");
    std::fs::write(&path, "[elasticsearch]\nhost = \"es01\"\nport = 9243\n")
        .expect("should write config");

    let config = LogwardenConfig::from_file(&path)
        .await
        .expect("should load config");
    assert_eq!(config.elasticsearch.host, "es01");
    assert_eq!(config.elasticsearch.port, 9243);
}

#[tokio::test]
async fn load_missing_file_returns_file_not_found() {
    let dir = TempDir::new().expect("should create temp dir");
    let path = dir.path().join("missing.toml");

    let err = LogwardenConfig::from_file(&path)
        .await
        .expect_err("missing file should fail");
    assert!(matches!(
        err,
        LogwardenError::Config(ConfigError::FileNotFound { .. })
    ));
}

#[tokio::test]
async fn load_or_default_falls_back_when_missing() {
    let dir = TempDir::new().expect("should create temp dir");
    let path = dir.path().join("missing.toml");

    let config = LogwardenConfig::load_or_default(&path)
        .await
        .expect("missing default file should fall back");
    assert_eq!(config.elasticsearch.port, 9200);
}

#[tokio::test]
async fn load_or_default_still_rejects_malformed_file() {
    let dir = TempDir::new().expect("should create temp dir");
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[general\nlog_level = \"info\"\n").expect("should write");

    let err = LogwardenConfig::load_or_default(&path)
        .await
        .expect_err("malformed file should fail");
    assert!(matches!(
        err,
        LogwardenError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[test]
fn invalid_log_format_fails_validation() {
    let config = LogwardenConfig::parse("[general]\nlog_format = \"xml\"\n").expect("should parse");
    let err = config.validate().expect_err("xml is not a log format");
    assert!(err.to_string().contains("general.log_format"));
}

#[test]
fn wrong_type_fails_parse() {
    let err = LogwardenConfig::parse("[elasticsearch]\nport = \"high\"\n")
        .expect_err("string port should fail");
    assert!(matches!(
        err,
        LogwardenError::Config(ConfigError::ParseFailed { .. })
    ));
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let toml = r#"
[elasticsearch]
host = "from-file"
"#;

    let original = std::env::var("LOGWARDEN_ELASTICSEARCH_HOST").ok();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("LOGWARDEN_ELASTICSEARCH_HOST", "from-env");
    }

    let mut config = LogwardenConfig::parse(toml).expect("should parse");
    config.apply_env_overrides();
    let result = config.elasticsearch.host.clone();

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("LOGWARDEN_ELASTICSEARCH_HOST", val),
            None => std::env::remove_var("LOGWARDEN_ELASTICSEARCH_HOST"),
        }
    }

    assert_eq!(result, "from-env");
}

#[test]
#[serial_test::serial]
fn env_override_sets_password_and_timeout() {
    let original_pw = std::env::var("LOGWARDEN_ELASTICSEARCH_PASSWORD").ok();
    let original_timeout = std::env::var("LOGWARDEN_ELASTICSEARCH_TIMEOUT_SECS").ok();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("LOGWARDEN_ELASTICSEARCH_PASSWORD", "s3cret");
        std::env::set_var("LOGWARDEN_ELASTICSEARCH_TIMEOUT_SECS", "30");
    }

    let mut config = LogwardenConfig::default();
    config.apply_env_overrides();
    let password = config.elasticsearch.password.clone();
    let timeout = config.elasticsearch.timeout_secs;

    // SAFETY: 테스트 정리
    unsafe {
        match original_pw {
            Some(val) => std::env::set_var("LOGWARDEN_ELASTICSEARCH_PASSWORD", val),
            None => std::env::remove_var("LOGWARDEN_ELASTICSEARCH_PASSWORD"),
        }
        match original_timeout {
            Some(val) => std::env::set_var("LOGWARDEN_ELASTICSEARCH_TIMEOUT_SECS", val),
            None => std::env::remove_var("LOGWARDEN_ELASTICSEARCH_TIMEOUT_SECS"),
        }
    }

    assert_eq!(password, "s3cret");
    assert_eq!(timeout, 30);
}

#[test]
#[serial_test::serial]
fn invalid_env_number_keeps_file_value() {
    let original = std::env::var("LOGWARDEN_ELASTICSEARCH_PORT").ok();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("LOGWARDEN_ELASTICSEARCH_PORT", "not-a-port");
    }

    let mut config = LogwardenConfig::parse("[elasticsearch]\nport = 9243\n").expect("should parse");
    config.apply_env_overrides();
    let port = config.elasticsearch.port;

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("LOGWARDEN_ELASTICSEARCH_PORT", val),
            None => std::env::remove_var("LOGWARDEN_ELASTICSEARCH_PORT"),
        }
    }

    assert_eq!(port, 9243);
}
