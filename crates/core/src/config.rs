//! 설정 관리 — logwarden.toml 파싱 및 런타임 설정
//!
//! [`LogwardenConfig`]는 CLI, 문서 저장소 클라이언트, 액션 실행기가 공유하는
//! 최상위 설정 구조체입니다. 룰/액션 정의는 별도의 액션 파일(YAML)에 있으며
//! 여기서는 그 경로만 관리합니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGWARDEN_ELASTICSEARCH_PASSWORD=secret` 형식)
//! 3. 설정 파일 (`logwarden.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logwarden_core::error::LogwardenError> {
//! use logwarden_core::config::LogwardenConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogwardenConfig::load("logwarden.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogwardenConfig::parse("[elasticsearch]\nhost = \"es01\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, LogwardenError};

/// 설정 파일 기본 경로
pub const DEFAULT_CONFIG_PATH: &str = "/etc/logwarden/logwarden.toml";

/// logwarden 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogwardenConfig {
    /// 일반 설정 (로깅)
    #[serde(default)]
    pub general: GeneralConfig,
    /// 문서 저장소 연결 설정
    #[serde(default)]
    pub elasticsearch: ElasticsearchConfig,
    /// 검사 실행 설정
    #[serde(default)]
    pub check: CheckConfig,
}

impl LogwardenConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogwardenError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일이 없으면 기본값을 사용합니다.
    ///
    /// 기본 경로처럼 "있으면 읽는" 파일에 사용합니다. 파일이 있지만 깨져 있으면
    /// 에러를 반환합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, LogwardenError> {
        let path = path.as_ref();
        match Self::from_file(path).await {
            Ok(mut config) => {
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            Err(LogwardenError::Config(ConfigError::FileNotFound { .. })) => {
                debug!(path = %path.display(), "config file not found, using defaults");
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            Err(e) => Err(e),
        }
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogwardenError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogwardenError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogwardenError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogwardenError> {
        toml::from_str(toml_str).map_err(|e| {
            LogwardenError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGWARDEN_{SECTION}_{FIELD}`
    /// 예: `LOGWARDEN_ELASTICSEARCH_HOST=es01.internal`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGWARDEN_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGWARDEN_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.log_file, "LOGWARDEN_GENERAL_LOG_FILE");

        // Elasticsearch
        override_string(
            &mut self.elasticsearch.host,
            "LOGWARDEN_ELASTICSEARCH_HOST",
        );
        override_u16(
            &mut self.elasticsearch.port,
            "LOGWARDEN_ELASTICSEARCH_PORT",
        );
        override_bool(&mut self.elasticsearch.ssl, "LOGWARDEN_ELASTICSEARCH_SSL");
        override_bool(
            &mut self.elasticsearch.validate_ssl,
            "LOGWARDEN_ELASTICSEARCH_VALIDATE_SSL",
        );
        override_string(
            &mut self.elasticsearch.user,
            "LOGWARDEN_ELASTICSEARCH_USER",
        );
        override_string(
            &mut self.elasticsearch.password,
            "LOGWARDEN_ELASTICSEARCH_PASSWORD",
        );
        override_string(
            &mut self.elasticsearch.proxy,
            "LOGWARDEN_ELASTICSEARCH_PROXY",
        );
        override_bool(
            &mut self.elasticsearch.socks,
            "LOGWARDEN_ELASTICSEARCH_SOCKS",
        );
        override_u64(
            &mut self.elasticsearch.timeout_secs,
            "LOGWARDEN_ELASTICSEARCH_TIMEOUT_SECS",
        );

        // Check
        override_string(&mut self.check.action_file, "LOGWARDEN_CHECK_ACTION_FILE");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogwardenError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.elasticsearch.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "elasticsearch.host".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        if self.elasticsearch.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "elasticsearch.port".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.elasticsearch.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "elasticsearch.timeout_secs".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.elasticsearch.socks && self.elasticsearch.proxy.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "elasticsearch.socks".to_owned(),
                reason: "socks requires a proxy address".to_owned(),
            }
            .into());
        }

        if self.check.action_file.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "check.action_file".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 로그 파일 경로 (`-`이면 stderr)
    ///
    /// stdout은 플러그인 출력 전용이므로 로그를 쓰지 않습니다.
    pub log_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "pretty".to_owned(),
            log_file: "-".to_owned(),
        }
    }
}

/// 문서 저장소(Elasticsearch) 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticsearchConfig {
    /// 호스트 이름
    pub host: String,
    /// 포트
    pub port: u16,
    /// HTTPS 사용 여부
    pub ssl: bool,
    /// 인증서 검증 여부
    pub validate_ssl: bool,
    /// Basic 인증 사용자 (빈 문자열이면 인증 없음)
    pub user: String,
    /// Basic 인증 비밀번호
    #[serde(skip_serializing)]
    pub password: String,
    /// 프록시 주소 (`host:port` 또는 URL)
    pub proxy: String,
    /// 프록시가 SOCKS5인지 여부
    pub socks: bool,
    /// 요청 타임아웃 (초) — PIT keep-alive에도 사용
    pub timeout_secs: u64,
}

impl ElasticsearchConfig {
    /// `scheme://host:port` 형식의 기본 URL
    pub fn base_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }

    /// 요청 타임아웃
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 9200,
            ssl: true,
            validate_ssl: true,
            user: String::new(),
            password: String::new(),
            proxy: String::new(),
            socks: false,
            timeout_secs: 120,
        }
    }
}

/// 검사 실행 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// 액션 정의 파일(YAML) 경로
    pub action_file: String,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            action_file: "/etc/logwarden/actions.yaml".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
