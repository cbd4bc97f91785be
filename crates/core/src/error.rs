//! 에러 타입 — 도메인별 에러 정의

/// logwarden 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogwardenError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 문서 저장소(검색) 에러
    #[error("search error: {0}")]
    Search(String),

    /// 액션 실행 에러
    #[error("check error: {0}")]
    Check(String),

    /// 상태 파일 저장/로드 에러
    #[error("status error: {0}")]
    Status(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_to_top_level() {
        let err: LogwardenError = ConfigError::FileNotFound {
            path: "/etc/logwarden/logwarden.toml".to_owned(),
        }
        .into();
        assert!(matches!(err, LogwardenError::Config(_)));
        assert!(err.to_string().contains("/etc/logwarden/logwarden.toml"));
    }

    #[test]
    fn invalid_value_display_names_field() {
        let err = ConfigError::InvalidValue {
            field: "elasticsearch.port".to_owned(),
            reason: "must be greater than 0".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value for 'elasticsearch.port': must be greater than 0"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: LogwardenError = io.into();
        assert!(err.to_string().starts_with("io error"));
    }
}
