//! 검사 엔진 에러 타입
//!
//! [`CheckError`]는 액션 파일 로딩부터 상태 파일 저장까지 검사 엔진 내부에서
//! 발생하는 모든 에러를 표현합니다. [`CheckError::kind`]는 에러를 처리 정책
//! 단위([`ErrorKind`])로 분류합니다.
//! `From<CheckError> for LogwardenError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use logwarden_core::error::{ConfigError, LogwardenError};
use logwarden_search::SearchError;

/// 에러 처리 정책 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 액션 파일/임계값 설정 오류 — 로딩 시점에 치명적
    Config,
    /// 커서(PIT 열기/진행/닫기) 실패 — 현재 액션만 중단
    Cursor,
    /// 잘못된 정규식 — 현재 액션 실패로 보고
    Pattern,
    /// 문서에 체크포인트 타임스탬프 필드가 없음 — 현재 액션 중단
    MissingField,
    /// 상태 파일 읽기/쓰기 실패
    Persistence,
}

/// 검사 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// 액션 파일 로딩 실패
    #[error("action file error: {path}: {reason}")]
    ActionLoad {
        /// 액션 파일 경로
        path: String,
        /// 로딩 실패 사유
        reason: String,
    },

    /// 액션 정의 검증 실패
    #[error("action validation error: action '{action}': {reason}")]
    ActionValidation {
        /// 문제가 된 액션 이름
        action: String,
        /// 검증 실패 사유
        reason: String,
    },

    /// 룰 정의 검증 실패
    #[error("rule validation error: rule '{rule}': {reason}")]
    RuleValidation {
        /// 문제가 된 룰 이름
        rule: String,
        /// 검증 실패 사유
        reason: String,
    },

    /// 임계값 범위 문자열 파싱 실패
    #[error("invalid {kind} range '{range}' in rule '{rule}': {reason}")]
    InvalidRange {
        /// 룰 이름
        rule: String,
        /// `warning` 또는 `critical`
        kind: &'static str,
        /// 원본 범위 문자열
        range: String,
        /// 파싱 실패 사유
        reason: String,
    },

    /// 요청한 액션이 하나도 없음
    #[error("none of the actions {names:?} were found")]
    UnknownActions {
        /// 요청한 액션 이름 목록
        names: Vec<String>,
    },

    /// 정규식 컴파일 실패 (평가 시점에 보고)
    #[error("invalid pattern for field '{field}': '{regex}': {reason}")]
    Pattern {
        /// 패턴이 검사하는 필드
        field: String,
        /// 원본 정규식
        regex: String,
        /// 컴파일 실패 사유
        reason: String,
    },

    /// 문서에 필수 필드가 없음
    #[error("document {document} is missing field {field}")]
    MissingField {
        /// 문서 ID (알 수 없으면 빈 문자열)
        document: String,
        /// 누락된 필드
        field: String,
    },

    /// 문서 저장소 통신 실패
    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    /// 더 가져올 페이지가 없는 커서에서 next 호출
    #[error("cursor exhausted: no search_after marker available")]
    CursorExhausted,

    /// 이미 닫혔거나 실패한 커서 사용
    #[error("cursor is {state}")]
    CursorUnavailable {
        /// 현재 커서 상태
        state: String,
    },

    /// 상태 파일 읽기/쓰기/직렬화 실패
    #[error("status file error: {path}: {reason}")]
    Status {
        /// 상태 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },
}

impl CheckError {
    /// 에러를 처리 정책 단위로 분류합니다.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ActionLoad { .. }
            | Self::ActionValidation { .. }
            | Self::RuleValidation { .. }
            | Self::InvalidRange { .. }
            | Self::UnknownActions { .. } => ErrorKind::Config,
            Self::Pattern { .. } => ErrorKind::Pattern,
            Self::MissingField { .. } => ErrorKind::MissingField,
            Self::Search(_) | Self::CursorExhausted | Self::CursorUnavailable { .. } => {
                ErrorKind::Cursor
            }
            Self::Status { .. } => ErrorKind::Persistence,
        }
    }
}

impl From<CheckError> for LogwardenError {
    fn from(err: CheckError) -> Self {
        match err.kind() {
            ErrorKind::Config => LogwardenError::Config(ConfigError::ParseFailed {
                reason: err.to_string(),
            }),
            ErrorKind::Cursor => LogwardenError::Search(err.to_string()),
            ErrorKind::Persistence => LogwardenError::Status(err.to_string()),
            ErrorKind::Pattern | ErrorKind::MissingField => LogwardenError::Check(err.to_string()),
        }
    }
}
