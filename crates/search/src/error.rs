//! 에러 타입 — 문서 저장소 통신 에러 정의

/// 문서 저장소 클라이언트 에러
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// HTTP 클라이언트 생성 실패 (TLS, 프록시 설정 등)
    #[error("failed to build http client: {reason}")]
    ClientBuild {
        /// 실패 사유
        reason: String,
    },

    /// 요청 전송 실패 (연결 거부, DNS 등)
    #[error("request to {url} failed: {reason}")]
    Request {
        /// 요청 URL
        url: String,
        /// 실패 사유
        reason: String,
    },

    /// 요청 타임아웃
    #[error("request to {url} timed out")]
    Timeout {
        /// 요청 URL
        url: String,
    },

    /// 저장소가 4xx/5xx 상태 코드를 반환
    #[error("{url} returned status {status}: {reason}")]
    Status {
        /// 요청 URL
        url: String,
        /// HTTP 상태 코드
        status: u16,
        /// 저장소가 보고한 사유
        reason: String,
    },

    /// 응답 본문 디코딩 실패
    #[error("failed to decode response from {url}: {reason}")]
    Decode {
        /// 요청 URL
        url: String,
        /// 실패 사유
        reason: String,
    },
}
