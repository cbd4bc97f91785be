//! logwarden-core — 공통 타입, trait, 에러, 설정
//!
//! 모든 logwarden 크레이트가 공유하는 기반 타입을 정의합니다.
//!
//! # 모듈
//! - [`config`]: `logwarden.toml` 파싱, 환경변수 오버라이드, 검증
//! - [`document`]: 점 경로 기반 문서 필드 접근 trait ([`DocumentView`])
//! - [`error`]: 최상위 에러 타입
//! - [`metrics`]: 메트릭 이름 상수
//! - [`types`]: 검사 결과 상태 ([`CheckState`])

pub mod config;
pub mod document;
pub mod error;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, LogwardenError};

// 설정
pub use config::LogwardenConfig;

// 문서 뷰
pub use document::DocumentView;

// 도메인 타입
pub use types::CheckState;
