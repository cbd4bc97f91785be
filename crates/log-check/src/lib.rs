//! logwarden-check — 로그 검사 엔진
//!
//! 문서 저장소에서 지난 실행 이후의 로그를 페이지 단위로 읽어 룰에 따라
//! 분류하고, 룰별 매칭 수를 임계값과 비교하여 결과를 보고합니다.
//! 다음 실행을 위한 체크포인트와 경보 히스토리는 액션별 상태 파일에 저장합니다.
//!
//! # 아키텍처
//!
//! ```text
//! ActionSet (actions.yaml)
//!     │
//!     ▼
//! Check::run ──▶ PaginatedSearch ──▶ DocumentStore (PIT + search_after)
//!     │               │
//!     │               ▼ page
//!     │          RuleEngine ──▶ RuleCount + checkpoint 후보
//!     │               │
//!     ▼               ▼
//! StatusStore ◀── evaluate_thresholds / report_historic ──▶ Report
//! ```
//!
//! # 모듈
//! - [`action`]: 액션 파일 로딩 및 검증
//! - [`check`]: 액션 실행기와 히스토리 관리 명령
//! - [`cursor`]: PIT 기반 페이지 커서
//! - [`error`]: 검사 엔진 에러
//! - [`evaluator`]: 임계값 평가와 히스토리 보고
//! - [`report`]: 결과와 perfdata 레코드
//! - [`rule`]: 패턴 매칭, 룰 엔진, 임계값 범위, 집계
//! - [`status`]: 상태 파일 저장소

pub mod action;
pub mod check;
pub mod cursor;
pub mod error;
pub mod evaluator;
pub mod report;
pub mod rule;
pub mod status;

// --- 주요 타입 re-export ---

pub use action::{Action, ActionDefinition, ActionSet};
pub use check::{ActionHistory, Check};
pub use cursor::{CursorState, PAGE_SIZE, PaginatedSearch};
pub use error::{CheckError, ErrorKind};
pub use report::{CheckResult, PerfDatum, Report};
pub use rule::{Rule, RuleCount, RuleDefinition, RuleEngine, ThresholdRange};
pub use status::{StatusData, StatusHistory, StatusStore};
