//! 메트릭 상수 및 설명 등록
//!
//! 검사 실행 중 기록되는 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//! CLI는 recorder를 설치하지 않으므로, recorder를 설치한 프로세스에 임베드될 때만
//! 값이 수집됩니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logwarden_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(logwarden_core::metrics::CHECK_DOCUMENTS_SCANNED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 액션 이름 레이블 키
pub const LABEL_ACTION: &str = "action";

/// 룰 이름 레이블 키
pub const LABEL_RULE: &str = "rule";

/// 결과 상태 레이블 키 (ok, warning, critical, unknown)
pub const LABEL_STATE: &str = "state";

// ─── 검사 메트릭 ──────────────────────────────────────────────────

/// 검사: 스캔한 문서 수 (counter, label: action)
pub const CHECK_DOCUMENTS_SCANNED_TOTAL: &str = "logwarden_check_documents_scanned_total";

/// 검사: 가져온 페이지 수 (counter, label: action)
pub const CHECK_PAGES_FETCHED_TOTAL: &str = "logwarden_check_pages_fetched_total";

/// 검사: 룰 매칭 수 (counter, label: action, rule)
pub const CHECK_RULE_MATCHES_TOTAL: &str = "logwarden_check_rule_matches_total";

/// 검사: 기록된 히스토리 항목 수 (counter, label: action, state)
pub const CHECK_HISTORY_RECORDED_TOTAL: &str = "logwarden_check_history_recorded_total";

/// 검사: 실패한 액션 수 (counter, label: action)
pub const CHECK_ACTION_FAILURES_TOTAL: &str = "logwarden_check_action_failures_total";

/// 모든 메트릭의 설명을 등록합니다.
///
/// `metrics::describe_counter!()`를 호출하여 recorder에 메타데이터를 제공합니다.
/// recorder 설치 직후 한 번 호출합니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        CHECK_DOCUMENTS_SCANNED_TOTAL,
        "Total number of documents evaluated against action rules"
    );
    describe_counter!(
        CHECK_PAGES_FETCHED_TOTAL,
        "Total number of result pages fetched from the document store"
    );
    describe_counter!(
        CHECK_RULE_MATCHES_TOTAL,
        "Documents matched per rule"
    );
    describe_counter!(
        CHECK_HISTORY_RECORDED_TOTAL,
        "History entries recorded for threshold breaches"
    );
    describe_counter!(
        CHECK_ACTION_FAILURES_TOTAL,
        "Actions aborted by search, rule or persistence errors"
    );
}
