//! 룰 엔진 -- 정렬된 룰 적용, 집계, 체크포인트 후보 추출
//!
//! 액션 파일에서 읽은 룰을 문서마다 평가하여 [`RuleCount`]에 집계하고,
//! 마지막으로 처리한 문서의 `@timestamp`를 다음 실행의 체크포인트 후보로
//! 반환합니다.
//!
//! # 아키텍처
//! - [`RuleEngine`]: 룰 정렬 및 문서/페이지 평가 코디네이터
//! - [`matcher`]: 포함/제외 패턴 평가
//! - [`range`]: 임계값 범위 파싱 및 평가
//! - [`count`]: 실행 단위 집계
//! - [`types`]: 룰 정의와 컴파일된 룰

pub mod count;
pub mod matcher;
pub mod range;
pub mod types;

pub use count::{NO_MATCH_KEY, RuleCount, RuleCountEntry, TOTAL_KEY};
pub use matcher::is_match;
pub use range::{RangeError, ThresholdRange};
pub use types::{CombineMode, Pattern, PatternDefinition, Rule, RuleDefinition};

use logwarden_core::DocumentView;

use crate::error::CheckError;

/// 체크포인트 타임스탬프 필드
pub const TIMESTAMP_FIELD: &str = "@timestamp";

/// 문서 하나의 평가 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOutcome {
    /// 매칭된 룰 이름 (평가 순서)
    pub matched: Vec<String>,
    /// 문서의 타임스탬프 (체크포인트 후보)
    pub timestamp: String,
}

/// 룰 엔진
///
/// 룰은 `(order, name)` 오름차순으로 평가됩니다. `stop_on_match` 룰이
/// 매칭되면 그 문서에 대해 이후 룰은 평가하지 않습니다.
///
/// # 사용 예시
/// ```ignore
/// let engine = RuleEngine::new(rules);
/// let mut counts = engine.new_count();
/// let checkpoint = engine.evaluate_page(page.hits(), &mut counts)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl RuleEngine {
    /// 룰 목록으로 엔진을 만듭니다.
    pub fn new(mut rules: Vec<Rule>) -> Self {
        rules.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
        Self { rules }
    }

    /// 평가 순서로 정렬된 룰 목록
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// 이름으로 룰을 찾습니다.
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// 룰 이름과 예약 키로 초기화한 집계를 만듭니다.
    pub fn new_count(&self) -> RuleCount {
        RuleCount::new(self.rules.iter().map(|r| r.name.as_str()))
    }

    /// 문서 하나를 평가하여 집계에 반영합니다.
    ///
    /// # Errors
    ///
    /// - 평가 중인 패턴의 정규식이 잘못된 경우 `CheckError::Pattern`
    /// - 문서에 `@timestamp`가 없는 경우 `CheckError::MissingField`
    pub fn evaluate_document<D>(
        &self,
        doc: &D,
        counts: &mut RuleCount,
    ) -> Result<DocumentOutcome, CheckError>
    where
        D: DocumentView + ?Sized,
    {
        counts.increment(TOTAL_KEY);

        let mut matched = Vec::new();
        for rule in &self.rules {
            if !is_match(doc, rule)? {
                continue;
            }

            tracing::trace!(rule = %rule.name, document = %doc.document_id(), "rule matched");
            counts.record(&rule.name, excerpt(doc, rule), rule.output_lines);
            matched.push(rule.name.clone());

            if rule.stop_on_match {
                break;
            }
        }

        if matched.is_empty() {
            counts.increment(NO_MATCH_KEY);
        }

        let timestamp = document_timestamp(doc)?;
        Ok(DocumentOutcome { matched, timestamp })
    }

    /// 페이지의 모든 문서를 평가하고 마지막 문서의 타임스탬프를 반환합니다.
    ///
    /// 빈 페이지는 `None`을 반환합니다.
    pub fn evaluate_page<D: DocumentView>(
        &self,
        docs: &[D],
        counts: &mut RuleCount,
    ) -> Result<Option<String>, CheckError> {
        let mut last = None;
        for doc in docs {
            last = Some(self.evaluate_document(doc, counts)?.timestamp);
        }
        Ok(last)
    }
}

/// 룰의 출력 필드 값을 문서에서 발췌합니다. 없는 필드는 건너뜁니다.
fn excerpt<D>(doc: &D, rule: &Rule) -> Vec<String>
where
    D: DocumentView + ?Sized,
{
    rule.output_fields
        .iter()
        .filter_map(|field| doc.get_string(field))
        .collect()
}

/// 문서의 체크포인트 타임스탬프를 추출합니다.
///
/// 저장소가 렌더링한 값을 우선하며, 배열 표기의 대괄호를 제거합니다.
fn document_timestamp<D>(doc: &D) -> Result<String, CheckError>
where
    D: DocumentView + ?Sized,
{
    if let Some(rendered) = doc.get_rendered(TIMESTAMP_FIELD) {
        return Ok(rendered.replace(['[', ']'], ""));
    }

    doc.get_string(TIMESTAMP_FIELD)
        .ok_or_else(|| CheckError::MissingField {
            document: doc.document_id().to_owned(),
            field: TIMESTAMP_FIELD.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use logwarden_search::Hit;
    use serde_json::{Value, json};

    fn make_rule(name: &str, order: i64, field: &str, regex: &str, stop: bool) -> Rule {
        let def = RuleDefinition {
            order,
            stop_on_match: stop,
            pattern: vec![PatternDefinition {
                field: field.to_owned(),
                regex: regex.to_owned(),
            }],
            output_fields: vec!["message".to_owned()],
            output_lines: 2,
            ..Default::default()
        };
        Rule::compile(name, &def).unwrap()
    }

    fn doc(level: &str, message: &str, ts: &str) -> Value {
        json!({ "level": level, "message": message, "@timestamp": ts })
    }

    #[test]
    fn rules_are_sorted_by_order_then_name() {
        let engine = RuleEngine::new(vec![
            make_rule("zeta", 1, "level", "x", false),
            make_rule("beta", 2, "level", "x", false),
            make_rule("alpha", 1, "level", "x", false),
        ]);
        let names: Vec<&str> = engine.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta", "beta"]);
    }

    #[test]
    fn counts_matches_and_totals() {
        let engine = RuleEngine::new(vec![
            make_rule("errors", 1, "level", "^ERROR$", false),
            make_rule("any", 2, "level", ".", false),
        ]);
        let mut counts = engine.new_count();

        let outcome = engine
            .evaluate_document(&doc("ERROR", "boom", "2024-05-01T10:00:00.000Z"), &mut counts)
            .unwrap();
        assert_eq!(outcome.matched, vec!["errors", "any"]);
        assert_eq!(outcome.timestamp, "2024-05-01T10:00:00.000Z");

        engine
            .evaluate_document(&json!({ "@timestamp": "t2" }), &mut counts)
            .unwrap();

        assert_eq!(counts.total(), 2);
        assert_eq!(counts.not_matched(), 1);
        assert_eq!(counts.count("errors"), 1);
        assert_eq!(counts.get("errors").unwrap().lines, vec!["boom"]);
    }

    #[test]
    fn stop_on_match_skips_later_rules() {
        let engine = RuleEngine::new(vec![
            make_rule("second", 2, "level", "ERROR", false),
            make_rule("first", 1, "level", "ERROR", true),
        ]);
        let mut counts = engine.new_count();
        let outcome = engine
            .evaluate_document(&doc("ERROR", "boom", "t"), &mut counts)
            .unwrap();
        assert_eq!(outcome.matched, vec!["first"]);
        assert_eq!(counts.count("first"), 1);
        assert_eq!(counts.count("second"), 0);
    }

    #[test]
    fn missing_timestamp_fails() {
        let engine = RuleEngine::new(vec![]);
        let mut counts = engine.new_count();
        let hit = Hit::from_source("doc-1", json!({ "message": "no time" }), vec![]);
        let err = engine.evaluate_document(&hit, &mut counts).unwrap_err();
        assert!(matches!(
            err,
            CheckError::MissingField { ref document, ref field }
                if document == "doc-1" && field == "@timestamp"
        ));
    }

    #[test]
    fn rendered_timestamp_wins_and_brackets_are_stripped() {
        let hit = Hit {
            id: "1".to_owned(),
            source: json!({ "@timestamp": "2024-05-01T10:00:00Z" }),
            fields: json!({ "@timestamp": ["2024-05-01T10:00:00.000Z", "x"] }),
            ..Hit::default()
        };
        assert_eq!(
            document_timestamp(&hit).unwrap(),
            "2024-05-01T10:00:00.000Z, x"
        );

        let source_only = Hit::from_source("2", json!({ "@timestamp": "t-src" }), vec![]);
        assert_eq!(document_timestamp(&source_only).unwrap(), "t-src");
    }

    #[test]
    fn evaluate_page_returns_last_timestamp() {
        let engine = RuleEngine::new(vec![make_rule("errors", 1, "level", "ERROR", false)]);
        let mut counts = engine.new_count();
        let docs = vec![doc("ERROR", "a", "t1"), doc("INFO", "b", "t2")];
        let last = engine.evaluate_page(&docs, &mut counts).unwrap();
        assert_eq!(last.as_deref(), Some("t2"));

        let empty: Vec<Value> = Vec::new();
        assert_eq!(engine.evaluate_page(&empty, &mut counts).unwrap(), None);
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn pattern_error_aborts_document() {
        let def = RuleDefinition {
            pattern: vec![PatternDefinition {
                field: "level".to_owned(),
                regex: "[".to_owned(),
            }],
            ..Default::default()
        };
        let engine = RuleEngine::new(vec![Rule::compile("bad", &def).unwrap()]);
        let mut counts = engine.new_count();
        let err = engine
            .evaluate_document(&doc("ERROR", "a", "t"), &mut counts)
            .unwrap_err();
        assert!(matches!(err, CheckError::Pattern { .. }));
    }

    #[test]
    fn evaluation_is_idempotent() {
        let engine = RuleEngine::new(vec![make_rule("errors", 1, "level", "ERROR", false)]);
        let document = doc("ERROR", "boom", "t");

        let mut first = engine.new_count();
        let a = engine.evaluate_document(&document, &mut first).unwrap();
        let mut second = engine.new_count();
        let b = engine.evaluate_document(&document, &mut second).unwrap();

        assert_eq!(a, b);
        assert_eq!(first, second);
    }
}
