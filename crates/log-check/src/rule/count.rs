//! 룰별 집계 -- 실행 한 번 동안의 매칭 횟수와 발췌 줄
//!
//! [`RuleCount`]는 액션 실행마다 새로 만들어지며 저장되지 않습니다.

use std::collections::HashMap;

/// 스캔한 전체 문서 수 키
pub const TOTAL_KEY: &str = "_total";

/// 어떤 룰에도 매칭되지 않은 문서 수 키
pub const NO_MATCH_KEY: &str = "_nomatch";

/// 룰 하나의 집계
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleCountEntry {
    /// 매칭 횟수
    pub count: u64,
    /// 발췌 줄 (스캔 순서, 상한 적용)
    pub lines: Vec<String>,
}

/// 실행 한 번의 룰별 집계
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleCount {
    entries: HashMap<String, RuleCountEntry>,
}

impl RuleCount {
    /// 룰 이름과 예약 키를 0으로 초기화한 집계를 만듭니다.
    pub fn new<'a>(rule_names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut entries: HashMap<String, RuleCountEntry> = rule_names
            .into_iter()
            .map(|name| (name.to_owned(), RuleCountEntry::default()))
            .collect();
        entries.insert(TOTAL_KEY.to_owned(), RuleCountEntry::default());
        entries.insert(NO_MATCH_KEY.to_owned(), RuleCountEntry::default());
        Self { entries }
    }

    /// 키의 카운트를 1 증가시킵니다.
    pub fn increment(&mut self, key: &str) {
        self.entries.entry(key.to_owned()).or_default().count += 1;
    }

    /// 룰 매칭을 기록합니다. 발췌 줄은 `cap`개까지만 보관합니다.
    pub fn record(&mut self, rule: &str, lines: Vec<String>, cap: usize) {
        let entry = self.entries.entry(rule.to_owned()).or_default();
        entry.count += 1;
        for line in lines {
            if entry.lines.len() >= cap {
                break;
            }
            entry.lines.push(line);
        }
    }

    /// 키의 카운트 (없으면 0)
    pub fn count(&self, key: &str) -> u64 {
        self.entries.get(key).map_or(0, |e| e.count)
    }

    /// 키의 집계
    pub fn get(&self, key: &str) -> Option<&RuleCountEntry> {
        self.entries.get(key)
    }

    /// 스캔한 전체 문서 수
    pub fn total(&self) -> u64 {
        self.count(TOTAL_KEY)
    }

    /// 매칭되지 않은 문서 수
    pub fn not_matched(&self) -> u64 {
        self.count(NO_MATCH_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_reserved_keys() {
        let counts = RuleCount::new(["errors", "warnings"]);
        assert_eq!(counts.total(), 0);
        assert_eq!(counts.not_matched(), 0);
        assert_eq!(counts.get("errors"), Some(&RuleCountEntry::default()));
        assert!(counts.get("unknown").is_none());
        assert_eq!(counts.count("unknown"), 0);
    }

    #[test]
    fn record_caps_lines() {
        let mut counts = RuleCount::new(["errors"]);
        counts.record("errors", vec!["a".to_owned(), "b".to_owned()], 3);
        counts.record("errors", vec!["c".to_owned(), "d".to_owned()], 3);
        counts.record("errors", vec!["e".to_owned()], 3);

        let entry = counts.get("errors").unwrap();
        assert_eq!(entry.count, 3);
        assert_eq!(entry.lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn zero_cap_keeps_no_lines() {
        let mut counts = RuleCount::new(["errors"]);
        counts.record("errors", vec!["a".to_owned()], 0);
        assert_eq!(counts.count("errors"), 1);
        assert!(counts.get("errors").unwrap().lines.is_empty());
    }

    #[test]
    fn increment_reserved_keys() {
        let mut counts = RuleCount::new([]);
        counts.increment(TOTAL_KEY);
        counts.increment(TOTAL_KEY);
        counts.increment(NO_MATCH_KEY);
        assert_eq!(counts.total(), 2);
        assert_eq!(counts.not_matched(), 1);
    }
}
