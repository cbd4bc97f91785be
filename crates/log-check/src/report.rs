//! 검사 보고서 -- 결과와 perfdata 레코드
//!
//! 검사 엔진은 결과를 텍스트로 렌더링하지 않고 [`Report`]에 쌓기만 합니다.
//! 모니터링 플러그인 형식 출력과 종료 코드는 CLI가 결정합니다.

use serde::Serialize;

use logwarden_core::CheckState;

/// 결과 하나
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    /// 상태
    pub state: CheckState,
    /// 요약 메시지
    pub message: String,
    /// 상세 텍스트 (여러 줄 가능)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_text: Option<String>,
}

/// 성능 데이터 하나
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerfDatum {
    /// 라벨
    pub label: String,
    /// 값
    pub value: f64,
    /// 단위 (`c` = counter)
    pub uom: String,
    /// WARNING 범위
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warn: Option<String>,
    /// CRITICAL 범위
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crit: Option<String>,
}

impl PerfDatum {
    /// 임계값 없는 카운터
    pub fn counter(label: impl Into<String>, value: u64) -> Self {
        Self {
            label: label.into(),
            value: value as f64,
            uom: "c".to_owned(),
            warn: None,
            crit: None,
        }
    }

    /// 임계값을 붙입니다.
    pub fn with_thresholds(mut self, warn: Option<String>, crit: Option<String>) -> Self {
        self.warn = warn;
        self.crit = crit;
        self
    }
}

/// 검사 보고서
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    results: Vec<CheckResult>,
    perf: Vec<PerfDatum>,
}

impl Report {
    /// 빈 보고서
    pub fn new() -> Self {
        Self::default()
    }

    /// 결과를 추가합니다.
    pub fn add_result(
        &mut self,
        state: CheckState,
        message: impl Into<String>,
        long_text: Option<String>,
    ) {
        self.results.push(CheckResult {
            state,
            message: message.into(),
            long_text,
        });
    }

    /// perfdata를 추가합니다.
    pub fn add_perf(&mut self, datum: PerfDatum) {
        self.perf.push(datum);
    }

    /// 결과 목록 (추가 순)
    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    /// perfdata 목록 (추가 순)
    pub fn perf(&self) -> &[PerfDatum] {
        &self.perf
    }

    /// 가장 나쁜 상태. 결과가 없으면 OK입니다.
    pub fn worst_state(&self) -> CheckState {
        self.results
            .iter()
            .map(|r| r.state)
            .max()
            .unwrap_or(CheckState::Ok)
    }

    /// 특정 라벨의 perfdata를 찾습니다.
    pub fn perf_value(&self, label: &str) -> Option<f64> {
        self.perf.iter().find(|p| p.label == label).map(|p| p.value)
    }

    /// 다른 보고서의 내용을 뒤에 붙입니다.
    pub fn merge(&mut self, other: Report) {
        self.results.extend(other.results);
        self.perf.extend(other.perf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_ok() {
        assert_eq!(Report::new().worst_state(), CheckState::Ok);
    }

    #[test]
    fn worst_state_uses_ordinal() {
        let mut report = Report::new();
        report.add_result(CheckState::Warning, "a/warn", None);
        report.add_result(CheckState::Unknown, "b: failed", None);
        report.add_result(CheckState::Critical, "a/crit", None);
        assert_eq!(report.worst_state(), CheckState::Unknown);
    }

    #[test]
    fn perf_lookup_and_merge() {
        let mut report = Report::new();
        report.add_perf(
            PerfDatum::counter("errors", 6).with_thresholds(Some("@5:".to_owned()), None),
        );

        let mut other = Report::new();
        other.add_perf(PerfDatum::counter("auth_lines", 1000));
        other.add_result(CheckState::Ok, "auth/errors", None);
        report.merge(other);

        assert_eq!(report.perf_value("errors"), Some(6.0));
        assert_eq!(report.perf_value("auth_lines"), Some(1000.0));
        assert_eq!(report.perf()[0].warn.as_deref(), Some("@5:"));
        assert_eq!(report.results().len(), 1);
    }

    #[test]
    fn serializes_without_empty_options() {
        let mut report = Report::new();
        report.add_result(CheckState::Warning, "auth/errors", None);
        report.add_perf(PerfDatum::counter("errors", 6));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["results"][0]["state"], 1);
        assert!(json["results"][0].get("long_text").is_none());
        assert!(json["perf"][0].get("warn").is_none());
    }
}
