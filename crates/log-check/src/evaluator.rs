//! 임계값 평가 및 보고
//!
//! 액션 실행의 집계를 룰별 범위와 비교하여 결과와 perfdata를 만들고,
//! 경보가 발생하면 히스토리 항목을 추가합니다. 이전 실행에서 남은 미처리
//! 히스토리 항목도 별도의 결과로 보고합니다.

use chrono::{DateTime, Utc};

use logwarden_core::CheckState;
use logwarden_core::metrics as m;

use crate::action::Action;
use crate::report::{PerfDatum, Report};
use crate::rule::{Rule, RuleCount};
use crate::status::{StatusData, StatusHistory};

/// 발췌 줄 들여쓰기
const EXCERPT_INDENT: &str = "   ";

/// 룰별 임계값을 평가하여 보고서에 결과와 perfdata를 추가합니다.
///
/// CRITICAL 범위를 먼저 검사합니다. 히스토리가 활성화된 액션에서
/// WARNING/CRITICAL이 나오면 히스토리 항목을 추가합니다. 마지막에 전체
/// 문서 수와 미매칭 문서 수 perfdata를 추가합니다.
///
/// 추가한 히스토리 항목 수를 반환합니다.
pub fn evaluate_thresholds(
    action: &Action,
    counts: &RuleCount,
    status: &mut StatusData,
    now: DateTime<Utc>,
    report: &mut Report,
) -> usize {
    let mut recorded = 0;

    for rule in action.engine.rules() {
        let count = counts.count(&rule.name);
        let lines = excerpt_lines(counts, rule);
        let state = classify(rule, count);

        let mut long_text = match state {
            CheckState::Critical => exceeds(action, rule, count, rule.critical.as_str()),
            CheckState::Warning => exceeds(action, rule, count, rule.warning.as_str()),
            _ => format!(
                "Value {count} for rule {} in search {} is within thresholds {},{}",
                rule.name, action.name, rule.warning, rule.critical
            ),
        };

        if state != CheckState::Ok {
            tracing::debug!(
                action = %action.name,
                rule = %rule.name,
                value = count,
                state = %state,
                "threshold reached"
            );
            push_excerpt(&mut long_text, &lines);

            if action.history_enabled() {
                let uuid = status.add_history_entry(now, state, &rule.name, count, lines);
                tracing::info!(action = %action.name, rule = %rule.name, uuid = %uuid, "recorded history entry");
                metrics::counter!(
                    m::CHECK_HISTORY_RECORDED_TOTAL,
                    m::LABEL_ACTION => action.name.clone(),
                    m::LABEL_STATE => state.as_str()
                )
                .increment(1);
                recorded += 1;
            }
        }

        report.add_result(
            state,
            format!("{}/{}", action.name, rule.name),
            Some(long_text),
        );
        report.add_perf(
            PerfDatum::counter(rule.metric_label(), count)
                .with_thresholds(rule.warning.perf_threshold(), rule.critical.perf_threshold()),
        );
    }

    report.add_perf(PerfDatum::counter(
        format!("{}_lines", action.name),
        counts.total(),
    ));
    report.add_perf(PerfDatum::counter(
        format!("{}_not_matched", action.name),
        counts.not_matched(),
    ));

    recorded
}

/// 이전 실행에서 남은 미처리 히스토리 항목을 보고하고 그 수를 반환합니다.
pub fn report_historic(action: &Action, status: &StatusData, report: &mut Report) -> u64 {
    let mut historic = 0;

    for entry in status.unhandled_historic() {
        report.add_result(
            entry.state,
            format!("{}/{} (historic)", action.name, entry.rule),
            Some(historic_text(action, entry)),
        );
        historic += 1;
    }

    report.add_perf(PerfDatum::counter(
        format!("{}_historic", action.name),
        historic,
    ));
    historic
}

fn classify(rule: &Rule, count: u64) -> CheckState {
    if rule.critical.alerts_on_count(count) {
        CheckState::Critical
    } else if rule.warning.alerts_on_count(count) {
        CheckState::Warning
    } else {
        CheckState::Ok
    }
}

fn exceeds(action: &Action, rule: &Rule, count: u64, range: &str) -> String {
    format!(
        "Value {count} for rule {} in search {} exceeds threshold {range}",
        rule.name, action.name
    )
}

fn excerpt_lines(counts: &RuleCount, rule: &Rule) -> Vec<String> {
    counts
        .get(&rule.name)
        .map(|entry| entry.lines.iter().take(rule.output_lines).cloned().collect())
        .unwrap_or_default()
}

fn historic_text(action: &Action, entry: &StatusHistory) -> String {
    let mut text = format!(
        "Reporting unhandled historic event {} for rule {} for action {} which occurred on {}",
        entry.uuid, entry.rule, action.name, entry.timestamp
    );
    push_excerpt(&mut text, &entry.lines);
    text
}

fn push_excerpt(text: &mut String, lines: &[String]) {
    for line in lines {
        text.push('\n');
        text.push_str(EXCERPT_INDENT);
        text.push_str(line);
    }
}
