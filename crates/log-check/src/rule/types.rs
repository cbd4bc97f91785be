//! 룰 데이터 타입
//!
//! 액션 파일(YAML)에서 역직렬화되는 [`RuleDefinition`]과, 로딩 시 검증 및
//! 컴파일을 거친 [`Rule`]을 정의합니다.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::range::ThresholdRange;
use crate::error::CheckError;

/// 룰 이름 최대 길이
const MAX_RULE_NAME_LEN: usize = 256;

/// 패턴 정의 -- (필드 경로, 정규식) 쌍
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDefinition {
    /// 점(`.`)으로 구분된 필드 경로
    pub field: String,
    /// 정규식
    pub regex: String,
}

/// 룰 정의 -- 액션 파일의 `rules` 맵 값 하나에 대응합니다.
///
/// # YAML 스키마
/// ```yaml
/// errors:
///   description: auth failures
///   order: 1
///   stop_on_match: true
///   use_and: true
///   pattern:
///     - field: level
///       regex: '^ERROR$'
///   exclude:
///     - field: message
///       regex: healthcheck
///   warning: '>=5'
///   critical: '>=20'
///   metric_name: auth_errors
///   output_fields: [message]
///   output_lines: 5
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleDefinition {
    /// 룰 설명
    pub description: String,
    /// 평가 순서 (오름차순, 같으면 이름순)
    pub order: i64,
    /// perfdata 라벨 (비어 있으면 룰 이름)
    pub metric_name: String,
    /// 포함 패턴
    pub pattern: Vec<PatternDefinition>,
    /// 제외 패턴
    pub exclude: Vec<PatternDefinition>,
    /// true면 AND, false면 OR 결합
    pub use_and: bool,
    /// 매칭 시 이후 룰 평가 중단
    pub stop_on_match: bool,
    /// WARNING 범위
    pub warning: String,
    /// CRITICAL 범위
    pub critical: String,
    /// 매칭 시 발췌할 필드
    pub output_fields: Vec<String>,
    /// 발췌 줄 수 상한
    pub output_lines: usize,
}

/// 패턴 결합 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineMode {
    /// 모든 패턴이 매칭되어야 함
    And,
    /// 하나라도 매칭되면 됨 (첫 매칭에서 중단)
    Or,
}

impl CombineMode {
    /// `use_and` 플래그로부터 결합 방식을 결정합니다.
    pub fn from_use_and(use_and: bool) -> Self {
        if use_and { Self::And } else { Self::Or }
    }
}

/// 컴파일된 패턴
///
/// 컴파일 실패도 보관해 두었다가, 해당 패턴이 실제로 평가될 때 에러로 보고합니다.
#[derive(Debug, Clone)]
pub struct Pattern {
    field: String,
    source: String,
    regex: Result<Regex, String>,
}

impl Pattern {
    /// 정의로부터 패턴을 컴파일합니다.
    pub fn compile(definition: &PatternDefinition) -> Self {
        Self {
            field: definition.field.clone(),
            source: definition.regex.clone(),
            regex: Regex::new(&definition.regex).map_err(|e| e.to_string()),
        }
    }

    /// 검사 대상 필드 경로
    pub fn field(&self) -> &str {
        &self.field
    }

    /// 원본 정규식
    pub fn source(&self) -> &str {
        &self.source
    }

    /// 정규식이 정상적으로 컴파일되었는지 여부
    pub fn is_valid(&self) -> bool {
        self.regex.is_ok()
    }

    /// 값에 대해 정규식을 평가합니다.
    pub fn is_match(&self, value: &str) -> Result<bool, CheckError> {
        match &self.regex {
            Ok(regex) => Ok(regex.is_match(value)),
            Err(reason) => Err(CheckError::Pattern {
                field: self.field.clone(),
                regex: self.source.clone(),
                reason: reason.clone(),
            }),
        }
    }
}

/// 컴파일된 룰
#[derive(Debug, Clone)]
pub struct Rule {
    /// 룰 이름 (액션 내 유일)
    pub name: String,
    /// 룰 설명
    pub description: String,
    /// 평가 순서
    pub order: i64,
    /// 매칭 시 이후 룰 평가 중단
    pub stop_on_match: bool,
    /// 패턴 결합 방식 (포함/제외 공통)
    pub mode: CombineMode,
    /// 포함 패턴
    pub patterns: Vec<Pattern>,
    /// 제외 패턴
    pub excludes: Vec<Pattern>,
    /// WARNING 범위
    pub warning: ThresholdRange,
    /// CRITICAL 범위
    pub critical: ThresholdRange,
    /// perfdata 라벨 재정의
    pub metric_name: String,
    /// 발췌할 필드
    pub output_fields: Vec<String>,
    /// 발췌 줄 수 상한
    pub output_lines: usize,
}

impl Rule {
    /// 정의를 검증하고 컴파일합니다.
    ///
    /// 범위 문자열이 잘못되면 로딩 전체가 실패해야 하므로 에러를 반환합니다.
    /// 정규식 컴파일 실패는 여기서 실패시키지 않습니다.
    pub fn compile(name: &str, definition: &RuleDefinition) -> Result<Self, CheckError> {
        if name.is_empty() {
            return Err(CheckError::RuleValidation {
                rule: "(empty)".to_owned(),
                reason: "rule name must not be empty".to_owned(),
            });
        }

        if name.len() > MAX_RULE_NAME_LEN {
            return Err(CheckError::RuleValidation {
                rule: name.to_owned(),
                reason: format!("rule name must not exceed {MAX_RULE_NAME_LEN} characters"),
            });
        }

        if let Some(empty) = definition
            .pattern
            .iter()
            .chain(&definition.exclude)
            .find(|p| p.field.is_empty())
        {
            return Err(CheckError::RuleValidation {
                rule: name.to_owned(),
                reason: format!("pattern '{}' has an empty field", empty.regex),
            });
        }

        let warning = parse_range(name, "warning", &definition.warning)?;
        let critical = parse_range(name, "critical", &definition.critical)?;

        let rule = Self {
            name: name.to_owned(),
            description: definition.description.clone(),
            order: definition.order,
            stop_on_match: definition.stop_on_match,
            mode: CombineMode::from_use_and(definition.use_and),
            patterns: definition.pattern.iter().map(Pattern::compile).collect(),
            excludes: definition.exclude.iter().map(Pattern::compile).collect(),
            warning,
            critical,
            metric_name: definition.metric_name.clone(),
            output_fields: definition.output_fields.clone(),
            output_lines: definition.output_lines,
        };

        for pattern in rule.patterns.iter().chain(&rule.excludes) {
            if !pattern.is_valid() {
                tracing::warn!(
                    rule = %rule.name,
                    field = %pattern.field(),
                    regex = %pattern.source(),
                    "rule contains an invalid regex, matching documents will fail"
                );
            }
        }

        Ok(rule)
    }

    /// perfdata 라벨: `metric_name`이 있으면 그것, 없으면 룰 이름
    pub fn metric_label(&self) -> &str {
        if self.metric_name.is_empty() {
            &self.name
        } else {
            &self.metric_name
        }
    }
}

fn parse_range(rule: &str, kind: &'static str, range: &str) -> Result<ThresholdRange, CheckError> {
    ThresholdRange::parse(range).map_err(|e| CheckError::InvalidRange {
        rule: rule.to_owned(),
        kind,
        range: range.to_owned(),
        reason: e.to_string(),
    })
}
