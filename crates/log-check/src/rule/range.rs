//! 임계값 범위 -- 모니터링 플러그인 범위 표기법 파싱 및 평가
//!
//! 지원 형식 (닫힌 구간):
//!
//! | 표기 | 경보 조건 |
//! |------|-----------|
//! | `10` | `< 0` 또는 `> 10` |
//! | `10:` | `< 10` |
//! | `~:10` | `> 10` |
//! | `10:20` | `< 10` 또는 `> 20` |
//! | `@10:20` | `10 <= x <= 20` |
//! | `>=5`, `>5`, `<=5`, `<5` | 비교식 그대로 |
//! | (빈 문자열) | 경보 없음 |

use std::fmt;

/// 범위 문자열 파싱 에러
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RangeError {
    /// 숫자가 아님
    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    /// `:` 구분자가 두 개 이상
    #[error("too many ':' separators")]
    TooManySeparators,

    /// 시작이 끝보다 큼
    #[error("start {start} is greater than end {end}")]
    Inverted {
        /// 구간 시작
        start: f64,
        /// 구간 끝
        end: f64,
    },
}

/// 비교 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `>=`
    GreaterOrEqual,
    /// `>`
    Greater,
    /// `<=`
    LessOrEqual,
    /// `<`
    Less,
}

#[derive(Debug, Clone, PartialEq)]
enum RangeKind {
    Never,
    Interval { start: f64, end: f64, inside: bool },
    Compare { op: Comparison, value: f64 },
}

/// 파싱된 임계값 범위
///
/// 로딩 시 한 번 파싱되며, 원본 문자열은 메시지 출력용으로 보존합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdRange {
    source: String,
    kind: RangeKind,
}

impl ThresholdRange {
    /// 범위 문자열을 파싱합니다.
    pub fn parse(input: &str) -> Result<Self, RangeError> {
        let source = input.trim().to_owned();
        let kind = parse_kind(&source)?;
        Ok(Self { source, kind })
    }

    /// 경보하지 않는 범위
    pub fn never() -> Self {
        Self {
            source: String::new(),
            kind: RangeKind::Never,
        }
    }

    /// 값이 경보 조건에 해당하는지 검사합니다.
    pub fn alerts(&self, value: f64) -> bool {
        match self.kind {
            RangeKind::Never => false,
            RangeKind::Interval { start, end, inside } => {
                let within = start <= value && value <= end;
                within == inside
            }
            RangeKind::Compare { op, value: bound } => match op {
                Comparison::GreaterOrEqual => value >= bound,
                Comparison::Greater => value > bound,
                Comparison::LessOrEqual => value <= bound,
                Comparison::Less => value < bound,
            },
        }
    }

    /// 카운트 값에 대해 경보 여부를 검사합니다.
    pub fn alerts_on_count(&self, count: u64) -> bool {
        self.alerts(count as f64)
    }

    /// 원본 범위 문자열 (공백 제거)
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// 경보하지 않는 범위인지 여부
    pub fn is_never(&self) -> bool {
        self.kind == RangeKind::Never
    }

    /// perfdata에 붙일 표준 범위 표기
    ///
    /// 비교식은 같은 의미의 구간 표기로 변환합니다.
    pub fn perf_threshold(&self) -> Option<String> {
        match self.kind {
            RangeKind::Never => None,
            RangeKind::Interval { .. } => Some(self.source.clone()),
            RangeKind::Compare { op, value } => Some(match op {
                Comparison::GreaterOrEqual => format!("@{value}:"),
                Comparison::Greater => format!("~:{value}"),
                Comparison::LessOrEqual => format!("@~:{value}"),
                Comparison::Less => format!("{value}:"),
            }),
        }
    }
}

impl Default for ThresholdRange {
    fn default() -> Self {
        Self::never()
    }
}

impl fmt::Display for ThresholdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_kind(source: &str) -> Result<RangeKind, RangeError> {
    if source.is_empty() {
        return Ok(RangeKind::Never);
    }

    for (prefix, op) in [
        (">=", Comparison::GreaterOrEqual),
        ("<=", Comparison::LessOrEqual),
        (">", Comparison::Greater),
        ("<", Comparison::Less),
    ] {
        if let Some(rest) = source.strip_prefix(prefix) {
            return Ok(RangeKind::Compare {
                op,
                value: parse_number(rest.trim())?,
            });
        }
    }

    let (inside, body) = match source.strip_prefix('@') {
        Some(rest) => (true, rest),
        None => (false, source),
    };

    let parts: Vec<&str> = body.split(':').collect();
    let (start, end) = match parts.as_slice() {
        [end] => (0.0, parse_number(end)?),
        [start, end] => {
            let start = match *start {
                "~" => f64::NEG_INFINITY,
                "" => 0.0,
                s => parse_number(s)?,
            };
            let end = match *end {
                "" => f64::INFINITY,
                e => parse_number(e)?,
            };
            (start, end)
        }
        _ => return Err(RangeError::TooManySeparators),
    };

    if start > end {
        return Err(RangeError::Inverted { start, end });
    }

    Ok(RangeKind::Interval { start, end, inside })
}

fn parse_number(text: &str) -> Result<f64, RangeError> {
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(RangeError::InvalidNumber(text.to_owned())),
    }
}
