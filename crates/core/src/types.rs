//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 검사 결과 상태는 모니터링 시스템(Nagios/Icinga) 플러그인 규약의
//! 서수 값(OK=0, WARNING=1, CRITICAL=2, UNKNOWN=3)을 그대로 따릅니다.
//! 이 값은 상태 파일에 숫자로 저장되고 프로세스 종료 코드로도 사용됩니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 검사 결과 상태
///
/// `Ord` 구현은 서수 값 순서(`Ok < Warning < Critical < Unknown`)를 따르며,
/// 여러 결과 중 최악의 상태를 고를 때 사용합니다.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum CheckState {
    /// 정상
    #[default]
    Ok,
    /// 경고 임계값 초과
    Warning,
    /// 위험 임계값 초과
    Critical,
    /// 검사 자체를 수행하지 못함
    Unknown,
}

impl CheckState {
    /// 플러그인 규약상의 서수 값
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Warning => 1,
            Self::Critical => 2,
            Self::Unknown => 3,
        }
    }

    /// 프로세스 종료 코드
    pub fn exit_code(self) -> i32 {
        i32::from(self.ordinal())
    }

    /// 서수 값에서 상태를 복원합니다.
    pub fn from_ordinal(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Ok),
            1 => Some(Self::Warning),
            2 => Some(Self::Critical),
            3 => Some(Self::Unknown),
            _ => None,
        }
    }

    /// 레이블 문자열 (`OK`, `WARNING`, ...)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CheckState> for u8 {
    fn from(state: CheckState) -> Self {
        state.ordinal()
    }
}

impl TryFrom<u8> for CheckState {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_ordinal(value).ok_or_else(|| format!("invalid check state ordinal: {value}"))
    }
}
