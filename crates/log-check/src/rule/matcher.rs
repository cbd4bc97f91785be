//! 패턴 매칭 로직 -- 포함/제외 패턴 평가
//!
//! 한 룰의 포함 패턴과 제외 패턴을 문서 하나에 대해 평가합니다.
//! 정규식은 룰 로딩 시 컴파일되어 [`Pattern`]에 보관됩니다.

use logwarden_core::DocumentView;

use super::types::{CombineMode, Pattern, Rule};
use crate::error::CheckError;

/// 문서가 룰에 매칭되는지 평가합니다.
///
/// 포함 패턴이 매칭된 경우에만 제외 패턴을 평가하며, 제외 패턴이
/// 매칭되면 결과는 false입니다. 포함 패턴이 없는 룰은 어떤 문서에도
/// 매칭되지 않습니다.
///
/// # Errors
///
/// 평가 도중 컴파일에 실패한 정규식을 만나면 `CheckError::Pattern`을 반환합니다.
pub fn is_match<D>(doc: &D, rule: &Rule) -> Result<bool, CheckError>
where
    D: DocumentView + ?Sized,
{
    let found = evaluate_patterns(doc, &rule.patterns, rule.mode)?;
    if !found {
        return Ok(false);
    }

    let excepted = evaluate_patterns(doc, &rule.excludes, rule.mode)?;
    Ok(!excepted)
}

/// 패턴 목록을 결합 방식에 따라 평가합니다.
///
/// 필드가 없는 패턴을 만나면 그 시점의 결과로 평가를 끝냅니다.
fn evaluate_patterns<D>(doc: &D, patterns: &[Pattern], mode: CombineMode) -> Result<bool, CheckError>
where
    D: DocumentView + ?Sized,
{
    let mut found = false;

    for (idx, pattern) in patterns.iter().enumerate() {
        let Some(value) = doc.get_string(pattern.field()) else {
            break;
        };

        let matched = pattern.is_match(&value)?;
        match mode {
            CombineMode::And => {
                found = if idx == 0 { matched } else { found && matched };
            }
            CombineMode::Or => {
                if matched {
                    found = true;
                    break;
                }
            }
        }
    }

    Ok(found)
}
