//! 문서 뷰 — 점(`.`)으로 구분된 경로로 문서 필드에 접근하는 trait
//!
//! 룰 엔진은 문서 저장소의 실제 응답 형태를 알지 못하고 [`DocumentView`]만
//! 사용합니다. 저장소 클라이언트는 자신의 히트 타입에 대해 이 trait을 구현합니다.
//!
//! 경로 해석은 가장 긴 리터럴 키를 먼저 시도합니다. 따라서 평탄화된 키
//! (`"host.name": [...]`)와 중첩 객체(`{"host": {"name": ...}}`)를 모두 찾습니다.

use serde_json::{Map, Value};

/// 점 경로로 필드를 조회할 수 있는 문서
pub trait DocumentView {
    /// 경로에 해당하는 원시 JSON 값을 반환합니다.
    fn get_raw(&self, path: &str) -> Option<&Value>;

    /// 경로에 해당하는 값을 문자열로 렌더링해 반환합니다.
    fn get_string(&self, path: &str) -> Option<String> {
        self.get_raw(path).map(render_value)
    }

    /// 저장소가 렌더링한 표현(예: `fields` API 결과)을 반환합니다.
    ///
    /// 렌더링된 표현이 없는 문서는 `None`을 반환합니다.
    fn get_rendered(&self, _path: &str) -> Option<String> {
        None
    }

    /// 로그/에러 메시지에 표시할 문서 식별자 (없으면 빈 문자열)
    fn document_id(&self) -> &str {
        ""
    }
}

impl DocumentView for Map<String, Value> {
    fn get_raw(&self, path: &str) -> Option<&Value> {
        lookup_path(self, path)
    }
}

impl DocumentView for Value {
    fn get_raw(&self, path: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => lookup_path(map, path),
            _ => None,
        }
    }
}

/// 객체 안에서 점 경로를 해석합니다.
pub fn lookup_path<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    if let Some(value) = map.get(path) {
        return Some(value);
    }
    for (idx, _) in path.rmatch_indices('.') {
        let (head, rest) = (&path[..idx], &path[idx + 1..]);
        if let Some(Value::Object(inner)) = map.get(head)
            && let Some(found) = lookup_path(inner, rest)
        {
            return Some(found);
        }
    }
    None
}

/// JSON 값을 매칭/출력용 문자열로 변환합니다.
///
/// - 문자열은 그대로, 숫자와 불리언은 표시 형식으로
/// - `null`은 빈 문자열
/// - 원소가 하나인 배열은 그 원소, 그 외 배열은 `[a, b]`
/// - 객체는 compact JSON
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) if items.len() == 1 => render_value(&items[0]),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(render_value).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Object(_) => value.to_string(),
    }
}
