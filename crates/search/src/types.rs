//! 검색 응답 타입
//!
//! Elasticsearch `_search` 응답 중 검사에 필요한 부분만 역직렬화합니다.
//! 알 수 없는 필드는 무시합니다.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use logwarden_core::document::{DocumentView, render_value};

/// `_search` 응답
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// 갱신된 point-in-time ID (PIT 검색일 때만)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pit_id: Option<String>,
    /// 처리 시간 (밀리초)
    #[serde(default)]
    pub took: u64,
    /// 샤드 타임아웃 여부
    #[serde(default)]
    pub timed_out: bool,
    /// 히트 목록
    #[serde(default)]
    pub hits: HitsEnvelope,
}

impl SearchResponse {
    /// 히트 목록으로 응답을 만듭니다.
    pub fn from_hits(hits: Vec<Hit>) -> Self {
        Self {
            hits: HitsEnvelope { hits },
            ..Self::default()
        }
    }

    /// 이 페이지의 히트 목록
    pub fn hits(&self) -> &[Hit] {
        &self.hits.hits
    }
}

/// `hits` 객체
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HitsEnvelope {
    /// 문서 목록
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// 검색 결과 문서 하나
///
/// 필드 조회는 저장소가 렌더링한 `fields`를 먼저 보고, 없으면 `_source`를 봅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hit {
    /// 인덱스 이름
    #[serde(rename = "_index", default)]
    pub index: String,
    /// 문서 ID
    #[serde(rename = "_id", default)]
    pub id: String,
    /// 원본 문서 (`_source: false`이면 null)
    #[serde(rename = "_source", default)]
    pub source: Value,
    /// `fields` API 결과 (키는 평탄화된 경로, 값은 배열)
    #[serde(default)]
    pub fields: Value,
    /// 정렬 키 (search_after에 사용)
    #[serde(default)]
    pub sort: Vec<Value>,
}

impl Hit {
    /// `fields` 응답 형태의 문서를 만듭니다.
    pub fn from_fields(id: impl Into<String>, fields: Value, sort: Vec<Value>) -> Self {
        Self {
            id: id.into(),
            fields,
            sort,
            ..Self::default()
        }
    }

    /// `_source` 응답 형태의 문서를 만듭니다.
    pub fn from_source(id: impl Into<String>, source: Value, sort: Vec<Value>) -> Self {
        Self {
            id: id.into(),
            source,
            sort,
            ..Self::default()
        }
    }
}

impl DocumentView for Hit {
    fn get_raw(&self, path: &str) -> Option<&Value> {
        self.fields
            .get_raw(path)
            .or_else(|| self.source.get_raw(path))
    }

    fn get_rendered(&self, path: &str) -> Option<String> {
        self.fields.get_raw(path).map(render_value)
    }

    fn document_id(&self) -> &str {
        &self.id
    }
}

/// `POST /{index}/_pit` 응답
#[derive(Debug, Clone, Deserialize)]
pub struct PointInTime {
    /// PIT ID
    pub id: String,
}

/// 저장소 에러 응답 (`{"error": {"reason": ...}}`)
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: ErrorDetail,
}

/// 에러 상세. 일부 버전은 문자열만 반환합니다.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorDetail {
    Structured {
        #[serde(default)]
        reason: String,
        #[serde(rename = "type", default)]
        kind: String,
    },
    Plain(String),
}

impl ErrorDetail {
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Structured { reason, kind } if kind.is_empty() => reason.clone(),
            Self::Structured { reason, kind } => format!("{kind}: {reason}"),
            Self::Plain(text) => text.clone(),
        }
    }
}
