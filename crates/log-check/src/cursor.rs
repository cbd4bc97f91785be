//! 페이지 커서 -- point-in-time 스냅샷과 search_after 기반 페이지 순회
//!
//! 계속 추가되는 인덱스를 offset으로 순회하면 페이지 사이에 문서가 밀리거나
//! 중복됩니다. 커서는 저장소의 스냅샷(PIT)에 묶여 있고, 직전 페이지의 마지막
//! 문서 정렬 키에서 다음 페이지를 시작합니다.
//!
//! # 상태 전이
//!
//! ```text
//! Init ──open──▶ Active ──next──▶ Active
//!                  │                │
//!                  ├── 마지막 페이지 ──▶ Exhausted ─┐
//!                  ├── 페이지 상한 ──▶ LimitReached ─┼──close──▶ Closed
//!                  └── 실행 에러 ──▶ Failed ────────┘
//! ```
//!
//! 종료 조건(마지막 페이지, 페이지 상한)은 호출자가 판단합니다.

use std::fmt;

use serde_json::{Value, json};

use logwarden_search::{DocumentStore, Hit, SearchResponse};

use crate::error::CheckError;

/// 한 페이지의 문서 수
pub const PAGE_SIZE: usize = 1000;

/// 쿼리 템플릿의 페이지 파라미터 자리
pub const PAGINATION_PLACEHOLDER: &str = "_PAGINATION_";

/// 쿼리 템플릿의 체크포인트 자리
pub const TIMESTAMP_PLACEHOLDER: &str = "_TIMESTAMP_";

/// 커서 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// 열기 전
    Init,
    /// 다음 페이지가 있을 수 있음
    Active,
    /// 마지막 페이지까지 읽음
    Exhausted,
    /// 페이지 상한에 도달
    LimitReached,
    /// 스냅샷 해제됨
    Closed,
    /// 실행 에러
    Failed,
}

impl fmt::Display for CursorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Active => "active",
            Self::Exhausted => "exhausted",
            Self::LimitReached => "limit reached",
            Self::Closed => "closed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// PIT 기반 페이지 커서
pub struct PaginatedSearch<'a, S: DocumentStore> {
    store: &'a S,
    index: String,
    query: String,
    keep_alive: String,
    pit_id: Option<String>,
    search_after: Vec<Value>,
    page: SearchResponse,
    pages_fetched: u32,
    state: CursorState,
}

impl<'a, S: DocumentStore> PaginatedSearch<'a, S> {
    /// 스냅샷을 열고 첫 페이지를 가져옵니다.
    ///
    /// `query`는 체크포인트가 이미 대입되고 페이지 파라미터 자리가 남아 있는
    /// 템플릿입니다. 첫 검색이 실패하면 열었던 스냅샷을 해제한 뒤 에러를
    /// 반환합니다.
    ///
    /// # Errors
    ///
    /// 스냅샷 열기 또는 첫 검색이 실패하면 `CheckError::Search`를 반환합니다.
    pub async fn open(
        store: &'a S,
        index: &str,
        query: &str,
        keep_alive: &str,
    ) -> Result<Self, CheckError> {
        let pit_id = store.open_point_in_time(index, keep_alive).await?;
        tracing::debug!(index, keep_alive, "opened point in time");

        let mut cursor = Self {
            store,
            index: index.to_owned(),
            query: query.to_owned(),
            keep_alive: keep_alive.to_owned(),
            pit_id: Some(pit_id),
            search_after: Vec::new(),
            page: SearchResponse::default(),
            pages_fetched: 0,
            state: CursorState::Init,
        };

        if let Err(e) = cursor.fetch().await {
            cursor.close().await;
            return Err(e);
        }
        Ok(cursor)
    }

    /// 다음 페이지를 가져옵니다.
    ///
    /// # Errors
    /// - 마지막 페이지 이후 호출 시 `CheckError::CursorExhausted`
    /// - 닫혔거나 실패했거나 페이지 상한에 도달한 커서에서 호출 시
    ///   `CheckError::CursorUnavailable`
    /// - 검색 실패 시 `CheckError::Search` (커서는 `Failed`가 됨)
    pub async fn next(&mut self) -> Result<&[Hit], CheckError> {
        match self.state {
            CursorState::Active => {}
            CursorState::Exhausted => return Err(CheckError::CursorExhausted),
            state => {
                return Err(CheckError::CursorUnavailable {
                    state: state.to_string(),
                });
            }
        }

        if self.search_after.is_empty() {
            return Err(CheckError::CursorExhausted);
        }

        self.fetch().await?;
        Ok(self.page.hits())
    }

    /// 현재 페이지의 문서
    pub fn page(&self) -> &[Hit] {
        self.page.hits()
    }

    /// 마지막으로 가져온 페이지가 가득 차 있어 다음 페이지가 있을 수 있는지 여부
    pub fn has_more(&self) -> bool {
        self.state == CursorState::Active
    }

    /// 페이지 상한 도달을 기록합니다.
    pub fn mark_limit_reached(&mut self) {
        if self.state == CursorState::Active {
            tracing::debug!(
                index = %self.index,
                pages = self.pages_fetched,
                "page limit reached"
            );
            self.state = CursorState::LimitReached;
        }
    }

    /// 지금까지 가져온 페이지 수
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// 현재 상태
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// 현재 스냅샷 ID
    pub fn pit_id(&self) -> Option<&str> {
        self.pit_id.as_deref()
    }

    /// 스냅샷을 해제합니다.
    ///
    /// 실패는 경고 로그만 남기며, 여러 번 호출해도 안전합니다.
    pub async fn close(&mut self) {
        if let Some(pit_id) = self.pit_id.take() {
            match self.store.close_point_in_time(&pit_id).await {
                Ok(()) => tracing::debug!(index = %self.index, "closed point in time"),
                Err(e) => tracing::warn!(
                    index = %self.index,
                    error = %e,
                    "failed to close point in time"
                ),
            }
        }
        self.state = CursorState::Closed;
    }

    async fn fetch(&mut self) -> Result<(), CheckError> {
        let body = self
            .query
            .replace(PAGINATION_PLACEHOLDER, &self.pagination());

        let response = match self.store.search("", &body).await {
            Ok(response) => response,
            Err(e) => {
                self.state = CursorState::Failed;
                return Err(e.into());
            }
        };

        if let Some(pit_id) = &response.pit_id {
            self.pit_id = Some(pit_id.clone());
        }

        self.search_after = response
            .hits()
            .last()
            .map(|hit| hit.sort.clone())
            .unwrap_or_default();
        self.pages_fetched += 1;
        self.state = if response.hits().len() < PAGE_SIZE {
            CursorState::Exhausted
        } else {
            CursorState::Active
        };

        tracing::debug!(
            index = %self.index,
            pages = self.pages_fetched,
            hits = response.hits().len(),
            took_ms = response.took,
            "fetched page"
        );

        self.page = response;
        Ok(())
    }

    /// 페이지 파라미터 조각 (바깥 중괄호 없는 JSON 객체 멤버)
    fn pagination(&self) -> String {
        let mut params = json!({
            "pit": {
                "id": self.pit_id.as_deref().unwrap_or_default(),
                "keep_alive": self.keep_alive,
            },
            "size": PAGE_SIZE,
        });
        if !self.search_after.is_empty() {
            params["search_after"] = Value::Array(self.search_after.clone());
        }

        let text = params.to_string();
        text.strip_prefix('{')
            .and_then(|t| t.strip_suffix('}'))
            .unwrap_or(&text)
            .to_owned()
    }
}
