//! 테스트용 Mock 문서 저장소
//!
//! 미리 준비한 페이지를 순서대로 반환하여 Elasticsearch 없이도 커서와
//! 액션 실행을 테스트할 수 있습니다. 받은 요청은 기록되어 검증에 사용합니다.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::client::DocumentStore;
use crate::error::SearchError;
use crate::types::{Hit, SearchResponse};

/// 스크립트된 응답을 반환하는 mock 저장소
#[derive(Default)]
pub struct MockDocumentStore {
    /// search 호출마다 하나씩 꺼내 반환할 응답 (`Err`는 상태 코드 에러로 변환)
    pages: Mutex<VecDeque<Result<SearchResponse, String>>>,
    /// PIT 열기 실패 시뮬레이션
    fail_open: bool,
    /// PIT 닫기 실패 시뮬레이션
    fail_close: bool,
    /// 기록: 열린 인덱스
    opened: Mutex<Vec<(String, String)>>,
    /// 기록: search 요청 본문
    queries: Mutex<Vec<(String, String)>>,
    /// 기록: 닫힌 PIT ID
    closed: Mutex<Vec<String>>,
}

impl MockDocumentStore {
    /// 빈 mock 저장소 (모든 검색이 빈 페이지를 반환)
    pub fn new() -> Self {
        Self::default()
    }

    /// 히트 목록 하나를 다음 페이지로 추가합니다.
    pub fn with_page(self, hits: Vec<Hit>) -> Self {
        self.push(Ok(SearchResponse::from_hits(hits)));
        self
    }

    /// 완성된 응답을 다음 페이지로 추가합니다.
    pub fn with_response(self, response: SearchResponse) -> Self {
        self.push(Ok(response));
        self
    }

    /// 다음 search 호출이 실패하도록 합니다.
    pub fn with_failing_page(self, reason: &str) -> Self {
        self.push(Err(reason.to_owned()));
        self
    }

    /// PIT 열기가 실패하도록 합니다.
    pub fn with_failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// PIT 닫기가 실패하도록 합니다.
    pub fn with_failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// 기록된 `(index, keep_alive)` 목록
    pub fn opened(&self) -> Vec<(String, String)> {
        lock(&self.opened).clone()
    }

    /// 기록된 `(index, body)` 목록
    pub fn queries(&self) -> Vec<(String, String)> {
        lock(&self.queries).clone()
    }

    /// 닫힌 PIT ID 목록
    pub fn closed(&self) -> Vec<String> {
        lock(&self.closed).clone()
    }

    fn push(&self, page: Result<SearchResponse, String>) {
        lock(&self.pages).push_back(page);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl DocumentStore for MockDocumentStore {
    async fn open_point_in_time(
        &self,
        index: &str,
        keep_alive: &str,
    ) -> Result<String, SearchError> {
        lock(&self.opened).push((index.to_owned(), keep_alive.to_owned()));
        if self.fail_open {
            return Err(SearchError::Status {
                url: format!("mock://{index}/_pit"),
                status: 404,
                reason: format!("no such index [{index}]"),
            });
        }
        Ok(format!("pit-{index}"))
    }

    async fn search(&self, index: &str, query: &str) -> Result<SearchResponse, SearchError> {
        lock(&self.queries).push((index.to_owned(), query.to_owned()));
        let next = lock(&self.pages).pop_front();
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(reason)) => Err(SearchError::Status {
                url: "mock:///_search".to_owned(),
                status: 500,
                reason,
            }),
            None => Ok(SearchResponse::default()),
        }
    }

    async fn close_point_in_time(&self, pit_id: &str) -> Result<(), SearchError> {
        lock(&self.closed).push(pit_id.to_owned());
        if self.fail_close {
            return Err(SearchError::Request {
                url: "mock:///_pit".to_owned(),
                reason: "connection reset".to_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn returns_pages_in_order_then_empty() {
        let store = MockDocumentStore::new()
            .with_page(vec![Hit::from_fields("1", json!({}), vec![json!(1)])])
            .with_failing_page("shard failure");

        let first = store.search("", "{}").await.unwrap();
        assert_eq!(first.hits().len(), 1);
        let second = store.search("", "{}").await.unwrap_err();
        assert!(second.to_string().contains("shard failure"));
        let third = store.search("", "{}").await.unwrap();
        assert!(third.hits().is_empty());
        assert_eq!(store.queries().len(), 3);
    }

    #[tokio::test]
    async fn records_open_and_close() {
        let store = MockDocumentStore::new().with_failing_close();
        let pit = store.open_point_in_time("logs-*", "120s").await.unwrap();
        assert_eq!(pit, "pit-logs-*");
        assert!(store.close_point_in_time(&pit).await.is_err());
        assert_eq!(store.opened(), vec![("logs-*".to_owned(), "120s".to_owned())]);
        assert_eq!(store.closed(), vec![pit]);
    }

    #[tokio::test]
    async fn failing_open_reports_status() {
        let store = MockDocumentStore::new().with_failing_open();
        let err = store.open_point_in_time("missing", "60s").await.unwrap_err();
        assert!(matches!(err, SearchError::Status { status: 404, .. }));
    }
}
