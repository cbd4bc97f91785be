//! logwarden-search — 문서 저장소 클라이언트
//!
//! 검사 엔진이 사용하는 point-in-time 검색 호출을 [`DocumentStore`] trait으로
//! 추상화하고, Elasticsearch HTTP 구현을 제공합니다.
//!
//! # 모듈
//! - [`client`]: `DocumentStore` trait, `ElasticsearchClient`
//! - [`error`]: 통신 에러 (`SearchError`)
//! - [`types`]: 검색 응답과 히트 (`SearchResponse`, `Hit`)
//! - `mock`: 스크립트된 페이지를 반환하는 테스트용 저장소 (`mock` feature)

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod types;

// --- 주요 타입 re-export ---

pub use client::{DocumentStore, ElasticsearchClient};
pub use error::SearchError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockDocumentStore;
pub use types::{Hit, SearchResponse};
