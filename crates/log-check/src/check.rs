//! 액션 실행기 -- 커서, 룰 엔진, 임계값 평가, 상태 저장소 연결
//!
//! [`Check`]는 로딩된 액션 세트를 들고 있으며, 액션마다 독립적으로
//! 스캔을 실행합니다. 한 액션의 실패는 UNKNOWN 결과로 보고되고 다음
//! 액션은 영향을 받지 않습니다. 히스토리 관리 명령(list/handle/rm/init)도
//! 여기서 제공합니다.
//!
//! # 실행 흐름
//!
//! ```text
//! 상태 로드 ─▶ 커서 열기 ─▶ 페이지 평가 ─▶ (다음 페이지)* ─▶ 커서 닫기
//!                                                             │
//!             상태 저장 ◀─ 히스토리 보고 ◀─ 임계값 평가 ◀─ 체크포인트 전진
//! ```

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use logwarden_core::CheckState;
use logwarden_core::metrics as m;
use logwarden_search::DocumentStore;

use crate::action::{Action, ActionSet};
use crate::cursor::PaginatedSearch;
use crate::error::CheckError;
use crate::evaluator::{evaluate_thresholds, report_historic};
use crate::report::Report;
use crate::rule::RuleCount;
use crate::status::{StatusData, StatusStore};

/// 한 액션의 히스토리 조회 결과
#[derive(Debug, Clone, Serialize)]
pub struct ActionHistory {
    /// 액션 이름
    pub action: String,
    /// 상태 파일 경로
    pub status_file: PathBuf,
    /// 상태 파일 내용
    #[serde(flatten)]
    pub status: StatusData,
}

/// 액션 실행기
pub struct Check {
    actions: ActionSet,
}

impl Check {
    /// 로딩된 액션 세트로 실행기를 만듭니다.
    pub fn new(actions: ActionSet) -> Self {
        Self { actions }
    }

    /// 액션 파일을 읽어 실행기를 만듭니다.
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self, CheckError> {
        Ok(Self::new(ActionSet::load(path).await?))
    }

    /// 액션 세트
    pub fn actions(&self) -> &ActionSet {
        &self.actions
    }

    /// 선택한 액션(빈 필터는 전체)을 실행하고 보고서를 반환합니다.
    ///
    /// 실패는 보고서의 UNKNOWN 결과로 나타나며, 이 함수 자체는 실패하지 않습니다.
    pub async fn run<S: DocumentStore>(
        &self,
        store: &S,
        filter: &[String],
        keep_alive: &str,
    ) -> Report {
        let mut report = Report::new();
        let selected = self.actions.select(filter);

        if selected.is_empty() {
            tracing::error!(actions = ?filter, "none of the requested actions are defined");
            report.add_result(
                CheckState::Unknown,
                format!("None of the actions {filter:?} were found"),
                None,
            );
            return report;
        }

        for action in selected {
            tracing::debug!(action = %action.name, index = %action.index, "running action");
            let mut action_report = Report::new();

            match self
                .run_action(store, action, keep_alive, Utc::now(), &mut action_report)
                .await
            {
                Ok(()) => report.merge(action_report),
                Err(e) => {
                    tracing::error!(action = %action.name, error = %e, kind = ?e.kind(), "action failed");
                    metrics::counter!(
                        m::CHECK_ACTION_FAILURES_TOTAL,
                        m::LABEL_ACTION => action.name.clone()
                    )
                    .increment(1);
                    // 저장 실패는 이미 계산된 결과를 버리지 않음
                    if matches!(e, CheckError::Status { .. }) {
                        report.merge(action_report);
                    }
                    report.add_result(
                        CheckState::Unknown,
                        format!("{}: {e}", action.name),
                        None,
                    );
                }
            }
        }

        report
    }

    async fn run_action<S: DocumentStore>(
        &self,
        store: &S,
        action: &Action,
        keep_alive: &str,
        now: DateTime<Utc>,
        report: &mut Report,
    ) -> Result<(), CheckError> {
        let status_store = StatusStore::new(&action.status_file);
        let mut status = status_store.load().await?;
        let before = status.clone();

        let (counts, checkpoint) = scan(store, action, &status.timestamp, keep_alive).await?;
        record_matches(action, &counts);

        if let Some(candidate) = checkpoint
            && status.advance_checkpoint(&candidate)
        {
            tracing::debug!(action = %action.name, timestamp = %status.timestamp, "checkpoint advanced");
        }

        if action.history_enabled() {
            let pruned = status.prune_at(now, action.history);
            if pruned > 0 {
                tracing::debug!(action = %action.name, pruned, "pruned history");
            }
        }

        evaluate_thresholds(action, &counts, &mut status, now, report);
        report_historic(action, &status, report);

        if status != before {
            status_store.save(&status).await?;
        } else {
            tracing::debug!(action = %action.name, "status unchanged, not saving");
        }

        Ok(())
    }

    /// 선택한 액션의 히스토리를 읽습니다.
    ///
    /// # Errors
    /// - 선택된 액션이 없으면 `CheckError::UnknownActions`
    /// - 상태 파일을 읽을 수 없으면 `CheckError::Status`
    pub async fn list_history(&self, filter: &[String]) -> Result<Vec<ActionHistory>, CheckError> {
        let mut listing = Vec::new();
        for action in self.select(filter)? {
            let status = StatusStore::new(&action.status_file).load().await?;
            listing.push(ActionHistory {
                action: action.name.clone(),
                status_file: action.status_file.clone(),
                status,
            });
        }
        Ok(listing)
    }

    /// 히스토리 항목을 처리 완료로 표시하고 영향받은 항목 수를 반환합니다.
    pub async fn handle_history(
        &self,
        filter: &[String],
        uuids: &[String],
        all: bool,
    ) -> Result<usize, CheckError> {
        self.modify_history(filter, |status| status.handle(uuids, all))
            .await
    }

    /// 히스토리 항목을 삭제하고 삭제한 항목 수를 반환합니다.
    pub async fn remove_history(
        &self,
        filter: &[String],
        uuids: &[String],
        all: bool,
    ) -> Result<usize, CheckError> {
        self.modify_history(filter, |status| status.remove(uuids, all))
            .await
    }

    /// 체크포인트를 지정한 값으로 설정하고 갱신한 액션 수를 반환합니다.
    ///
    /// 히스토리는 그대로 유지합니다.
    pub async fn init_checkpoint(
        &self,
        filter: &[String],
        timestamp: &str,
    ) -> Result<usize, CheckError> {
        if timestamp.trim().is_empty() {
            return Err(CheckError::ActionValidation {
                action: filter.join(","),
                reason: "checkpoint timestamp must not be empty".to_owned(),
            });
        }

        self.modify_history(filter, |status| {
            usize::from(status.set_checkpoint(timestamp.trim()))
        })
        .await
    }

    /// 상태 파일을 읽고, 수정하고, 바뀐 것이 있으면 다시 씁니다.
    async fn modify_history<F>(&self, filter: &[String], mut apply: F) -> Result<usize, CheckError>
    where
        F: FnMut(&mut StatusData) -> usize,
    {
        let mut total = 0;
        for action in self.select(filter)? {
            let store = StatusStore::new(&action.status_file);
            let mut status = store.load().await?;
            let affected = apply(&mut status);
            if affected > 0 {
                store.save(&status).await?;
                tracing::info!(
                    action = %action.name,
                    path = %action.status_file.display(),
                    affected,
                    "updated status file"
                );
            }
            total += affected;
        }
        Ok(total)
    }

    fn select(&self, filter: &[String]) -> Result<Vec<&Action>, CheckError> {
        let selected = self.actions.select(filter);
        if selected.is_empty() {
            return Err(CheckError::UnknownActions {
                names: filter.to_vec(),
            });
        }
        Ok(selected)
    }
}

/// 액션의 쿼리로 스캔을 실행합니다. 커서는 결과와 관계없이 닫습니다.
async fn scan<S: DocumentStore>(
    store: &S,
    action: &Action,
    checkpoint: &str,
    keep_alive: &str,
) -> Result<(RuleCount, Option<String>), CheckError> {
    let query = action.query_for(checkpoint);
    tracing::debug!(action = %action.name, checkpoint, "starting scan");

    let mut cursor = PaginatedSearch::open(store, &action.index, &query, keep_alive).await?;
    let result = drain(&mut cursor, action).await;
    cursor.close().await;

    if let Ok((counts, _)) = &result {
        tracing::info!(
            action = %action.name,
            pages = cursor.pages_fetched(),
            documents = counts.total(),
            "scan finished"
        );
    }
    result
}

/// 커서의 페이지를 상한까지 읽으며 룰을 평가합니다.
async fn drain<S: DocumentStore>(
    cursor: &mut PaginatedSearch<'_, S>,
    action: &Action,
) -> Result<(RuleCount, Option<String>), CheckError> {
    let mut counts = action.engine.new_count();

    record_page(action, cursor.page().len());
    let mut last = action.engine.evaluate_page(cursor.page(), &mut counts)?;

    while cursor.has_more() {
        if cursor.pages_fetched() >= action.max_pages() {
            cursor.mark_limit_reached();
            tracing::info!(
                action = %action.name,
                limit = action.max_pages(),
                "page limit reached, remaining documents are left for the next run"
            );
            break;
        }

        let page = cursor.next().await?;
        record_page(action, page.len());
        if let Some(timestamp) = action.engine.evaluate_page(page, &mut counts)? {
            last = Some(timestamp);
        }
    }

    Ok((counts, last))
}

fn record_page(action: &Action, documents: usize) {
    metrics::counter!(m::CHECK_PAGES_FETCHED_TOTAL, m::LABEL_ACTION => action.name.clone())
        .increment(1);
    metrics::counter!(m::CHECK_DOCUMENTS_SCANNED_TOTAL, m::LABEL_ACTION => action.name.clone())
        .increment(documents as u64);
}

fn record_matches(action: &Action, counts: &RuleCount) {
    for rule in action.engine.rules() {
        let count = counts.count(&rule.name);
        if count > 0 {
            metrics::counter!(
                m::CHECK_RULE_MATCHES_TOTAL,
                m::LABEL_ACTION => action.name.clone(),
                m::LABEL_RULE => rule.name.clone()
            )
            .increment(count);
        }
    }
}
