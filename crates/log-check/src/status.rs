//! 상태 저장소 -- 액션별 체크포인트와 경보 히스토리의 영속화
//!
//! 상태 파일(YAML)은 액션마다 하나이며 체크포인트 타임스탬프와 히스토리
//! 항목 목록을 담습니다. 운영자 명령(handle/rm/init)은 같은 파일을 읽고,
//! 수정하고, 다시 씁니다.
//!
//! 같은 상태 파일에 대한 동시 실행은 조정하지 않습니다. 마지막에 쓴
//! 프로세스의 내용이 남으므로, 액션별 실행은 외부에서 직렬화해야 합니다.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use logwarden_core::CheckState;

use crate::error::CheckError;

/// 히스토리 타임스탬프 형식 (UTC)
pub const HISTORY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// 상태 파일이 없을 때의 체크포인트
pub const CHECKPOINT_SENTINEL: &str = "1900-01-01T00:00:00.000Z";

/// 히스토리 형식으로 시각을 포맷합니다.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(HISTORY_TIME_FORMAT).to_string()
}

/// 히스토리 형식의 타임스탬프를 파싱합니다.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, HISTORY_TIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// 경보 히스토리 항목 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistory {
    /// 항목 식별자
    pub uuid: String,
    /// 경보 발생 시각
    pub timestamp: String,
    /// 발생 당시 상태
    pub state: CheckState,
    /// 경보를 낸 룰
    pub rule: String,
    /// 운영자 확인 여부
    #[serde(default)]
    pub handled: bool,
    /// 발생 당시 매칭 횟수
    #[serde(default)]
    pub counter: u64,
    /// 매칭된 줄 발췌
    #[serde(default)]
    pub lines: Vec<String>,
    /// 이번 실행에서 생성된 항목 (저장하지 않음)
    #[serde(skip)]
    pub fresh: bool,
}

/// 상태 파일 내용
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusData {
    /// 체크포인트 (저장소 타임스탬프 형식)
    #[serde(default)]
    pub timestamp: String,
    /// 경보 히스토리 (발생 순)
    #[serde(default)]
    pub history: Vec<StatusHistory>,
}

impl StatusData {
    /// 체크포인트를 후보 값으로 전진시킵니다.
    ///
    /// 빈 후보는 무시합니다. 두 값이 모두 RFC 3339 시각이고 후보가 더 이르면
    /// 무시합니다. 그 밖의 형식(예: epoch 밀리초)은 저장소 고유 값이므로 그대로
    /// 받아들입니다. 값이 바뀌면 true를 반환합니다.
    pub fn advance_checkpoint(&mut self, candidate: &str) -> bool {
        if candidate.is_empty() || candidate == self.timestamp {
            return false;
        }

        if !self.timestamp.is_empty() && is_earlier(candidate, &self.timestamp) {
            tracing::debug!(
                current = %self.timestamp,
                candidate = %candidate,
                "checkpoint candidate is older than the current checkpoint, keeping current"
            );
            return false;
        }

        self.timestamp = candidate.to_owned();
        true
    }

    /// 체크포인트를 그대로 설정합니다. 빈 값은 무시합니다.
    pub fn set_checkpoint(&mut self, timestamp: &str) -> bool {
        if timestamp.is_empty() || timestamp == self.timestamp {
            return false;
        }
        self.timestamp = timestamp.to_owned();
        true
    }

    /// 새 히스토리 항목을 추가하고 그 UUID를 반환합니다.
    pub fn add_history_entry(
        &mut self,
        at: DateTime<Utc>,
        state: CheckState,
        rule: &str,
        counter: u64,
        lines: Vec<String>,
    ) -> String {
        let uuid = Uuid::new_v4().to_string();
        self.history.push(StatusHistory {
            uuid: uuid.clone(),
            timestamp: format_timestamp(at),
            state,
            rule: rule.to_owned(),
            handled: false,
            counter,
            lines,
            fresh: true,
        });
        uuid
    }

    /// 보존 기간이 지난 항목을 현재 시각 기준으로 제거합니다.
    pub fn prune(&mut self, retention_secs: u64) -> usize {
        self.prune_at(Utc::now(), retention_secs)
    }

    /// 보존 기간이 지난 항목을 `now` 기준으로 제거하고 제거한 수를 반환합니다.
    ///
    /// 경과 시간이 보존 기간과 같은 항목은 남깁니다. 타임스탬프를 해석할 수
    /// 없는 항목은 제거합니다.
    pub fn prune_at(&mut self, now: DateTime<Utc>, retention_secs: u64) -> usize {
        let before = self.history.len();
        let retention = i64::try_from(retention_secs).unwrap_or(i64::MAX);

        self.history.retain(|entry| match parse_timestamp(&entry.timestamp) {
            Some(at) => {
                let age = now.signed_duration_since(at).num_seconds();
                let keep = age <= retention;
                if !keep {
                    tracing::trace!(uuid = %entry.uuid, age, retention, "history entry expired");
                }
                keep
            }
            None => {
                tracing::warn!(
                    uuid = %entry.uuid,
                    timestamp = %entry.timestamp,
                    format = HISTORY_TIME_FORMAT,
                    "could not interpret history timestamp, dropping entry"
                );
                false
            }
        });

        before - self.history.len()
    }

    /// 지정한 UUID(또는 전체) 항목을 처리 완료로 표시하고 해당 수를 반환합니다.
    pub fn handle(&mut self, uuids: &[String], all: bool) -> usize {
        let mut affected = 0;
        for entry in &mut self.history {
            if all || uuids.contains(&entry.uuid) {
                entry.handled = true;
                affected += 1;
            }
        }
        affected
    }

    /// 지정한 UUID(또는 전체) 항목을 삭제하고 삭제한 수를 반환합니다.
    pub fn remove(&mut self, uuids: &[String], all: bool) -> usize {
        let before = self.history.len();
        self.history.retain(|entry| !(all || uuids.contains(&entry.uuid)));
        before - self.history.len()
    }

    /// 항목 하나를 처리 완료로 표시합니다.
    pub fn acknowledge(&mut self, uuid: &str) -> bool {
        match self.history.iter_mut().find(|e| e.uuid == uuid) {
            Some(entry) => {
                entry.handled = true;
                true
            }
            None => false,
        }
    }

    /// 이전 실행에서 생긴 미처리 항목
    pub fn unhandled_historic(&self) -> impl Iterator<Item = &StatusHistory> {
        self.history.iter().filter(|e| !e.fresh && !e.handled)
    }
}

/// `a`가 `b`보다 이른 시각인지 비교합니다.
///
/// 둘 중 하나라도 RFC 3339로 해석되지 않으면 비교할 수 없으므로 false입니다.
fn is_earlier(a: &str, b: &str) -> bool {
    match (
        DateTime::parse_from_rfc3339(a),
        DateTime::parse_from_rfc3339(b),
    ) {
        (Ok(a), Ok(b)) => a < b,
        _ => false,
    }
}

/// 상태 파일 하나에 대한 저장소
#[derive(Debug, Clone)]
pub struct StatusStore {
    path: PathBuf,
}

impl StatusStore {
    /// 경로로 저장소를 만듭니다.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 상태 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 상태를 읽습니다.
    ///
    /// 파일이 없거나 비어 있으면 체크포인트가 기본값인 빈 상태를 반환합니다.
    ///
    /// # Errors
    ///
    /// 파일을 읽을 수 없거나 YAML 해석에 실패하면 `CheckError::Status`를 반환합니다.
    pub async fn load(&self) -> Result<StatusData, CheckError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    path = %self.path.display(),
                    timestamp = CHECKPOINT_SENTINEL,
                    "no status file found, using default start date"
                );
                return Ok(StatusData {
                    timestamp: CHECKPOINT_SENTINEL.to_owned(),
                    history: Vec::new(),
                });
            }
            Err(e) => return Err(self.error(format!("failed to read file: {e}"))),
        };

        let mut data = if content.trim().is_empty() {
            StatusData::default()
        } else {
            serde_yaml::from_str::<StatusData>(&content)
                .map_err(|e| self.error(format!("failed to parse YAML: {e}")))?
        };

        if data.timestamp.is_empty() {
            data.timestamp = CHECKPOINT_SENTINEL.to_owned();
        }

        tracing::debug!(
            path = %self.path.display(),
            timestamp = %data.timestamp,
            entries = data.history.len(),
            "read status file"
        );
        Ok(data)
    }

    /// 상태를 저장합니다.
    ///
    /// 체크포인트가 비어 있으면 아무것도 쓰지 않습니다. 임시 파일에 쓴 뒤
    /// 이름을 바꾸므로 중간에 실패해도 기존 파일은 손상되지 않습니다.
    ///
    /// # Errors
    ///
    /// 직렬화, 디렉터리 생성, 쓰기, 이름 변경 실패 시 `CheckError::Status`를 반환합니다.
    pub async fn save(&self, data: &StatusData) -> Result<(), CheckError> {
        if data.timestamp.is_empty() {
            tracing::debug!(path = %self.path.display(), "skipped writing empty timestamp");
            return Ok(());
        }

        let yaml = serde_yaml::to_string(data)
            .map_err(|e| self.error(format!("failed to serialize status: {e}")))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.error(format!("failed to create directory: {e}")))?;
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, yaml)
            .await
            .map_err(|e| self.error(format!("failed to write file: {e}")))?;

        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(self.error(format!("failed to replace file: {e}")));
        }

        tracing::debug!(
            path = %self.path.display(),
            timestamp = %data.timestamp,
            entries = data.history.len(),
            "wrote status file"
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn error(&self, reason: String) -> CheckError {
        CheckError::Status {
            path: self.path.display().to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn entry(uuid: &str, timestamp: &str) -> StatusHistory {
        StatusHistory {
            uuid: uuid.to_owned(),
            timestamp: timestamp.to_owned(),
            state: CheckState::Warning,
            rule: "errors".to_owned(),
            handled: false,
            counter: 6,
            lines: vec!["boom".to_owned()],
            fresh: false,
        }
    }

    fn data_with(entries: Vec<StatusHistory>) -> StatusData {
        StatusData {
            timestamp: "2024-05-01T10:00:00.000Z".to_owned(),
            history: entries,
        }
    }

    #[test]
    fn timestamp_format_round_trips() {
        let text = format_timestamp(now());
        assert_eq!(text, "2024-05-01T12:00:00.000Z");
        assert_eq!(parse_timestamp(&text), Some(now()));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn prune_keeps_boundary_and_drops_unparseable() {
        let retention = 3600;
        let boundary = format_timestamp(now() - Duration::seconds(3600));
        let expired = format_timestamp(now() - Duration::seconds(3601));
        let recent = format_timestamp(now() - Duration::seconds(10));

        let mut data = data_with(vec![
            entry("boundary", &boundary),
            entry("expired", &expired),
            entry("garbage", "not a timestamp"),
            entry("recent", &recent),
        ]);

        let removed = data.prune_at(now(), retention);
        assert_eq!(removed, 2);
        let left: Vec<&str> = data.history.iter().map(|e| e.uuid.as_str()).collect();
        assert_eq!(left, vec!["boundary", "recent"]);
    }

    #[test]
    fn handle_marks_only_matching_entries() {
        let mut data = data_with(vec![entry("a", "t"), entry("b", "t"), entry("c", "t")]);
        let affected = data.handle(&["b".to_owned()], false);
        assert_eq!(affected, 1);
        let handled: Vec<bool> = data.history.iter().map(|e| e.handled).collect();
        assert_eq!(handled, vec![false, true, false]);
    }

    #[test]
    fn handle_and_remove_all_ignore_uuid_list() {
        let mut data = data_with(vec![entry("a", "t"), entry("b", "t")]);
        assert_eq!(data.handle(&[], true), 2);
        assert!(data.history.iter().all(|e| e.handled));

        assert_eq!(data.remove(&["zzz".to_owned()], true), 2);
        assert!(data.history.is_empty());
    }

    #[test]
    fn remove_preserves_order() {
        let mut data = data_with(vec![entry("a", "t"), entry("b", "t"), entry("c", "t")]);
        assert_eq!(data.remove(&["b".to_owned()], false), 1);
        let left: Vec<&str> = data.history.iter().map(|e| e.uuid.as_str()).collect();
        assert_eq!(left, vec!["a", "c"]);
        assert_eq!(data.remove(&["missing".to_owned()], false), 0);
    }

    #[test]
    fn acknowledge_single_entry() {
        let mut data = data_with(vec![entry("a", "t"), entry("b", "t")]);
        assert!(data.acknowledge("a"));
        assert!(!data.acknowledge("missing"));
        assert!(data.history[0].handled);
        assert!(!data.history[1].handled);
    }

    #[test]
    fn unhandled_historic_skips_fresh_and_handled() {
        let mut data = data_with(vec![entry("old", "t"), entry("done", "t")]);
        data.history[1].handled = true;
        data.add_history_entry(now(), CheckState::Critical, "errors", 30, vec![]);

        let ids: Vec<&str> = data.unhandled_historic().map(|e| e.uuid.as_str()).collect();
        assert_eq!(ids, vec!["old"]);
        assert!(data.history[2].fresh);
        assert_eq!(data.history[2].uuid.len(), 36);
    }

    #[test]
    fn advance_checkpoint_never_erases_or_rewinds() {
        let mut data = data_with(vec![]);
        assert!(!data.advance_checkpoint(""));
        assert_eq!(data.timestamp, "2024-05-01T10:00:00.000Z");

        assert!(!data.advance_checkpoint("2024-05-01T09:00:00.000Z"));
        assert!(data.advance_checkpoint("2024-05-01T11:00:00.000Z"));
        assert_eq!(data.timestamp, "2024-05-01T11:00:00.000Z");

        assert!(data.set_checkpoint("2024-04-01T00:00:00.000Z"));
        assert!(!data.set_checkpoint(""));
    }

    #[test]
    fn advance_checkpoint_accepts_non_rfc3339_values() {
        let mut data = StatusData {
            timestamp: CHECKPOINT_SENTINEL.to_owned(),
            history: Vec::new(),
        };
        assert!(data.advance_checkpoint("1714557600000"));
        assert_eq!(data.timestamp, "1714557600000");

        assert!(data.advance_checkpoint("1714557600500"));
        assert_eq!(data.timestamp, "1714557600500");
        assert!(!data.advance_checkpoint(""));
        assert_eq!(data.timestamp, "1714557600500");
    }

    #[test]
    fn fresh_marker_is_not_serialized() {
        let mut data = data_with(vec![]);
        data.add_history_entry(now(), CheckState::Warning, "errors", 6, vec!["x".to_owned()]);
        let yaml = serde_yaml::to_string(&data).unwrap();
        assert!(!yaml.contains("fresh"));
        assert!(yaml.contains("state: 1"));

        let back: StatusData = serde_yaml::from_str(&yaml).unwrap();
        assert!(!back.history[0].fresh);
        assert_eq!(back.history[0].state, CheckState::Warning);
    }

    #[tokio::test]
    async fn load_missing_file_uses_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let store = StatusStore::new(dir.path().join("missing.yaml"));
        let data = store.load().await.unwrap();
        assert_eq!(data.timestamp, CHECKPOINT_SENTINEL);
        assert!(data.history.is_empty());
    }

    #[tokio::test]
    async fn load_empty_file_uses_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.yaml");
        tokio::fs::write(&path, "").await.unwrap();
        let data = StatusStore::new(&path).load().await.unwrap();
        assert_eq!(data.timestamp, CHECKPOINT_SENTINEL);
    }

    #[tokio::test]
    async fn load_malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        tokio::fs::write(&path, "history: [").await.unwrap();
        let err = StatusStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, CheckError::Status { .. }));
    }

    #[tokio::test]
    async fn save_creates_parents_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = StatusStore::new(dir.path().join("nested/deeper/status.yaml"));
        let data = data_with(vec![entry("a", "2024-05-01T10:05:00.000Z")]);

        store.save(&data).await.unwrap();
        let back = store.load().await.unwrap();
        assert_eq!(back, data);
        assert!(!dir.path().join("nested/deeper/status.yaml.tmp").exists());
    }

    #[tokio::test]
    async fn save_with_empty_timestamp_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.yaml");
        let store = StatusStore::new(&path);
        store.save(&data_with(vec![entry("a", "t")])).await.unwrap();
        let before = tokio::fs::read(&path).await.unwrap();

        store.save(&StatusData::default()).await.unwrap();
        let after = tokio::fs::read(&path).await.unwrap();
        assert_eq!(before, after);
    }
}
