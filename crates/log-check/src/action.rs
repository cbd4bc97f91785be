//! 액션 정의 -- 액션 파일(YAML) 로딩, 검증, 컴파일
//!
//! 액션은 인덱스, 쿼리 템플릿, 룰 맵, 페이지 상한, 히스토리 보존 기간,
//! 상태 파일 경로로 구성된 하나의 검사 작업입니다. 로딩 시 모든 룰의
//! 범위가 파싱되며, 하나라도 잘못되면 액션 세트 전체의 로딩이 실패합니다.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cursor::{PAGINATION_PLACEHOLDER, TIMESTAMP_PLACEHOLDER};
use crate::error::CheckError;
use crate::rule::{Rule, RuleDefinition, RuleEngine};

/// 액션 파일 최대 크기
const MAX_ACTION_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// 기본 페이지 상한
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// 액션 파일 최상위 구조
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionFile {
    /// 액션 목록
    #[serde(default)]
    pub actions: Vec<ActionDefinition>,
}

/// 액션 정의 -- 액션 파일의 `actions` 항목 하나
///
/// # YAML 스키마
/// ```yaml
/// name: auth_errors
/// index: logs-*
/// query: '{"query":{"range":{"@timestamp":{"gt":"_TIMESTAMP_"}}},_PAGINATION_}'
/// limit: 10
/// history: 86400
/// statusfile: /var/lib/logwarden/auth_errors.yaml
/// rules:
///   errors:
///     pattern: [{field: level, regex: '^ERROR$'}]
///     warning: '>=5'
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// 액션 이름
    pub name: String,
    /// 히스토리 보존 기간 (초, 0이면 히스토리 비활성)
    #[serde(default)]
    pub history: u64,
    /// 검색 대상 인덱스
    pub index: String,
    /// 쿼리 템플릿
    pub query: String,
    /// 이름별 룰 정의
    #[serde(default)]
    pub rules: BTreeMap<String, RuleDefinition>,
    /// 실행당 최대 페이지 수
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// 상태 파일 경로
    #[serde(rename = "statusfile")]
    pub status_file: PathBuf,
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

/// 컴파일된 액션
#[derive(Debug, Clone)]
pub struct Action {
    /// 액션 이름
    pub name: String,
    /// 검색 대상 인덱스
    pub index: String,
    /// 쿼리 템플릿
    pub query: String,
    /// 실행당 최대 페이지 수
    pub limit: u32,
    /// 히스토리 보존 기간 (초)
    pub history: u64,
    /// 상태 파일 경로
    pub status_file: PathBuf,
    /// 룰 엔진
    pub engine: RuleEngine,
}

impl Action {
    /// 정의를 검증하고 룰을 컴파일합니다.
    pub fn compile(definition: &ActionDefinition) -> Result<Self, CheckError> {
        let name = definition.name.trim();
        if name.is_empty() {
            return Err(CheckError::ActionValidation {
                action: "(empty)".to_owned(),
                reason: "action name must not be empty".to_owned(),
            });
        }

        if definition.index.trim().is_empty() {
            return Err(CheckError::ActionValidation {
                action: name.to_owned(),
                reason: "index must not be empty".to_owned(),
            });
        }

        if !definition.query.contains(PAGINATION_PLACEHOLDER) {
            return Err(CheckError::ActionValidation {
                action: name.to_owned(),
                reason: format!("query must contain the {PAGINATION_PLACEHOLDER} placeholder"),
            });
        }

        if !definition.query.contains(TIMESTAMP_PLACEHOLDER) {
            tracing::warn!(
                action = %name,
                "query has no {TIMESTAMP_PLACEHOLDER} placeholder, every run rescans from the start"
            );
        }

        if definition.status_file.as_os_str().is_empty() {
            return Err(CheckError::ActionValidation {
                action: name.to_owned(),
                reason: "statusfile must not be empty".to_owned(),
            });
        }

        let rules = definition
            .rules
            .iter()
            .map(|(rule_name, rule)| Rule::compile(rule_name, rule))
            .collect::<Result<Vec<_>, _>>()?;

        if rules.is_empty() {
            tracing::warn!(action = %name, "action has no rules, only totals will be reported");
        }

        Ok(Self {
            name: name.to_owned(),
            index: definition.index.clone(),
            query: definition.query.clone(),
            limit: definition.limit,
            history: definition.history,
            status_file: definition.status_file.clone(),
            engine: RuleEngine::new(rules),
        })
    }

    /// 체크포인트를 쿼리 템플릿에 대입합니다.
    pub fn query_for(&self, checkpoint: &str) -> String {
        self.query.replace(TIMESTAMP_PLACEHOLDER, checkpoint)
    }

    /// 실행당 최대 페이지 수 (0은 1로 취급)
    pub fn max_pages(&self) -> u32 {
        self.limit.max(1)
    }

    /// 히스토리가 활성화되어 있는지 여부
    pub fn history_enabled(&self) -> bool {
        self.history > 0
    }
}

/// 로딩된 액션 세트 (파일 순서 유지)
#[derive(Debug, Clone, Default)]
pub struct ActionSet {
    actions: Vec<Action>,
}

impl ActionSet {
    /// 액션 파일을 읽어 컴파일합니다.
    ///
    /// # Errors
    /// - 파일을 읽을 수 없거나 크기 제한을 넘는 경우
    /// - YAML 파싱 또는 검증에 실패한 경우
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CheckError> {
        let path = path.as_ref();
        let load_error = |reason: String| CheckError::ActionLoad {
            path: path.display().to_string(),
            reason,
        };

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| load_error(format!("failed to read file metadata: {e}")))?;

        if metadata.len() > MAX_ACTION_FILE_SIZE {
            return Err(load_error(format!(
                "file too large: {} bytes (max {MAX_ACTION_FILE_SIZE})",
                metadata.len()
            )));
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| load_error(format!("failed to read file: {e}")))?;

        let set = Self::parse(&content, &path.display().to_string())?;
        tracing::info!(path = %path.display(), count = set.len(), "loaded actions");
        Ok(set)
    }

    /// YAML 문자열에서 액션 세트를 만듭니다.
    pub fn parse(yaml: &str, source: &str) -> Result<Self, CheckError> {
        let file: ActionFile = serde_yaml::from_str(yaml).map_err(|e| CheckError::ActionLoad {
            path: source.to_owned(),
            reason: format!("failed to parse YAML: {e}"),
        })?;

        let mut seen = HashSet::new();
        let mut actions = Vec::with_capacity(file.actions.len());
        for definition in &file.actions {
            let action = Action::compile(definition)?;
            if !seen.insert(action.name.clone()) {
                return Err(CheckError::ActionValidation {
                    action: action.name,
                    reason: "duplicate action name".to_owned(),
                });
            }
            actions.push(action);
        }

        Ok(Self { actions })
    }

    /// 이름 필터로 액션을 고릅니다. 빈 필터는 전체를 뜻합니다.
    ///
    /// 존재하지 않는 이름은 경고 로그를 남기고 무시합니다.
    pub fn select(&self, names: &[String]) -> Vec<&Action> {
        if names.is_empty() {
            return self.actions.iter().collect();
        }

        for name in names {
            if self.get(name).is_none() {
                tracing::warn!(action = %name, "requested action is not defined");
            }
        }

        self.actions
            .iter()
            .filter(|a| names.iter().any(|n| n == &a.name))
            .collect()
    }

    /// 이름으로 액션을 찾습니다.
    pub fn get(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// 액션 목록
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// 액션 수
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
