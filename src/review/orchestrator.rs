//! 审查编排
//!
//! 状态流转：Received → Authorized → Fetching → Assembling → Requesting → Persisted。
//! 任何写入之前的失败都不会修改提交记录；写入是最后一步，且反馈与审查时间在同一条
//! UPDATE 中提交。

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::errors::{FetchError, RequestError};
use super::fetcher::SourceFetcher;
use super::prompt::PromptAssembler;
use super::requester::ReviewRequester;
use crate::models::users::entities::User;
use crate::storage::Storage;

/// 生成式服务返回无法解析的内容时写入的反馈
pub const MALFORMED_FEEDBACK: &str = "LLM did not return a valid response.";

/// 可能失败的阶段；组装提示词不会失败，因此没有对应的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStage {
    Authorizing,
    Fetching,
    Requesting,
    Persisting,
}

impl fmt::Display for ReviewStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReviewStage::Authorizing => "authorizing",
            ReviewStage::Fetching => "fetching",
            ReviewStage::Requesting => "requesting",
            ReviewStage::Persisting => "persisting",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    NotFound(String),
    Forbidden(String),
    /// 同一提交已有审查在进行，或条件更新时发现已被其他审查写入
    Conflict(String),
    Failed { stage: ReviewStage, detail: String },
}

impl fmt::Display for ReviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ReviewError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            ReviewError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            ReviewError::Failed { stage, detail } => {
                write!(f, "Review failed while {stage}: {detail}")
            }
        }
    }
}

impl std::error::Error for ReviewError {}

/// 一次成功审查的结果
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub submission_id: i64,
    pub feedback: String,
    pub reviewed_at: DateTime<Utc>,
    /// 反馈是否为 [`MALFORMED_FEEDBACK`] 占位文本
    pub malformed: bool,
}

/// 进行中的审查登记，离开作用域时自动释放
struct InFlightGuard {
    map: Arc<DashMap<i64, ()>>,
    submission_id: i64,
}

impl InFlightGuard {
    fn acquire(map: &Arc<DashMap<i64, ()>>, submission_id: i64) -> Option<Self> {
        use dashmap::mapref::entry::Entry;

        match map.entry(submission_id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(Self {
                    map: map.clone(),
                    submission_id,
                })
            }
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.map.remove(&self.submission_id);
    }
}

pub struct ReviewOrchestrator {
    storage: Arc<dyn Storage>,
    fetcher: Arc<dyn SourceFetcher>,
    requester: Arc<dyn ReviewRequester>,
    assembler: PromptAssembler,
    in_flight: Arc<DashMap<i64, ()>>,
}

impl ReviewOrchestrator {
    pub fn new(
        storage: Arc<dyn Storage>,
        fetcher: Arc<dyn SourceFetcher>,
        requester: Arc<dyn ReviewRequester>,
        assembler: PromptAssembler,
    ) -> Self {
        Self {
            storage,
            fetcher,
            requester,
            assembler,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// 当前正在审查的提交数量
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub async fn review(
        &self,
        caller: &User,
        submission_id: i64,
    ) -> Result<ReviewOutcome, ReviewError> {
        // Received → Authorized
        if !caller.is_teacher() {
            return Err(ReviewError::Forbidden(
                "Only teachers can request a review".to_string(),
            ));
        }

        let submission = self
            .storage
            .get_submission_by_id(submission_id)
            .await
            .map_err(|e| failed(ReviewStage::Authorizing, e.to_string()))?
            .ok_or_else(|| ReviewError::NotFound(format!("Submission {submission_id} not found")))?;

        let assignment = self
            .storage
            .get_assignment_by_id(submission.assignment_id)
            .await
            .map_err(|e| failed(ReviewStage::Authorizing, e.to_string()))?
            .ok_or_else(|| {
                ReviewError::NotFound(format!(
                    "Assignment {} not found",
                    submission.assignment_id
                ))
            })?;

        if !assignment.is_owned_by(caller.id) {
            warn!(
                "User {} tried to review submission {} of assignment {} owned by {}",
                caller.id, submission_id, assignment.id, assignment.teacher_id
            );
            return Err(ReviewError::Forbidden(
                "You do not own the assignment of this submission".to_string(),
            ));
        }

        let _guard = InFlightGuard::acquire(&self.in_flight, submission_id).ok_or_else(|| {
            ReviewError::Conflict(format!(
                "A review of submission {submission_id} is already in progress"
            ))
        })?;
        let expected_revision = submission.review_revision;
        info!(
            "Review of submission {} authorized for teacher {}",
            submission_id, caller.id
        );

        // Authorized → Fetching
        let repo_url = submission.repo_url.as_deref().ok_or_else(|| {
            let e = FetchError::InvalidRepoUrl("<missing>".to_string());
            error!("Submission {} has no repository URL", submission_id);
            failed(ReviewStage::Fetching, e.to_string())
        })?;
        let files = self
            .fetcher
            .fetch(repo_url, submission.commit_ref.as_deref())
            .await
            .map_err(|e| {
                error!("Fetching sources for submission {} failed: {}", submission_id, e);
                failed(ReviewStage::Fetching, e.to_string())
            })?;

        // Fetching → Assembling
        let prompt = self.assembler.assemble(&assignment.title, repo_url, &files);
        info!(
            "Assembled review prompt for submission {}: {} files, {} chars",
            submission_id,
            files.len(),
            prompt.chars().count()
        );

        // Assembling → Requesting
        let (feedback, malformed) = match self.requester.request_review(&prompt).await {
            Ok(feedback) => (feedback, false),
            Err(RequestError::MalformedResponse(detail)) => {
                warn!(
                    "Review service returned malformed response for submission {}: {}",
                    submission_id, detail
                );
                (MALFORMED_FEEDBACK.to_string(), true)
            }
            Err(e @ RequestError::TransportFailure(_)) => {
                error!("Review request for submission {} failed: {}", submission_id, e);
                return Err(failed(ReviewStage::Requesting, e.to_string()));
            }
        };

        // Requesting → Persisted
        let now = Utc::now();
        let reviewed_at = DateTime::<Utc>::from_timestamp(now.timestamp(), 0).unwrap_or(now);
        let written = self
            .storage
            .record_review(submission_id, &feedback, reviewed_at, expected_revision)
            .await
            .map_err(|e| {
                error!("Persisting review of submission {} failed: {}", submission_id, e);
                failed(ReviewStage::Persisting, e.to_string())
            })?;

        if !written {
            return Err(ReviewError::Conflict(format!(
                "Submission {submission_id} was reviewed concurrently"
            )));
        }

        info!("Review of submission {} persisted", submission_id);
        Ok(ReviewOutcome {
            submission_id,
            feedback,
            reviewed_at,
            malformed,
        })
    }
}

fn failed(stage: ReviewStage, detail: String) -> ReviewError {
    ReviewError::Failed { stage, detail }
}
