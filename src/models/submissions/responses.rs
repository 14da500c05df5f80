use serde::Serialize;

use super::entities::Submission;

/// 提交响应（审查字段平铺）
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub repo_url: Option<String>,
    pub commit_ref: Option<String>,
    pub status: String,
    pub submitted_at: String,
    pub review_feedback: Option<String>,
    pub reviewed_at: Option<String>,
}

impl From<Submission> for SubmissionResponse {
    fn from(s: Submission) -> Self {
        let (review_feedback, reviewed_at) = match s.review {
            Some(r) => (Some(r.feedback), Some(r.reviewed_at.to_rfc3339())),
            None => (None, None),
        };
        Self {
            id: s.id,
            assignment_id: s.assignment_id,
            student_id: s.student_id,
            repo_url: s.repo_url,
            commit_ref: s.commit_ref,
            status: s.status.to_string(),
            submitted_at: s.submitted_at.to_rfc3339(),
            review_feedback,
            reviewed_at,
        }
    }
}

/// 审查完成响应
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub submission_id: i64,
    pub feedback: String,
    pub reviewed_at: String,
}
