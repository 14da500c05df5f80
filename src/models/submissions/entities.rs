use serde::{Deserialize, Serialize};

// 提交状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Submitted, // 已提交，尚未审查
    Reviewed,  // 已完成自动审查
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Submitted => write!(f, "submitted"),
            SubmissionStatus::Reviewed => write!(f, "reviewed"),
        }
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(SubmissionStatus::Submitted),
            "reviewed" => Ok(SubmissionStatus::Reviewed),
            _ => Err(format!("Invalid submission status: {s}")),
        }
    }
}

/// 一次审查的结果
///
/// 反馈与审查时间总是成对出现，整体写入、整体覆盖。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub feedback: String,
    pub reviewed_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub repo_url: Option<String>,
    pub commit_ref: Option<String>,
    pub status: SubmissionStatus,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub review: Option<ReviewRecord>,
    pub review_revision: i64,
}

impl Submission {
    pub fn reviewed_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.review.as_ref().map(|r| r.reviewed_at)
    }

    pub fn review_feedback(&self) -> Option<&str> {
        self.review.as_ref().map(|r| r.feedback.as_str())
    }
}
