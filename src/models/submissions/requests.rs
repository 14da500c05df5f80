use serde::Deserialize;

// 学生创建提交
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSubmissionRequest {
    pub repo_url: Option<String>,
    pub commit_ref: Option<String>,
}
