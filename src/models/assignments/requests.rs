use serde::Deserialize;

// 作业创建请求
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssignmentRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: chrono::DateTime<chrono::Utc>,
}
