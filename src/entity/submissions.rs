//! 提交实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub repo_url: Option<String>,
    pub commit_ref: Option<String>,
    pub status: String,
    pub submitted_at: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub review_feedback: Option<String>,
    pub reviewed_at: Option<i64>,
    /// 每次写入审查结果加一，作为条件更新的版本号
    pub review_revision: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignments::Entity",
        from = "Column::AssignmentId",
        to = "super::assignments::Column::Id"
    )]
    Assignment,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
}

impl Related<super::assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_submission(self) -> crate::models::submissions::entities::Submission {
        use crate::models::submissions::entities::{ReviewRecord, Submission, SubmissionStatus};
        use chrono::{DateTime, Utc};

        // 审查字段只有成对存在时才视为有效
        let review = match (self.review_feedback, self.reviewed_at) {
            (Some(feedback), Some(ts)) => {
                DateTime::<Utc>::from_timestamp(ts, 0).map(|reviewed_at| ReviewRecord {
                    feedback,
                    reviewed_at,
                })
            }
            (None, None) => None,
            _ => {
                tracing::warn!(
                    "Submission {} has a half-written review, ignoring it",
                    self.id
                );
                None
            }
        };

        Submission {
            id: self.id,
            assignment_id: self.assignment_id,
            student_id: self.student_id,
            repo_url: self.repo_url,
            commit_ref: self.commit_ref,
            status: self
                .status
                .parse::<SubmissionStatus>()
                .unwrap_or(SubmissionStatus::Submitted),
            submitted_at: DateTime::<Utc>::from_timestamp(self.submitted_at, 0)
                .unwrap_or_default(),
            review,
            review_revision: self.review_revision,
        }
    }
}
