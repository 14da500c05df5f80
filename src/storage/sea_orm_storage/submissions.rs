//! 提交存储操作

use super::SeaOrmStorage;
use crate::entity::submissions::{ActiveModel, Column, Entity as Submissions};
use crate::errors::{HWSystemError, Result};
use crate::models::submissions::{
    entities::{Submission, SubmissionStatus},
    requests::CreateSubmissionRequest,
};
use sea_orm::sea_query::{self, Expr};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, SqlErr};

impl SeaOrmStorage {
    /// 创建提交
    ///
    /// 先查重再插入；并发插入由 (assignment_id, student_id) 唯一索引兜底，
    /// 两种情况都返回 DuplicateSubmission。
    pub async fn create_submission_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
        req: CreateSubmissionRequest,
    ) -> Result<Submission> {
        if self
            .get_submission_by_assignment_and_student_impl(assignment_id, student_id)
            .await?
            .is_some()
        {
            return Err(HWSystemError::duplicate_submission(format!(
                "学生 {student_id} 已提交过作业 {assignment_id}"
            )));
        }

        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            assignment_id: Set(assignment_id),
            student_id: Set(student_id),
            repo_url: Set(req.repo_url),
            commit_ref: Set(req.commit_ref),
            status: Set(SubmissionStatus::Submitted.to_string()),
            submitted_at: Set(now),
            review_feedback: Set(None),
            reviewed_at: Set(None),
            review_revision: Set(0),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                HWSystemError::duplicate_submission(format!(
                    "学生 {student_id} 已提交过作业 {assignment_id}"
                ))
            } else {
                HWSystemError::database_operation(format!("创建提交失败: {e}"))
            }
        })?;

        Ok(result.into_submission())
    }

    /// 通过 ID 获取提交
    pub async fn get_submission_by_id_impl(
        &self,
        submission_id: i64,
    ) -> Result<Option<Submission>> {
        let result = Submissions::find_by_id(submission_id)
            .one(&self.db)
            .await
            .map_err(|e| HWSystemError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 获取学生在某作业下的提交
    pub async fn get_submission_by_assignment_and_student_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>> {
        let result = Submissions::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| HWSystemError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 写入审查结果
    ///
    /// 单条 UPDATE 同时写入 review_feedback、reviewed_at 和状态，并把 review_revision 加一。
    /// 条件是调用方读到的 review_revision；审查时间只精确到秒，不能作为条件。
    pub async fn record_review_impl(
        &self,
        submission_id: i64,
        feedback: &str,
        reviewed_at: chrono::DateTime<chrono::Utc>,
        expected_revision: i64,
    ) -> Result<bool> {
        let result = Submissions::update_many()
            .col_expr(Column::ReviewFeedback, Expr::value(feedback.to_string()))
            .col_expr(Column::ReviewedAt, Expr::value(reviewed_at.timestamp()))
            .col_expr(
                Column::Status,
                Expr::value(SubmissionStatus::Reviewed.to_string()),
            )
            .col_expr(
                Column::ReviewRevision,
                sea_query::ExprTrait::add(Expr::col(Column::ReviewRevision), 1),
            )
            .filter(Column::Id.eq(submission_id))
            .filter(Column::ReviewRevision.eq(expected_revision))
            .exec(&self.db)
            .await
            .map_err(|e| HWSystemError::database_operation(format!("写入审查结果失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
