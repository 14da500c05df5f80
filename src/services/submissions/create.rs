use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::middlewares::RequireJWT;
use crate::models::submissions::{
    requests::CreateSubmissionRequest, responses::SubmissionResponse,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::review::RepoLocator;

/// 创建提交
/// POST /assignments/{id}/submissions
pub async fn create_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    assignment_id: i64,
    mut req: CreateSubmissionRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let student_id = match RequireJWT::extract_user_id(request) {
        Some(id) => id,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    // 仓库地址可选，但提供时必须格式正确
    req.repo_url = req
        .repo_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());
    if let Some(url) = &req.repo_url
        && let Err(e) = RepoLocator::parse(url)
    {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::RepoUrlInvalid, e.to_string())));
    }

    match storage.get_assignment_by_id(assignment_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AssignmentNotFound,
                "作业不存在",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询作业失败: {e}"),
                )),
            );
        }
    }

    match storage
        .create_submission(assignment_id, student_id, req)
        .await
    {
        Ok(submission) => {
            tracing::info!(
                "Student {} submitted assignment {} as submission {}",
                student_id,
                assignment_id,
                submission.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                SubmissionResponse::from(submission),
                "提交成功",
            )))
        }
        Err(e) if e.is_duplicate_submission() => {
            Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::DuplicateSubmission,
                "已提交过该作业",
            )))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::SubmissionCreateFailed,
                format!("创建提交失败: {e}"),
            )),
        ),
    }
}
