use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::middlewares::RequireJWT;
use crate::models::submissions::responses::ReviewResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::review::{ReviewError, ReviewStage};

/// 触发自动代码审查
/// POST /submissions/{id}/review
pub async fn review_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    let orchestrator = match service.get_orchestrator(request) {
        Some(orchestrator) => orchestrator,
        None => {
            tracing::error!("ReviewOrchestrator not registered in app data");
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "审查服务不可用",
                )),
            );
        }
    };

    match orchestrator.review(&current_user, submission_id).await {
        Ok(outcome) => {
            let message = if outcome.malformed {
                "Review completed, but the review service returned no usable feedback"
            } else {
                "Review completed"
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                ReviewResponse {
                    submission_id: outcome.submission_id,
                    feedback: outcome.feedback,
                    reviewed_at: outcome.reviewed_at.to_rfc3339(),
                },
                message,
            )))
        }
        Err(e) => Ok(review_error_response(e)),
    }
}

fn review_error_response(err: ReviewError) -> HttpResponse {
    match err {
        ReviewError::NotFound(msg) => HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::SubmissionNotFound, msg)),
        ReviewError::Forbidden(msg) => {
            HttpResponse::Forbidden().json(ApiResponse::error_empty(ErrorCode::Forbidden, msg))
        }
        ReviewError::Conflict(msg) => HttpResponse::Conflict()
            .json(ApiResponse::error_empty(ErrorCode::ReviewInProgress, msg)),
        ReviewError::Failed { stage, detail } => {
            let code = match stage {
                ReviewStage::Fetching => ErrorCode::ReviewFetchFailed,
                ReviewStage::Requesting => ErrorCode::ReviewUpstreamFailed,
                ReviewStage::Persisting => ErrorCode::ReviewPersistFailed,
                ReviewStage::Authorizing => ErrorCode::InternalServerError,
            };
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                code,
                format!("Review failed while {stage}: {detail}"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_review_error_status_mapping() {
        let cases = [
            (ReviewError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ReviewError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ReviewError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                ReviewError::Failed {
                    stage: ReviewStage::Fetching,
                    detail: "x".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ReviewError::Failed {
                    stage: ReviewStage::Authorizing,
                    detail: "x".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ReviewError::Failed {
                    stage: ReviewStage::Requesting,
                    detail: "x".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(review_error_response(err).status(), status);
        }
    }
}
