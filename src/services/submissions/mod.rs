pub mod create;
pub mod review;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::models::submissions::requests::CreateSubmissionRequest;
use crate::review::ReviewOrchestrator;
use crate::storage::Storage;

pub struct SubmissionService {
    storage: Option<Arc<dyn Storage>>,
}

impl SubmissionService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub(crate) fn get_orchestrator(
        &self,
        request: &HttpRequest,
    ) -> Option<web::Data<ReviewOrchestrator>> {
        request.app_data::<web::Data<ReviewOrchestrator>>().cloned()
    }

    /// 学生创建提交
    pub async fn create_submission(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        req: CreateSubmissionRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_submission(self, request, assignment_id, req).await
    }

    /// 教师触发自动审查
    pub async fn review_submission(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        review::review_submission(self, request, submission_id).await
    }
}
