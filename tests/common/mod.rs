//! 集成测试共用的存储、用户与审查组件桩
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rust_hwreview::config::DatabaseConfig;
use rust_hwreview::models::assignments::{
    entities::Assignment, requests::CreateAssignmentRequest,
};
use rust_hwreview::models::submissions::{
    entities::Submission, requests::CreateSubmissionRequest,
};
use rust_hwreview::models::users::{
    entities::{RoleSet, User},
    requests::CreateUserRequest,
};
use rust_hwreview::review::{FetchError, RequestError, SourceFetcher, SourceFile};
use rust_hwreview::review::requester::ReviewRequester;
use rust_hwreview::storage::{Storage, create_storage};

pub const REPO_URL: &str = "https://github.com/u/repo";

pub async fn memory_storage() -> Arc<dyn Storage> {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        pool_size: 1,
        timeout: 5,
    };
    create_storage(&config)
        .await
        .expect("failed to create in-memory storage")
}

pub async fn create_user(
    storage: &Arc<dyn Storage>,
    username: &str,
    roles: RoleSet,
    password_hash: &str,
) -> User {
    storage
        .create_user(CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: password_hash.to_string(),
            roles,
        })
        .await
        .expect("failed to create user")
}

/// 教师 T 拥有作业 A，学生 U 针对 A 的提交 S 指向 REPO_URL；T2 是另一位教师
pub struct Scenario {
    pub teacher: User,
    pub other_teacher: User,
    pub student: User,
    pub assignment: Assignment,
    pub submission: Submission,
}

pub async fn seed_scenario(storage: &Arc<dyn Storage>) -> Scenario {
    seed_scenario_with_repo(storage, Some(REPO_URL)).await
}

pub async fn seed_scenario_with_repo(
    storage: &Arc<dyn Storage>,
    repo_url: Option<&str>,
) -> Scenario {
    let teacher = create_user(storage, "teacher_t", RoleSet::teacher(), "x").await;
    let other_teacher = create_user(storage, "teacher_t2", RoleSet::teacher(), "x").await;
    let student = create_user(storage, "student_u", RoleSet::student(), "x").await;

    let assignment = storage
        .create_assignment(
            teacher.id,
            CreateAssignmentRequest {
                title: "HW1".to_string(),
                description: "Implement the calculator".to_string(),
                due_date: chrono::Utc::now() + chrono::Duration::days(7),
            },
        )
        .await
        .expect("failed to create assignment");

    let submission = storage
        .create_submission(
            assignment.id,
            student.id,
            CreateSubmissionRequest {
                repo_url: repo_url.map(str::to_string),
                commit_ref: None,
            },
        )
        .await
        .expect("failed to create submission");

    Scenario {
        teacher,
        other_teacher,
        student,
        assignment,
        submission,
    }
}

/// 返回固定结果的拉取桩，记录调用次数
pub struct StubFetcher {
    result: Result<Vec<SourceFile>, FetchError>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn returning(files: Vec<SourceFile>) -> Self {
        Self {
            result: Ok(files),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn one_file() -> Self {
        Self::returning(vec![SourceFile::new("a.py", "x=1")])
    }

    pub fn failing(err: FetchError) -> Self {
        Self {
            result: Err(err),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceFetcher for StubFetcher {
    async fn fetch(
        &self,
        _repo_url: &str,
        _reference: Option<&str>,
    ) -> Result<Vec<SourceFile>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// 按顺序返回预设结果的请求桩，记录收到的提示词
pub struct StubRequester {
    results: Mutex<Vec<Result<String, RequestError>>>,
    prompts: Mutex<Vec<String>>,
}

impl StubRequester {
    pub fn sequence(results: Vec<Result<String, RequestError>>) -> Self {
        Self {
            results: Mutex::new(results.into_iter().rev().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(feedback: &str) -> Self {
        Self::sequence(vec![Ok(feedback.to_string())])
    }

    pub fn failing(err: RequestError) -> Self {
        Self::sequence(vec![Err(err)])
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReviewRequester for StubRequester {
    async fn request_review(&self, prompt: &str) -> Result<String, RequestError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.results
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(RequestError::TransportFailure("no stubbed reply".into())))
    }
}
