use serde::{Deserialize, Serialize};

/// 业务错误码
///
/// 0 表示成功；1xxx 通用错误；2xxx 认证与用户；3xxx 作业；4xxx 提交与审查。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    AuthFailed = 2000,
    RegisterFailed = 2001,
    UserNameInvalid = 2002,
    UserEmailInvalid = 2003,
    UserPasswordInvalid = 2004,
    UserNameAlreadyExists = 2005,
    UserEmailAlreadyExists = 2006,
    UserRolesInvalid = 2007,

    AssignmentNotFound = 3000,
    AssignmentCreateFailed = 3001,
    AssignmentInvalid = 3002,

    SubmissionNotFound = 4000,
    SubmissionCreateFailed = 4001,
    DuplicateSubmission = 4002,
    RepoUrlInvalid = 4003,
    ReviewInProgress = 4100,
    ReviewFetchFailed = 4101,
    ReviewUpstreamFailed = 4102,
    ReviewPersistFailed = 4103,
}
