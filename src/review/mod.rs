//! 代码审查流程
//!
//! 一次审查依次经过：拉取仓库源码（[`fetcher`]）、组装提示词（[`prompt`]）、
//! 请求生成式文本服务（[`requester`]），最后由 [`orchestrator`] 写回提交记录。
//! 外部服务都隐藏在 trait 之后，测试中可以替换为桩实现。

pub mod errors;
pub mod fetcher;
pub mod github;
pub mod orchestrator;
pub mod prompt;
pub mod requester;

pub use errors::{FetchError, RequestError};
pub use fetcher::{RepositoryFetcher, SourceFetcher, SourceFile};
pub use github::{GithubApi, HostingApi, RepoLocator};
pub use orchestrator::{
    MALFORMED_FEEDBACK, ReviewError, ReviewOrchestrator, ReviewOutcome, ReviewStage,
};
pub use prompt::PromptAssembler;
pub use requester::{GeminiRequester, ReviewRequester};
