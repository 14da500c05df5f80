use crate::cache::IdentityCache;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::review::{
    GeminiRequester, GithubApi, PromptAssembler, RepositoryFetcher, ReviewOrchestrator,
};
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{info, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: IdentityCache,
    pub orchestrator: Arc<ReviewOrchestrator>,
}

/// 根据配置构建审查流程
///
/// 凭据从配置显式传入各组件，组件内部不再读取全局配置。
pub fn build_review_orchestrator(
    config: &AppConfig,
    storage: Arc<dyn Storage>,
) -> Result<ReviewOrchestrator> {
    if config.github.token.is_empty() {
        warn!("GitHub token is not configured, anonymous requests are heavily rate limited");
    }

    let hosting = Arc::new(GithubApi::new(&config.github)?);
    let fetcher = Arc::new(RepositoryFetcher::new(hosting, &config.github));
    let requester = Arc::new(GeminiRequester::new(&config.llm)?);
    let assembler = PromptAssembler::new(config.llm.max_prompt_chars);

    info!(
        "Review pipeline ready: github={}, llm={} ({}), extensions={:?}",
        config.github.api_base,
        requester.endpoint(),
        config.llm.model,
        config.github.extensions
    );

    Ok(ReviewOrchestrator::new(
        storage, fetcher, requester, assembler,
    ))
}

/// 准备服务器启动的上下文
/// 包括存储、身份缓存和审查流程
pub async fn prepare_server_startup() -> Result<StartupContext> {
    // 重复安装时返回 Err，忽略即可
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = AppConfig::get();

    let storage = crate::storage::create_storage(&config.database).await?;
    warn!("Storage backend initialized and migrations completed");

    let cache = IdentityCache::new(&config.cache);
    warn!("Identity cache initialized");

    let orchestrator = Arc::new(build_review_orchestrator(config, storage.clone())?);

    Ok(StartupContext {
        storage,
        cache,
        orchestrator,
    })
}
