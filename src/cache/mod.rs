//! 身份缓存
//!
//! 以 access token 为键缓存已解析的用户，避免每个请求都回表查询。
//! 仅使用进程内的 Moka 缓存，TTL 与容量来自 `[cache]` 配置。

use moka::future::Cache;
use std::time::Duration;
use tracing::debug;

use crate::config::CacheConfig;
use crate::models::users::entities::User;

pub enum CacheResult<T> {
    Found(T),
    NotFound,
}

#[derive(Clone)]
pub struct IdentityCache {
    inner: Cache<String, User>,
}

impl IdentityCache {
    pub fn new(config: &CacheConfig) -> Self {
        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.default_ttl))
            .build();

        debug!(
            "IdentityCache initialized with max capacity: {}, ttl: {}s",
            config.max_capacity, config.default_ttl
        );
        Self { inner }
    }

    fn key(token: &str) -> String {
        format!("user:{token}")
    }

    pub async fn get(&self, token: &str) -> CacheResult<User> {
        match self.inner.get(&Self::key(token)).await {
            Some(user) => CacheResult::Found(user),
            None => CacheResult::NotFound,
        }
    }

    pub async fn insert(&self, token: &str, user: User) {
        self.inner.insert(Self::key(token), user).await;
    }
}
