//! 代码托管平台访问
//!
//! [`HostingApi`] 抽象出审查所需的两个能力：列出目录、读取文件。
//! [`GithubApi`] 基于 GitHub REST contents API 实现。

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::errors::FetchError;
use crate::config::GithubConfig;
use crate::errors::{HWSystemError, Result};

static REPO_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://([A-Za-z0-9.-]+(?::\d+)?)/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?/?$")
        .expect("Invalid repository URL regex")
});

/// 解析后的仓库地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocator {
    pub host: String,
    pub owner: String,
    pub repo: String,
}

impl RepoLocator {
    pub fn parse(url: &str) -> std::result::Result<Self, FetchError> {
        let caps = REPO_URL_RE
            .captures(url.trim())
            .ok_or_else(|| FetchError::InvalidRepoUrl(url.to_string()))?;

        let repo = caps[3].to_string();
        if repo.is_empty() || repo == "." || repo == ".." {
            return Err(FetchError::InvalidRepoUrl(url.to_string()));
        }

        Ok(Self {
            host: caps[1].to_string(),
            owner: caps[2].to_string(),
            repo,
        })
    }
}

impl std::fmt::Display for RepoLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.host, self.owner, self.repo)
    }
}

/// 目录项类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    #[serde(other)]
    Other, // symlink、submodule 等，审查时忽略
}

/// 目录列表中的一项
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

/// 文件内容（可能是 base64 编码）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileBlob {
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[async_trait]
pub trait HostingApi: Send + Sync {
    /// 列出目录内容，`path` 为空表示仓库根目录
    async fn list_dir(
        &self,
        repo: &RepoLocator,
        path: &str,
        reference: Option<&str>,
    ) -> std::result::Result<Vec<RepoEntry>, FetchError>;

    /// 读取单个文件
    async fn get_file(
        &self,
        repo: &RepoLocator,
        path: &str,
        reference: Option<&str>,
    ) -> std::result::Result<FileBlob, FetchError>;
}

pub struct GithubApi {
    client: reqwest::Client,
    api_base: Url,
}

impl GithubApi {
    pub fn new(config: &GithubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        if !config.token.is_empty() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", config.token))
                .map_err(|e| HWSystemError::validation(format!("GitHub token 格式无效: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let api_base = Url::parse(&config.api_base)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                HWSystemError::validation(format!("GitHub API 地址无效: {}", config.api_base))
            })?;

        Ok(Self { client, api_base })
    }

    /// 每一段路径单独编码，文件名中的 `#`、`?`、`%` 不会改变请求的资源
    fn contents_url(&self, repo: &RepoLocator, path: &str) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["repos", repo.owner.as_str(), repo.repo.as_str(), "contents"])
                .extend(path.split('/').filter(|segment| !segment.is_empty()));
        }
        url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        reference: Option<&str>,
    ) -> std::result::Result<T, FetchError> {
        let mut request = self.client.get(url.clone());
        if let Some(reference) = reference {
            request = request.query(&[("ref", reference)]);
        }

        debug!("GitHub GET {}", url);
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::TransportFailure(format!("GET {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::TransportFailure(format!(
                "GET {url} returned {status}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::TransportFailure(format!("GET {url}: invalid body: {e}")))
    }
}

#[async_trait]
impl HostingApi for GithubApi {
    async fn list_dir(
        &self,
        repo: &RepoLocator,
        path: &str,
        reference: Option<&str>,
    ) -> std::result::Result<Vec<RepoEntry>, FetchError> {
        let url = self.contents_url(repo, path);
        self.get_json::<Vec<RepoEntry>>(url, reference).await
    }

    async fn get_file(
        &self,
        repo: &RepoLocator,
        path: &str,
        reference: Option<&str>,
    ) -> std::result::Result<FileBlob, FetchError> {
        let url = self.contents_url(repo, path);
        self.get_json::<FileBlob>(url, reference).await
    }
}
