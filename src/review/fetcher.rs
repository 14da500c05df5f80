//! 仓库源码拉取
//!
//! 从仓库根目录开始广度优先遍历，只读取扩展名匹配的文件。
//! 每一层目录列表按路径排序，同一快照下输出顺序稳定。

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::errors::FetchError;
use super::github::{EntryKind, FileBlob, HostingApi, RepoEntry, RepoLocator};
use crate::config::GithubConfig;

/// 拉取到的单个源码文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// 拉取仓库中所有相关源码文件，按遍历顺序返回
    async fn fetch(
        &self,
        repo_url: &str,
        reference: Option<&str>,
    ) -> Result<Vec<SourceFile>, FetchError>;
}

pub struct RepositoryFetcher {
    api: Arc<dyn HostingApi>,
    extensions: Vec<String>,
    max_files: usize,
}

impl RepositoryFetcher {
    pub fn new(api: Arc<dyn HostingApi>, config: &GithubConfig) -> Self {
        Self::with_extensions(api, &config.extensions, config.max_files)
    }

    pub fn with_extensions(
        api: Arc<dyn HostingApi>,
        extensions: &[String],
        max_files: usize,
    ) -> Self {
        Self {
            api,
            extensions: extensions.iter().map(|e| e.to_ascii_lowercase()).collect(),
            max_files: max_files.max(1),
        }
    }

    fn is_relevant(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    async fn list_sorted(
        &self,
        repo: &RepoLocator,
        path: &str,
        reference: Option<&str>,
    ) -> Result<Vec<RepoEntry>, FetchError> {
        let mut entries = self.api.list_dir(repo, path, reference).await?;
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }
}

#[async_trait]
impl SourceFetcher for RepositoryFetcher {
    async fn fetch(
        &self,
        repo_url: &str,
        reference: Option<&str>,
    ) -> Result<Vec<SourceFile>, FetchError> {
        let repo = RepoLocator::parse(repo_url)?;
        info!("Fetching sources from {} (ref: {:?})", repo, reference);

        let mut queue: VecDeque<RepoEntry> =
            self.list_sorted(&repo, "", reference).await?.into();
        let mut files = Vec::new();

        while let Some(entry) = queue.pop_front() {
            match entry.kind {
                EntryKind::Dir => {
                    let children = self.list_sorted(&repo, &entry.path, reference).await?;
                    queue.extend(children);
                }
                EntryKind::File if self.is_relevant(&entry.name) => {
                    if files.len() >= self.max_files {
                        warn!(
                            "File limit {} reached for {}, skipping remaining files",
                            self.max_files, repo
                        );
                        break;
                    }

                    let blob = self.api.get_file(&repo, &entry.path, reference).await?;
                    let content = decode_blob(&blob).unwrap_or_else(|e| {
                        warn!("Failed to decode {}: {}", entry.path, e);
                        format!("[Error decoding file: {e}]")
                    });
                    files.push(SourceFile::new(entry.path, content));
                }
                _ => debug!("Skipping {}", entry.path),
            }
        }

        if files.is_empty() {
            return Err(FetchError::NoRelevantFiles);
        }

        info!("Fetched {} source files from {}", files.len(), repo);
        Ok(files)
    }
}

/// 解码文件内容：base64（忽略换行等空白）或原始文本
pub(crate) fn decode_blob(blob: &FileBlob) -> Result<String, String> {
    let content = blob.content.as_deref().unwrap_or_default();
    match blob.encoding.as_deref() {
        Some("base64") => {
            let cleaned: String = content.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = STANDARD
                .decode(cleaned.as_bytes())
                .map_err(|e| format!("invalid base64: {e}"))?;
            String::from_utf8(bytes).map_err(|e| format!("not valid UTF-8: {e}"))
        }
        None | Some("") | Some("utf-8") => Ok(content.to_string()),
        Some(other) => Err(format!("unsupported encoding '{other}'")),
    }
}
