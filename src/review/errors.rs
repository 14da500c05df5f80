use std::fmt;

/// 拉取仓库源码时的错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// 仓库地址不符合 `https://<host>/<owner>/<repo>[.git]`
    InvalidRepoUrl(String),
    /// 遍历结束后没有任何匹配扩展名的文件
    NoRelevantFiles,
    /// 托管平台请求失败（超时、连接错误、非 2xx、无法解析的目录列表）
    TransportFailure(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::InvalidRepoUrl(url) => write!(f, "Invalid repository URL: {url}"),
            FetchError::NoRelevantFiles => {
                write!(f, "No relevant source files found in repository")
            }
            FetchError::TransportFailure(detail) => {
                write!(f, "Repository fetch failed: {detail}")
            }
        }
    }
}

impl std::error::Error for FetchError {}

/// 请求生成式文本服务时的错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// 2xx 响应中没有可用的生成文本
    MalformedResponse(String),
    /// 超时、连接错误或非 2xx 状态码
    TransportFailure(String),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::MalformedResponse(detail) => {
                write!(f, "Malformed response from review service: {detail}")
            }
            RequestError::TransportFailure(detail) => {
                write!(f, "Review service request failed: {detail}")
            }
        }
    }
}

impl std::error::Error for RequestError {}
