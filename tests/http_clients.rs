//! GitHub 与生成式文本服务 HTTP 客户端测试（wiremock）

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rust_hwreview::config::{GithubConfig, LlmConfig};
use rust_hwreview::review::github::EntryKind;
use rust_hwreview::review::{
    FetchError, GeminiRequester, GithubApi, HostingApi, RepoLocator, RepositoryFetcher,
    RequestError, ReviewRequester, SourceFetcher,
};

fn github_config(server: &MockServer) -> GithubConfig {
    GithubConfig {
        api_base: server.uri(),
        token: "ghp_test".to_string(),
        timeout_secs: 5,
        ..GithubConfig::default()
    }
}

fn llm_config(server: &MockServer, timeout_secs: u64) -> LlmConfig {
    LlmConfig {
        api_base: server.uri(),
        api_key: "llm-key".to_string(),
        model: "gemini-test".to_string(),
        timeout_secs,
        ..LlmConfig::default()
    }
}

fn locator() -> RepoLocator {
    RepoLocator::parse("https://github.com/u/repo").unwrap()
}

#[tokio::test]
async fn test_github_list_dir_sends_token_and_ref() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/u/repo/contents"))
        .and(header("authorization", "Bearer ghp_test"))
        .and(header("accept", "application/vnd.github+json"))
        .and(query_param("ref", "abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "main.py", "path": "main.py", "type": "file", "size": 10},
            {"name": "src", "path": "src", "type": "dir"},
            {"name": "vendor", "path": "vendor", "type": "submodule"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let api = GithubApi::new(&github_config(&server)).unwrap();
    let entries = api.list_dir(&locator(), "", Some("abc123")).await.unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].kind, EntryKind::File);
    assert_eq!(entries[1].kind, EntryKind::Dir);
    assert_eq!(entries[2].kind, EntryKind::Other);
}

#[tokio::test]
async fn test_github_get_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/u/repo/contents/src/app.js"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "app.js",
            "path": "src/app.js",
            "type": "file",
            "encoding": "base64",
            "content": STANDARD.encode("console.log(1);")
        })))
        .mount(&server)
        .await;

    let api = GithubApi::new(&github_config(&server)).unwrap();
    let blob = api.get_file(&locator(), "src/app.js", None).await.unwrap();

    assert_eq!(blob.encoding.as_deref(), Some("base64"));
    assert_eq!(
        STANDARD.decode(blob.content.unwrap()).unwrap(),
        b"console.log(1);"
    );
}

#[tokio::test]
async fn test_github_non_success_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/u/repo/contents"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;

    let api = GithubApi::new(&github_config(&server)).unwrap();
    match api.list_dir(&locator(), "", None).await {
        Err(FetchError::TransportFailure(detail)) => assert!(detail.contains("404")),
        other => panic!("expected transport failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_github_unparseable_listing_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/u/repo/contents"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let api = GithubApi::new(&github_config(&server)).unwrap();
    assert!(matches!(
        api.list_dir(&locator(), "", None).await,
        Err(FetchError::TransportFailure(_))
    ));
}

#[tokio::test]
async fn test_repository_fetcher_walks_mock_repository() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/u/repo/contents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "src", "path": "src", "type": "dir"},
            {"name": "README.md", "path": "README.md", "type": "file"},
            {"name": "main.py", "path": "main.py", "type": "file"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/u/repo/contents/src"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "util.py", "path": "src/util.py", "type": "file"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/u/repo/contents/main.py"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "encoding": "base64",
            // GitHub 返回的 base64 带换行
            "content": format!("{}\n", STANDARD.encode("import util\n"))
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/u/repo/contents/src/util.py"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "encoding": "base64",
            "content": STANDARD.encode("def f():\n    return 1\n")
        })))
        .mount(&server)
        .await;

    let config = github_config(&server);
    let api = Arc::new(GithubApi::new(&config).unwrap());
    let fetcher = RepositoryFetcher::new(api, &config);
    let files = fetcher
        .fetch("https://github.com/u/repo.git", None)
        .await
        .unwrap();

    let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["main.py", "src/util.py"]);
    assert_eq!(files[0].content, "import util\n");
    assert_eq!(files[1].content, "def f():\n    return 1\n");
}

#[tokio::test]
async fn test_gemini_request_shape_and_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .and(header("x-goog-api-key", "llm-key"))
        .and(body_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "review this"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Consider adding tests."}]},
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let requester = GeminiRequester::new(&llm_config(&server, 5)).unwrap();
    let feedback = requester.request_review("review this").await.unwrap();
    assert_eq!(feedback, "Consider adding tests.");
}

#[tokio::test]
async fn test_gemini_server_error_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let requester = GeminiRequester::new(&llm_config(&server, 5)).unwrap();
    match requester.request_review("p").await {
        Err(RequestError::TransportFailure(detail)) => assert!(detail.contains("500")),
        other => panic!("expected transport failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_gemini_unexpected_payload_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let requester = GeminiRequester::new(&llm_config(&server, 5)).unwrap();
    assert!(matches!(
        requester.request_review("p").await,
        Err(RequestError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_gemini_timeout_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"candidates": []}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let requester = GeminiRequester::new(&llm_config(&server, 1)).unwrap();
    assert!(matches!(
        requester.request_review("p").await,
        Err(RequestError::TransportFailure(_))
    ));
}

#[tokio::test]
async fn test_repository_fetcher_encodes_special_file_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/u/repo/contents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "a#1.py", "path": "a#1.py", "type": "file"},
            {"name": "b.py", "path": "b.py", "type": "file"},
            {"name": "50% off?.py", "path": "50% off?.py", "type": "file"}
        ])))
        .mount(&server)
        .await;
    for (encoded, body) in [
        ("/repos/u/repo/contents/a%231.py", "first = 1\n"),
        ("/repos/u/repo/contents/b.py", "second = 2\n"),
        ("/repos/u/repo/contents/50%25%20off%3F.py", "third = 3\n"),
    ] {
        Mock::given(method("GET"))
            .and(path(encoded))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "encoding": "base64",
                "content": STANDARD.encode(body)
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let config = github_config(&server);
    let api = Arc::new(GithubApi::new(&config).unwrap());
    let files = RepositoryFetcher::new(api, &config)
        .fetch("https://github.com/u/repo", None)
        .await
        .unwrap();

    let found: Vec<(&str, &str)> = files
        .iter()
        .map(|f| (f.path.as_str(), f.content.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("50% off?.py", "third = 3\n"),
            ("a#1.py", "first = 1\n"),
            ("b.py", "second = 2\n"),
        ]
    );
}
