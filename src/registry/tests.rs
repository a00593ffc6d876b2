use super::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const FIXTURE: &str = r#"{
  "elm/core": ["1.0.0", "1.0.1", "1.0.5"],
  "elm/http": ["1.0.0", "2.0.0"],
  "NoRedInk/elm-json-decode-pipeline": ["1.0.0"],
  "a/b": ["3.0.0", "1.0.0", "2.0.0"]
}"#;

/// 在本地起一个只应答一次的 HTTP 服务，返回其 URL
async fn serve_once(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 4096];
        let _ = socket.read(&mut buf).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });
    format!("http://{}/all-packages", addr)
}

fn local_client(url: String) -> RegistryClient {
    let client = Client::builder().no_proxy().build().unwrap();
    RegistryClient::with_client(client, url)
}

#[test]
fn parse_keeps_document_order() {
    let index = parse_index(FIXTURE).unwrap();
    let names: Vec<&str> = index.iter().map(|(name, _)| name).collect();
    assert_eq!(
        names,
        vec!["elm/core", "elm/http", "NoRedInk/elm-json-decode-pipeline", "a/b"]
    );
    assert_eq!(
        index.get("a/b").unwrap(),
        &["3.0.0".to_string(), "1.0.0".to_string(), "2.0.0".to_string()]
    );
}

#[test]
fn empty_version_lists_are_dropped() {
    let index = parse_index(r#"{"x/empty": [], "x/full": ["1.0.0"]}"#).unwrap();
    assert_eq!(index.len(), 1);
    assert!(index.get("x/empty").is_none());
    assert!(index.get("x/full").is_some());
}

#[test]
fn duplicate_keys_keep_first_position_and_last_value() {
    let index = parse_index(r#"{"a/a": ["1.0.0"], "b/b": ["1.0.0"], "a/a": ["2.0.0"]}"#).unwrap();
    let names: Vec<&str> = index.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["a/a", "b/b"]);
    assert_eq!(index.get("a/a").unwrap(), &["2.0.0".to_string()]);
}

#[test]
fn shape_mismatch_is_a_parse_error() {
    for body in [
        "not json",
        r#"["elm/core"]"#,
        r#"{"elm/core": "1.0.0"}"#,
        r#"{"elm/core": [1, 2]}"#,
    ] {
        let err = parse_index(body).unwrap_err();
        assert!(err.is_parse(), "{body} should be a parse error");
        assert!(!err.is_transport());
    }
}

#[test]
fn empty_object_is_an_empty_index() {
    assert!(parse_index("{}").unwrap().is_empty());
}

#[tokio::test]
async fn fetch_returns_fixture_in_order() {
    let url = serve_once("200 OK", FIXTURE).await;
    let index = local_client(url).fetch_index().await.unwrap();
    assert_eq!(index, parse_index(FIXTURE).unwrap());
    assert_eq!(index.len(), 4);
}

#[tokio::test]
async fn fetch_surfaces_malformed_body() {
    let url = serve_once("200 OK", "<html>oops</html>").await;
    let err = local_client(url).fetch_index().await.unwrap_err();
    assert!(err.is_parse());
}

#[tokio::test]
async fn fetch_surfaces_error_status() {
    let url = serve_once("503 Service Unavailable", "").await;
    let err = local_client(url).fetch_index().await.unwrap_err();
    assert!(err.is_transport());
    assert!(matches!(err, RegistryError::Status { status: 503, .. }));
}

#[tokio::test]
async fn fetch_surfaces_connection_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = local_client(format!("http://{}/all-packages", addr))
        .fetch_index()
        .await
        .unwrap_err();
    assert!(err.is_transport());
    assert!(matches!(err, RegistryError::Transport(_)));
}

#[test]
fn client_uses_configured_url() {
    let config = Config {
        registry_url: "http://localhost:9/all-packages".to_string(),
        ..Config::default()
    };
    let client = RegistryClient::new(&config).unwrap();
    assert_eq!(client.url(), "http://localhost:9/all-packages");
}
