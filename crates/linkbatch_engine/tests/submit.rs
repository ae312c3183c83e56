use std::time::Duration;

use linkbatch_engine::{
    ClientSettings, LinkOutcome, ReqwestSubmitter, ServiceContract, SubmitAck, SubmitError,
    Submitter,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer) -> ClientSettings {
    ClientSettings::new(Url::parse(&server.uri()).unwrap())
}

fn links(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

#[tokio::test]
async fn returns_task_id_and_sends_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/download"))
        .and(header("Authorization", "hunter2"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({"links": ["http://a", "http://b"]})))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"task_id": "t1"})))
        .expect(1)
        .mount(&server)
        .await;

    let submitter = ReqwestSubmitter::new(settings(&server));
    let ack = submitter
        .submit(&links(&["http://a", "http://b"]), Some("hunter2"))
        .await
        .expect("submit ok");
    assert_eq!(ack, SubmitAck::Task("t1".to_string()));
}

#[tokio::test]
async fn omits_authorization_without_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": 7})))
        .mount(&server)
        .await;

    let submitter = ReqwestSubmitter::new(settings(&server));
    for credential in [None, Some("")] {
        let ack = submitter.submit(&links(&["x"]), credential).await.unwrap();
        assert_eq!(ack, SubmitAck::Task("7".to_string()));
    }

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests
        .iter()
        .all(|request| !request.headers.contains_key("authorization")));
}

#[tokio::test]
async fn structured_error_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/download"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "db down"})))
        .mount(&server)
        .await;

    let err = ReqwestSubmitter::new(settings(&server))
        .submit(&links(&["http://a"]), None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        SubmitError::Request {
            status: 500,
            status_text: "Internal Server Error".to_string(),
            message: Some("db down".to_string()),
        }
    );
    let message = err.to_string();
    assert!(message.contains("500"));
    assert!(message.contains("db down"));
}

#[tokio::test]
async fn unstructured_error_body_reports_status_only() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/download"))
        .respond_with(ResponseTemplate::new(401).set_body_string("nope"))
        .mount(&server)
        .await;

    let err = ReqwestSubmitter::new(settings(&server))
        .submit(&links(&["http://a"]), Some("wrong"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Error: 401 Unauthorized");
}

#[tokio::test]
async fn success_without_task_id_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/download"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let err = ReqwestSubmitter::new(settings(&server))
        .submit(&links(&["http://a"]), None)
        .await
        .unwrap_err();
    assert_eq!(err, SubmitError::Protocol("no task id".to_string()));
}

/// Answers one request with `response` verbatim, then hangs up.
async fn serve_raw_once(response: &'static str) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        // The JSON request body is the last thing sent and ends with `}`.
        while !(request.windows(4).any(|w| w == b"\r\n\r\n") && request.ends_with(b"}")) {
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&chunk[..n]),
            }
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });
    addr
}

#[tokio::test]
async fn truncated_error_body_still_reports_status() {
    let addr = serve_raw_once(
        "HTTP/1.1 500 Internal Server Error\r\n\
         Content-Type: application/json\r\n\
         Content-Length: 100\r\n\r\n\
         {\"error\":",
    )
    .await;

    let settings = ClientSettings::new(Url::parse(&format!("http://{addr}")).unwrap());
    let err = tokio::time::timeout(
        Duration::from_secs(5),
        ReqwestSubmitter::new(settings).submit(&links(&["http://a"]), None),
    )
    .await
    .expect("submit should finish")
    .unwrap_err();

    assert_eq!(
        err,
        SubmitError::Request {
            status: 500,
            status_text: "Internal Server Error".to_string(),
            message: None,
        }
    );
    assert_eq!(err.to_string(), "Error: 500 Internal Server Error");
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    // Reserve a port, then free it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut settings = ClientSettings::new(Url::parse(&format!("http://{addr}")).unwrap());
    settings.connect_timeout = Duration::from_secs(2);
    let err = ReqwestSubmitter::new(settings)
        .submit(&links(&["http://a"]), None)
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn single_shot_contract_returns_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"link": "http://a", "status": "success"},
                {"link": "http://b", "status": "fail", "error": "exit status 1"}
            ]
        })))
        .mount(&server)
        .await;

    let mut settings = settings(&server);
    settings.contract = ServiceContract::SingleShot;
    let ack = ReqwestSubmitter::new(settings)
        .submit(&links(&["http://a", "http://b"]), None)
        .await
        .unwrap();
    assert_eq!(
        ack,
        SubmitAck::Results(vec![
            LinkOutcome {
                link: "http://a".to_string(),
                status: "success".to_string(),
                error: None,
            },
            LinkOutcome {
                link: "http://b".to_string(),
                status: "fail".to_string(),
                error: Some("exit status 1".to_string()),
            },
        ])
    );
}

#[tokio::test]
async fn single_shot_without_results_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "t1"})))
        .mount(&server)
        .await;

    let mut settings = settings(&server);
    settings.contract = ServiceContract::SingleShot;
    let err = ReqwestSubmitter::new(settings)
        .submit(&links(&["http://a"]), None)
        .await
        .unwrap_err();
    assert_eq!(err, SubmitError::Protocol("no results".to_string()));
}
