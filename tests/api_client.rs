#![cfg(feature = "network")]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use repotype::api::types::{ExtensionSelection, FileStatus};
use repotype::api::{ApiClient, ApiError, RepositoryService};

struct Captured {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Answers exactly one request with `status` and `body`, handing back what
/// the client sent.
fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        let mut headers = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((key, value)) = line.split_once(':') {
                headers.push((key.trim().to_string(), value.trim().to_string()));
            }
        }
        let length = headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.parse::<usize>().ok())
            .unwrap_or(0);
        let mut raw_body = vec![0; length];
        reader.read_exact(&mut raw_body).unwrap();

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
        stream.flush().unwrap();

        Captured {
            request_line: request_line.trim_end().to_string(),
            headers,
            body: String::from_utf8(raw_body).unwrap(),
        }
    });
    (base, handle)
}

fn client(base: &str) -> ApiClient {
    ApiClient::new(base, Some("secret".to_string()), Duration::from_secs(5)).unwrap()
}

#[test]
fn get_repository_sends_bearer_token() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"id":4,"name":"demo","file_items":[{"id":9,"name":"src","type":"dir","status":"untyped","file_items":[{"id":10,"name":"main.rs","type":"file","status":"typed"}]}]}"#,
    );
    let repo = client(&base).get_repository(4).unwrap();
    let captured = server.join().unwrap();

    assert_eq!(captured.request_line, "GET /api/repositories/4 HTTP/1.1");
    assert_eq!(captured.header("authorization"), Some("Bearer secret"));
    assert_eq!(captured.header("content-type"), Some("application/json"));
    assert_eq!(repo.name, "demo");
    assert_eq!(repo.typed_summary(), (1, 1));
    assert_eq!(repo.find_file(10).unwrap().status, FileStatus::Typed);
}

#[test]
fn get_file_item_returns_content() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"id":10,"name":"main.rs","type":"file","status":"untyped","content":"fn main() {}\n","full_path":"src/main.rs"}"#,
    );
    let item = client(&base).get_file_item(4, 10).unwrap();
    let captured = server.join().unwrap();

    assert_eq!(
        captured.request_line,
        "GET /api/repositories/4/file_items/10 HTTP/1.1"
    );
    assert_eq!(item.content.as_deref(), Some("fn main() {}\n"));
    assert_eq!(item.full_path.as_deref(), Some("src/main.rs"));
}

#[test]
fn mark_file_typed_patches_status() {
    let (base, server) = serve_once(
        "200 OK",
        r#"[{"id":10,"name":"main.rs","type":"file","status":"typed"}]"#,
    );
    let items = client(&base).mark_file_typed(4, 10).unwrap();
    let captured = server.join().unwrap();

    assert_eq!(
        captured.request_line,
        "PATCH /api/repositories/4/file_items/10 HTTP/1.1"
    );
    let body: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(body, serde_json::json!({"file_item": {"status": "typed"}}));
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].status, FileStatus::Typed);
}

#[test]
fn preview_encodes_url_query() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"name":"demo","extensions":[{"name":".rs","file_count":3,"is_active":true}]}"#,
    );
    let preview = client(&base)
        .preview_repository("https://github.com/a/b")
        .unwrap();
    let captured = server.join().unwrap();

    assert_eq!(
        captured.request_line,
        "GET /api/repositories/preview?url=https%3A%2F%2Fgithub.com%2Fa%2Fb HTTP/1.1"
    );
    assert_eq!(preview.extensions[0].file_count, 3);
}

#[test]
fn create_repository_posts_extensions() {
    let (base, server) = serve_once("201 Created", r#"{"id":5,"name":"b"}"#);
    let selections = vec![
        ExtensionSelection {
            name: ".rs".to_string(),
            is_active: true,
        },
        ExtensionSelection {
            name: ".md".to_string(),
            is_active: false,
        },
    ];
    let repo = client(&base)
        .create_repository("https://github.com/a/b", Some(selections.as_slice()))
        .unwrap();
    let captured = server.join().unwrap();

    assert_eq!(captured.request_line, "POST /api/repositories HTTP/1.1");
    let body: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"repository": {
            "url": "https://github.com/a/b",
            "extensions": [
                {"name": ".rs", "is_active": true},
                {"name": ".md", "is_active": false}
            ]
        }})
    );
    assert_eq!(repo.id, 5);
    assert!(repo.file_items.is_empty());
}

#[test]
fn validation_errors_flatten_in_order() {
    let (base, server) = serve_once(
        "422 Unprocessable Entity",
        r#"{"errors":{"url":["is invalid","is too long"],"name":["can't be blank"]}}"#,
    );
    let err = client(&base)
        .create_repository("nope", None)
        .unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, ApiError::Validation { status: 422, .. }));
    assert_eq!(
        err.user_message(),
        "- url is invalid\n- url is too long\n- name can't be blank"
    );
}

#[test]
fn backend_message_is_shown_verbatim() {
    let (base, server) = serve_once("404 Not Found", r#"{"message":"Repository not found"}"#);
    let err = client(&base).get_repository(99).unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, ApiError::Backend { status: 404, .. }));
    assert_eq!(err.user_message(), "Repository not found");
}

#[test]
fn closed_port_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = client(&base).get_repository(1).unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "got {err:?}");
    assert!(err.user_message().starts_with("Unable to reach the server"));
}

#[test]
fn slow_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let server = thread::spawn(move || {
        let (_stream, _) = listener.accept().unwrap();
        thread::sleep(Duration::from_secs(2));
    });

    let client = ApiClient::new(&base, None, Duration::from_millis(200)).unwrap();
    let err = client.get_repository(1).unwrap_err();
    assert!(matches!(err, ApiError::Timeout), "got {err:?}");
    server.join().unwrap();
}
