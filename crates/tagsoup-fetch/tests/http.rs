use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tagsoup_fetch::{FormulaClient, HttpFetcher};
use tagsoup_markup::error::ServiceError;
use tagsoup_markup::{Fetch, FormulaService};

/// Serves one canned response on a local port and hands back the raw request.
fn serve_once(status: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request(&mut stream);
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
        tx.send(request).unwrap();
    });

    (format!("http://{addr}"), rx)
}

fn read_request(stream: &mut impl Read) -> String {
    let mut data = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = stream.read(&mut chunk).unwrap();
        data.extend_from_slice(&chunk[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        assert!(n > 0, "connection closed before headers ended");
    };

    let headers = String::from_utf8_lossy(&data[..header_end]).to_lowercase();
    let length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .map_or(0, |v| v.trim().parse::<usize>().unwrap());
    while data.len() < header_end + length {
        let n = stream.read(&mut chunk).unwrap();
        assert!(n > 0, "connection closed before body ended");
        data.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8(data).unwrap()
}

#[test]
fn test_get_sends_query() {
    let (base, rx) = serve_once("200 OK", r#"{"result": {}}"#);
    let fetcher = HttpFetcher::new(Duration::from_secs(5));

    let response = fetcher
        .get(&format!("{base}/api"), &[("a", "play_list"), ("mix_vid", "t_zIo")])
        .unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, r#"{"result": {}}"#);

    let request = rx.recv().unwrap();
    assert!(
        request.starts_with("GET /api?a=play_list&mix_vid=t_zIo HTTP/1.1"),
        "{request}"
    );
}

#[test]
fn test_post_form_encodes_body() {
    let (base, rx) = serve_once("200 OK", r#"{"flash": "x"}"#);
    let fetcher = HttpFetcher::new(Duration::from_secs(5));

    let response = fetcher
        .post_form(&format!("{base}/get.do"), &[("url", "http://tv.sohu.com/a b")])
        .unwrap();
    assert_eq!(response.json().unwrap()["flash"], "x");

    let request = rx.recv().unwrap();
    assert!(request.starts_with("POST /get.do HTTP/1.1"), "{request}");
    let body = request.split("\r\n\r\n").nth(1).unwrap();
    assert!(body.starts_with("url=http%3A%2F%2Ftv.sohu.com"), "{body}");
}

#[test]
fn test_error_status_is_a_response() {
    let (base, _rx) = serve_once("404 Not Found", "{}");
    let fetcher = HttpFetcher::new(Duration::from_secs(5));
    let response = fetcher.get(&base, &[]).unwrap();
    assert_eq!(response.status, 404);
}

#[test]
fn test_connection_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let fetcher = HttpFetcher::new(Duration::from_secs(5));
    let err = fetcher.get(&format!("http://{addr}/"), &[]).unwrap_err();
    assert!(matches!(err, ServiceError::Request { .. }), "{err:?}");
}

#[test]
fn test_formula_create_posts_code() {
    let (base, rx) = serve_once("201 Created", "");
    let client = FormulaClient::new(&base, "/formula/{hash}.{format}", Duration::from_secs(5));

    client.create("x^2").unwrap();
    let request = rx.recv().unwrap();
    assert!(request.starts_with("POST / HTTP/1.1"), "{request}");
    let body = request.split("\r\n\r\n").nth(1).unwrap();
    assert!(body.starts_with("code=x"), "{body}");
    assert!(!body.contains('^'), "{body}");
}

#[test]
fn test_formula_create_rejected() {
    let (base, _rx) = serve_once("500 Internal Server Error", "boom");
    let client = FormulaClient::new(&base, "/formula/{hash}.{format}", Duration::from_secs(5));

    let err = client.create("x^2").unwrap_err();
    assert!(
        matches!(err, ServiceError::Status { status: 500, .. }),
        "{err:?}"
    );
}
