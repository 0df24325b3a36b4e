//! Minimal HTTP/1.1 origin for integration tests.
//!
//! Serves one static body at every path. Can block HEAD, lie about the size
//! in HEAD, omit Content-Length on GET, fail with a fixed status, and
//! redirect paths under `/r/` to the same path without the prefix.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, Copy)]
pub struct MediaServerOptions {
    /// If false, HEAD returns 405 (simulates origins that block HEAD).
    pub head_allowed: bool,
    /// Content-Type sent with HEAD and GET; omitted when `None`.
    pub content_type: Option<&'static str>,
    /// Content-Length announced by HEAD instead of the real body length.
    pub head_length: Option<u64>,
    /// If true, GET sends no Content-Length and closes the connection after the body.
    pub get_without_length: bool,
    /// Status for every request instead of 200.
    pub status: Option<u16>,
}

impl Default for MediaServerOptions {
    fn default() -> Self {
        Self {
            head_allowed: true,
            content_type: Some("application/octet-stream"),
            head_length: None,
            get_without_length: false,
            status: None,
        }
    }
}

/// Starts a server in a background thread serving `body`. Returns the base URL
/// without a trailing slash (e.g. "http://127.0.0.1:12345"). Runs until the process exits.
pub fn start(body: Vec<u8>, content_type: &'static str) -> String {
    start_with_options(
        body,
        MediaServerOptions {
            content_type: Some(content_type),
            ..MediaServerOptions::default()
        },
    )
}

pub fn start_with_options(body: Vec<u8>, opts: MediaServerOptions) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            thread::spawn(move || handle(stream, &body, opts));
        }
    });
    format!("http://127.0.0.1:{}", port)
}

fn handle(mut stream: std::net::TcpStream, body: &[u8], opts: MediaServerOptions) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (method, path) = parse_request_line(request);

    if let Some(rest) = path.strip_prefix("/r/") {
        let response = format!(
            "HTTP/1.1 302 Found\r\nLocation: /{}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            rest
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if let Some(code) = opts.status {
        let response = format!(
            "HTTP/1.1 {} Error\r\nContent-Length: 5\r\nConnection: close\r\n\r\noops!",
            code
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    let content_type = opts
        .content_type
        .map(|ct| format!("Content-Type: {}\r\n", ct))
        .unwrap_or_default();
    let total = body.len() as u64;

    if method.eq_ignore_ascii_case("HEAD") {
        if !opts.head_allowed {
            let _ = stream.write_all(
                b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
            return;
        }
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
            opts.head_length.unwrap_or(total),
            content_type
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if method.eq_ignore_ascii_case("GET") {
        let length = if opts.get_without_length {
            String::new()
        } else {
            format!("Content-Length: {}\r\n", total)
        };
        let response = format!(
            "HTTP/1.1 200 OK\r\n{}{}Connection: close\r\n\r\n",
            length, content_type
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.write_all(body);
        return;
    }
    let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\n\r\n");
}

/// Returns (method, path) from the request line.
fn parse_request_line(request: &str) -> (&str, &str) {
    let line = request.lines().next().unwrap_or("");
    let mut parts = line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("/");
    (method, path)
}
