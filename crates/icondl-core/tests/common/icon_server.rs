//! Minimal HTTP/1.1 server standing in for the Iconify API and the set-JSON host.
//!
//! Routes are keyed by request target (path plus query). Unknown targets get 404.
//! Every request is counted so tests can assert retry and fallback behavior.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub enum Route {
    /// 200 with this body and content type.
    Ok(&'static str, Vec<u8>),
    /// Bare status with an empty body.
    Status(u16),
    /// 503 for the first `failures` requests, then 200 with the body.
    FailThenOk(usize, Vec<u8>),
}

pub struct IconServer {
    base: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl IconServer {
    /// Base URL without a trailing slash, e.g. `http://127.0.0.1:12345`.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Requests seen for `target` (path plus query).
    pub fn hits(&self, target: &str) -> usize {
        self.hits.lock().unwrap().get(target).copied().unwrap_or(0)
    }
}

pub fn svg_route() -> Route {
    Route::Ok("image/svg+xml", br#"<svg xmlns="http://www.w3.org/2000/svg"/>"#.to_vec())
}

pub fn json_route(body: &str) -> Route {
    Route::Ok("application/json", body.as_bytes().to_vec())
}

/// Starts the server in a background thread. It runs until the process exits.
pub fn start<S: Into<String>>(routes: Vec<(S, Route)>) -> IconServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Route>> = Arc::new(
        routes
            .into_iter()
            .map(|(target, route)| (target.into(), route))
            .collect(),
    );
    let hits = Arc::new(Mutex::new(HashMap::new()));
    let server_hits = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&server_hits);
            thread::spawn(move || handle(stream, &routes, &hits));
        }
    });
    IconServer {
        base: format!("http://127.0.0.1:{}", port),
        hits,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    routes: &HashMap<String, Route>,
    hits: &Mutex<HashMap<String, usize>>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
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
    let target = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    let seen = {
        let mut hits = hits.lock().unwrap();
        let count = hits.entry(target.clone()).or_insert(0);
        *count += 1;
        *count
    };

    const EMPTY: &[u8] = b"";
    let (status, content_type, body): (&str, &str, &[u8]) = match routes.get(&target) {
        Some(Route::Ok(ct, body)) => ("200 OK", *ct, body.as_slice()),
        Some(Route::Status(404)) | None => ("404 Not Found", "text/plain", EMPTY),
        Some(Route::Status(500)) => ("500 Internal Server Error", "text/plain", EMPTY),
        Some(Route::Status(503)) => ("503 Service Unavailable", "text/plain", EMPTY),
        Some(Route::Status(_)) => ("400 Bad Request", "text/plain", EMPTY),
        Some(Route::FailThenOk(failures, body)) => {
            if seen <= *failures {
                ("503 Service Unavailable", "text/plain", EMPTY)
            } else {
                ("200 OK", "image/svg+xml", body.as_slice())
            }
        }
    };
    let header = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    );
    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(body);
}
