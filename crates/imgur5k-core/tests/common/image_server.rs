//! Minimal HTTP/1.1 image host for integration tests.
//!
//! Serves fixed bodies by path. Unknown paths get a short 404 page, and when
//! a required agent is set, requests without it get a short 403 page, the way
//! the real host answers clients it does not like.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, Default)]
pub struct ImageServerOptions {
    /// If set, the `User-Agent` header must contain this text.
    pub required_agent: Option<String>,
}

/// Starts a server in a background thread serving `bodies` (path → bytes,
/// e.g. "/a1.jpg"). Returns the base URL without trailing slash
/// (e.g. "http://127.0.0.1:12345"). The server runs until the process exits.
pub fn start(bodies: HashMap<String, Vec<u8>>) -> String {
    start_with_options(bodies, ImageServerOptions::default())
}

pub fn start_with_options(bodies: HashMap<String, Vec<u8>>, opts: ImageServerOptions) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let bodies = Arc::new(bodies);
    let opts = Arc::new(opts);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let bodies = Arc::clone(&bodies);
            let opts = Arc::clone(&opts);
            thread::spawn(move || handle(stream, &bodies, &opts));
        }
    });
    format!("http://127.0.0.1:{}", port)
}

fn handle(mut stream: std::net::TcpStream, bodies: &HashMap<String, Vec<u8>>, opts: &ImageServerOptions) {
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
    let (path, agent) = parse_request(request);

    let agent_ok = match &opts.required_agent {
        Some(required) => agent.map(|a| a.contains(required.as_str())).unwrap_or(false),
        None => true,
    };
    let (status, body): (&str, &[u8]) = if !agent_ok {
        ("403 Forbidden", &b"forbidden"[..])
    } else {
        match bodies.get(path) {
            Some(b) => ("200 OK", b.as_slice()),
            None => ("404 Not Found", &b"not found"[..]),
        }
    };

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body);
}

/// Returns (path, optional User-Agent value).
fn parse_request(request: &str) -> (&str, Option<&str>) {
    let mut path = "";
    let mut agent = None;
    for (i, line) in request.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if i == 0 {
            path = line.split_whitespace().nth(1).unwrap_or("");
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("user-agent") {
                agent = Some(value.trim());
            }
        }
    }
    (path, agent)
}
