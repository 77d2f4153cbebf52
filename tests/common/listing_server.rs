//! Minimal HTTP/1.1 server that answers GET with a fixed storage listing.
//!
//! Optionally requires a Basic `Authorization` header, forces a status code,
//! or delays the response. Counts every request it answers.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub const LISTING_PATH: &str = "/api/storage/releases/?list&deep=1";

#[derive(Debug, Clone, Default)]
pub struct ListingServerOptions {
    /// Full expected `Authorization` value; requests without it get 401.
    pub required_auth: Option<String>,
    /// Respond with this status (and the body) instead of 200.
    pub status: Option<u16>,
    /// Sleep before responding.
    pub delay: Option<Duration>,
}

pub struct ListingServer {
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl ListingServer {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

pub fn start(body: &str) -> ListingServer {
    start_with_options(body, ListingServerOptions::default())
}

/// Starts a server in a background thread. The server runs until the process exits.
pub fn start_with_options(body: &str, opts: ListingServerOptions) -> ListingServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body.as_bytes().to_vec());
    let hits = Arc::new(AtomicUsize::new(0));
    let opts = Arc::new(opts);
    {
        let hits = Arc::clone(&hits);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let body = Arc::clone(&body);
                let hits = Arc::clone(&hits);
                let opts = Arc::clone(&opts);
                thread::spawn(move || handle(stream, &body, &opts, &hits));
            }
        });
    }
    ListingServer {
        url: format!("http://127.0.0.1:{}{}", port, LISTING_PATH),
        hits,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    body: &[u8],
    opts: &ListingServerOptions,
    hits: &AtomicUsize,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    let request = String::from_utf8_lossy(&request).to_string();
    hits.fetch_add(1, Ordering::SeqCst);

    if let Some(delay) = opts.delay {
        thread::sleep(delay);
    }

    if let Some(expected) = &opts.required_auth {
        if authorization(&request).as_deref() != Some(expected.as_str()) {
            let _ = stream.write_all(
                b"HTTP/1.1 401 Unauthorized\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
            return;
        }
    }

    let status = match opts.status.unwrap_or(200) {
        200 => "200 OK".to_string(),
        code => format!("{} Error", code),
    };
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\
         Connection: close\r\n\r\n",
        status,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

fn authorization(request: &str) -> Option<String> {
    request.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case("authorization")
            .then(|| value.trim().to_string())
    })
}
