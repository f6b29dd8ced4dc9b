//! Minimal HTTP/1.1 server serving one tile body for integration tests.
//!
//! Answers every GET with the full body and a `Content-MD5` header (correct,
//! wrong, or absent). The body can be paced or cut short, and the server
//! counts the body bytes it actually managed to send.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use demsync_core::digest::ContentDigest;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub enum Md5Header {
    /// Digest of the served body.
    Correct,
    /// A fixed value, e.g. the digest of some other content.
    Fixed(String),
    Missing,
}

#[derive(Debug, Clone)]
pub struct TileServerOptions {
    pub md5: Md5Header,
    pub chunk_size: usize,
    /// Sleep before each body chunk.
    pub chunk_delay: Option<Duration>,
    /// Close the connection after this many body bytes (Content-Length still advertises the full size).
    pub truncate_after: Option<usize>,
    pub status: u16,
    /// Cancelled once the last body byte has been written to the socket.
    pub cancel_after_body: Option<CancellationToken>,
}

impl Default for TileServerOptions {
    fn default() -> Self {
        Self {
            md5: Md5Header::Correct,
            chunk_size: 16 * 1024,
            chunk_delay: None,
            truncate_after: None,
            status: 200,
            cancel_after_body: None,
        }
    }
}

pub struct TileServer {
    pub url: String,
    bytes_sent: Arc<AtomicU64>,
    requests: Arc<AtomicUsize>,
}

impl TileServer {
    /// Body bytes written to sockets so far, across all requests.
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread serving `body`. Runs until the process exits.
pub fn start(body: Vec<u8>) -> TileServer {
    start_with_options(body, TileServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: TileServerOptions) -> TileServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let bytes_sent = Arc::new(AtomicU64::new(0));
    let requests = Arc::new(AtomicUsize::new(0));
    {
        let bytes_sent = Arc::clone(&bytes_sent);
        let requests = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let body = Arc::clone(&body);
                let opts = opts.clone();
                let bytes_sent = Arc::clone(&bytes_sent);
                requests.fetch_add(1, Ordering::SeqCst);
                thread::spawn(move || handle(stream, &body, &opts, &bytes_sent));
            }
        });
    }
    TileServer {
        url: format!("http://127.0.0.1:{}/dem/tile.tif", port),
        bytes_sent,
        requests,
    }
}

fn handle(mut stream: TcpStream, body: &[u8], opts: &TileServerOptions, bytes_sent: &AtomicU64) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    if !read_request_head(&mut stream) {
        return;
    }

    let md5_header = match &opts.md5 {
        Md5Header::Correct => format!("Content-MD5: {}\r\n", ContentDigest::compute(body)),
        Md5Header::Fixed(v) => format!("Content-MD5: {}\r\n", v),
        Md5Header::Missing => String::new(),
    };
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: image/tiff\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
        opts.status,
        reason(opts.status),
        body.len(),
        md5_header
    );
    if stream.write_all(head.as_bytes()).is_err() {
        return;
    }
    let _ = stream.flush();

    let limit = opts.truncate_after.unwrap_or(body.len()).min(body.len());
    for chunk in body[..limit].chunks(opts.chunk_size.max(1)) {
        if let Some(d) = opts.chunk_delay {
            thread::sleep(d);
        }
        if stream.write_all(chunk).is_err() {
            return;
        }
        bytes_sent.fetch_add(chunk.len() as u64, Ordering::SeqCst);
    }
    let _ = stream.flush();
    if let Some(token) = &opts.cancel_after_body {
        token.cancel();
    }
    let _ = stream.shutdown(std::net::Shutdown::Both);
}

/// Reads until the blank line ending the request head. Returns false on EOF or error.
fn read_request_head(stream: &mut TcpStream) -> bool {
    let mut head = Vec::new();
    let mut buf = [0u8; 4096];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return false,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
        if head.len() > 64 * 1024 {
            return false;
        }
    }
    head.starts_with(b"GET ")
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
