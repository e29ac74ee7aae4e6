//! Minimal HTTP/1.1 server for tests that need control over the socket itself

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// Serves the same canned response to every request and counts accepted connections.
pub struct RawServer {
    pub base_url: String,
    connections: Arc<AtomicUsize>,
}

impl RawServer {
    /// `response` is written verbatim. With `hang_up` set the socket is closed right after
    /// it; otherwise the connection is kept alive for further requests.
    pub async fn start(response: Vec<u8>, hang_up: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let connections = Arc::new(AtomicUsize::new(0));
        let response = Arc::new(response);

        let counter = connections.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let response = response.clone();
                tokio::spawn(serve_connection(socket, response, hang_up));
            }
        });

        Self {
            base_url,
            connections,
        }
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

async fn serve_connection(socket: TcpStream, response: Arc<Vec<u8>>, hang_up: bool) {
    let mut reader = BufReader::new(socket);
    loop {
        let Some(body_len) = read_request_head(&mut reader).await else {
            return;
        };
        // Drain the body so closing the socket never resets unread data.
        let mut body = vec![0u8; body_len];
        if reader.read_exact(&mut body).await.is_err() {
            return;
        }
        let socket = reader.get_mut();
        if socket.write_all(&response).await.is_err() || socket.flush().await.is_err() {
            return;
        }
        if hang_up {
            let _ = socket.shutdown().await;
            return;
        }
    }
}

/// Reads the request line and headers; returns the declared body length.
async fn read_request_head(reader: &mut BufReader<TcpStream>) -> Option<usize> {
    let mut content_length = 0;
    let mut saw_request_line = false;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await.ok()? == 0 {
            return None;
        }
        let line = line.trim_end();
        if line.is_empty() {
            if saw_request_line {
                return Some(content_length);
            }
            continue;
        }
        saw_request_line = true;
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
}

/// 200 response carrying all of `body`.
pub fn full_response(body: &[u8]) -> Vec<u8> {
    truncated_response(body.len(), body)
}

/// 200 response that declares `declared` bytes but only carries `body`.
pub fn truncated_response(declared: usize, body: &[u8]) -> Vec<u8> {
    let mut out = format!(
        "HTTP/1.1 200 OK\r\ncontent-type: audio/mpeg\r\ncontent-length: {}\r\nconnection: keep-alive\r\n\r\n",
        declared
    )
    .into_bytes();
    out.extend_from_slice(body);
    out
}
