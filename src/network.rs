//! Greeting backend: a single `GET /` route returning a fixed JSON payload.
//!
//! Speaks just enough HTTP/1.1 for browsers and curl. One request per
//! connection, answered with `Connection: close`.

use anyhow::{Context, Result};
use serde::Serialize;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

pub const GREETING: &str = "Hello from Backend 🚀";

/// Header lines read before giving up on a request
const MAX_HEADER_LINES: usize = 100;

/// Longest request or header line accepted, terminator included
const MAX_LINE_BYTES: usize = 8 * 1024;

/// Time a client gets to send the request line and headers
const HEADER_TIMEOUT: Duration = Duration::from_secs(10);

/// Bounds on draining unread input after the response is written
const LINGER_TIMEOUT: Duration = Duration::from_secs(1);
const LINGER_MAX_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Clone, Serialize)]
pub struct Greeting {
    pub message: &'static str,
}

impl Default for Greeting {
    fn default() -> Self {
        Self { message: GREETING }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub reason: &'static str,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    fn json<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self {
            status: 200,
            reason: "OK",
            content_type: "application/json; charset=utf-8",
            body: serde_json::to_vec(value).context("Failed to serialize response")?,
        })
    }

    fn text(status: u16, reason: &'static str, body: String) -> Self {
        Self {
            status,
            reason,
            content_type: "text/plain; charset=utf-8",
            body: body.into_bytes(),
        }
    }

    /// Plain-text error whose body is the reason phrase
    fn error(status: u16, reason: &'static str) -> Self {
        Self::text(status, reason, reason.to_string())
    }

    /// Serialize status line, headers and (unless `head_only`) the body
    pub fn to_bytes(&self, head_only: bool) -> Vec<u8> {
        let mut out = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status,
            self.reason,
            self.content_type,
            self.body.len()
        )
        .into_bytes();
        if !head_only {
            out.extend_from_slice(&self.body);
        }
        out
    }
}

/// Map a request to its response
///
/// HEAD is answered like GET; the body is dropped when writing.
pub fn route(method: &str, target: &str) -> Result<Response> {
    let path = target.split('?').next().unwrap_or(target);

    match (method, path) {
        ("GET" | "HEAD", "/") => Response::json(&Greeting::default()),
        _ => Ok(Response::text(
            404,
            "Not Found",
            format!("Cannot {} {}", method, path),
        )),
    }
}

/// What the request head turned out to be
#[derive(Debug, PartialEq, Eq)]
enum RequestHead {
    /// Peer closed without sending anything
    Closed,
    Request { method: String, target: String },
    /// Answer with this error instead of routing
    Rejected(Response),
}

/// One line read under [`MAX_LINE_BYTES`]
#[derive(Debug, PartialEq, Eq)]
enum BoundedLine {
    Eof,
    Line(Vec<u8>),
    TooLong,
}

pub struct GreetingServer {
    listener: TcpListener,
}

impl GreetingServer {
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .context(format!("Failed to bind {}", addr))?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, one task per connection
    pub async fn run(self) -> Result<()> {
        let port = self.local_addr()?.port();
        info!("Backend running on port {}", port);

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, peer).await {
                    error!(error = ?e, %peer, "Connection error");
                }
            });
        }
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr) -> Result<()> {
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);

    let head = match timeout(HEADER_TIMEOUT, read_request_head(&mut reader)).await {
        Ok(head) => head?,
        Err(_) => {
            warn!("{} did not finish its request headers in time", peer);
            RequestHead::Rejected(Response::error(408, "Request Timeout"))
        }
    };

    let (response, head_only) = match head {
        RequestHead::Closed => {
            debug!("{} closed before sending a request", peer);
            return Ok(());
        }
        RequestHead::Request { method, target } => {
            debug!("{} {} {}", peer, method, target);
            (route(&method, &target)?, method == "HEAD")
        }
        RequestHead::Rejected(response) => {
            warn!("Rejected request from {}: {} {}", peer, response.status, response.reason);
            (response, false)
        }
    };

    writer.write_all(&response.to_bytes(head_only)).await?;
    writer.flush().await?;
    writer.shutdown().await?;

    // Closing with unread input would reset the connection under the response
    linger(&mut reader).await;
    Ok(())
}

/// Read the request line and the headers behind it
async fn read_request_head<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<RequestHead> {
    let line = match read_bounded_line(reader).await? {
        BoundedLine::Eof => return Ok(RequestHead::Closed),
        BoundedLine::TooLong => {
            return Ok(RequestHead::Rejected(Response::error(414, "URI Too Long")))
        }
        BoundedLine::Line(line) => line,
    };

    if let Some(rejected) = skip_headers(reader).await? {
        return Ok(RequestHead::Rejected(rejected));
    }

    let bad_request = || RequestHead::Rejected(Response::error(400, "Bad Request"));
    let Ok(line) = String::from_utf8(line) else {
        return Ok(bad_request());
    };

    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(method), Some(target), Some(version), None) if version.starts_with("HTTP/") => {
            Ok(RequestHead::Request {
                method: method.to_string(),
                target: target.to_string(),
            })
        }
        _ => Ok(bad_request()),
    }
}

/// Read up to and including `\n`, stopping at [`MAX_LINE_BYTES`]
async fn read_bounded_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<BoundedLine> {
    let mut line = Vec::new();
    let read = (&mut *reader)
        .take(MAX_LINE_BYTES as u64)
        .read_until(b'\n', &mut line)
        .await?;

    if read == 0 {
        Ok(BoundedLine::Eof)
    } else if !line.ends_with(b"\n") && line.len() >= MAX_LINE_BYTES {
        Ok(BoundedLine::TooLong)
    } else {
        Ok(BoundedLine::Line(line))
    }
}

/// Consume header lines up to the blank separator
///
/// Returns the error to send if the headers are too large.
async fn skip_headers<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Option<Response>> {
    let too_large = || Some(Response::error(431, "Request Header Fields Too Large"));

    for _ in 0..MAX_HEADER_LINES {
        match read_bounded_line(reader).await? {
            BoundedLine::Eof => return Ok(None),
            BoundedLine::TooLong => return Ok(too_large()),
            BoundedLine::Line(line) => {
                if line.iter().all(|b| *b == b'\r' || *b == b'\n') {
                    return Ok(None);
                }
            }
        }
    }
    Ok(too_large())
}

/// Discard whatever the peer still sends, within [`LINGER_TIMEOUT`] and [`LINGER_MAX_BYTES`]
async fn linger<R: AsyncRead + Unpin>(reader: &mut R) {
    let mut rest = (&mut *reader).take(LINGER_MAX_BYTES);
    let _ = timeout(LINGER_TIMEOUT, tokio::io::copy(&mut rest, &mut tokio::io::sink())).await;
}
