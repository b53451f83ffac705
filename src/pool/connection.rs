//! Cache-Server Connection
//!
//! A single connection speaking a minimal RESP3 subset: enough for the
//! handshake (`HELLO 3`, with inline AUTH when a credential is configured)
//! plus EXISTS/HGET/HSET/DEL/PING. All socket work is timeout-bound.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::error::{CacheError, CacheResult};

/// Per-connect and per-command I/O deadline.
const IO_TIMEOUT: Duration = Duration::from_secs(2);

// == Connect Target ==
/// Where and how to reach the cache server.
#[derive(Debug, Clone)]
pub struct ConnectTarget {
    pub host: String,
    pub port: u16,
    /// Omitted entirely from the handshake when absent
    pub password: Option<String>,
}

// == Reply Values ==
/// Decoded RESP3 reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Resp {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(String),
    Null,
    Boolean(bool),
    Array(Vec<Resp>),
    Map(Vec<(Resp, Resp)>),
}

// == Connection ==
/// One established, handshaken connection to the cache server.
#[derive(Debug)]
pub struct Connection {
    stream: BufStream<TcpStream>,
}

impl Connection {
    /// Dials the target and negotiates RESP3.
    pub async fn connect(target: &ConnectTarget) -> CacheResult<Self> {
        let addr = format!("{}:{}", target.host, target.port);
        let stream = timeout(IO_TIMEOUT, TcpStream::connect(&addr))
            .await
            .map_err(|_| CacheError::Timeout)??;

        let mut conn = Self {
            stream: BufStream::new(stream),
        };

        let reply = match &target.password {
            Some(password) => {
                conn.command(&["HELLO", "3", "AUTH", "default", password])
                    .await?
            }
            None => conn.command(&["HELLO", "3"]).await?,
        };

        match reply {
            // RESP3 servers answer HELLO with a map; a RESP2-style array is
            // tolerated for servers that downgrade the reply.
            Resp::Map(_) | Resp::Array(_) => Ok(conn),
            other => Err(CacheError::Protocol(format!(
                "unexpected HELLO reply: {:?}",
                other
            ))),
        }
    }

    // == Command ==
    /// Sends one command and decodes the reply, bounded by the I/O deadline.
    ///
    /// A server error reply is surfaced as `CacheError::Server`.
    pub async fn command(&mut self, parts: &[&str]) -> CacheResult<Resp> {
        let reply = timeout(IO_TIMEOUT, self.exchange(parts))
            .await
            .map_err(|_| CacheError::Timeout)??;

        match reply {
            Resp::Error(message) => Err(CacheError::Server(message)),
            reply => Ok(reply),
        }
    }

    /// Liveness probe used by the pool's idle sweep.
    pub async fn ping(&mut self) -> bool {
        matches!(
            self.command(&["PING"]).await,
            Ok(Resp::Simple(reply)) if reply == "PONG"
        )
    }

    async fn exchange(&mut self, parts: &[&str]) -> CacheResult<Resp> {
        self.write_command(parts).await?;
        self.read_reply().await
    }

    /// Encodes a command as an array of bulk strings.
    async fn write_command(&mut self, parts: &[&str]) -> CacheResult<()> {
        let mut buf = format!("*{}\r\n", parts.len());
        for part in parts {
            buf.push_str(&format!("${}\r\n{}\r\n", part.len(), part));
        }
        self.stream.write_all(buf.as_bytes()).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Decodes one reply value. Boxed for the recursive aggregate cases.
    fn read_reply(&mut self) -> Pin<Box<dyn Future<Output = CacheResult<Resp>> + Send + '_>> {
        Box::pin(async move {
            let line = self.read_line().await?;
            if line.is_empty() {
                return Err(CacheError::Protocol("empty reply line".to_string()));
            }
            let (tag, rest) = line.split_at(1);

            match tag {
                "+" => Ok(Resp::Simple(rest.to_string())),
                "-" => Ok(Resp::Error(rest.to_string())),
                ":" => rest
                    .parse()
                    .map(Resp::Integer)
                    .map_err(|_| CacheError::Protocol(format!("bad integer: {}", rest))),
                "#" => Ok(Resp::Boolean(rest == "t")),
                "_" => Ok(Resp::Null),
                "$" => {
                    let len: i64 = rest
                        .parse()
                        .map_err(|_| CacheError::Protocol(format!("bad bulk length: {}", rest)))?;
                    if len < 0 {
                        return Ok(Resp::Null);
                    }
                    self.read_bulk(len as usize).await
                }
                "*" => {
                    let len: i64 = rest
                        .parse()
                        .map_err(|_| CacheError::Protocol(format!("bad array length: {}", rest)))?;
                    if len < 0 {
                        return Ok(Resp::Null);
                    }
                    let mut items = Vec::with_capacity(len as usize);
                    for _ in 0..len {
                        items.push(self.read_reply().await?);
                    }
                    Ok(Resp::Array(items))
                }
                "%" => {
                    let pairs: usize = rest
                        .parse()
                        .map_err(|_| CacheError::Protocol(format!("bad map length: {}", rest)))?;
                    let mut entries = Vec::with_capacity(pairs);
                    for _ in 0..pairs {
                        let key = self.read_reply().await?;
                        let value = self.read_reply().await?;
                        entries.push((key, value));
                    }
                    Ok(Resp::Map(entries))
                }
                other => Err(CacheError::Protocol(format!(
                    "unsupported reply type: {:?}",
                    other
                ))),
            }
        })
    }

    /// Reads a payload of known length plus its trailing CRLF.
    async fn read_bulk(&mut self, len: usize) -> CacheResult<Resp> {
        let mut buf = vec![0u8; len + 2];
        self.stream.read_exact(&mut buf).await?;
        if &buf[len..] != b"\r\n" {
            return Err(CacheError::Protocol("bulk string missing CRLF".to_string()));
        }
        buf.truncate(len);
        String::from_utf8(buf)
            .map(Resp::Bulk)
            .map_err(|_| CacheError::Protocol("bulk string is not UTF-8".to_string()))
    }

    /// Reads one CRLF-terminated header line, without the terminator.
    async fn read_line(&mut self) -> CacheResult<String> {
        let mut line = String::new();
        let read = self.stream.read_line(&mut line).await?;
        if read == 0 {
            return Err(CacheError::Closed);
        }
        if !line.ends_with("\r\n") {
            return Err(CacheError::Protocol("reply line missing CRLF".to_string()));
        }
        line.truncate(line.len() - 2);
        Ok(line)
    }
}
