//! Minimal IRC client used to send notices.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

use super::line::{sanitize, IrcLine};
use super::ChatTransport;
use crate::config::IrcConfig;
use crate::{PrwatchError, Result};

/// How long `quit` waits for the QUIT line to be flushed.
const QUIT_TIMEOUT: Duration = Duration::from_secs(5);

type LineReader = BufReader<OwnedReadHalf>;

/// A registered IRC connection.
///
/// A reader task answers server pings; a writer task owns the socket's
/// write half and sends queued lines in order.
pub struct IrcClient {
    outgoing: mpsc::UnboundedSender<String>,
    nick: String,
    writer: Mutex<Option<JoinHandle<()>>>,
    reader: JoinHandle<()>,
}

impl IrcClient {
    /// Connect, register and join the configured channel.
    ///
    /// Fails if the server cannot be reached or does not accept the
    /// registration within the configured timeout.
    pub async fn connect(config: &IrcConfig) -> Result<Self> {
        info!("Connecting to IRC server {}", config.server);

        let stream = TcpStream::connect(&config.server).await.map_err(|e| {
            PrwatchError::Chat(format!("failed to connect to {}: {}", config.server, e))
        })?;
        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half);

        let nick = timeout(
            Duration::from_secs(config.register_timeout_secs),
            register(&mut lines, &mut write_half, &config.nick),
        )
        .await
        .map_err(|_| PrwatchError::Chat("timed out waiting for registration".to_string()))??;
        info!("Registered on {} as {}", config.server, nick);

        let (outgoing, queued) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_loop(write_half, queued));
        let reader = tokio::spawn(read_loop(lines, outgoing.clone()));

        let client = Self {
            outgoing,
            nick,
            writer: Mutex::new(Some(writer)),
            reader,
        };
        client.join(&config.channel)?;
        Ok(client)
    }

    /// Nickname accepted by the server.
    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// Join `channel`.
    pub fn join(&self, channel: &str) -> Result<()> {
        info!("Joining {}", channel);
        self.send_line(format!("JOIN {}", sanitize(channel)))
    }

    /// Send QUIT and wait briefly for it to go out.
    pub async fn quit(&self, reason: &str) {
        if self
            .send_line(format!("QUIT :{}", sanitize(reason)))
            .is_err()
        {
            debug!("IRC connection already closed");
        }
        if let Some(writer) = self.writer.lock().await.take() {
            if timeout(QUIT_TIMEOUT, writer).await.is_err() {
                warn!("Timed out sending QUIT");
            }
        }
        self.reader.abort();
    }

    fn send_line(&self, line: String) -> Result<()> {
        self.outgoing
            .send(line)
            .map_err(|_| PrwatchError::Chat("connection closed".to_string()))
    }
}

impl Drop for IrcClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[async_trait]
impl ChatTransport for IrcClient {
    async fn notice(&self, channel: &str, text: &str) -> Result<()> {
        self.send_line(format!("NOTICE {} :{}", sanitize(channel), sanitize(text)))
    }
}

/// Send NICK/USER and wait for the welcome reply. Returns the accepted nick.
async fn register(
    lines: &mut LineReader,
    writer: &mut OwnedWriteHalf,
    nick: &str,
) -> Result<String> {
    let mut nick = sanitize(nick);
    write_line(writer, &format!("NICK {nick}")).await?;
    write_line(writer, &format!("USER {nick} 0 * :{nick}")).await?;

    let mut buf = Vec::new();
    loop {
        let Some(raw) = read_line(lines, &mut buf).await? else {
            return Err(PrwatchError::Chat(
                "connection closed during registration".to_string(),
            ));
        };
        let Some(line) = IrcLine::parse(&raw) else {
            continue;
        };

        match line.command {
            "001" => return Ok(nick),
            "PING" => write_line(writer, &pong(&line)).await?,
            // ERR_NICKNAMEINUSE
            "433" => {
                nick.push('_');
                debug!("Nickname taken, retrying as {}", nick);
                write_line(writer, &format!("NICK {nick}")).await?;
            }
            "ERROR" => {
                return Err(PrwatchError::Chat(format!(
                    "server refused registration: {}",
                    line.trailing().unwrap_or_default()
                )));
            }
            _ => trace!("<- {}", raw),
        }
    }
}

async fn write_loop(mut writer: OwnedWriteHalf, mut queued: mpsc::UnboundedReceiver<String>) {
    while let Some(line) = queued.recv().await {
        if let Err(e) = write_line(&mut writer, &line).await {
            warn!("IRC write failed: {}", e);
            break;
        }
        if line.starts_with("QUIT") {
            break;
        }
    }
    let _ = writer.shutdown().await;
}

async fn read_loop(mut lines: LineReader, outgoing: mpsc::UnboundedSender<String>) {
    let mut buf = Vec::new();
    loop {
        match read_line(&mut lines, &mut buf).await {
            Ok(Some(raw)) => {
                let Some(line) = IrcLine::parse(&raw) else {
                    continue;
                };
                match line.command {
                    "PING" => {
                        if outgoing.send(pong(&line)).is_err() {
                            break;
                        }
                    }
                    "ERROR" => warn!("IRC server error: {}", line.trailing().unwrap_or_default()),
                    _ => trace!("<- {}", raw),
                }
            }
            Ok(None) => {
                warn!("IRC connection closed by server");
                break;
            }
            Err(e) => {
                warn!("IRC read failed: {}", e);
                break;
            }
        }
    }
}

/// Read one line without its terminator. Bytes that are not UTF-8 are
/// replaced rather than rejected. `None` at end of stream.
async fn read_line(
    lines: &mut LineReader,
    buf: &mut Vec<u8>,
) -> std::io::Result<Option<String>> {
    buf.clear();
    if lines.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(buf);
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn pong(ping: &IrcLine<'_>) -> String {
    match ping.trailing() {
        Some(token) => format!("PONG :{token}"),
        None => "PONG".to_string(),
    }
}

async fn write_line(writer: &mut OwnedWriteHalf, line: &str) -> Result<()> {
    trace!("-> {}", line);
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\r\n").await?;
    Ok(())
}
