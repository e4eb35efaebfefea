//! IRC client tests against a scripted local server.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::time::timeout;

use prwatch::config::IrcConfig;
use prwatch::{ChatTransport, IrcClient};

/// Default timeout for test operations.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Server side of one client connection.
struct FakeServer {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl FakeServer {
    async fn accept(listener: &TcpListener) -> Self {
        let (stream, _) = timeout(DEFAULT_TIMEOUT, listener.accept())
            .await
            .expect("client did not connect")
            .unwrap();
        let (read_half, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        }
    }

    async fn expect(&mut self, expected: &str) {
        let line = timeout(DEFAULT_TIMEOUT, self.lines.next_line())
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {expected:?}"))
            .unwrap()
            .expect("connection closed");
        assert_eq!(line, expected);
    }

    async fn send(&mut self, line: &str) {
        self.send_bytes(line.as_bytes()).await;
    }

    async fn send_bytes(&mut self, line: &[u8]) {
        self.writer.write_all(line).await.unwrap();
        self.writer.write_all(b"\r\n").await.unwrap();
    }
}

async fn listen() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

fn config(addr: SocketAddr) -> IrcConfig {
    IrcConfig {
        server: addr.to_string(),
        channel: "#ci".to_string(),
        nick: "os-jenkins".to_string(),
        register_timeout_secs: 5,
    }
}

#[tokio::test]
async fn test_register_join_notice_and_quit() {
    let (listener, addr) = listen().await;

    let server = tokio::spawn(async move {
        let mut server = FakeServer::accept(&listener).await;
        server.expect("NICK os-jenkins").await;
        server.expect("USER os-jenkins 0 * :os-jenkins").await;
        server.send("PING :hello").await;
        server.expect("PONG :hello").await;
        server
            .send(":irc.example.com 001 os-jenkins :Welcome")
            .await;
        server.expect("JOIN #ci").await;
        server.expect("NOTICE #ci :PR#7 is \x02STILL FAILING\x0F").await;

        // Pings after registration are answered by the background reader.
        server.send("PING :later").await;
        server.expect("PONG :later").await;

        server.expect("QUIT :bye!").await;
    });

    let client = IrcClient::connect(&config(addr)).await.unwrap();
    assert_eq!(client.nick(), "os-jenkins");
    client
        .notice("#ci", "PR#7 is \x02STILL FAILING\x0F")
        .await
        .unwrap();

    // Give the server time to ping before quitting.
    tokio::time::sleep(Duration::from_millis(200)).await;
    client.quit("bye!").await;

    server.await.unwrap();
}

#[tokio::test]
async fn test_nick_collision_appends_underscore() {
    let (listener, addr) = listen().await;

    let server = tokio::spawn(async move {
        let mut server = FakeServer::accept(&listener).await;
        server.expect("NICK os-jenkins").await;
        server.expect("USER os-jenkins 0 * :os-jenkins").await;
        server
            .send(":irc.example.com 433 * os-jenkins :Nickname is already in use")
            .await;
        server.expect("NICK os-jenkins_").await;
        server
            .send(":irc.example.com 001 os-jenkins_ :Welcome")
            .await;
        server.expect("JOIN #ci").await;
    });

    let client = IrcClient::connect(&config(addr)).await.unwrap();
    assert_eq!(client.nick(), "os-jenkins_");
    server.await.unwrap();
}

#[tokio::test]
async fn test_notice_strips_line_breaks() {
    let (listener, addr) = listen().await;

    let server = tokio::spawn(async move {
        let mut server = FakeServer::accept(&listener).await;
        server.expect("NICK os-jenkins").await;
        server.expect("USER os-jenkins 0 * :os-jenkins").await;
        server.send(":irc 001 os-jenkins :Welcome").await;
        server.expect("JOIN #ci").await;
        server.expect("NOTICE #ci :first second").await;
    });

    let client = IrcClient::connect(&config(addr)).await.unwrap();
    client.notice("#ci", "first\nsecond").await.unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn test_latin1_lines_do_not_stop_ping_replies() {
    let (listener, addr) = listen().await;

    let server = tokio::spawn(async move {
        let mut server = FakeServer::accept(&listener).await;
        server.expect("NICK os-jenkins").await;
        server.expect("USER os-jenkins 0 * :os-jenkins").await;
        server
            .send_bytes(b":irc NOTICE AUTH :*** Bienvenue \xe0 bord")
            .await;
        server.send(":irc 001 os-jenkins :Welcome").await;
        server.expect("JOIN #ci").await;

        server.send_bytes(b":bob!u@h PRIVMSG #ci :caf\xe9").await;
        server.send("PING :later").await;
        server.expect("PONG :later").await;
    });

    let client = IrcClient::connect(&config(addr)).await.unwrap();
    server.await.unwrap();
    drop(client);
}

#[tokio::test]
async fn test_registration_refused() {
    let (listener, addr) = listen().await;

    let server = tokio::spawn(async move {
        let mut server = FakeServer::accept(&listener).await;
        server.expect("NICK os-jenkins").await;
        server.expect("USER os-jenkins 0 * :os-jenkins").await;
        server.send("ERROR :Closing link: banned").await;
    });

    let err = IrcClient::connect(&config(addr)).await.err().unwrap();
    assert!(err.to_string().contains("banned"));
    server.await.unwrap();
}

#[tokio::test]
async fn test_registration_connection_closed() {
    let (listener, addr) = listen().await;

    let server = tokio::spawn(async move {
        let server = FakeServer::accept(&listener).await;
        drop(server);
    });

    let err = IrcClient::connect(&config(addr)).await.err().unwrap();
    assert!(err.to_string().contains("chat error") || err.to_string().contains("I/O error"));
    server.await.unwrap();
}
