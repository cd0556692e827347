#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tictactoe::messages::{ClientCommand, ServerMessage};
use tictactoe::{Config, Position, Server};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn spawn_test_server() -> SocketAddr {
    spawn_test_server_with_config(Config::default()).await
}

pub async fn spawn_test_server_with_config(config: Config) -> SocketAddr {
    let config = Config {
        bind_addr: "127.0.0.1".to_string(),
        ..config
    }
    .with_port(0);

    let server = Server::bind(&config).await.unwrap();
    let addr = server.local_addr().unwrap();

    tokio::spawn(async move {
        server.run().await.unwrap();
    });

    addr
}

/// A line-protocol client speaking to the test server
pub struct TestClient {
    lines: FramedRead<OwnedReadHalf, LinesCodec>,
    sink: FramedWrite<OwnedWriteHalf, LinesCodec>,
}

impl TestClient {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("Failed to connect");
        let (reader, writer) = stream.into_split();
        Self {
            lines: FramedRead::new(reader, LinesCodec::new()),
            sink: FramedWrite::new(writer, LinesCodec::new()),
        }
    }

    pub async fn send(&mut self, command: ClientCommand) {
        self.send_raw(&command.to_string()).await;
    }

    pub async fn send_raw(&mut self, line: &str) {
        self.sink.send(line).await.unwrap();
    }

    /// Write bytes straight to the socket, bypassing line encoding
    pub async fn send_bytes(&mut self, bytes: &[u8]) {
        self.sink.get_mut().write_all(bytes).await.unwrap();
    }

    pub async fn play(&mut self, index: u8) {
        self.send(ClientCommand::Move(pos(index))).await;
    }

    pub async fn recv(&mut self) -> ServerMessage {
        match self.recv_within(RECV_TIMEOUT).await {
            Some(msg) => msg,
            None => panic!("No message within {RECV_TIMEOUT:?}"),
        }
    }

    /// Next message, or `None` if nothing arrives in `wait`
    pub async fn recv_within(&mut self, wait: Duration) -> Option<ServerMessage> {
        let line = tokio::time::timeout(wait, self.lines.next()).await.ok()?;
        let line = line.expect("Connection closed").unwrap();
        Some(line.parse().unwrap())
    }

    /// True once the server has closed the connection
    pub async fn closed(&mut self) -> bool {
        matches!(
            tokio::time::timeout(RECV_TIMEOUT, self.lines.next()).await,
            Ok(None)
        )
    }
}

pub fn pos(index: u8) -> Position {
    Position::new(index).unwrap()
}

/// Connect `X` then `O` and consume the pairing handshake
pub async fn connect_pair(addr: SocketAddr) -> (TestClient, TestClient) {
    let mut x = TestClient::connect(addr).await;
    assert_eq!(x.recv().await, ServerMessage::Welcome(tictactoe::Mark::X));
    assert!(matches!(x.recv().await, ServerMessage::Message(_)));

    let mut o = TestClient::connect(addr).await;
    assert_eq!(o.recv().await, ServerMessage::Welcome(tictactoe::Mark::O));
    assert_eq!(x.recv().await, ServerMessage::message("Your move"));

    (x, o)
}

/// Play one accepted move and consume both resulting notifications
pub async fn exchange(mover: &mut TestClient, other: &mut TestClient, index: u8) {
    mover.play(index).await;
    assert_eq!(mover.recv().await, ServerMessage::ValidMove);
    assert_eq!(other.recv().await, ServerMessage::OpponentMoved(pos(index)));
}
