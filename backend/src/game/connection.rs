use crate::game::core::messages::{ClientCommand, ServerMessage};
use crate::game::matchmaking::{MatchmakingState, Seat};
use futures_util::{SinkExt, StreamExt};
use std::io;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;
use tokio_util::bytes::BytesMut;
use tokio_util::codec::{Decoder, FramedRead, FramedWrite, LinesCodec, LinesCodecError};
use tracing::{debug, info, warn};

/// Longest command line accepted; longer lines are discarded
const MAX_LINE_LENGTH: usize = 256;

/// Why a connection loop ended
#[derive(Debug)]
enum Exit {
    Quit,
    Closed,
    ReadFailed,
    WriteFailed,
}

/// Drive one seated connection until it quits, closes, or fails.
///
/// Outbound lines are written by a separate task fed from the seat's queue.
/// Whatever ends the connection, the seat is released through the
/// disconnect path so the opponent is told exactly once.
pub async fn run_connection(
    stream: TcpStream,
    state: Arc<MatchmakingState>,
    seat: Seat,
    outbound: mpsc::UnboundedReceiver<ServerMessage>,
) {
    let peer = stream.peer_addr().ok();
    info!(?peer, game_id = seat.game.id(), mark = %seat.mark, "Connection started");

    let (reader, writer) = stream.into_split();
    let mut send_task = tokio::spawn(write_loop(writer, outbound));
    let lines = FramedRead::new(reader, ClientLines::new());

    let exit = tokio::select! {
        _ = &mut send_task => Exit::WriteFailed,
        exit = read_loop(lines, &state, &seat) => exit,
    };

    state.handle_disconnect(&seat);

    // Dropping the last sender lets the writer flush what is queued and stop
    let writer_running = !matches!(exit, Exit::WriteFailed);
    drop(seat);
    if writer_running {
        let _ = send_task.await;
    }

    info!(?peer, ?exit, "Connection closed");
}

async fn write_loop(writer: OwnedWriteHalf, mut outbound: mpsc::UnboundedReceiver<ServerMessage>) {
    let mut sink = FramedWrite::new(writer, LinesCodec::new());

    while let Some(msg) = outbound.recv().await {
        debug!(%msg, "Sending message to client");
        if let Err(e) = sink.send(msg.to_string()).await {
            warn!(error = %e, "Failed to write to client");
            return;
        }
    }
}

async fn read_loop(
    mut lines: FramedRead<OwnedReadHalf, ClientLines>,
    state: &MatchmakingState,
    seat: &Seat,
) -> Exit {
    while let Some(frame) = lines.next().await {
        let line = match frame {
            Ok(Frame::Line(line)) => line,
            Ok(Frame::Discarded(e)) => {
                debug!(error = %e, "Discarding unreadable line");
                continue;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read from client");
                return Exit::ReadFailed;
            }
        };

        debug!(raw = %line, "Received line");

        let Some(command) = ClientCommand::parse(&line) else {
            debug!(raw = %line, "Ignoring unrecognized line");
            continue;
        };

        if let ControlFlow::Break(()) = state.handle_command(seat, command) {
            return Exit::Quit;
        }
    }

    Exit::Closed
}

/// A decoded client line
#[derive(Debug)]
enum Frame {
    Line(String),
    /// Over-long or not UTF-8; the bytes were consumed
    Discarded(LinesCodecError),
}

/// `LinesCodec` that turns bad lines into frames instead of errors.
///
/// A decode error would stop `FramedRead` until more bytes arrive, stranding
/// complete lines already in its buffer. Only socket failures stay errors.
struct ClientLines(LinesCodec);

impl ClientLines {
    fn new() -> Self {
        Self(LinesCodec::new_with_max_length(MAX_LINE_LENGTH))
    }

    fn recover(decoded: Result<Option<String>, LinesCodecError>) -> io::Result<Option<Frame>> {
        match decoded {
            Ok(line) => Ok(line.map(Frame::Line)),
            Err(e @ LinesCodecError::MaxLineLengthExceeded) => Ok(Some(Frame::Discarded(e))),
            Err(LinesCodecError::Io(e)) if e.kind() == io::ErrorKind::InvalidData => {
                Ok(Some(Frame::Discarded(LinesCodecError::Io(e))))
            }
            Err(LinesCodecError::Io(e)) => Err(e),
        }
    }
}

impl Decoder for ClientLines {
    type Item = Frame;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> io::Result<Option<Frame>> {
        Self::recover(self.0.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> io::Result<Option<Frame>> {
        Self::recover(self.0.decode_eof(buf))
    }
}
