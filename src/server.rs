use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Result, Context};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::{net::{TcpListener, TcpStream}, sync::Mutex};
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tracing::{debug, info, warn};

use crate::protocol::{command::Command, frame::Frame, pulse::PulseTrain};
use crate::transmit::Transmitter;


pub const DEFAULT_LISTEN: &str = "127.0.0.1:8040";

const MAX_REQUEST_LEN: usize = 4096;

/// Pause after a failed accept (e.g. out of file descriptors).
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);


/// One line of JSON sent by a client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub token: Option<String>,

    pub command: Command,
}

/// One line of JSON sent back for every request line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Response {
    Ok {
        /// Header word, state word and end byte in hex.
        frame: String,
        pulses: String,
    },
    Error {
        message: String
    },
}

impl Response {
    fn error(message: impl Into<String>) -> Self {
        Response::Error { message: message.into() }
    }
}


struct SharedState {
    token: Option<String>,

    /// Only one transmission may be in flight at a time.
    transmitter: Mutex<Transmitter>,
}

impl SharedState {
    async fn handle(&self, line: &str) -> Response {
        let request: Request = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(err) => return Response::error(format!("invalid request: {err}")),
        };

        if let Some(token) = &self.token {
            if !token_matches(token, request.token.as_deref()) {
                warn!("rejected request with missing or wrong token");
                return Response::error("unauthorized");
            }
        }

        let frame = match Frame::from_command(&request.command) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(command = ?request.command, %err, "rejected command");
                return Response::error(err.to_string());
            }
        };

        let train = PulseTrain::from(&frame);

        {
            let transmitter = self.transmitter.lock().await;

            if let Err(err) = transmitter.transmit(&train).await {
                warn!("transmission failed: {err:#}");
                return Response::error(format!("{err:#}"));
            }
        }

        info!(unit = ?request.command.unit(), %frame, "command sent");

        Response::Ok {
            frame: frame.to_string(),
            pulses: train.to_string(),
        }
    }
}

/// Token comparison that does not stop at the first differing byte. Only the length can leak.
fn token_matches(expected: &str, given: Option<&str>) -> bool {
    let Some(given) = given else {
        return false;
    };

    if expected.len() != given.len() {
        return false;
    }

    expected.bytes()
        .zip(given.bytes())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b)) == 0
}


/// Accepts newline-delimited JSON commands over TCP.
pub struct Server {
    listener: TcpListener,
    state: Arc<SharedState>,
}

impl Server {
    pub async fn bind(addr: &str, token: Option<String>, transmitter: Transmitter) -> Result<Self> {
        let listener = TcpListener::bind(addr).await
            .with_context(|| format!("failed to listen on {addr}"))?;

        let state = Arc::new(SharedState {
            token,
            transmitter: Mutex::new(transmitter),
        });

        Ok(Self { listener, state })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn run(self) -> Result<()> {
        info!(addr = %self.local_addr()?, "listening");

        loop {
            let (socket, addr) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(err) => {
                    warn!(%err, "failed to accept connection");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };

            if let Err(err) = socket.set_nodelay(true) {
                warn!(%addr, %err, "dropping connection");
                continue;
            }

            info!(%addr, "new connection");

            let state = self.state.clone();
            tokio::spawn(async move {
                if let Err(err) = process(socket, state).await {
                    warn!(%addr, "connection error: {err:#}");
                }

                info!(%addr, "client disconnected");
            });
        }
    }
}

async fn process(socket: TcpStream, state: Arc<SharedState>) -> Result<()> {
    let mut framed = Framed::new(socket, LinesCodec::new_with_max_length(MAX_REQUEST_LEN));

    while let Some(line) = framed.next().await {
        let response = match line {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => {
                debug!(%line, "request");
                state.handle(&line).await
            },
            Err(LinesCodecError::MaxLineLengthExceeded) => {
                Response::error(format!("request longer than {MAX_REQUEST_LEN} bytes"))
            },
            Err(LinesCodecError::Io(err)) => return Err(err.into()),
        };

        framed.send(serde_json::to_string(&response)?).await?;
    }

    Ok(())
}
