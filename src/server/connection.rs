//! # Sesión de Conexión
//! src/server/connection.rs
//!
//! Máquina de estados de una conexión HTTP:
//!
//! ```text
//! ReadingRequest → Routing → Responding → ReadingRequest (keep-alive)
//!                     │                 → Closed         (Connection: close)
//!                     └─→ Upgrading (terminal: la conexión pasa a WebSocket)
//! ```
//!
//! Los requests se procesan estrictamente en orden, uno a la vez. El
//! fin del stream (o el timeout de inactividad) lleva a `Closed`.

use std::io::{BufRead, Write};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::http::{ParseError, Request, Response, StatusCode};
use crate::router::Router;
use crate::websocket::{handshake, Registry, WebSocketSession};

enum State {
    ReadingRequest,
    Routing(Request),
    Responding { response: Response, close: bool },
    Upgrading(Request),
    Closed,
}

/// Cómo terminó la fase HTTP de la conexión
pub enum Outcome<R: BufRead> {
    /// El socket debe cerrarse
    Closed,

    /// Handshake completado; la sesión WebSocket ya está registrada
    Upgraded(WebSocketSession<R>),
}

/// Conexión HTTP dueña exclusiva de su stream
pub struct Connection<R: BufRead, W: Write + Send + 'static> {
    reader: R,
    writer: W,
    peer: String,
    router: Arc<Router>,
    registry: Arc<Registry>,
    max_frame_size: u64,
    max_body_size: usize,
    request_count: u64,
    keep_alive: bool,
}

impl<R: BufRead, W: Write + Send + 'static> Connection<R, W> {
    pub fn new(
        reader: R,
        writer: W,
        peer: String,
        router: Arc<Router>,
        registry: Arc<Registry>,
        max_frame_size: u64,
        max_body_size: usize,
    ) -> Self {
        Self {
            reader,
            writer,
            peer,
            router,
            registry,
            max_frame_size,
            max_body_size,
            request_count: 0,
            keep_alive: true,
        }
    }

    /// Procesa requests hasta cerrar o hacer upgrade
    ///
    /// Un error de transporte, un `Content-Length` inválido o mayor que
    /// `max_body_size` terminan la conexión con `Err`; nunca afectan a
    /// otras conexiones.
    pub fn run(mut self) -> Result<Outcome<R>> {
        let mut state = State::ReadingRequest;

        loop {
            state = match state {
                State::ReadingRequest => self.read_request()?,
                State::Routing(request) => self.route(request),
                State::Responding { response, close } => {
                    self.respond(&response)?;
                    if close {
                        self.keep_alive = false;
                        State::Closed
                    } else {
                        State::ReadingRequest
                    }
                }
                State::Upgrading(request) => return self.upgrade(request),
                State::Closed => {
                    debug!(peer = %self.peer, requests = self.request_count, keep_alive = self.keep_alive, "conexión cerrada");
                    return Ok(Outcome::Closed);
                }
            };
        }
    }

    fn read_request(&mut self) -> Result<State> {
        match Request::read_from(&mut self.reader, self.max_body_size) {
            Ok(Some(request)) => {
                self.request_count += 1;
                info!(
                    peer = %self.peer,
                    request = self.request_count,
                    method = request.method().as_str(),
                    path = request.path(),
                    "procesando request"
                );
                Ok(State::Routing(request))
            }
            Ok(None) => Ok(State::Closed),
            Err(ParseError::MalformedRequestLine(line)) => {
                warn!(peer = %self.peer, %line, "request line malformada");
                Ok(State::Responding {
                    response: Response::new(StatusCode::BadRequest).with_header("Connection", "close"),
                    close: true,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn route(&self, request: Request) -> State {
        if handshake::is_upgrade_request(&request) {
            return State::Upgrading(request);
        }

        let close = request.wants_close();
        let mut response = self.router.route(&request);
        if close {
            response.add_header("Connection", "close");
        }

        State::Responding { response, close }
    }

    fn respond(&mut self, response: &Response) -> Result<()> {
        self.writer.write_all(&response.to_bytes())?;
        self.writer.flush()?;
        if response.status().is_server_error() {
            warn!(peer = %self.peer, status = response.status().as_u16(), "response con error interno");
        } else {
            debug!(peer = %self.peer, status = response.status().as_u16(), "response enviada");
        }
        Ok(())
    }

    fn upgrade(mut self, request: Request) -> Result<Outcome<R>> {
        let key = request.header("sec-websocket-key").unwrap_or_default();
        self.respond(&handshake::handshake_response(key))?;

        let peer = self.registry.add(request.path(), Box::new(self.writer));
        info!(peer = %self.peer, session = peer.id(), path = request.path(), "handshake WebSocket completado");

        Ok(Outcome::Upgraded(WebSocketSession::new(
            self.reader,
            peer,
            self.registry,
            self.max_frame_size,
        )))
    }
}
