//! # Sesión WebSocket
//! src/websocket/session.rs
//!
//! Loop de una conexión ya upgradeada: lee frames en orden de llegada y
//! los despacha por opcode.
//!
//! | Opcode | Acción |
//! |--------|--------|
//! | text   | `Echo: <msg>` al emisor, `Broadcast: <msg>` al resto |
//! | close  | responde close, da de baja y termina |
//! | ping   | pong con el mismo payload |
//! | pong / otros | se ignoran |

use std::io::Read;
use std::sync::Arc;

use tracing::{debug, info};

use super::frame::{Frame, OpCode};
use super::registry::{Peer, Registry};
use crate::error::Result;

/// Sesión WebSocket dueña del lado de lectura de la conexión
pub struct WebSocketSession<R: Read> {
    reader: R,
    peer: Arc<Peer>,
    registry: Arc<Registry>,
    max_payload: u64,
}

impl<R: Read> WebSocketSession<R> {
    /// `peer` ya debe estar registrado en `registry`
    pub fn new(reader: R, peer: Arc<Peer>, registry: Arc<Registry>, max_payload: u64) -> Self {
        Self {
            reader,
            peer,
            registry,
            max_payload,
        }
    }

    /// Envía el mensaje de bienvenida y procesa frames hasta close/EOF/error
    ///
    /// Siempre da de baja la sesión del registro al salir.
    pub fn run(mut self) -> Result<()> {
        let result = self.serve();
        self.registry.remove(self.peer.id());
        info!(session = self.peer.id(), "sesión WebSocket terminada");
        result
    }

    /// Da de baja la sesión sin procesar frames
    ///
    /// Para cuando la conexión falla entre el handshake y `run`.
    pub fn abort(self) {
        self.registry.remove(self.peer.id());
        debug!(session = self.peer.id(), "sesión WebSocket abortada");
    }

    fn serve(&mut self) -> Result<()> {
        let welcome = format!("Welcome to WebSocket server! Path: {}", self.peer.path());
        self.peer.send(&Frame::text(&welcome))?;

        while let Some(frame) = Frame::read_from(&mut self.reader, self.max_payload)? {
            if !self.dispatch(frame)? {
                break;
            }
        }

        Ok(())
    }

    /// Retorna `false` cuando la sesión debe terminar
    fn dispatch(&mut self, frame: Frame) -> Result<bool> {
        let id = self.peer.id();

        match frame.opcode {
            OpCode::Text => {
                let message = String::from_utf8_lossy(&frame.payload);
                debug!(session = id, %message, "mensaje de texto recibido");

                self.peer.send(&Frame::text(&format!("Echo: {}", message)))?;
                let delivered = self
                    .registry
                    .broadcast(id, &Frame::text(&format!("Broadcast: {}", message)));
                debug!(session = id, delivered, "broadcast enviado");
            }
            OpCode::Close => {
                debug!(session = id, "close frame recibido");
                self.registry.remove(id);
                // El peer pudo haber cerrado ya su lado
                if let Err(e) = self.peer.send(&Frame::close(frame.payload)) {
                    debug!(session = id, error = %e, "no se pudo responder el close");
                }
                return Ok(false);
            }
            OpCode::Ping => {
                self.peer.send(&Frame::pong(frame.payload))?;
            }
            OpCode::Pong => {
                debug!(session = id, "pong recibido");
            }
            other => {
                debug!(session = id, opcode = other.as_u8(), "opcode ignorado");
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::registry::tests::SharedBuf;
    use std::io::Cursor;

    fn client_frame(opcode: u8, payload: &[u8]) -> Vec<u8> {
        let key = [0x12, 0x34, 0x56, 0x78];
        let mut out = vec![0x80 | opcode, 0x80 | payload.len() as u8];
        out.extend_from_slice(&key);
        out.extend(payload.iter().enumerate().map(|(i, b)| b ^ key[i % 4]));
        out
    }

    /// Decodifica todos los frames escritos por el servidor
    fn frames(bytes: Vec<u8>) -> Vec<Frame> {
        let mut cursor = Cursor::new(bytes);
        let mut out = Vec::new();
        while let Some(f) = Frame::read_from(&mut cursor, u64::MAX).unwrap() {
            out.push(f);
        }
        out
    }

    #[test]
    fn test_welcome_echo_and_broadcast() {
        let registry = Arc::new(Registry::new());
        let own = SharedBuf::default();
        let other = SharedBuf::default();
        let peer = registry.add("/chat", Box::new(own.clone()));
        registry.add("/other", Box::new(other.clone()));

        let input = client_frame(0x1, b"ping");
        WebSocketSession::new(Cursor::new(input), peer, Arc::clone(&registry), 1024)
            .run()
            .unwrap();

        let sent = frames(own.contents());
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].payload, b"Welcome to WebSocket server! Path: /chat");
        assert_eq!(sent[1], Frame::text("Echo: ping"));

        assert_eq!(frames(other.contents()), vec![Frame::text("Broadcast: ping")]);
        // EOF da de baja la sesión
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_ping_gets_pong() {
        let registry = Arc::new(Registry::new());
        let own = SharedBuf::default();
        let peer = registry.add("/", Box::new(own.clone()));

        let input = client_frame(0x9, b"abc");
        WebSocketSession::new(Cursor::new(input), peer, registry, 1024)
            .run()
            .unwrap();

        let sent = frames(own.contents());
        assert_eq!(sent[1], Frame::pong(b"abc".to_vec()));
    }

    #[test]
    fn test_close_stops_processing() {
        let registry = Arc::new(Registry::new());
        let own = SharedBuf::default();
        let peer = registry.add("/", Box::new(own.clone()));

        let mut input = client_frame(0x8, &[0x03, 0xE8]);
        input.extend(client_frame(0x1, b"after close"));
        WebSocketSession::new(Cursor::new(input), peer, Arc::clone(&registry), 1024)
            .run()
            .unwrap();

        let sent = frames(own.contents());
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1], Frame::close(vec![0x03, 0xE8]));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_close_reply_to_broken_peer_still_ends_cleanly() {
        use crate::websocket::registry::tests::BrokenPipe;

        let registry = Arc::new(Registry::new());
        let peer = registry.add("/", Box::new(BrokenPipe));
        let mut session =
            WebSocketSession::new(Cursor::new(client_frame(0x8, b"")), peer, Arc::clone(&registry), 1024);

        // Sin bienvenida: directo al dispatch del close
        let frame = Frame::read_from(&mut session.reader, 1024).unwrap().unwrap();
        assert!(!session.dispatch(frame).unwrap());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_abort_deregisters_without_sending() {
        let registry = Arc::new(Registry::new());
        let own = SharedBuf::default();
        let peer = registry.add("/", Box::new(own.clone()));

        WebSocketSession::new(Cursor::new(Vec::new()), peer, Arc::clone(&registry), 1024).abort();

        assert!(registry.is_empty());
        assert!(own.contents().is_empty());
    }

    #[test]
    fn test_pong_and_binary_are_ignored() {
        let registry = Arc::new(Registry::new());
        let own = SharedBuf::default();
        let other = SharedBuf::default();
        let peer = registry.add("/", Box::new(own.clone()));
        registry.add("/", Box::new(other.clone()));

        let mut input = client_frame(0xA, b"");
        input.extend(client_frame(0x2, &[1, 2, 3]));
        WebSocketSession::new(Cursor::new(input), peer, registry, 1024)
            .run()
            .unwrap();

        assert_eq!(frames(own.contents()).len(), 1);
        assert!(other.contents().is_empty());
    }

    #[test]
    fn test_oversized_frame_ends_session_with_error() {
        let registry = Arc::new(Registry::new());
        let peer = registry.add("/", Box::new(SharedBuf::default()));

        let input = client_frame(0x1, &[b'a'; 64]);
        let result = WebSocketSession::new(Cursor::new(input), peer, Arc::clone(&registry), 16).run();

        assert!(matches!(result, Err(crate::error::Error::Frame(_))));
        assert!(registry.is_empty());
    }
}
