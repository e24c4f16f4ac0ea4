//! # Módulo WebSocket
//!
//! Todo lo que ocurre después del upgrade:
//!
//! - `handshake`: validación del request y respuesta 101
//! - `frame`: codec de frames RFC 6455
//! - `registry`: conjunto compartido de sesiones para broadcast
//! - `session`: loop de lectura y despacho por opcode
//!
//! Una conexión upgradeada nunca vuelve a HTTP.

pub mod frame;
pub mod handshake;
pub mod registry;
pub mod session;

pub use frame::{Frame, FrameError, OpCode};
pub use handshake::{accept_key, handshake_response, is_upgrade_request};
pub use registry::{Peer, Registry};
pub use session::WebSocketSession;
