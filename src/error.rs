//! # Errores del Servidor
//! src/error.rs
//!
//! Error de nivel de crate. Cada capa define su propio enum
//! (`ParseError`, `StoreError`, `FrameError`) y aquí se agrupan los que
//! pueden terminar una conexión.

use crate::http::request::ParseError;
use crate::websocket::frame::FrameError;

/// Errores que terminan una sesión o impiden arrancar el servidor
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request HTTP imposible de parsear
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Frame WebSocket inválido
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Falla de lectura/escritura en el socket
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Configuración inválida
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
