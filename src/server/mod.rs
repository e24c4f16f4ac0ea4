//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! - `tcp`: escucha en un puerto y lanza un thread por conexión
//! - `connection`: máquina de estados HTTP de cada conexión (keep-alive,
//!   close, upgrade a WebSocket)

pub mod connection;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use connection::{Connection, Outcome};
pub use tcp::Server;
