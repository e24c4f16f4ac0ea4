//! # wsgate
//! src/lib.rs
//!
//! Servidor HTTP/1.1 mínimo con upgrade a WebSocket sobre un mismo puerto.
//! Sirve echo de texto, lectura/escritura de archivos y broadcast de
//! mensajes entre sesiones WebSocket.
//!
//! ## Arquitectura
//!
//! - `http`: lectura de requests, construcción de responses, gzip
//! - `router`: mapeo de paths (exactos y por prefijo) a handlers
//! - `handlers`: `/`, `/echo/`, `/user-agent`, `/files/`
//! - `storage`: interfaz get/put de blobs por nombre
//! - `websocket`: handshake, codec de frames, registro y sesión
//! - `server`: listener TCP y máquina de estados por conexión
//! - `config`: configuración por CLI y variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use wsgate::config::Config;
//! use wsgate::server::Server;
//!
//! let server = Server::bind(Config::default()).expect("bind");
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod router;
pub mod server;
pub mod storage;
pub mod websocket;

pub use error::{Error, Result};
