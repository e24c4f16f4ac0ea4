//! # Módulo HTTP
//!
//! Implementa el subconjunto de HTTP/1.1 que necesita el servidor,
//! sin usar librerías de alto nivel:
//!
//! - Lectura de requests desde un stream persistente (keep-alive)
//! - Construcción de responses con `Content-Length` calculado
//! - Negociación y compresión gzip
//! - Códigos de estado
//!
//! No se soporta chunked transfer encoding ni pipelining: cada conexión
//! procesa un request a la vez.

pub mod request;
pub mod response;
pub mod status;

pub use request::{Headers, Method, ParseError, Request};
pub use response::{supports_gzip, Response};
pub use status::StatusCode;
