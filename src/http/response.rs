//! # Construcción de Respuestas HTTP
//!
//! Este módulo proporciona una API para construir respuestas HTTP/1.1
//! de forma programática y convertirlas a bytes para enviar al cliente.
//!
//! ## Formato de una respuesta HTTP/1.1
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/plain\r\n
//! Content-Encoding: gzip\r\n
//! Connection: close\r\n
//! Content-Length: 23\r\n
//! \r\n
//! <body>
//! ```
//!
//! Los headers se emiten en el orden en que se agregaron. `Content-Length`
//! nunca se guarda como header: se calcula del body al serializar.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use wsgate::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_body("text/plain", b"Hello".to_vec());
//!
//! let bytes = response.to_bytes();
//! assert!(bytes.ends_with(b"Content-Length: 5\r\n\r\nHello"));
//! ```

use super::StatusCode;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, Write};

/// Representa una respuesta HTTP/1.1 completa
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,

    /// Pares nombre/valor en orden de emisión
    headers: Vec<(String, String)>,

    body: Vec<u8>,
}

impl Response {
    /// Crea una nueva respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Agrega un header al final de la lista
    ///
    /// # Ejemplo
    /// ```
    /// use wsgate::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok)
    ///     .with_header("Connection", "close");
    /// assert_eq!(response.header("connection"), Some("close"));
    /// ```
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega un header a una respuesta existente (versión mutable)
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    /// Establece el body junto con su `Content-Type`
    pub fn with_body(mut self, content_type: &str, body: Vec<u8>) -> Self {
        self.add_header("Content-Type", content_type);
        self.body = body;
        self
    }

    /// Establece el body comprimido con gzip
    ///
    /// Agrega `Content-Type` y `Content-Encoding: gzip`. Una falla del
    /// encoder solo afecta a esta respuesta.
    pub fn with_gzip_body(mut self, content_type: &str, body: &[u8]) -> io::Result<Self> {
        let compressed = gzip(body)?;
        self.add_header("Content-Type", content_type);
        self.add_header("Content-Encoding", "gzip");
        self.body = compressed;
        Ok(self)
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// Genera:
    /// - Status line: `HTTP/1.1 200 OK\r\n`
    /// - Headers en orden de inserción
    /// - `Content-Length` calculado del body (excepto en 101)
    /// - Línea vacía y body
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(128 + self.body.len());

        result.extend_from_slice(format!("HTTP/1.1 {}\r\n", self.status).as_bytes());

        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        if self.status != StatusCode::SwitchingProtocols {
            result.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        result
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Busca un header por nombre (sin distinguir mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Decide si el cliente acepta gzip
///
/// El valor de `Accept-Encoding` se separa por comas; gzip se elige solo si
/// algún token (recortado, en minúsculas) es exactamente `gzip`. No hay
/// comodines ni pesos `q`.
///
/// # Ejemplo
/// ```
/// use wsgate::http::supports_gzip;
///
/// assert!(supports_gzip(Some("deflate, GZIP ")));
/// assert!(!supports_gzip(Some("gzip;q=1.0")));
/// assert!(!supports_gzip(None));
/// ```
pub fn supports_gzip(accept_encoding: Option<&str>) -> bool {
    accept_encoding
        .map(|value| {
            value
                .split(',')
                .any(|token| token.trim().to_ascii_lowercase() == "gzip")
        })
        .unwrap_or(false)
}

fn gzip(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
