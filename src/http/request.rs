//! # Lectura de Requests HTTP/1.1
//! src/http/request.rs
//!
//! Este módulo lee un request HTTP/1.1 directamente desde un stream
//! con buffer (`BufRead`), de modo que varias peticiones puedan llegar
//! por la misma conexión (keep-alive).
//!
//! ## Formato de un Request
//!
//! ```text
//! POST /files/foo.txt HTTP/1.1\r\n
//! Host: localhost:4221\r\n
//! Content-Length: 5\r\n
//! \r\n
//! hello
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD /path HTTP/1.1`
//! 2. **Headers**: Pares `Name: Value` (uno por línea)
//! 3. **Empty Line**: `\r\n` que separa headers del body
//! 4. **Body**: exactamente `Content-Length` bytes, si el header existe y es > 0

use std::collections::HashMap;
use std::io::{self, BufRead, Read};

/// Largo máximo de la request line y de cada header, en bytes
pub const MAX_LINE_LEN: usize = 8 * 1024;

/// Métodos HTTP reconocidos
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,

    /// Cualquier otro token; se conserva tal cual llegó
    Other(String),
}

impl Method {
    fn parse(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            other => Method::Other(other.to_string()),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::Other(s) => s,
        }
    }
}

/// Errores que pueden ocurrir durante la lectura de un request
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// La request line tiene menos de dos tokens
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),

    /// `Content-Length` no es un entero no negativo
    #[error("invalid content-length: {0:?}")]
    InvalidContentLength(String),

    /// `Content-Length` supera el límite configurado; no se lee el body
    #[error("body too large: {len} bytes (max {max})")]
    BodyTooLarge { len: usize, max: usize },

    /// Un header superó `MAX_LINE_LEN` sin terminar en `\n`
    #[error("header line longer than {0} bytes")]
    HeaderTooLong(usize),

    /// Falla del stream (incluye body truncado)
    #[error("read error: {0}")]
    Io(#[from] io::Error),
}

/// Headers de un request con nombres en minúsculas
///
/// Si un header aparece varias veces, gana la última ocurrencia.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    map: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserta un header; el nombre se normaliza a minúsculas
    pub fn insert(&mut self, name: &str, value: &str) {
        self.map.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    /// Obtiene un header sin distinguir mayúsculas en el nombre
    ///
    /// # Ejemplo
    /// ```
    /// use wsgate::http::Headers;
    ///
    /// let mut headers = Headers::new();
    /// headers.insert("User-Agent", "curl/8.0");
    /// assert_eq!(headers.get("user-agent"), Some("curl/8.0"));
    /// ```
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(&name.to_ascii_lowercase()).map(|s| s.as_str())
    }

    /// Verifica si el valor del header contiene `needle` (sin distinguir mayúsculas)
    pub fn value_contains(&self, name: &str, needle: &str) -> bool {
        self.get(name)
            .map(|v| v.to_ascii_lowercase().contains(&needle.to_ascii_lowercase()))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Representa un request HTTP parseado. Inmutable una vez leído.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    headers: Headers,

    /// Presente solo si `Content-Length` > 0
    body: Option<Vec<u8>>,
}

impl Request {
    /// Lee un request completo desde el stream
    ///
    /// `max_body` acota el `Content-Length` aceptado antes de reservar memoria.
    ///
    /// # Retorna
    ///
    /// * `Ok(Some(Request))` - Request leído
    /// * `Ok(None)` - Fin del stream: el peer cerró, llegó una línea vacía
    ///   o expiró el timeout de inactividad antes de la request line
    /// * `Err(ParseError)` - Request inválido o falla del stream
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use std::io::Cursor;
    /// use wsgate::http::Request;
    ///
    /// let mut raw = Cursor::new(b"GET /echo/abc HTTP/1.1\r\nUser-Agent: test\r\n\r\n".to_vec());
    /// let request = Request::read_from(&mut raw, 1024).unwrap().unwrap();
    ///
    /// assert_eq!(request.path(), "/echo/abc");
    /// assert_eq!(request.header("user-agent"), Some("test"));
    /// ```
    pub fn read_from<R: BufRead>(reader: &mut R, max_body: usize) -> Result<Option<Self>, ParseError> {
        let request_line = match read_line(reader) {
            Ok(Some(Line::Complete(line))) if !line.is_empty() => line,
            Ok(Some(Line::TooLong(prefix))) => return Err(ParseError::MalformedRequestLine(prefix)),
            Ok(_) => return Ok(None),
            Err(e) if is_timeout(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let (method, path) = Self::parse_request_line(&request_line)?;
        let headers = Self::read_headers(reader)?;

        let content_length = match headers.get("content-length") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| ParseError::InvalidContentLength(raw.to_string()))?,
            None => 0,
        };
        if content_length > max_body {
            return Err(ParseError::BodyTooLarge {
                len: content_length,
                max: max_body,
            });
        }

        let body = if content_length > 0 {
            let mut buf = vec![0u8; content_length];
            reader.read_exact(&mut buf)?;
            Some(buf)
        } else {
            None
        };

        Ok(Some(Request {
            method,
            path,
            headers,
            body,
        }))
    }

    /// Parsea la request line separando por espacios simples
    ///
    /// Formato: `GET /path HTTP/1.1`. La versión no se valida.
    fn parse_request_line(line: &str) -> Result<(Method, String), ParseError> {
        let parts: Vec<&str> = line.split(' ').collect();

        if parts.len() < 2 {
            return Err(ParseError::MalformedRequestLine(line.to_string()));
        }

        Ok((Method::parse(parts[0]), parts[1].to_string()))
    }

    /// Lee headers hasta la línea vacía (o el fin del stream)
    ///
    /// Las líneas sin ':' se ignoran.
    fn read_headers<R: BufRead>(reader: &mut R) -> Result<Headers, ParseError> {
        let mut headers = Headers::new();

        while let Some(line) = read_line(reader)? {
            let line = match line {
                Line::Complete(line) => line,
                Line::TooLong(_) => return Err(ParseError::HeaderTooLong(MAX_LINE_LEN)),
            };
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                headers.insert(name, value);
            }
        }

        Ok(headers)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Obtiene un header específico (nombre sin distinguir mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// El cliente pidió cerrar la conexión (`Connection: close`)
    pub fn wants_close(&self) -> bool {
        self.headers.value_contains("connection", "close")
    }
}

enum Line {
    Complete(String),

    /// Los primeros `MAX_LINE_LEN` bytes de una línea sin terminar
    TooLong(String),
}

/// Lee una línea terminada en `\n`, sin el `\r\n` final
///
/// Nunca lee más de `MAX_LINE_LEN + 1` bytes. Retorna `None` si el
/// stream terminó antes de leer algún byte.
fn read_line<R: BufRead>(reader: &mut R) -> io::Result<Option<Line>> {
    let mut buf = Vec::new();
    let limit = MAX_LINE_LEN as u64 + 1;
    if reader.by_ref().take(limit).read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }

    if buf.len() > MAX_LINE_LEN && buf.last() != Some(&b'\n') {
        buf.truncate(MAX_LINE_LEN);
        return Ok(Some(Line::TooLong(String::from_utf8_lossy(&buf).into_owned())));
    }

    while matches!(buf.last(), Some(b'\n') | Some(b'\r')) {
        buf.pop();
    }

    Ok(Some(Line::Complete(String::from_utf8_lossy(&buf).into_owned())))
}

/// El read timeout del socket aparece como `WouldBlock` en Unix y `TimedOut` en Windows
fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}
