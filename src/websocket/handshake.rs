//! # Handshake WebSocket
//! src/websocket/handshake.rs
//!
//! Decide si un request HTTP pide upgrade y construye la respuesta
//! `101 Switching Protocols`.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sha1::{Digest, Sha1};

use crate::http::{Request, Response, StatusCode};

/// GUID fijo de RFC 6455 para calcular `Sec-WebSocket-Accept`
pub const WS_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Calcula `Sec-WebSocket-Accept`: Base64(SHA-1(key + GUID))
///
/// # Ejemplo
/// ```
/// use wsgate::websocket::accept_key;
///
/// assert_eq!(accept_key("dGhlIHNhbXBsZSBub25jZQ=="), "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=");
/// ```
pub fn accept_key(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hasher.update(WS_GUID.as_bytes());
    BASE64.encode(hasher.finalize())
}

/// Un request califica para upgrade si:
///
/// - `Connection` contiene "upgrade" (sin distinguir mayúsculas)
/// - `Upgrade` contiene "websocket"
/// - `Sec-WebSocket-Key` está presente
/// - `Sec-WebSocket-Version` es exactamente "13"
pub fn is_upgrade_request(request: &Request) -> bool {
    let headers = request.headers();

    headers.value_contains("connection", "upgrade")
        && headers.value_contains("upgrade", "websocket")
        && headers.get("sec-websocket-key").is_some()
        && headers.get("sec-websocket-version") == Some("13")
}

/// Respuesta 101 para la key recibida
pub fn handshake_response(key: &str) -> Response {
    Response::new(StatusCode::SwitchingProtocols)
        .with_header("Upgrade", "websocket")
        .with_header("Connection", "Upgrade")
        .with_header("Sec-WebSocket-Accept", &accept_key(key))
}
