//! # Handlers básicos
//!
//! - `/`: 200 sin body
//! - `/echo/<texto>`: devuelve el texto, con gzip si el cliente lo acepta
//! - `/user-agent`: devuelve el header `User-Agent`

use tracing::error;

use crate::http::{supports_gzip, Request, Response, StatusCode};
use crate::router::Context;

/// Handler para `/`
pub fn root_handler(_req: &Request, _ctx: &Context<'_>) -> Response {
    Response::new(StatusCode::Ok)
}

/// Handler para `/echo/<texto>`
///
/// El texto es el resto literal del path (sin URL-decoding).
pub fn echo_handler(req: &Request, ctx: &Context<'_>) -> Response {
    let body = ctx.rest.as_bytes();

    if !supports_gzip(req.header("accept-encoding")) {
        return Response::new(StatusCode::Ok).with_body("text/plain", body.to_vec());
    }

    match Response::new(StatusCode::Ok).with_gzip_body("text/plain", body) {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "falló la compresión gzip");
            Response::new(StatusCode::InternalServerError)
        }
    }
}

/// Handler para `/user-agent`
pub fn user_agent_handler(req: &Request, _ctx: &Context<'_>) -> Response {
    match req.header("user-agent") {
        Some(agent) => Response::new(StatusCode::Ok).with_body("text/plain", agent.as_bytes().to_vec()),
        None => Response::new(StatusCode::BadRequest),
    }
}
