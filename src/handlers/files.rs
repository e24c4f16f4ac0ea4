//! # Handler de archivos
//!
//! `/files/<nombre>` sobre el `BlobStore` del router:
//!
//! - `GET`: 200 con los bytes (`application/octet-stream`) o 404
//! - `POST`: escribe el body y retorna 201; 400 si no hay body
//! - otro método: 405
//!
//! Un nombre inválido (vacío, con `/`, `\` o `..`) retorna 400.

use tracing::{error, info};

use crate::http::{Method, Request, Response, StatusCode};
use crate::router::Context;
use crate::storage::StoreError;

/// Handler para `/files/<nombre>`
pub fn files_handler(req: &Request, ctx: &Context<'_>) -> Response {
    let name = ctx.rest;

    match req.method() {
        Method::GET => match ctx.store.read(name) {
            Ok(data) => Response::new(StatusCode::Ok).with_body("application/octet-stream", data),
            Err(e) => store_error_response(name, e),
        },
        Method::POST => {
            let Some(body) = req.body() else {
                return Response::new(StatusCode::BadRequest);
            };

            match ctx.store.write(name, body) {
                Ok(()) => {
                    info!(file = name, bytes = body.len(), "archivo escrito");
                    Response::new(StatusCode::Created)
                }
                Err(e) => store_error_response(name, e),
            }
        }
        _ => Response::new(StatusCode::MethodNotAllowed),
    }
}

fn store_error_response(name: &str, err: StoreError) -> Response {
    match err {
        StoreError::NotFound(_) => Response::new(StatusCode::NotFound),
        StoreError::InvalidName(_) => Response::new(StatusCode::BadRequest),
        StoreError::Io(e) => {
            error!(file = name, error = %e, "error de IO en el store");
            Response::new(StatusCode::InternalServerError)
        }
    }
}
