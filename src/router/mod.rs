//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Este módulo implementa el router que mapea paths HTTP a handlers.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Handler → Response
//! ```
//!
//! Hay dos tipos de ruta: exactas (`/user-agent`) y por prefijo
//! (`/echo/`), donde el handler recibe el resto del path tal cual llegó,
//! sin URL-decoding. Las rutas se prueban en orden de registro; si
//! ninguna coincide se retorna 404 Not Found.

use std::sync::Arc;

use crate::http::{Request, Response, StatusCode};
use crate::storage::BlobStore;

/// Datos que recibe cada handler además del request
pub struct Context<'a> {
    /// Resto del path después del prefijo (vacío en rutas exactas)
    pub rest: &'a str,

    pub store: &'a dyn BlobStore,
}

/// Tipo de función handler
pub type Handler = fn(&Request, &Context<'_>) -> Response;

enum Pattern {
    Exact(String),
    Prefix(String),
}

/// Router que mapea paths a handlers
pub struct Router {
    routes: Vec<(Pattern, Handler)>,
    store: Arc<dyn BlobStore>,
}

impl Router {
    /// Crea un router vacío sobre el store dado
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            routes: Vec::new(),
            store,
        }
    }

    /// Router con las rutas del servidor ya registradas
    pub fn with_default_routes(store: Arc<dyn BlobStore>) -> Self {
        let mut router = Self::new(store);
        router.register("/", crate::handlers::root_handler);
        router.register("/user-agent", crate::handlers::user_agent_handler);
        router.register_prefix("/echo/", crate::handlers::echo_handler);
        router.register_prefix("/files/", crate::handlers::files_handler);
        router
    }

    /// Registra una ruta exacta
    ///
    /// # Ejemplo
    /// ```
    /// use std::sync::Arc;
    /// use wsgate::router::{Context, Router};
    /// use wsgate::http::{Request, Response, StatusCode};
    /// use wsgate::storage::MemoryStore;
    ///
    /// fn hello_handler(_req: &Request, _ctx: &Context<'_>) -> Response {
    ///     Response::new(StatusCode::Ok).with_body("text/plain", b"hello".to_vec())
    /// }
    ///
    /// let mut router = Router::new(Arc::new(MemoryStore::new()));
    /// router.register("/hello", hello_handler);
    /// ```
    pub fn register(&mut self, path: &str, handler: Handler) {
        self.routes.push((Pattern::Exact(path.to_string()), handler));
    }

    /// Registra una ruta por prefijo
    pub fn register_prefix(&mut self, prefix: &str, handler: Handler) {
        self.routes.push((Pattern::Prefix(prefix.to_string()), handler));
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    pub fn route(&self, request: &Request) -> Response {
        let path = request.path();

        for (pattern, handler) in &self.routes {
            let rest = match pattern {
                Pattern::Exact(p) if p == path => Some(""),
                Pattern::Prefix(p) => path.strip_prefix(p.as_str()),
                _ => None,
            };

            if let Some(rest) = rest {
                let ctx = Context {
                    rest,
                    store: self.store.as_ref(),
                };
                return handler(request, &ctx);
            }
        }

        Response::new(StatusCode::NotFound)
    }
}
