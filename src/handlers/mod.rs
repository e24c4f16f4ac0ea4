//! # Handlers HTTP
//!
//! Implementación de las rutas del servidor.
//!
//! - **basic**: `/`, `/echo/<texto>`, `/user-agent`
//! - **files**: `/files/<nombre>` (GET lee, POST escribe)
//!
//! Cada handler recibe un Request y el `Context` del router, y retorna
//! una Response. Ningún error sale del handler: se convierte en un
//! código de estado.

pub mod basic;
pub mod files;

pub use basic::*;
pub use files::*;
