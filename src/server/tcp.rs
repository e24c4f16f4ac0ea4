//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Servidor que maneja múltiples conexiones simultáneas usando threads.
//! Cada conexión se procesa en su propio thread, así una falla de
//! transporte solo termina esa conexión.

use crate::config::Config;
use crate::error::Result;
use crate::router::Router;
use crate::server::connection::{Connection, Outcome};
use crate::storage::DirectoryStore;
use crate::websocket::Registry;
use std::io::BufReader;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info, warn};

/// Servidor HTTP/1.1 + WebSocket, un thread por conexión
pub struct Server {
    config: Config,
    router: Arc<Router>,
    registry: Arc<Registry>,
    listener: TcpListener,
}

impl Server {
    /// Crea el servidor y abre el socket de escucha
    pub fn bind(config: Config) -> Result<Self> {
        config.validate().map_err(crate::error::Error::Config)?;

        let store = Arc::new(DirectoryStore::new(&config.files_dir));
        let router = Router::with_default_routes(store);

        let listener = TcpListener::bind(config.address())?;
        info!(address = %listener.local_addr()?, "servidor escuchando");

        Ok(Self {
            config,
            router: Arc::new(router),
            registry: Arc::new(Registry::new()),
            listener,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Registro de sesiones WebSocket compartido por todas las conexiones
    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    /// Acepta conexiones hasta que el listener falle
    pub fn run(&self) -> Result<()> {
        info!("modo concurrente: un thread por conexión");

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let router = Arc::clone(&self.router);
                    let registry = Arc::clone(&self.registry);
                    let config = self.config.clone();

                    let peer_addr = stream
                        .peer_addr()
                        .map(|addr| addr.to_string())
                        .unwrap_or_else(|_| "unknown".to_string());

                    info!(peer = %peer_addr, "nueva conexión");

                    thread::spawn(move || {
                        if let Err(e) = Self::handle_connection(stream, peer_addr.clone(), router, registry, &config) {
                            warn!(peer = %peer_addr, error = %e, "conexión terminada con error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "error al aceptar conexión");
                }
            }
        }

        let drained = self.registry.drain();
        info!(drained, "servidor detenido");
        Ok(())
    }

    fn handle_connection(
        stream: TcpStream,
        peer: String,
        router: Arc<Router>,
        registry: Arc<Registry>,
        config: &Config,
    ) -> Result<()> {
        stream.set_read_timeout(Some(config.idle_timeout()))?;
        let control = stream.try_clone()?;
        let reader = BufReader::new(stream.try_clone()?);

        let connection = Connection::new(
            reader,
            stream,
            peer,
            router,
            registry,
            config.max_frame_size,
            config.max_body_size,
        );

        let result = match connection.run() {
            Ok(Outcome::Closed) => Ok(()),
            // Las sesiones WebSocket no tienen timeout de inactividad
            Ok(Outcome::Upgraded(session)) => match control.set_read_timeout(None) {
                Ok(()) => session.run(),
                Err(e) => {
                    session.abort();
                    Err(e.into())
                }
            },
            Err(e) => Err(e),
        };

        if let Err(e) = control.shutdown(Shutdown::Both) {
            debug!(error = %e, "shutdown del socket");
        }

        result
    }
}
