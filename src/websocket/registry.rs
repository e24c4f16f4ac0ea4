//! # Registro de Sesiones WebSocket
//! src/websocket/registry.rs
//!
//! Conjunto thread-safe de sesiones WebSocket abiertas. Es la única
//! estructura que modifican varios threads a la vez.
//!
//! El broadcast toma una copia de la lista bajo el lock y escribe fuera
//! de él, así un peer lento no bloquea altas/bajas. Los peers cuya
//! escritura falla se dan de baja al terminar el broadcast.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::frame::Frame;

/// Sesión WebSocket registrada
///
/// El writer está protegido por un mutex: el thread dueño de la sesión y
/// los broadcasts de otros threads nunca intercalan bytes de dos frames.
pub struct Peer {
    id: u64,
    path: String,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl Peer {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Path pedido en el upgrade
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Envía un frame completo a este peer
    pub fn send(&self, frame: &Frame) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        frame.write_to(&mut **writer)
    }
}

impl std::fmt::Debug for Peer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Peer")
            .field("id", &self.id)
            .field("path", &self.path)
            .finish()
    }
}

/// Registro compartido de sesiones WebSocket
#[derive(Debug, Default)]
pub struct Registry {
    peers: Mutex<Vec<Arc<Peer>>>,
    next_id: AtomicU64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra una sesión recién upgradeada
    pub fn add(&self, path: &str, writer: Box<dyn Write + Send>) -> Arc<Peer> {
        let peer = Arc::new(Peer {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            path: path.to_string(),
            writer: Mutex::new(writer),
        });

        self.lock().push(Arc::clone(&peer));
        debug!(session = peer.id, path, "sesión WebSocket registrada");
        peer
    }

    /// Da de baja una sesión. Retorna `false` si ya no estaba.
    pub fn remove(&self, id: u64) -> bool {
        let mut peers = self.lock();
        let before = peers.len();
        peers.retain(|p| p.id != id);
        before != peers.len()
    }

    /// Envía `frame` a todas las sesiones excepto `sender`
    ///
    /// Retorna cuántas sesiones lo recibieron.
    pub fn broadcast(&self, sender: u64, frame: &Frame) -> usize {
        let targets: Vec<Arc<Peer>> = self
            .lock()
            .iter()
            .filter(|p| p.id != sender)
            .cloned()
            .collect();

        let mut delivered = 0;
        let mut failed = Vec::new();

        for peer in &targets {
            match peer.send(frame) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(session = peer.id, error = %e, "falló broadcast, se da de baja la sesión");
                    failed.push(peer.id);
                }
            }
        }

        if !failed.is_empty() {
            self.lock().retain(|p| !failed.contains(&p.id));
        }

        delivered
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Envía un close frame a cada sesión y vacía el registro
    pub fn drain(&self) -> usize {
        let peers: Vec<Arc<Peer>> = std::mem::take(&mut *self.lock());

        for peer in &peers {
            if let Err(e) = peer.send(&Frame::close(Vec::new())) {
                debug!(session = peer.id, error = %e, "no se pudo enviar close al drenar");
            }
        }

        peers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Arc<Peer>>> {
        self.peers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::thread;

    /// Writer en memoria compartido para inspeccionar lo enviado
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuf(pub Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        pub(crate) fn contents(&self) -> Vec<u8> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Writer que siempre falla, simula un socket roto
    pub(crate) struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_add_and_remove() {
        let registry = Registry::new();
        let a = registry.add("/a", Box::new(SharedBuf::default()));
        let b = registry.add("/b", Box::new(SharedBuf::default()));

        assert_ne!(a.id(), b.id());
        assert_eq!(a.path(), "/a");
        assert_eq!(registry.len(), 2);

        assert!(registry.remove(a.id()));
        assert!(!registry.remove(a.id()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_broadcast_excludes_sender() {
        let registry = Registry::new();
        let (buf_a, buf_b, buf_c) = (SharedBuf::default(), SharedBuf::default(), SharedBuf::default());
        let a = registry.add("/", Box::new(buf_a.clone()));
        registry.add("/", Box::new(buf_b.clone()));
        registry.add("/", Box::new(buf_c.clone()));

        let frame = Frame::text("Broadcast: hi");
        assert_eq!(registry.broadcast(a.id(), &frame), 2);

        assert!(buf_a.contents().is_empty());
        assert_eq!(buf_b.contents(), frame.encode());
        assert_eq!(buf_c.contents(), frame.encode());
    }

    #[test]
    fn test_broadcast_removes_failed_peers() {
        let registry = Registry::new();
        let ok = SharedBuf::default();
        let sender = registry.add("/", Box::new(SharedBuf::default()));
        let broken = registry.add("/", Box::new(BrokenPipe));
        registry.add("/", Box::new(ok.clone()));

        assert_eq!(registry.broadcast(sender.id(), &Frame::text("x")), 1);
        assert_eq!(registry.len(), 2);
        assert!(!registry.remove(broken.id()));
        assert_eq!(ok.contents(), Frame::text("x").encode());
    }

    #[test]
    fn test_drain_sends_close_and_empties() {
        let registry = Registry::new();
        let buf = SharedBuf::default();
        registry.add("/", Box::new(buf.clone()));
        registry.add("/", Box::new(BrokenPipe));

        assert_eq!(registry.drain(), 2);
        assert!(registry.is_empty());
        assert_eq!(buf.contents(), vec![0x88, 0x00]);
    }

    #[test]
    fn test_concurrent_add_remove_broadcast() {
        let registry = Arc::new(Registry::new());
        let listener = SharedBuf::default();
        registry.add("/listen", Box::new(listener.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..50 {
                        let peer = registry.add("/t", Box::new(SharedBuf::default()));
                        registry.broadcast(peer.id(), &Frame::text("m"));
                        registry.remove(peer.id());
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(registry.len(), 1);
        let one = Frame::text("m").encode();
        let received = listener.contents();
        assert_eq!(received.len(), one.len() * 400);
        assert!(received.chunks(one.len()).all(|c| c == one.as_slice()));
    }
}
