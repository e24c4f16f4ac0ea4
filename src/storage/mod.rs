//! # Almacenamiento de Archivos
//! src/storage/mod.rs
//!
//! Interfaz mínima de lectura/escritura de blobs con nombre que usa
//! `/files/<name>`. La implementación real guarda un archivo por nombre
//! dentro de un directorio; `MemoryStore` se usa en tests.
//!
//! Los nombres se validan antes de tocar el filesystem: no se aceptan
//! nombres vacíos ni con `/`, `\` o `..`.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

/// Errores del store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("file not found: {0}")]
    NotFound(String),

    /// Nombre vacío o con separadores / `..`
    #[error("invalid file name: {0:?}")]
    InvalidName(String),

    #[error("storage io error: {0}")]
    Io(#[from] io::Error),
}

/// Lectura/escritura de blobs por nombre
///
/// Las implementaciones se comparten entre threads. No hay locking por
/// nombre: dos escritores concurrentes sobre el mismo archivo pueden
/// intercalarse.
pub trait BlobStore: Send + Sync {
    fn read(&self, name: &str) -> Result<Vec<u8>, StoreError>;

    fn write(&self, name: &str, data: &[u8]) -> Result<(), StoreError>;
}

/// Valida un nombre de archivo
///
/// # Ejemplo
/// ```
/// use wsgate::storage::validate_name;
///
/// assert!(validate_name("foo.txt").is_ok());
/// assert!(validate_name("../etc/passwd").is_err());
/// assert!(validate_name("a/b").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<&str, StoreError> {
    if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(name)
}

/// Store respaldado por un directorio del filesystem
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// El directorio no necesita existir; se crea en la primera escritura
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BlobStore for DirectoryStore {
    fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.root.join(validate_name(name)?);

        match fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, name: &str, data: &[u8]) -> Result<(), StoreError> {
        let path = self.root.join(validate_name(name)?);

        fs::create_dir_all(&self.root)?;
        fs::write(path, data)?;
        Ok(())
    }
}

/// Store en memoria
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let name = validate_name(name)?;
        let blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        blobs
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn write(&self, name: &str, data: &[u8]) -> Result<(), StoreError> {
        let name = validate_name(name)?;
        let mut blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        blobs.insert(name.to_string(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("foo.txt").is_ok());
        assert!(validate_name("archivo-1_v2.bin").is_ok());
        assert!(matches!(validate_name(""), Err(StoreError::InvalidName(_))));
        assert!(matches!(validate_name(".."), Err(StoreError::InvalidName(_))));
        assert!(matches!(validate_name("a/../b"), Err(StoreError::InvalidName(_))));
        assert!(matches!(validate_name("dir/file"), Err(StoreError::InvalidName(_))));
        assert!(matches!(validate_name("dir\\file"), Err(StoreError::InvalidName(_))));
    }

    #[test]
    fn test_directory_store_write_then_read() {
        let tmp = TempDir::new().unwrap();
        let store = DirectoryStore::new(tmp.path());

        store.write("foo.txt", b"hello").unwrap();
        assert_eq!(store.read("foo.txt").unwrap(), b"hello");
        assert_eq!(fs::read(tmp.path().join("foo.txt")).unwrap(), b"hello");
    }

    #[test]
    fn test_directory_store_creates_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("nested").join("files");
        let store = DirectoryStore::new(&root);

        assert!(!root.exists());
        store.write("a.bin", &[0, 1, 2]).unwrap();
        assert!(root.is_dir());
        assert_eq!(store.read("a.bin").unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_directory_store_overwrites() {
        let tmp = TempDir::new().unwrap();
        let store = DirectoryStore::new(tmp.path());

        store.write("f", b"first version").unwrap();
        store.write("f", b"second").unwrap();
        assert_eq!(store.read("f").unwrap(), b"second");
    }

    #[test]
    fn test_directory_store_missing_file() {
        let tmp = TempDir::new().unwrap();
        let store = DirectoryStore::new(tmp.path());

        assert!(matches!(store.read("missing.txt"), Err(StoreError::NotFound(n)) if n == "missing.txt"));
    }

    #[test]
    fn test_directory_store_rejects_traversal() {
        let tmp = TempDir::new().unwrap();
        let store = DirectoryStore::new(tmp.path().join("files"));

        assert!(matches!(
            store.write("../escape.txt", b"x"),
            Err(StoreError::InvalidName(_))
        ));
        assert!(!tmp.path().join("escape.txt").exists());
    }

    #[test]
    fn test_directory_store_write_failure_is_io_error() {
        let tmp = TempDir::new().unwrap();
        // La raíz es un archivo, no un directorio
        let root = tmp.path().join("not-a-dir");
        fs::write(&root, b"x").unwrap();
        let store = DirectoryStore::new(&root);

        assert!(matches!(store.write("a", b"y"), Err(StoreError::Io(_))));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();

        assert!(matches!(store.read("a"), Err(StoreError::NotFound(_))));
        store.write("a", b"data").unwrap();
        assert_eq!(store.read("a").unwrap(), b"data");
        assert!(matches!(store.write("x/y", b""), Err(StoreError::InvalidName(_))));
    }
}
