//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración con soporte para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./wsgate --port 4221 --directory /tmp/files --idle-timeout 30
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 FILES_DIR=/srv/files ./wsgate
//! ```

use std::time::Duration;

use clap::Parser;
use tracing::info;

/// Configuración del servidor HTTP/WebSocket
#[derive(Debug, Clone, Parser)]
#[command(name = "wsgate")]
#[command(about = "Servidor HTTP/1.1 con upgrade a WebSocket")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "4221", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    /// Directorio donde `/files/` guarda y lee archivos
    #[arg(short, long = "directory", default_value = "files", env = "FILES_DIR")]
    pub files_dir: String,

    /// Segundos de espera por la siguiente request line antes de cerrar
    #[arg(long = "idle-timeout", default_value = "30", env = "IDLE_TIMEOUT_SECS")]
    pub idle_timeout_secs: u64,

    /// Tamaño máximo de payload de un frame WebSocket entrante (bytes)
    #[arg(long = "max-frame-size", default_value = "16777216", env = "MAX_FRAME_SIZE")]
    pub max_frame_size: u64,

    /// Tamaño máximo del body de un request HTTP (bytes)
    #[arg(long = "max-body-size", default_value = "16777216", env = "MAX_BODY_SIZE")]
    pub max_body_size: usize,

    /// Filtro de logs si `RUST_LOG` no está definido
    #[arg(long = "log-level", default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use wsgate::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:4221");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), String> {
        if self.idle_timeout_secs == 0 {
            return Err("Idle timeout must be > 0".to_string());
        }
        if self.max_frame_size == 0 {
            return Err("Max frame size must be > 0".to_string());
        }
        if self.max_body_size == 0 {
            return Err("Max body size must be > 0".to_string());
        }
        if self.files_dir.trim().is_empty() {
            return Err("Files directory must not be empty".to_string());
        }
        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn log_summary(&self) {
        info!(
            address = %self.address(),
            files_dir = %self.files_dir,
            idle_timeout_secs = self.idle_timeout_secs,
            max_frame_size = self.max_frame_size,
            max_body_size = self.max_body_size,
            "configuración cargada"
        );
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 4221,
            host: "127.0.0.1".to_string(),
            files_dir: "files".to_string(),
            idle_timeout_secs: 30,
            max_frame_size: 16 * 1024 * 1024,
            max_body_size: 16 * 1024 * 1024,
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 4221);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.files_dir, "files");
        assert_eq!(config.idle_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "0.0.0.0".to_string();
        config.port = 3000;
        assert_eq!(config.address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_validate_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_idle_timeout() {
        let mut config = Config::default();
        config.idle_timeout_secs = 0;
        let result = config.validate();
        assert!(result.unwrap_err().contains("Idle timeout"));
    }

    #[test]
    fn test_validate_invalid_frame_size() {
        let mut config = Config::default();
        config.max_frame_size = 0;
        assert!(config.validate().unwrap_err().contains("Max frame size"));
    }

    #[test]
    fn test_validate_invalid_body_size() {
        let mut config = Config::default();
        config.max_body_size = 0;
        assert!(config.validate().unwrap_err().contains("Max body size"));
    }

    #[test]
    fn test_validate_empty_directory() {
        let mut config = Config::default();
        config.files_dir = "  ".to_string();
        assert!(config.validate().unwrap_err().contains("Files directory"));
    }

    #[test]
    fn test_parse_cli_flags() {
        let config = Config::try_parse_from([
            "wsgate",
            "--port",
            "9000",
            "--directory",
            "/tmp/data",
            "--idle-timeout",
            "5",
            "--max-body-size",
            "2048",
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.files_dir, "/tmp/data");
        assert_eq!(config.idle_timeout_secs, 5);
        assert_eq!(config.max_body_size, 2048);
    }

    #[test]
    fn test_parse_rejects_non_numeric_port() {
        assert!(Config::try_parse_from(["wsgate", "--port", "abc"]).is_err());
    }
}
