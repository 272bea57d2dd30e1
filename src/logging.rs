//! # Log de Transacciones
//! src/logging.rs
//!
//! Registro persistente de cada petición atendida, repartido en dos
//! ficheros dentro del directorio raíz del servidor:
//!
//! - `access_log.txt`: respuestas con éxito (200 y 304)
//! - `errors_log.txt`: respuestas de error (400, 403, 404)
//!
//! Cada transacción ocupa un bloque de líneas terminado en línea en
//! blanco:
//!
//! ```text
//! Petition received: GET /index.html HTTP/1.0
//! From: 127.0.0.1:54321
//! Date: Thu Jan 01 00:00:00 UTC 1970
//! Server answer: 200 OK
//! Sent resource size: 1024
//! ```
//!
//! La línea de tamaño solo aparece en las transacciones con éxito. Un
//! fallo al escribir el log se avisa y se descarta: el servidor nunca
//! deja de responder por culpa del log.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::http::date;
use crate::http::StatusCode;

/// Fichero de transacciones con éxito
pub const ACCESS_LOG_FILE: &str = "access_log.txt";

/// Fichero de transacciones con error
pub const ERRORS_LOG_FILE: &str = "errors_log.txt";

/// Máximo de tokens de la línea de petición que se registran
const MAX_LOGGED_TOKENS: usize = 3;

/// Log de transacciones thread-safe
///
/// Los workers comparten clones de este handle; cada fichero tiene su
/// propio mutex, así que escribir un acceso no bloquea escribir un
/// error.
#[derive(Clone)]
pub struct TransactionLog {
    access: Arc<LogFile>,
    errors: Arc<LogFile>,
}

/// Un fichero de log con su mutex de serialización
struct LogFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl TransactionLog {
    /// Crea el log de transacciones bajo el directorio raíz dado
    ///
    /// Los ficheros no se crean hasta la primera escritura.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            access: Arc::new(LogFile {
                path: root.join(ACCESS_LOG_FILE),
                lock: Mutex::new(()),
            }),
            errors: Arc::new(LogFile {
                path: root.join(ERRORS_LOG_FILE),
                lock: Mutex::new(()),
            }),
        }
    }

    /// Registra una transacción completa
    ///
    /// `tokens` son los tokens de la línea de petición (se registran
    /// como mucho tres), `remote` la dirección del cliente y
    /// `received_at` el instante de recepción. El fichero de destino lo
    /// decide el código de estado de la respuesta.
    pub fn record(
        &self,
        tokens: &[String],
        remote: &str,
        received_at: DateTime<Utc>,
        status: StatusCode,
        size: u64,
    ) {
        let record = Self::format_record(tokens, remote, received_at, status, size);
        let file = if status.is_success() {
            &self.access
        } else {
            &self.errors
        };
        Self::append(file, &record);
    }

    /// Ruta del fichero de accesos
    pub fn access_path(&self) -> &Path {
        &self.access.path
    }

    /// Ruta del fichero de errores
    pub fn errors_path(&self) -> &Path {
        &self.errors.path
    }

    /// Construye el bloque de texto de una transacción
    fn format_record(
        tokens: &[String],
        remote: &str,
        received_at: DateTime<Utc>,
        status: StatusCode,
        size: u64,
    ) -> String {
        let mut record = String::from("Petition received:");
        for token in tokens.iter().take(MAX_LOGGED_TOKENS) {
            record.push(' ');
            record.push_str(token);
        }
        record.push('\n');

        record.push_str(&format!("From: {}\n", remote));
        record.push_str(&format!("Date: {}\n", date::format_datetime(received_at)));
        record.push_str(&format!("Server answer: {}\n", status));

        if status.is_success() {
            record.push_str(&format!("Sent resource size: {}\n", size));
        }

        record.push('\n');
        record
    }

    /// Añade un bloque al final del fichero indicado
    ///
    /// Abre en modo append en cada escritura, con lo que el fichero se
    /// puede rotar por fuera sin reiniciar el servidor. Un mutex
    /// envenenado se recupera: el contenido protegido es solo el turno
    /// de escritura.
    fn append(file: &LogFile, record: &str) {
        let _guard = file.lock.lock().unwrap_or_else(|e| e.into_inner());

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file.path)
            .and_then(|mut handle| {
                handle.write_all(record.as_bytes())?;
                handle.flush()
            });

        if let Err(e) = result {
            log::warn!("no se pudo escribir el log {}: {}", file.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::UNIX_EPOCH;
    use tempfile::TempDir;

    fn epoch() -> DateTime<Utc> {
        DateTime::<Utc>::from(UNIX_EPOCH)
    }

    fn request_tokens() -> Vec<String> {
        vec![
            "GET".to_string(),
            "/index.html".to_string(),
            "HTTP/1.0".to_string(),
        ]
    }

    // ==================== Formato del bloque ====================

    #[test]
    fn test_format_record_success() {
        let record = TransactionLog::format_record(
            &request_tokens(),
            "10.0.0.1:1234",
            epoch(),
            StatusCode::Ok,
            7,
        );

        assert_eq!(
            record,
            "Petition received: GET /index.html HTTP/1.0\n\
             From: 10.0.0.1:1234\n\
             Date: Thu Jan 01 00:00:00 UTC 1970\n\
             Server answer: 200 OK\n\
             Sent resource size: 7\n\n"
        );
    }

    #[test]
    fn test_format_record_error_omits_size() {
        let record = TransactionLog::format_record(
            &request_tokens(),
            "10.0.0.1:1234",
            epoch(),
            StatusCode::NotFound,
            0,
        );

        assert!(record.contains("Server answer: 404 Not Found\n"));
        assert!(!record.contains("Sent resource size"));
        assert!(record.ends_with("\n\n"));
    }

    #[test]
    fn test_format_record_truncates_tokens() {
        let tokens = vec![
            "GET".to_string(),
            "/a".to_string(),
            "HTTP/1.0".to_string(),
            "extra".to_string(),
        ];
        let record =
            TransactionLog::format_record(&tokens, "10.0.0.1:1", epoch(), StatusCode::Ok, 0);

        assert!(record.starts_with("Petition received: GET /a HTTP/1.0\n"));
        assert!(!record.contains("extra"));
    }

    #[test]
    fn test_format_record_short_token_list() {
        let tokens = vec!["GET".to_string()];
        let record =
            TransactionLog::format_record(&tokens, "10.0.0.1:1", epoch(), StatusCode::BadRequest, 0);

        assert!(record.starts_with("Petition received: GET\n"));
    }

    // ==================== Selección de fichero ====================

    #[test]
    fn test_success_goes_to_access_log() {
        let dir = TempDir::new().unwrap();
        let log = TransactionLog::new(dir.path());

        log.record(&request_tokens(), "127.0.0.1:9", epoch(), StatusCode::Ok, 42);

        let contents = fs::read_to_string(log.access_path()).unwrap();
        assert!(contents.contains("Sent resource size: 42"));
        assert!(!log.errors_path().exists());
    }

    #[test]
    fn test_error_goes_to_errors_log() {
        let dir = TempDir::new().unwrap();
        let log = TransactionLog::new(dir.path());

        log.record(
            &request_tokens(),
            "127.0.0.1:9",
            epoch(),
            StatusCode::Forbidden,
            0,
        );

        let contents = fs::read_to_string(log.errors_path()).unwrap();
        assert!(contents.contains("Server answer: 403 Forbidden"));
        assert!(!log.access_path().exists());
    }

    #[test]
    fn test_not_modified_counts_as_success() {
        let dir = TempDir::new().unwrap();
        let log = TransactionLog::new(dir.path());

        log.record(
            &request_tokens(),
            "127.0.0.1:9",
            epoch(),
            StatusCode::NotModified,
            0,
        );

        let contents = fs::read_to_string(log.access_path()).unwrap();
        assert!(contents.contains("Server answer: 304 Not Modified"));
        assert!(contents.contains("Sent resource size: 0"));
    }

    #[test]
    fn test_records_append() {
        let dir = TempDir::new().unwrap();
        let log = TransactionLog::new(dir.path());

        log.record(&request_tokens(), "127.0.0.1:1", epoch(), StatusCode::Ok, 1);
        log.record(&request_tokens(), "127.0.0.1:2", epoch(), StatusCode::Ok, 2);

        let contents = fs::read_to_string(log.access_path()).unwrap();
        assert!(contents.contains("From: 127.0.0.1:1"));
        assert!(contents.contains("From: 127.0.0.1:2"));
        assert_eq!(contents.matches("Petition received:").count(), 2);
    }

    #[test]
    fn test_shared_handle_between_threads() {
        let dir = TempDir::new().unwrap();
        let log = TransactionLog::new(dir.path());

        let mut handles = Vec::new();
        for i in 0..4 {
            let log = log.clone();
            handles.push(std::thread::spawn(move || {
                log.record(
                    &request_tokens(),
                    &format!("127.0.0.1:{}", i),
                    epoch(),
                    StatusCode::Ok,
                    i,
                );
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let contents = fs::read_to_string(log.access_path()).unwrap();
        assert_eq!(contents.matches("Petition received:").count(), 4);
    }
}
